//! Configuration management for the sentiment web service.
//!
//! Sources are layered in this order, later ones winning:
//! built-in defaults, an optional `config/sentiment.toml`, then environment
//! variables such as `SENTIMENT__SERVER__PORT=8080`.

use crate::core::error::Result;
use crate::loaders::ModelSource;
use crate::pipelines::utils::DeviceRequest;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_MODEL_REPO: &str = "nlptown/bert-base-multilingual-uncased-sentiment";
pub const DEFAULT_CONFIG_PATH: &str = "config/sentiment.toml";

/// Main application configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub model: ModelConfig,
}

/// HTTP listener configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Number of worker threads; the framework picks one per core when unset.
    #[serde(default)]
    pub workers: Option<usize>,
}

/// Where the classifier weights come from and where they run
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ModelConfig {
    pub repo: String,
    pub revision: String,
    /// Local model directory. Takes precedence over `repo` when set.
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// `auto`, `cpu` or `cuda:<index>`
    pub device: String,
}

impl AppConfig {
    /// Load configuration from the default file location and the environment
    pub fn load() -> Result<Self> {
        Self::load_from_path(DEFAULT_CONFIG_PATH)
    }

    /// Load configuration from a specific (optional) file and the environment
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 5000)?
            .set_default("model.repo", DEFAULT_MODEL_REPO)?
            .set_default("model.revision", "main")?
            .set_default("model.device", "auto")?
            .add_source(File::from(path.as_ref()).required(false))
            .add_source(
                Environment::with_prefix("SENTIMENT")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }

    pub fn bind_address(&self) -> (String, u16) {
        (self.server.host.clone(), self.server.port)
    }
}

impl ModelConfig {
    pub fn source(&self) -> ModelSource {
        match &self.path {
            Some(path) => ModelSource::Local(path.clone()),
            None => ModelSource::Hub {
                repo: self.repo.clone(),
                revision: self.revision.clone(),
            },
        }
    }

    pub fn device_request(&self) -> Result<DeviceRequest> {
        self.device.parse()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 5000,
                workers: None,
            },
            model: ModelConfig {
                repo: DEFAULT_MODEL_REPO.to_string(),
                revision: "main".to_string(),
                path: None,
                device: "auto".to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.bind_address(), ("127.0.0.1".to_string(), 5000));
        assert_eq!(config.model.repo, DEFAULT_MODEL_REPO);
        assert_eq!(
            config.model.source(),
            ModelSource::Hub {
                repo: DEFAULT_MODEL_REPO.to_string(),
                revision: "main".to_string(),
            }
        );
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = AppConfig::load_from_path("does/not/exist.toml").unwrap();
        assert_eq!(config.server, AppConfig::default().server);
        assert_eq!(config.model.repo, DEFAULT_MODEL_REPO);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let path = std::env::temp_dir().join(format!("sentiment-web-{}.toml", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "[server]\nport = 8080\n\n[model]\npath = \"/models/nlptown\"\ndevice = \"cpu\"").unwrap();

        let config = AppConfig::load_from_path(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(
            config.model.source(),
            ModelSource::Local(PathBuf::from("/models/nlptown"))
        );
        assert!(matches!(
            config.model.device_request().unwrap(),
            DeviceRequest::Cpu
        ));
    }
}
