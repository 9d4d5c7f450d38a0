//! Model and tokenizer file resolution.
//!
//! Files either come from a Hugging Face Hub repository, in which case they are
//! downloaded once into the local hub cache and reused on every later start, or
//! from a local directory laid out like a hub snapshot.
//!
//! ## Main Types
//!
//! - [`ModelSource`] - Where a model lives
//! - [`HfLoader`] - Single file fetch from the hub with retry logic
//! - [`TokenizerLoader`] - Loads `tokenizer.json`, or builds a WordPiece
//!   tokenizer from `vocab.txt` for checkpoints that only ship the vocabulary
//! - [`ModelFiles`] - Resolved paths of the model config and weights
//!
//! Hub fetches retry on lock acquisition failures, which happen when two
//! processes share the same cache directory.

use crate::core::{ModelOptions, Result, SentimentError};
use hf_hub::api::tokio::ApiBuilder;
use hf_hub::{Repo, RepoType};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tokenizers::decoders::DecoderWrapper;
use tokenizers::models::wordpiece::WordPiece;
use tokenizers::models::ModelWrapper;
use tokenizers::normalizers::bert::BertNormalizer;
use tokenizers::normalizers::NormalizerWrapper;
use tokenizers::pre_tokenizers::bert::BertPreTokenizer;
use tokenizers::pre_tokenizers::PreTokenizerWrapper;
use tokenizers::processors::bert::BertProcessing;
use tokenizers::processors::PostProcessorWrapper;
use tokenizers::{Model, Tokenizer, TokenizerBuilder};

pub(crate) const CONFIG_FILE: &str = "config.json";
const TOKENIZER_FILE: &str = "tokenizer.json";
const VOCAB_FILE: &str = "vocab.txt";
const TOKENIZER_CONFIG_FILE: &str = "tokenizer_config.json";
const SAFETENSORS_FILE: &str = "model.safetensors";
const PYTORCH_FILE: &str = "pytorch_model.bin";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ModelSource {
    Hub { repo: String, revision: String },
    Local(PathBuf),
}

impl ModelSource {
    pub fn hub(repo: &str) -> Self {
        ModelSource::Hub {
            repo: repo.to_string(),
            revision: "main".to_string(),
        }
    }

    /// Resolve a single file from this source, downloading it if needed.
    pub async fn fetch(&self, filename: &str) -> Result<PathBuf> {
        match self {
            ModelSource::Hub { repo, revision } => {
                HfLoader::new(repo, revision, filename).load().await
            }
            ModelSource::Local(dir) => local_file(dir, filename),
        }
    }
}

impl std::fmt::Display for ModelSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelSource::Hub { repo, revision } => write!(f, "{repo}@{revision}"),
            ModelSource::Local(dir) => write!(f, "{}", dir.display()),
        }
    }
}

impl ModelOptions for ModelSource {
    fn cache_key(&self) -> String {
        match self {
            ModelSource::Hub { repo, revision } => format!("hub:{repo}@{revision}"),
            ModelSource::Local(dir) => format!("local:{}", dir.display()),
        }
    }
}

fn local_file(dir: &Path, filename: &str) -> Result<PathBuf> {
    let path = dir.join(filename);
    if path.is_file() {
        Ok(path)
    } else {
        Err(SentimentError::ModelNotFound(format!(
            "{} does not exist",
            path.display()
        )))
    }
}

#[derive(Debug, Clone)]
pub struct HfLoader {
    pub repo: String,
    pub revision: String,
    pub filename: String,
}

impl HfLoader {
    pub fn new(repo: &str, revision: &str, filename: &str) -> Self {
        Self {
            repo: repo.into(),
            revision: revision.into(),
            filename: filename.into(),
        }
    }

    pub async fn load(&self) -> Result<PathBuf> {
        let hf_api = ApiBuilder::new().with_chunk_size(None).build()?;
        let hf_repo = hf_api.repo(Repo::with_revision(
            self.repo.clone(),
            RepoType::Model,
            self.revision.clone(),
        ));

        let max_retries = 3;
        let mut attempt = 0;
        loop {
            match hf_repo.get(self.filename.as_str()).await {
                Ok(path) => return Ok(path),
                Err(e) => {
                    if e.to_string().contains("Lock acquisition failed") && attempt < max_retries - 1
                    {
                        let wait_time = std::time::Duration::from_millis(100 * (1 << attempt));
                        tracing::warn!(
                            repo = %self.repo,
                            file = %self.filename,
                            attempt,
                            "hub cache locked, retrying in {:?}",
                            wait_time
                        );
                        tokio::time::sleep(wait_time).await;
                        attempt += 1;
                        continue;
                    }
                    return Err(e.into());
                }
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct TokenizerLoader {
    source: ModelSource,
}

impl TokenizerLoader {
    pub fn new(source: ModelSource) -> Self {
        Self { source }
    }

    pub async fn load(&self) -> Result<Tokenizer> {
        let path = match self.source.fetch(TOKENIZER_FILE).await {
            Ok(path) => path,
            Err(tokenizer_err) => {
                return self.load_wordpiece().await.map_err(|e| {
                    SentimentError::TokenizerNotFound(format!(
                        "no tokenizer in {}: `{TOKENIZER_FILE}` ({tokenizer_err}), `{VOCAB_FILE}` ({e})",
                        self.source
                    ))
                })
            }
        };

        Tokenizer::from_file(&path)
            .map_err(|e| SentimentError::TokenizerNotFound(format!("{}: {e}", path.display())))
    }

    /// BERT WordPiece tokenizer rebuilt from `vocab.txt`, cased or not as
    /// `tokenizer_config.json` says (uncased when it is missing).
    async fn load_wordpiece(&self) -> Result<Tokenizer> {
        let vocab = self.source.fetch(VOCAB_FILE).await?;
        let settings = match self.source.fetch(TOKENIZER_CONFIG_FILE).await {
            Ok(path) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
            Err(_) => TokenizerSettings::default(),
        };
        tracing::debug!(
            source = %self.source,
            lowercase = settings.do_lower_case,
            "building WordPiece tokenizer from vocab"
        );
        wordpiece_tokenizer(&vocab, settings.do_lower_case)
    }
}

#[derive(Debug, Deserialize)]
struct TokenizerSettings {
    #[serde(default = "default_lower_case")]
    do_lower_case: bool,
}

impl Default for TokenizerSettings {
    fn default() -> Self {
        Self {
            do_lower_case: default_lower_case(),
        }
    }
}

fn default_lower_case() -> bool {
    true
}

fn wordpiece_tokenizer(vocab: &Path, lowercase: bool) -> Result<Tokenizer> {
    let tokenization = |e: tokenizers::Error| SentimentError::Tokenization(e.to_string());

    let vocab = vocab.to_str().ok_or_else(|| {
        SentimentError::TokenizerNotFound(format!("{} is not UTF-8", vocab.display()))
    })?;
    let model = WordPiece::from_file(vocab)
        .unk_token("[UNK]".to_string())
        .build()
        .map_err(tokenization)?;

    let special = |token: &str| {
        model.token_to_id(token).ok_or_else(|| {
            SentimentError::Tokenization(format!("vocabulary has no `{token}` token"))
        })
    };
    let processor = BertProcessing::new(
        ("[SEP]".to_string(), special("[SEP]")?),
        ("[CLS]".to_string(), special("[CLS]")?),
    );

    let tokenizer = TokenizerBuilder::<
        ModelWrapper,
        NormalizerWrapper,
        PreTokenizerWrapper,
        PostProcessorWrapper,
        DecoderWrapper,
    >::new()
    .with_model(model.into())
    .with_normalizer(Some(BertNormalizer::new(true, true, None, lowercase).into()))
    .with_pre_tokenizer(Some(BertPreTokenizer.into()))
    .with_post_processor(Some(processor.into()))
    .build()
    .map_err(tokenization)?;

    Ok(Tokenizer::from(tokenizer))
}

/// Weight file formats a classifier can be read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WeightsFile {
    Safetensors(PathBuf),
    Pytorch(PathBuf),
}

#[derive(Debug, Clone)]
pub struct ModelFiles {
    pub config: PathBuf,
    pub weights: WeightsFile,
}

impl ModelFiles {
    /// Resolve `config.json` and the weights, preferring safetensors over a
    /// pickled PyTorch checkpoint.
    pub async fn resolve(source: &ModelSource) -> Result<Self> {
        let config = source.fetch(CONFIG_FILE).await?;

        let weights = match source.fetch(SAFETENSORS_FILE).await {
            Ok(path) => WeightsFile::Safetensors(path),
            Err(safetensors_err) => match source.fetch(PYTORCH_FILE).await {
                Ok(path) => WeightsFile::Pytorch(path),
                Err(e) => {
                    return Err(SentimentError::ModelNotFound(format!(
                        "no weights in {source}: expected `{SAFETENSORS_FILE}` ({safetensors_err}) or `{PYTORCH_FILE}` ({e})"
                    )))
                }
            },
        };

        Ok(Self { config, weights })
    }
}
