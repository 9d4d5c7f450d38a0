pub mod cache;
pub mod config;
pub mod error;
pub mod label;

pub use cache::{global_cache, ModelCache, ModelOptions};
pub use config::AppConfig;
pub use error::{Result, SentimentError};
pub use label::SentimentLabel;
