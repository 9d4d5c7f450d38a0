//! Sentiment analysis pipeline for rating text on a five-step scale.
//!
//! ## Main Types
//!
//! - [`SentimentAnalysisPipeline`] - High-level interface for sentiment classification
//! - [`SentimentAnalysisPipelineBuilder`] - Builder pattern for pipeline configuration
//! - [`SentimentAnalysisModel`] - Trait for sentiment analysis model implementations
//! - [`SentimentClassifier`] - Object-safe classification seam used by the web server
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use sentiment_web::pipelines::sentiment_analysis_pipeline::*;
//!
//! # async fn run() -> sentiment_web::core::Result<()> {
//! let pipeline = SentimentAnalysisPipelineBuilder::nlptown().build().await?;
//!
//! let result = pipeline.predict("I love this product!")?;
//! println!("Sentiment: {} (confidence: {:.2})", result.label, result.score);
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod model;
pub mod pipeline;

pub use builder::SentimentAnalysisPipelineBuilder;
pub use model::SentimentAnalysisModel;
pub use pipeline::{SentimentAnalysisPipeline, SentimentClassifier, SentimentResult};

pub use crate::core::SentimentLabel;
pub use crate::loaders::ModelSource;
pub use crate::pipelines::utils::{DeviceRequest, DeviceSelectable};
