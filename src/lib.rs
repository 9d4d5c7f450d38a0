//! A small web front end that rates the sentiment of submitted text on a
//! five-step scale, from "Very Negative" to "Very Positive", with a pretrained
//! multilingual BERT classifier running on Candle.

pub mod core;
pub mod loaders;
pub mod models;
pub mod pipelines;
pub mod server;

pub use crate::core::{AppConfig, Result, SentimentError, SentimentLabel};
pub use pipelines::{
    SentimentAnalysisPipeline, SentimentAnalysisPipelineBuilder, SentimentClassifier,
};
