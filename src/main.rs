//! Sentiment Web - Main Entry Point
//!
//! Loads the classifier once, then serves the form page and the JSON API.

use anyhow::{Context, Result};
use sentiment_web::pipelines::sentiment_analysis_pipeline::*;
use sentiment_web::{server, AppConfig};
use std::sync::Arc;
use tracing::info;

#[actix_web::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sentiment_web=info,actix_web=info".into()),
        )
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;
    let source = config.model.source();
    info!(%source, device = %config.model.device, "Starting sentiment web");

    let pipeline = SentimentAnalysisPipelineBuilder::bert(source)
        .device_request(config.model.device_request()?)
        .build()
        .await
        .context("Failed to load sentiment model")?;
    info!(device = ?pipeline.device(), "Sentiment model ready");

    let classifier: Arc<dyn SentimentClassifier> = Arc::new(pipeline);
    server::run(&config, classifier).await?;

    info!("Server stopped");
    Ok(())
}
