//! Integration tests against the real nlptown checkpoint.
//! Run with: cargo test --features integration

#![cfg(feature = "integration")]

use sentiment_web::core::global_cache;
use sentiment_web::pipelines::sentiment_analysis_pipeline::*;

#[tokio::test]
async fn sentiment_basic() -> anyhow::Result<()> {
    let pipeline = SentimentAnalysisPipelineBuilder::nlptown().cpu().build().await?;

    let res = pipeline.predict("I love this")?;
    assert!(SentimentLabel::ALL.contains(&res.label));
    assert!(res.score > 0.0 && res.score <= 1.0);
    assert!(res.label >= SentimentLabel::Positive);

    let res = pipeline.classify("terrible service")?;
    assert!(res <= SentimentLabel::Negative);
    Ok(())
}

#[tokio::test]
async fn sentiment_is_deterministic_and_handles_empty_input() -> anyhow::Result<()> {
    let pipeline = SentimentAnalysisPipelineBuilder::nlptown().cpu().build().await?;

    let first = pipeline.predict("Das Essen war in Ordnung.")?;
    let second = pipeline.predict("Das Essen war in Ordnung.")?;
    assert_eq!(first, second);

    let empty = pipeline.classify("")?;
    assert!(SentimentLabel::ALL.contains(&empty));
    Ok(())
}

#[tokio::test]
async fn long_input_is_truncated_not_rejected() -> anyhow::Result<()> {
    let pipeline = SentimentAnalysisPipelineBuilder::nlptown().cpu().build().await?;

    let text = "the service was wonderful ".repeat(400);
    pipeline.classify(&text)?;
    Ok(())
}

#[tokio::test]
async fn repeated_builds_reuse_the_loaded_model() -> anyhow::Result<()> {
    SentimentAnalysisPipelineBuilder::nlptown().cpu().build().await?;
    let loaded = global_cache().len().await;

    for _ in 0..3 {
        SentimentAnalysisPipelineBuilder::nlptown().cpu().build().await?;
    }
    assert_eq!(global_cache().len().await, loaded);
    Ok(())
}
