use anyhow::Result;
use sentiment_web::pipelines::sentiment_analysis_pipeline::*;
use std::io::BufRead;

/// Classifies each line read from stdin.
#[tokio::main]
async fn main() -> Result<()> {
    println!("Building pipeline...");

    let pipeline = SentimentAnalysisPipelineBuilder::nlptown().build().await?;

    println!("Pipeline built successfully on {:?}.", pipeline.device());

    for line in std::io::stdin().lock().lines() {
        let text = line?;
        let result = pipeline.predict(&text)?;
        println!(
            "{} (rank {}, confidence: {:.4}) <- \"{}\"",
            result.label, result.rank, result.score, text
        );
    }

    Ok(())
}
