use super::model::SentimentAnalysisModel;
use crate::core::{Result, SentimentError, SentimentLabel};
use std::sync::Arc;
use tokenizers::Tokenizer;

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct SentimentResult {
    pub label: SentimentLabel,
    /// 1-based position of the winning score.
    pub rank: u8,
    /// Softmax probability of the winning class.
    pub score: f32,
}

/// The object-safe view of a pipeline that request handlers depend on.
pub trait SentimentClassifier: Send + Sync {
    fn classify(&self, text: &str) -> Result<SentimentLabel>;
}

pub struct SentimentAnalysisPipeline<M: SentimentAnalysisModel> {
    pub(crate) model: Arc<M>,
    pub(crate) tokenizer: Tokenizer,
}

impl<M: SentimentAnalysisModel> SentimentAnalysisPipeline<M> {
    /// Classify `text` into one of the five sentiment labels.
    pub fn classify(&self, text: &str) -> Result<SentimentLabel> {
        Ok(self.predict(text)?.label)
    }

    /// Predict sentiment with structured result containing label, rank and confidence score
    pub fn predict(&self, text: &str) -> Result<SentimentResult> {
        let logits = self.model.logits(&self.tokenizer, text)?;
        let index = argmax(&logits)
            .ok_or_else(|| SentimentError::Inference("model produced no scores".to_string()))?;
        let label = SentimentLabel::from_index(index).ok_or_else(|| {
            SentimentError::Inference(format!(
                "predicted index {index} is outside the {} known labels",
                SentimentLabel::ALL.len()
            ))
        })?;
        let score = softmax_at(&logits, index);

        tracing::debug!(chars = text.chars().count(), %label, score, "classified text");
        Ok(SentimentResult {
            label,
            rank: label.rank(),
            score,
        })
    }

    pub fn device(&self) -> &candle_core::Device {
        self.model.device()
    }
}

impl<M> SentimentClassifier for SentimentAnalysisPipeline<M>
where
    M: SentimentAnalysisModel + Send + Sync,
{
    fn classify(&self, text: &str) -> Result<SentimentLabel> {
        self.predict(text).map(|result| result.label)
    }
}

/// Position of the largest score. Equal scores resolve to the lowest position
/// and NaN never wins.
pub(crate) fn argmax(scores: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &score) in scores.iter().enumerate() {
        if score.is_nan() {
            continue;
        }
        if best.map_or(true, |(_, top)| score > top) {
            best = Some((i, score));
        }
    }
    best.map(|(i, _)| i)
}

pub(crate) fn softmax_at(scores: &[f32], index: usize) -> f32 {
    let max = scores.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let total: f32 = scores.iter().map(|s| (s - max).exp()).sum();
    (scores[index] - max).exp() / total
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipelines::sentiment_analysis_pipeline::model::fake::{
        word_level_tokenizer, KeywordModel,
    };

    fn keyword_pipeline() -> SentimentAnalysisPipeline<KeywordModel> {
        SentimentAnalysisPipeline {
            model: Arc::new(KeywordModel::cpu()),
            tokenizer: word_level_tokenizer(),
        }
    }

    #[test]
    fn argmax_prefers_lowest_index_on_ties() {
        assert_eq!(argmax(&[0.1, 0.9, 0.9, 0.2]), Some(1));
        assert_eq!(argmax(&[3.0, 3.0, 3.0]), Some(0));
    }

    #[test]
    fn argmax_skips_nan_and_handles_empty() {
        assert_eq!(argmax(&[f32::NAN, 0.5, 0.1]), Some(1));
        assert_eq!(argmax(&[]), None);
    }

    #[test]
    fn softmax_of_equal_scores_is_uniform() {
        let score = softmax_at(&[1.0; 5], 2);
        assert!((score - 0.2).abs() < 1e-6);
    }

    #[test]
    fn classifies_by_highest_score() -> Result<()> {
        let pipeline = keyword_pipeline();
        assert_eq!(pipeline.classify("good good")?, SentimentLabel::VeryPositive);
        assert_eq!(pipeline.classify("BAD")?, SentimentLabel::VeryNegative);
        assert_eq!(pipeline.classify("the weather today")?, SentimentLabel::Neutral);
        Ok(())
    }

    #[test]
    fn tied_scores_resolve_to_lowest_rank() -> Result<()> {
        // [1, 1, 0.5, 1, 1]: ranks 1, 2, 4 and 5 tie.
        let result = keyword_pipeline().predict("good bad")?;
        assert_eq!(result.label, SentimentLabel::VeryNegative);
        assert_eq!(result.rank, 1);
        Ok(())
    }

    #[test]
    fn empty_text_is_classified() -> Result<()> {
        let result = keyword_pipeline().predict("")?;
        assert_eq!(result.label, SentimentLabel::Neutral);
        assert!(result.score > 0.0 && result.score <= 1.0);
        Ok(())
    }

    #[test]
    fn classification_is_deterministic() -> Result<()> {
        let pipeline = keyword_pipeline();
        let first = pipeline.predict("good service, bad coffee, good staff")?;
        for _ in 0..10 {
            assert_eq!(
                pipeline.predict("good service, bad coffee, good staff")?,
                first
            );
        }
        Ok(())
    }

    #[test]
    fn usable_as_trait_object() -> Result<()> {
        let classifier: Arc<dyn SentimentClassifier> = Arc::new(keyword_pipeline());
        assert_eq!(classifier.classify("good")?, SentimentLabel::Positive);
        Ok(())
    }
}
