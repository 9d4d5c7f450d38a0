use crate::core::Result;
use tokenizers::Tokenizer;

pub trait SentimentAnalysisModel {
    type Options: std::fmt::Debug + Clone;

    async fn new(options: Self::Options, device: candle_core::Device) -> Result<Self>
    where
        Self: Sized;

    /// Raw class scores for `text`, one per sentiment rank, most negative first.
    fn logits(&self, tokenizer: &Tokenizer, text: &str) -> Result<Vec<f32>>;

    async fn get_tokenizer(options: Self::Options) -> Result<Tokenizer>;

    fn device(&self) -> &candle_core::Device;
}

#[cfg(test)]
pub(crate) mod fake {
    //! A keyword-counting stand-in for the BERT classifier.

    use super::SentimentAnalysisModel;
    use crate::core::{ModelOptions, Result, SentimentError};
    use candle_core::Device;
    use std::str::FromStr;
    use tokenizers::Tokenizer;

    const TOKENIZER_JSON: &str = r#"{
        "version": "1.0",
        "truncation": null,
        "padding": null,
        "added_tokens": [],
        "normalizer": {"type": "Lowercase"},
        "pre_tokenizer": {"type": "Whitespace"},
        "post_processor": null,
        "decoder": null,
        "model": {
            "type": "WordLevel",
            "vocab": {"[UNK]": 0, "good": 1, "bad": 2},
            "unk_token": "[UNK]"
        }
    }"#;

    const GOOD: u32 = 1;
    const BAD: u32 = 2;

    pub fn word_level_tokenizer() -> Tokenizer {
        Tokenizer::from_str(TOKENIZER_JSON).unwrap()
    }

    #[derive(Debug, Clone)]
    pub struct KeywordOptions(pub &'static str);

    impl ModelOptions for KeywordOptions {
        fn cache_key(&self) -> String {
            self.0.to_string()
        }
    }

    /// Scores "good" tokens towards the positive end and "bad" tokens towards
    /// the negative end; text with neither is neutral. Repeating a keyword
    /// pushes the result to the extreme rank.
    pub struct KeywordModel {
        device: Device,
    }

    impl KeywordModel {
        pub fn cpu() -> Self {
            Self {
                device: Device::Cpu,
            }
        }
    }

    impl SentimentAnalysisModel for KeywordModel {
        type Options = KeywordOptions;

        async fn new(_options: Self::Options, device: Device) -> Result<Self> {
            Ok(Self { device })
        }

        fn logits(&self, tokenizer: &Tokenizer, text: &str) -> Result<Vec<f32>> {
            let encoding = tokenizer
                .encode(text, false)
                .map_err(|e| SentimentError::Tokenization(e.to_string()))?;
            let good = encoding.get_ids().iter().filter(|&&id| id == GOOD).count() as f32;
            let bad = encoding.get_ids().iter().filter(|&&id| id == BAD).count() as f32;
            Ok(vec![bad * bad, bad, 0.5, good, good * good])
        }

        async fn get_tokenizer(_options: Self::Options) -> Result<Tokenizer> {
            Ok(word_level_tokenizer())
        }

        fn device(&self) -> &Device {
            &self.device
        }
    }
}
