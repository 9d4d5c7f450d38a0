use crate::core::{Result, SentimentError, SentimentLabel};
use crate::loaders::{ModelFiles, ModelSource, TokenizerLoader, WeightsFile, CONFIG_FILE};
use crate::pipelines::sentiment_analysis_pipeline::SentimentAnalysisModel;
use candle_core::{DType, Device, IndexOp, Module, Tensor};
use candle_nn::{Linear, VarBuilder};
use candle_transformers::models::bert::{BertModel, Config};
use serde::Deserialize;
use std::collections::HashMap;
use tokenizers::{Tokenizer, TruncationParams};

pub const DEFAULT_MAX_LENGTH: usize = 512;

/// Classification metadata that `bert::Config` does not carry.
#[derive(Debug, Deserialize)]
struct ClassifierConfigRaw {
    hidden_size: usize,
    id2label: HashMap<String, String>,
    #[serde(default)]
    max_position_embeddings: Option<usize>,
}

impl ClassifierConfigRaw {
    fn read(path: &std::path::Path) -> Result<(Self, String)> {
        let content = std::fs::read_to_string(path)?;
        Ok((serde_json::from_str(&content)?, content))
    }

    /// Longest token sequence the position embeddings can encode.
    fn max_length(&self) -> usize {
        self.max_position_embeddings.unwrap_or_else(|| {
            tracing::warn!(
                default = DEFAULT_MAX_LENGTH,
                "config has no max_position_embeddings, truncating at the default"
            );
            DEFAULT_MAX_LENGTH
        })
    }
}

/// BERT encoder with the pooled five-way sequence classification head used by
/// the `nlptown/bert-base-multilingual-uncased-sentiment` family of checkpoints.
pub struct BertSentimentModel {
    bert: BertModel,
    pooler: Linear,
    classifier: Linear,
    device: Device,
}

impl BertSentimentModel {
    pub async fn load(source: &ModelSource, device: Device) -> Result<Self> {
        tracing::info!(%source, ?device, "loading sentiment model");
        let files = ModelFiles::resolve(source).await?;

        let (class_cfg, config_content) = ClassifierConfigRaw::read(&files.config)?;
        if class_cfg.id2label.len() != SentimentLabel::ALL.len() {
            return Err(SentimentError::ModelFormat(format!(
                "expected {} labels, found {}",
                SentimentLabel::ALL.len(),
                class_cfg.id2label.len()
            )));
        }
        let config: Config = serde_json::from_str(&config_content)?;

        let dtype = DType::F32;
        let vb = match &files.weights {
            WeightsFile::Safetensors(path) => unsafe {
                VarBuilder::from_mmaped_safetensors(&[path], dtype, &device)?
            },
            WeightsFile::Pytorch(path) => VarBuilder::from_pth(path, dtype, &device)?,
        };

        let bert = BertModel::load(vb.pp("bert"), &config)?;
        let pooler = candle_nn::linear(
            class_cfg.hidden_size,
            class_cfg.hidden_size,
            vb.pp("bert.pooler.dense"),
        )?;
        let classifier = candle_nn::linear(
            class_cfg.hidden_size,
            SentimentLabel::ALL.len(),
            vb.pp("classifier"),
        )?;

        tracing::info!(%source, "sentiment model loaded");
        Ok(Self {
            bert,
            pooler,
            classifier,
            device,
        })
    }

    pub async fn load_tokenizer(source: &ModelSource) -> Result<Tokenizer> {
        let (class_cfg, _) = ClassifierConfigRaw::read(&source.fetch(CONFIG_FILE).await?)?;
        let tokenizer = TokenizerLoader::new(source.clone()).load().await?;
        Self::truncate_at(tokenizer, class_cfg.max_length())
    }

    /// Inputs beyond the position embeddings cannot be encoded; keep their prefix.
    fn truncate_at(mut tokenizer: Tokenizer, max_length: usize) -> Result<Tokenizer> {
        tokenizer
            .with_padding(None)
            .with_truncation(Some(TruncationParams {
                max_length,
                ..Default::default()
            }))
            .map_err(|e| SentimentError::Tokenization(e.to_string()))?;

        Ok(tokenizer)
    }

    fn forward(&self, input_ids: &Tensor, token_type_ids: &Tensor, mask: &Tensor) -> Result<Tensor> {
        // [batch, seq, hidden]
        let hidden = self.bert.forward(input_ids, token_type_ids, Some(mask))?;
        // Pool on the [CLS] position.
        let cls = hidden.i((.., 0))?;
        let pooled = self.pooler.forward(&cls)?.tanh()?;
        Ok(self.classifier.forward(&pooled)?)
    }
}

impl SentimentAnalysisModel for BertSentimentModel {
    type Options = ModelSource;

    async fn new(options: Self::Options, device: Device) -> Result<Self> {
        Self::load(&options, device).await
    }

    fn logits(&self, tokenizer: &Tokenizer, text: &str) -> Result<Vec<f32>> {
        let encoding = tokenizer
            .encode(text, true)
            .map_err(|e| SentimentError::Tokenization(e.to_string()))?;
        if encoding.get_ids().is_empty() {
            return Err(SentimentError::Tokenization(
                "tokenizer produced no tokens".to_string(),
            ));
        }

        let input_ids = Tensor::new(encoding.get_ids(), &self.device)?.unsqueeze(0)?;
        let token_type_ids = Tensor::new(encoding.get_type_ids(), &self.device)?.unsqueeze(0)?;
        let attention_mask =
            Tensor::new(encoding.get_attention_mask(), &self.device)?.unsqueeze(0)?;

        let logits = self.forward(&input_ids, &token_type_ids, &attention_mask)?;
        Ok(logits.squeeze(0)?.to_dtype(DType::F32)?.to_vec1::<f32>()?)
    }

    async fn get_tokenizer(options: Self::Options) -> Result<Tokenizer> {
        Self::load_tokenizer(&options).await
    }

    fn device(&self) -> &Device {
        &self.device
    }
}
