use super::model::SentimentAnalysisModel;
use super::pipeline::SentimentAnalysisPipeline;
use crate::core::{global_cache, ModelOptions, Result};
use crate::loaders::ModelSource;
use crate::models::BertSentimentModel;
use crate::pipelines::utils::{build_cache_key, DeviceRequest, DeviceSelectable};
use std::sync::Arc;

pub struct SentimentAnalysisPipelineBuilder<M: SentimentAnalysisModel> {
    options: M::Options,
    device_request: DeviceRequest,
}

impl<M: SentimentAnalysisModel> SentimentAnalysisPipelineBuilder<M> {
    pub fn new(options: M::Options) -> Self {
        Self {
            options,
            device_request: DeviceRequest::Default,
        }
    }

    /// Replace the device request in one go, e.g. with a value parsed from configuration.
    pub fn device_request(mut self, request: DeviceRequest) -> Self {
        self.device_request = request;
        self
    }

    /// Load (or reuse) the model and its tokenizer.
    ///
    /// Weights are shared through the global model cache, so building twice
    /// with the same options on the same device loads them only once.
    pub async fn build(self) -> Result<SentimentAnalysisPipeline<M>>
    where
        M: Send + Sync + 'static,
        M::Options: ModelOptions,
    {
        let device = self.device_request.resolve()?;
        let key = build_cache_key(&self.options, &device);
        let options = self.options.clone();
        let model: Arc<M> = global_cache()
            .get_or_create(&key, || M::new(options, device))
            .await?;
        let tokenizer = M::get_tokenizer(self.options).await?;
        Ok(SentimentAnalysisPipeline { model, tokenizer })
    }
}

impl<M: SentimentAnalysisModel> DeviceSelectable for SentimentAnalysisPipelineBuilder<M> {
    fn device_request_mut(&mut self) -> &mut DeviceRequest {
        &mut self.device_request
    }
}

impl SentimentAnalysisPipelineBuilder<BertSentimentModel> {
    /// A BERT sentiment classifier read from `source`.
    pub fn bert(source: ModelSource) -> Self {
        Self::new(source)
    }

    /// The multilingual five-star review classifier from `nlptown`.
    pub fn nlptown() -> Self {
        Self::bert(ModelSource::hub(crate::core::config::DEFAULT_MODEL_REPO))
    }
}
