//! Process-wide model cache.
//!
//! Loading BERT weights is the only expensive step this service performs, so
//! models are created once per (type, options, device) and handed out as
//! shared `Arc`s afterwards. The cache holds its lock across the loader, which
//! means concurrent builders for the same key wait for the first load instead
//! of reading the weights twice.

use crate::core::error::Result;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Trait implemented by model option types to generate a stable cache key.
pub trait ModelOptions {
    fn cache_key(&self) -> String;
}

type CacheStorage = HashMap<(TypeId, String), Arc<dyn Any + Send + Sync>>;

pub struct ModelCache {
    cache: Mutex<CacheStorage>,
}

impl ModelCache {
    pub fn new() -> Self {
        Self {
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Get a model from the cache, running `loader` only if none exists for `key`.
    pub async fn get_or_create<M, F, Fut>(&self, key: &str, loader: F) -> Result<Arc<M>>
    where
        M: Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<M>>,
    {
        let cache_key = (TypeId::of::<M>(), key.to_string());

        let mut cache = self.cache.lock().await;
        if let Some(cached) = cache.get(&cache_key) {
            if let Ok(model) = Arc::clone(cached).downcast::<M>() {
                tracing::debug!(key, "model cache hit");
                return Ok(model);
            }
        }

        let model = Arc::new(loader().await?);
        cache.insert(cache_key, model.clone() as Arc<dyn Any + Send + Sync>);

        Ok(model)
    }

    pub async fn clear(&self) {
        self.cache.lock().await.clear();
    }

    pub async fn len(&self) -> usize {
        self.cache.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.cache.lock().await.is_empty()
    }
}

impl Default for ModelCache {
    fn default() -> Self {
        Self::new()
    }
}

static GLOBAL_MODEL_CACHE: once_cell::sync::Lazy<ModelCache> =
    once_cell::sync::Lazy::new(ModelCache::new);

/// Get a reference to the global model cache.
pub fn global_cache() -> &'static ModelCache {
    &GLOBAL_MODEL_CACHE
}
