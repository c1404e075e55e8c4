use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use tokio::sync::RwLock;

use super::deploy::DeployedPipeline;
use crate::core::errors::ApiError;

#[derive(Default)]
struct RegistryInner {
    /// Keyed by rag_id.
    pipelines: HashMap<String, Arc<DeployedPipeline>>,
    /// pipeline_id -> rag_id
    aliases: HashMap<String, String>,
    /// rag_ids, oldest first.
    order: VecDeque<String>,
}

/// Live deployments, bounded; the oldest is evicted first.
pub struct PipelineRegistry {
    capacity: usize,
    inner: RwLock<RegistryInner>,
}

impl PipelineRegistry {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            inner: RwLock::new(RegistryInner::default()),
        }
    }

    pub async fn insert(&self, pipeline: DeployedPipeline) -> Arc<DeployedPipeline> {
        let pipeline = Arc::new(pipeline);
        let mut inner = self.inner.write().await;

        while inner.order.len() >= self.capacity {
            let Some(evicted) = inner.order.pop_front() else {
                break;
            };
            if let Some(old) = inner.pipelines.remove(&evicted) {
                inner.aliases.remove(&old.pipeline_id);
                tracing::info!("Evicted pipeline {} (registry full)", old.pipeline_id);
            }
        }

        inner
            .aliases
            .insert(pipeline.pipeline_id.clone(), pipeline.rag_id.clone());
        inner
            .pipelines
            .insert(pipeline.rag_id.clone(), pipeline.clone());
        inner.order.push_back(pipeline.rag_id.clone());
        pipeline
    }

    /// Looks up by rag_id or pipeline_id.
    pub async fn get(&self, id: &str) -> Option<Arc<DeployedPipeline>> {
        let inner = self.inner.read().await;
        let rag_id = inner.aliases.get(id).map(String::as_str).unwrap_or(id);
        inner.pipelines.get(rag_id).cloned()
    }

    pub async fn latest(&self) -> Option<Arc<DeployedPipeline>> {
        let inner = self.inner.read().await;
        inner
            .order
            .back()
            .and_then(|rag_id| inner.pipelines.get(rag_id))
            .cloned()
    }

    /// Named pipeline, or the most recent deployment when `id` is absent.
    pub async fn resolve(&self, id: Option<&str>) -> Result<Arc<DeployedPipeline>, ApiError> {
        match id.map(str::trim).filter(|id| !id.is_empty()) {
            Some(id) => self
                .get(id)
                .await
                .ok_or_else(|| ApiError::UnknownPipeline(id.to_string())),
            None => self.latest().await.ok_or(ApiError::NoPipeline),
        }
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.pipelines.len()
    }
}
