use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::architecture::RagArchitecture;
use super::chunker::{Chunker, ChunkerConfig};
use super::context::{ContextBuilder, ContextBuilderConfig};
use super::memory::ConversationMemory;
use super::pipeline::{build_pipeline, PipelineDependencies, PipelineGraph, PipelineState, PipelineTopology};
use super::prompt::PromptTemplate;
use super::store::{DocumentStore, InMemoryDocumentStore, StoredDocument};
use crate::core::config::RagSettings;
use crate::core::errors::ApiError;
use crate::llm::LlmProvider;

#[derive(Debug, Clone, Deserialize)]
pub struct DeployRequest {
    pub extracted_texts: Vec<String>,
    #[serde(rename = "ragType")]
    pub rag_type: String,
    #[serde(rename = "useCase")]
    pub use_case: String,
    #[serde(rename = "vectorDb")]
    pub vector_db: String,
    pub theme: String,
    #[serde(default)]
    pub features: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeploymentInfo {
    pub rag_id: String,
    pub pipeline_id: String,
    /// Requested architecture string, echoed verbatim.
    #[serde(rename = "type")]
    pub rag_type: String,
    pub use_case: String,
    pub vector_database: String,
    pub documents_processed: usize,
    pub chunks_indexed: usize,
    pub total_characters: usize,
    pub query_endpoint: String,
    pub features: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryAnswer {
    pub answer: String,
    pub sources: Vec<String>,
}

/// A deployed pipeline together with the store it retrieves from.
pub struct DeployedPipeline {
    pub rag_id: String,
    pub pipeline_id: String,
    pub architecture: RagArchitecture,
    pub info: DeploymentInfo,
    graph: PipelineGraph,
}

impl DeployedPipeline {
    pub async fn query(&self, query: &str) -> Result<QueryAnswer, ApiError> {
        let mut state = PipelineState::new(query);
        self.graph.run(&mut state).await?;

        tracing::info!(
            "Pipeline {} answered with {} sources",
            self.pipeline_id,
            state.sources.len()
        );
        Ok(QueryAnswer {
            answer: state.answer,
            sources: state.sources,
        })
    }

    pub fn topology(&self) -> PipelineTopology {
        self.graph.topology()
    }
}

/// Chunks texts into a fresh store and wires the requested pipeline over it.
pub struct RagDeployer {
    settings: RagSettings,
    public_base_url: String,
    provider: Arc<dyn LlmProvider>,
}

impl RagDeployer {
    pub fn new(settings: RagSettings, public_base_url: String, provider: Arc<dyn LlmProvider>) -> Self {
        Self {
            settings,
            public_base_url,
            provider,
        }
    }

    /// Graph for `architecture` over an empty store; used for previews.
    pub fn preview(
        &self,
        architecture: RagArchitecture,
        use_case: &str,
        features: Vec<String>,
    ) -> Result<PipelineGraph, ApiError> {
        let deps = self.dependencies(
            Arc::new(InMemoryDocumentStore::new()),
            PromptTemplate::new(use_case, features, architecture),
        );
        build_pipeline(architecture, deps).map_err(Into::into)
    }

    fn dependencies(&self, store: Arc<dyn DocumentStore>, template: PromptTemplate) -> PipelineDependencies {
        PipelineDependencies {
            store,
            provider: self.provider.clone(),
            memory: Arc::new(ConversationMemory::new(self.settings.history_turns)),
            template,
            context: ContextBuilder::new(ContextBuilderConfig::from(&self.settings)),
        }
    }

    pub async fn deploy(&self, request: DeployRequest) -> Result<DeployedPipeline, ApiError> {
        let architecture = RagArchitecture::resolve(&request.rag_type);
        let rag_id = uuid::Uuid::new_v4().to_string();
        let pipeline_id = format!("pipe_{}", &rag_id[..8]);

        let chunks = Chunker::new(ChunkerConfig::from(&self.settings)).chunk_texts(&request.extracted_texts);
        let documents: Vec<StoredDocument> = chunks
            .into_iter()
            .enumerate()
            .map(|(n, chunk)| StoredDocument {
                id: format!("{}-{}", pipeline_id, n),
                content: chunk.text,
                source: chunk.source,
                chunk_index: chunk.chunk_index,
            })
            .collect();

        let store = Arc::new(InMemoryDocumentStore::new());
        let chunks_indexed = store.write_documents(documents).await?;

        if !request.vector_db.eq_ignore_ascii_case(store.backend()) {
            tracing::info!(
                "Vector database '{}' requested; serving from the {} store",
                request.vector_db,
                store.backend()
            );
        }

        let template = PromptTemplate::new(request.use_case.clone(), request.features.clone(), architecture);
        let graph = build_pipeline(architecture, self.dependencies(store, template))?;

        let info = DeploymentInfo {
            rag_id: rag_id.clone(),
            pipeline_id: pipeline_id.clone(),
            rag_type: request.rag_type,
            use_case: request.use_case,
            vector_database: request.vector_db,
            documents_processed: request.extracted_texts.len(),
            chunks_indexed,
            total_characters: request.extracted_texts.iter().map(|t| t.chars().count()).sum(),
            query_endpoint: format!("{}/api/rag/{}/query", self.public_base_url, rag_id),
            features: request.features,
        };

        tracing::info!(
            "Deployed {} pipeline {} ({} documents, {} chunks)",
            architecture,
            pipeline_id,
            info.documents_processed,
            info.chunks_indexed
        );

        Ok(DeployedPipeline {
            rag_id,
            pipeline_id,
            architecture,
            info,
            graph,
        })
    }
}
