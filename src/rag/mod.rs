//! RAG (Retrieval-Augmented Generation) module.
//!
//! This module provides:
//! - `Chunker`: splits extracted texts into overlapping chunks
//! - `InMemoryDocumentStore`: BM25 keyword retrieval over those chunks
//! - `pipeline`: per-architecture component graphs
//! - `RagDeployer` / `PipelineRegistry`: deployment and lookup of live pipelines

mod architecture;
mod chunker;
mod context;
mod deploy;
mod memory;
pub mod pipeline;
mod prompt;
mod registry;
mod store;

pub use architecture::RagArchitecture;
pub use chunker::{Chunker, ChunkerConfig, TextChunk};
pub use context::{ContextBuilder, ContextBuilderConfig};
pub use deploy::{DeployRequest, DeployedPipeline, DeploymentInfo, QueryAnswer, RagDeployer};
pub use memory::ConversationMemory;
pub use prompt::{Exchange, PromptTemplate};
pub use registry::PipelineRegistry;
pub use store::{DocumentStore, InMemoryDocumentStore, RetrievedDocument, StoredDocument};
