// RAG pipeline module
// Component DAGs executed with petgraph

pub mod builder;
pub mod component;
pub mod components;
pub mod runtime;

pub use builder::{build_pipeline, PipelineDependencies};
pub use component::{Component, PipelineError, PipelineState};
pub use runtime::{ComponentInfo, Connection, PipelineGraph, PipelineGraphBuilder, PipelineTopology};
