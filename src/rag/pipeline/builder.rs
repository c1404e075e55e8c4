// Pipeline builder
// Assembles the component graph for each architecture

use std::sync::Arc;

use super::component::PipelineError;
use super::components::{
    CitationFormatter, DocumentJoiner, KeywordRetriever, LlmGenerator, MemoryReader,
    MemoryWriter, PromptBuilder, QueryPlanner, Retriever,
};
use super::runtime::{PipelineGraph, PipelineGraphBuilder};
use crate::llm::LlmProvider;
use crate::rag::architecture::RagArchitecture;
use crate::rag::context::ContextBuilder;
use crate::rag::memory::ConversationMemory;
use crate::rag::prompt::PromptTemplate;
use crate::rag::store::DocumentStore;

/// Everything the components of one deployment share.
pub struct PipelineDependencies {
    pub store: Arc<dyn DocumentStore>,
    pub provider: Arc<dyn LlmProvider>,
    pub memory: Arc<ConversationMemory>,
    pub template: PromptTemplate,
    pub context: ContextBuilder,
}

/// Build the pipeline graph for `architecture`
pub fn build_pipeline(
    architecture: RagArchitecture,
    deps: PipelineDependencies,
) -> Result<PipelineGraph, PipelineError> {
    let top_k = deps.context.config().top_k;
    let builder = PipelineGraphBuilder::new()
        .component(Box::new(PromptBuilder::new(deps.template, deps.context)))
        .component(Box::new(LlmGenerator::new(deps.provider)))
        .connect("prompt_builder", "llm");

    let builder = match architecture {
        RagArchitecture::Basic => builder
            .component(Box::new(Retriever::new(deps.store, top_k)))
            .connect("retriever", "prompt_builder"),
        RagArchitecture::Hybrid => builder
            .component(Box::new(Retriever::new(deps.store.clone(), top_k)))
            .component(Box::new(KeywordRetriever::new(deps.store, top_k)))
            .component(Box::new(DocumentJoiner::new(top_k)))
            .connect("retriever", "joiner")
            .connect("keyword_retriever", "joiner")
            .connect("joiner", "prompt_builder"),
        RagArchitecture::Agentic => builder
            .component(Box::new(QueryPlanner))
            .component(Box::new(Retriever::new(deps.store, top_k)))
            .connect("query_planner", "retriever")
            .connect("retriever", "prompt_builder"),
        RagArchitecture::Conversational => builder
            .component(Box::new(MemoryReader::new(deps.memory.clone())))
            .component(Box::new(Retriever::new(deps.store, top_k)))
            .component(Box::new(MemoryWriter::new(deps.memory)))
            .connect("memory", "retriever")
            .connect("retriever", "prompt_builder")
            .connect("llm", "memory_writer"),
        RagArchitecture::Citation => builder
            .component(Box::new(Retriever::new(deps.store, top_k)))
            .component(Box::new(CitationFormatter))
            .connect("retriever", "prompt_builder")
            .connect("llm", "citation_formatter"),
    };

    builder.build()
}
