// Component trait and per-query state
// Base abstraction for pipeline graph nodes

use async_trait::async_trait;
use std::collections::HashMap;

use crate::core::errors::ApiError;
use crate::rag::prompt::Exchange;
use crate::rag::store::RetrievedDocument;

/// Data flowing through one pipeline run.
#[derive(Debug, Clone, Default)]
pub struct PipelineState {
    pub query: String,
    /// Set by the query planner; retrievers fall back to `query` when empty.
    pub sub_queries: Vec<String>,
    /// Ranked output of each retrieving component, keyed by component id.
    pub retrieved: HashMap<String, Vec<RetrievedDocument>>,
    /// Documents that made it into the prompt, in context order.
    pub documents: Vec<RetrievedDocument>,
    pub sources: Vec<String>,
    pub history: Vec<Exchange>,
    pub prompt: String,
    /// Raw model output.
    pub reply: String,
    /// Final answer returned to the caller.
    pub answer: String,
}

impl PipelineState {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    /// Queries to retrieve for, honoring a plan when one exists.
    pub fn retrieval_queries(&self) -> Vec<&str> {
        if self.sub_queries.is_empty() {
            vec![self.query.as_str()]
        } else {
            self.sub_queries.iter().map(String::as_str).collect()
        }
    }
}

/// Pipeline execution error
///
/// `execution_trace` records the components that completed before the
/// failure, most-recent last.
#[derive(Debug, Clone)]
pub struct PipelineError {
    pub component_id: String,
    pub message: String,
    pub execution_trace: Vec<String>,
}

impl PipelineError {
    pub fn new(component_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            component_id: component_id.into(),
            message: message.into(),
            execution_trace: Vec::new(),
        }
    }

    pub fn with_trace(mut self, trace: Vec<String>) -> Self {
        self.execution_trace = trace;
        self
    }
}

impl std::fmt::Display for PipelineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.execution_trace.is_empty() {
            write!(f, "Pipeline error in {}: {}", self.component_id, self.message)
        } else {
            write!(
                f,
                "Pipeline error in {} (after {}): {}",
                self.component_id,
                self.execution_trace.join(" -> "),
                self.message
            )
        }
    }
}

impl std::error::Error for PipelineError {}

/// Id of the generator node; its failures are model-server failures.
pub const GENERATOR_ID: &str = "llm";

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        if err.component_id == GENERATOR_ID {
            ApiError::llm(err)
        } else {
            ApiError::internal(err)
        }
    }
}

/// Component trait - every pipeline node implements this
#[async_trait]
pub trait Component: Send + Sync {
    /// Unique identifier within a pipeline
    fn id(&self) -> &'static str;

    /// One-line summary shown in visualizations
    fn description(&self) -> String;

    /// Run the component. `inputs` are the ids of its upstream components.
    async fn run(&self, state: &mut PipelineState, inputs: &[&str]) -> Result<(), PipelineError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retrieval_queries_fall_back_to_query() {
        let mut state = PipelineState::new("refund policy");
        assert_eq!(state.retrieval_queries(), vec!["refund policy"]);

        state.sub_queries = vec!["a".to_string(), "b".to_string()];
        assert_eq!(state.retrieval_queries(), vec!["a", "b"]);
    }

    #[test]
    fn error_display_includes_trace() {
        let err = PipelineError::new("retriever", "store closed")
            .with_trace(vec!["query_planner".to_string()]);
        assert_eq!(
            err.to_string(),
            "Pipeline error in retriever (after query_planner): store closed"
        );

        let api = ApiError::from(err.clone());
        assert!(matches!(api, ApiError::Internal(_)));
        assert_eq!(api.to_string(), err.to_string());
    }

    #[test]
    fn generator_failures_keep_the_llm_category() {
        let err = PipelineError::new(GENERATOR_ID, "server returned 503")
            .with_trace(vec!["retriever".to_string(), "prompt_builder".to_string()]);

        let api = ApiError::from(err);
        assert!(matches!(api, ApiError::Llm(_)));
        assert_eq!(
            api.to_string(),
            "LLM request failed: Pipeline error in llm (after retriever -> prompt_builder): server returned 503"
        );
    }
}
