// Pipeline components
// One struct per graph node kind; dependencies are injected at build time

use async_trait::async_trait;
use regex::Regex;
use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use super::component::{Component, PipelineError, PipelineState, GENERATOR_ID};
use crate::core::errors::ApiError;
use crate::llm::{ChatRequest, LlmProvider};
use crate::rag::context::ContextBuilder;
use crate::rag::memory::ConversationMemory;
use crate::rag::prompt::{Exchange, PromptTemplate};
use crate::rag::store::{DocumentStore, RetrievedDocument};

pub const RRF_K: f64 = 60.0;

static SUB_QUERY_SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)[?;]|\s+and\s+(?:also|then)\s+").expect("valid regex"));

/// Keeps the best score per document id, then ranks.
fn merge_ranked(lists: Vec<Vec<RetrievedDocument>>, limit: usize) -> Vec<RetrievedDocument> {
    let mut best: Vec<RetrievedDocument> = Vec::new();
    for retrieved in lists.into_iter().flatten() {
        match best.iter_mut().find(|existing| existing.document.id == retrieved.document.id) {
            Some(existing) if existing.score < retrieved.score => *existing = retrieved,
            Some(_) => {}
            None => best.push(retrieved),
        }
    }
    best.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    best.truncate(limit);
    best
}

/// Reciprocal-rank fusion: each list contributes `1 / (k + rank)` per document.
pub fn reciprocal_rank_fusion(
    lists: &[&[RetrievedDocument]],
    k: f64,
    limit: usize,
) -> Vec<RetrievedDocument> {
    let mut fused: Vec<RetrievedDocument> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for list in lists {
        for (rank, retrieved) in list.iter().enumerate() {
            let contribution = 1.0 / (k + rank as f64 + 1.0);
            match positions.get(&retrieved.document.id) {
                Some(&pos) => fused[pos].score += contribution,
                None => {
                    positions.insert(retrieved.document.id.clone(), fused.len());
                    fused.push(RetrievedDocument {
                        document: retrieved.document.clone(),
                        score: contribution,
                    });
                }
            }
        }
    }

    fused.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    fused.truncate(limit);
    fused
}

/// Splits compound questions into retrievable parts.
pub fn plan_sub_queries(query: &str) -> Vec<String> {
    let parts: Vec<String> = SUB_QUERY_SEPARATORS
        .split(query)
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect();

    if parts.len() <= 1 {
        vec![query.trim().to_string()]
    } else {
        parts
    }
}

/// BM25 retrieval over the deployment's store.
pub struct Retriever {
    store: Arc<dyn DocumentStore>,
    top_k: usize,
}

impl Retriever {
    pub fn new(store: Arc<dyn DocumentStore>, top_k: usize) -> Self {
        Self { store, top_k }
    }
}

#[async_trait]
impl Component for Retriever {
    fn id(&self) -> &'static str {
        "retriever"
    }

    fn description(&self) -> String {
        format!("BM25 retrieval from the {} store (top {})", self.store.backend(), self.top_k)
    }

    async fn run(&self, state: &mut PipelineState, _inputs: &[&str]) -> Result<(), PipelineError> {
        let mut lists = Vec::new();
        for query in state.retrieval_queries() {
            let results = self
                .store
                .bm25_search(query, self.top_k)
                .await
                .map_err(|e| PipelineError::new(self.id(), e.to_string()))?;
            lists.push(results);
        }

        let merged = merge_ranked(lists, self.top_k);
        tracing::debug!("BM25 retrieved {} documents", merged.len());
        state.retrieved.insert(self.id().to_string(), merged);
        Ok(())
    }
}

/// Term-overlap retrieval, the sparse half of hybrid search.
pub struct KeywordRetriever {
    store: Arc<dyn DocumentStore>,
    top_k: usize,
}

impl KeywordRetriever {
    pub fn new(store: Arc<dyn DocumentStore>, top_k: usize) -> Self {
        Self { store, top_k }
    }
}

#[async_trait]
impl Component for KeywordRetriever {
    fn id(&self) -> &'static str {
        "keyword_retriever"
    }

    fn description(&self) -> String {
        format!("Keyword-overlap retrieval (top {})", self.top_k)
    }

    async fn run(&self, state: &mut PipelineState, _inputs: &[&str]) -> Result<(), PipelineError> {
        let results = self
            .store
            .keyword_search(&state.query, self.top_k)
            .await
            .map_err(|e| PipelineError::new(self.id(), e.to_string()))?;
        state.retrieved.insert(self.id().to_string(), results);
        Ok(())
    }
}

pub struct DocumentJoiner {
    top_k: usize,
}

impl DocumentJoiner {
    pub fn new(top_k: usize) -> Self {
        Self { top_k }
    }
}

#[async_trait]
impl Component for DocumentJoiner {
    fn id(&self) -> &'static str {
        "joiner"
    }

    fn description(&self) -> String {
        format!("Reciprocal-rank fusion of upstream results (k = {})", RRF_K)
    }

    async fn run(&self, state: &mut PipelineState, inputs: &[&str]) -> Result<(), PipelineError> {
        let lists: Vec<&[RetrievedDocument]> = inputs
            .iter()
            .filter_map(|input| state.retrieved.get(*input).map(Vec::as_slice))
            .collect();
        let fused = reciprocal_rank_fusion(&lists, RRF_K, self.top_k);
        state.retrieved.insert(self.id().to_string(), fused);
        Ok(())
    }
}

pub struct QueryPlanner;

#[async_trait]
impl Component for QueryPlanner {
    fn id(&self) -> &'static str {
        "query_planner"
    }

    fn description(&self) -> String {
        "Splits compound questions into sub-queries".to_string()
    }

    async fn run(&self, state: &mut PipelineState, _inputs: &[&str]) -> Result<(), PipelineError> {
        state.sub_queries = plan_sub_queries(&state.query);
        tracing::debug!("Planned {} sub-queries", state.sub_queries.len());
        Ok(())
    }
}

pub struct MemoryReader {
    memory: Arc<ConversationMemory>,
}

impl MemoryReader {
    pub fn new(memory: Arc<ConversationMemory>) -> Self {
        Self { memory }
    }
}

#[async_trait]
impl Component for MemoryReader {
    fn id(&self) -> &'static str {
        "memory"
    }

    fn description(&self) -> String {
        "Loads recent conversation turns".to_string()
    }

    async fn run(&self, state: &mut PipelineState, _inputs: &[&str]) -> Result<(), PipelineError> {
        state.history = self.memory.recent().await;
        Ok(())
    }
}

pub struct MemoryWriter {
    memory: Arc<ConversationMemory>,
}

impl MemoryWriter {
    pub fn new(memory: Arc<ConversationMemory>) -> Self {
        Self { memory }
    }
}

#[async_trait]
impl Component for MemoryWriter {
    fn id(&self) -> &'static str {
        "memory_writer"
    }

    fn description(&self) -> String {
        "Stores the new exchange in conversation memory".to_string()
    }

    async fn run(&self, state: &mut PipelineState, _inputs: &[&str]) -> Result<(), PipelineError> {
        self.memory
            .record(Exchange {
                query: state.query.clone(),
                answer: state.reply.clone(),
            })
            .await;
        Ok(())
    }
}

pub struct PromptBuilder {
    template: PromptTemplate,
    context: ContextBuilder,
}

impl PromptBuilder {
    pub fn new(template: PromptTemplate, context: ContextBuilder) -> Self {
        Self { template, context }
    }
}

#[async_trait]
impl Component for PromptBuilder {
    fn id(&self) -> &'static str {
        "prompt_builder"
    }

    fn description(&self) -> String {
        format!(
            "Fills the prompt template with up to {} documents",
            self.context.config().top_k
        )
    }

    async fn run(&self, state: &mut PipelineState, inputs: &[&str]) -> Result<(), PipelineError> {
        let documents = inputs
            .iter()
            .find_map(|input| state.retrieved.get(*input))
            .map(|docs| self.context.select(docs).to_vec())
            .unwrap_or_default();

        let context = self.context.format_context(&documents);
        state.sources = self.context.sources(&documents);
        state.prompt = self.template.render(&context, &state.query, &state.history);
        state.documents = documents;
        Ok(())
    }
}

pub struct LlmGenerator {
    provider: Arc<dyn LlmProvider>,
}

impl LlmGenerator {
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl Component for LlmGenerator {
    fn id(&self) -> &'static str {
        GENERATOR_ID
    }

    fn description(&self) -> String {
        format!("Chat completion via the {} provider", self.provider.name())
    }

    async fn run(&self, state: &mut PipelineState, _inputs: &[&str]) -> Result<(), PipelineError> {
        let reply = self
            .provider
            .chat(ChatRequest::from_prompt(state.prompt.clone()))
            .await
            .map_err(|e| {
                let message = match e {
                    ApiError::Llm(message) => message,
                    other => other.to_string(),
                };
                PipelineError::new(self.id(), message)
            })?;
        state.answer = reply.clone();
        state.reply = reply;
        Ok(())
    }
}

pub struct CitationFormatter;

#[async_trait]
impl Component for CitationFormatter {
    fn id(&self) -> &'static str {
        "citation_formatter"
    }

    fn description(&self) -> String {
        "Appends the numbered source list to the answer".to_string()
    }

    async fn run(&self, state: &mut PipelineState, _inputs: &[&str]) -> Result<(), PipelineError> {
        if state.documents.is_empty() {
            return Ok(());
        }

        let mut answer = state.answer.trim_end().to_string();
        answer.push_str("\n\nSources:");
        for (i, retrieved) in state.documents.iter().enumerate() {
            answer.push_str(&format!("\n[{}] {}", i + 1, retrieved.document.source));
        }
        state.answer = answer;
        Ok(())
    }
}
