//! DocumentStore trait and the in-memory keyword store backing each deployment.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::core::errors::ApiError;

const BM25_K1: f64 = 1.5;
const BM25_B: f64 = 0.75;

/// A stored chunk with metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredDocument {
    /// Unique document identifier.
    pub id: String,
    /// The text content of the chunk.
    pub content: String,
    /// Source identifier (URL or document label).
    pub source: String,
    /// Position of the chunk within its source.
    pub chunk_index: usize,
}

/// Result of a retrieval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedDocument {
    pub document: StoredDocument,
    /// Relevance score (higher = better).
    pub score: f64,
}

/// Abstract trait for document storage backends.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert documents, returning how many were written.
    async fn write_documents(&self, documents: Vec<StoredDocument>) -> Result<usize, ApiError>;

    /// Okapi BM25 ranking. Documents scoring zero are omitted.
    async fn bm25_search(&self, query: &str, limit: usize)
        -> Result<Vec<RetrievedDocument>, ApiError>;

    /// Fraction of distinct query terms present in each document.
    async fn keyword_search(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<RetrievedDocument>, ApiError>;

    /// Human-readable backend name.
    fn backend(&self) -> &str;
}

struct IndexedDocument {
    document: StoredDocument,
    term_freqs: HashMap<String, usize>,
    length: usize,
}

#[derive(Default)]
struct StoreInner {
    documents: Vec<IndexedDocument>,
    doc_freqs: HashMap<String, usize>,
    total_length: usize,
}

/// Chunks held in process memory and ranked with BM25.
#[derive(Default)]
pub struct InMemoryDocumentStore {
    inner: RwLock<StoreInner>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Lower-cased alphanumeric runs.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn rank(mut results: Vec<RetrievedDocument>, limit: usize) -> Vec<RetrievedDocument> {
    // Stable sort keeps insertion order among equal scores.
    results.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    results.truncate(limit);
    results
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn write_documents(&self, documents: Vec<StoredDocument>) -> Result<usize, ApiError> {
        let mut inner = self.inner.write().await;
        let written = documents.len();

        for document in documents {
            let tokens = tokenize(&document.content);
            let mut term_freqs: HashMap<String, usize> = HashMap::new();
            for token in &tokens {
                *term_freqs.entry(token.clone()).or_insert(0) += 1;
            }
            for term in term_freqs.keys() {
                *inner.doc_freqs.entry(term.clone()).or_insert(0) += 1;
            }
            inner.total_length += tokens.len();
            inner.documents.push(IndexedDocument {
                document,
                term_freqs,
                length: tokens.len(),
            });
        }

        tracing::debug!("Indexed {} documents ({} total)", written, inner.documents.len());
        Ok(written)
    }

    async fn bm25_search(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<RetrievedDocument>, ApiError> {
        let inner = self.inner.read().await;
        if inner.documents.is_empty() {
            return Ok(Vec::new());
        }

        let query_terms: HashSet<String> = tokenize(query).into_iter().collect();
        let total_docs = inner.documents.len() as f64;
        let avg_len = (inner.total_length as f64 / total_docs).max(1.0);

        let results = inner
            .documents
            .iter()
            .filter_map(|indexed| {
                let score: f64 = query_terms
                    .iter()
                    .filter_map(|term| {
                        let tf = *indexed.term_freqs.get(term)? as f64;
                        let df = *inner.doc_freqs.get(term)? as f64;
                        let idf = ((total_docs - df + 0.5) / (df + 0.5) + 1.0).ln();
                        let norm = BM25_K1 * (1.0 - BM25_B + BM25_B * indexed.length as f64 / avg_len);
                        Some(idf * tf * (BM25_K1 + 1.0) / (tf + norm))
                    })
                    .sum();

                (score > 0.0).then(|| RetrievedDocument {
                    document: indexed.document.clone(),
                    score,
                })
            })
            .collect();

        Ok(rank(results, limit))
    }

    async fn keyword_search(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<RetrievedDocument>, ApiError> {
        let inner = self.inner.read().await;
        let query_terms: HashSet<String> = tokenize(query).into_iter().collect();
        if query_terms.is_empty() {
            return Ok(Vec::new());
        }

        let results = inner
            .documents
            .iter()
            .filter_map(|indexed| {
                let matched = query_terms
                    .iter()
                    .filter(|term| indexed.term_freqs.contains_key(*term))
                    .count();
                let score = matched as f64 / query_terms.len() as f64;
                (score > 0.0).then(|| RetrievedDocument {
                    document: indexed.document.clone(),
                    score,
                })
            })
            .collect();

        Ok(rank(results, limit))
    }

    fn backend(&self) -> &str {
        "in-memory"
    }
}
