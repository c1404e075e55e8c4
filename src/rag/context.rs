//! Formats retrieved documents into the prompt's context block.

use serde::{Deserialize, Serialize};

use super::store::RetrievedDocument;
use crate::core::config::RagSettings;

/// Configuration for context building.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextBuilderConfig {
    /// Maximum number of documents to include
    pub top_k: usize,
    /// Maximum total context length in characters
    pub max_context_length: usize,
}

impl Default for ContextBuilderConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            max_context_length: 4000,
        }
    }
}

impl From<&RagSettings> for ContextBuilderConfig {
    fn from(settings: &RagSettings) -> Self {
        Self {
            top_k: settings.top_k,
            max_context_length: settings.max_context_length,
        }
    }
}

pub struct ContextBuilder {
    config: ContextBuilderConfig,
}

impl ContextBuilder {
    pub fn new(config: ContextBuilderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ContextBuilderConfig {
        &self.config
    }

    /// Documents that fit in the context window, in ranked order.
    pub fn select<'a>(&self, documents: &'a [RetrievedDocument]) -> &'a [RetrievedDocument] {
        let mut current_length = 0;
        let mut taken = 0;

        for retrieved in documents.iter().take(self.config.top_k) {
            // Extra for the citation header
            let addition_length = retrieved.document.content.chars().count() + 50;
            if current_length + addition_length > self.config.max_context_length && taken > 0 {
                break;
            }
            current_length += addition_length;
            taken += 1;
        }

        &documents[..taken]
    }

    /// Numbered passages with their source and relevance.
    pub fn format_context(&self, documents: &[RetrievedDocument]) -> String {
        let mut context = String::new();

        for (i, retrieved) in self.select(documents).iter().enumerate() {
            context.push_str(&format!(
                "[{}] (Source: {}, relevance: {:.2})\n{}\n\n",
                i + 1,
                retrieved.document.source,
                retrieved.score,
                retrieved.document.content
            ));
        }

        context.trim().to_string()
    }

    /// Distinct sources of the selected documents, first-seen order.
    pub fn sources(&self, documents: &[RetrievedDocument]) -> Vec<String> {
        let mut sources: Vec<String> = Vec::new();
        for retrieved in self.select(documents) {
            if !sources.contains(&retrieved.document.source) {
                sources.push(retrieved.document.source.clone());
            }
        }
        sources
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rag::store::StoredDocument;

    fn retrieved(content: &str, source: &str, score: f64) -> RetrievedDocument {
        RetrievedDocument {
            document: StoredDocument {
                id: format!("{}-{}", source, score),
                content: content.to_string(),
                source: source.to_string(),
                chunk_index: 0,
            },
            score,
        }
    }

    #[test]
    fn formats_numbered_passages() {
        let builder = ContextBuilder::new(ContextBuilderConfig::default());
        let docs = vec![
            retrieved("The sky is blue.", "doc1", 0.95),
            retrieved("Blue whales are large.", "doc2", 0.5),
        ];

        let context = builder.format_context(&docs);
        assert_eq!(
            context,
            "[1] (Source: doc1, relevance: 0.95)\nThe sky is blue.\n\n[2] (Source: doc2, relevance: 0.50)\nBlue whales are large."
        );
    }

    #[test]
    fn respects_top_k_and_length_budget() {
        let builder = ContextBuilder::new(ContextBuilderConfig {
            top_k: 2,
            max_context_length: 120,
        });
        let docs = vec![
            retrieved(&"a".repeat(40), "one", 3.0),
            retrieved(&"b".repeat(40), "two", 2.0),
            retrieved(&"c".repeat(40), "three", 1.0),
        ];

        assert_eq!(builder.select(&docs).len(), 1);
    }

    #[test]
    fn oversized_first_document_is_still_used() {
        let builder = ContextBuilder::new(ContextBuilderConfig {
            top_k: 5,
            max_context_length: 10,
        });
        let docs = vec![retrieved(&"x".repeat(100), "big", 1.0)];
        assert_eq!(builder.select(&docs).len(), 1);
    }

    #[test]
    fn test_source_extraction() {
        let builder = ContextBuilder::new(ContextBuilderConfig::default());
        let docs = vec![
            retrieved("a", "doc1.txt", 0.9),
            retrieved("b", "doc2.pdf", 0.8),
            retrieved("c", "doc1.txt", 0.7),
        ];

        assert_eq!(builder.sources(&docs), vec!["doc1.txt", "doc2.pdf"]);
    }
}
