//! Splits extracted texts into overlapping chunks for indexing.

use serde::{Deserialize, Serialize};

use crate::core::config::RagSettings;

/// Configuration for chunking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkerConfig {
    /// Maximum chunk size in characters
    pub chunk_size: usize,
    /// Overlap between chunks
    pub chunk_overlap: usize,
    /// Maximum chunks taken from a single text
    pub max_chunks: usize,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            chunk_overlap: 50,
            max_chunks: 200,
        }
    }
}

impl From<&RagSettings> for ChunkerConfig {
    fn from(settings: &RagSettings) -> Self {
        Self {
            chunk_size: settings.chunk_size,
            chunk_overlap: settings.chunk_overlap,
            max_chunks: settings.max_chunks_per_text,
        }
    }
}

/// A text chunk with source information.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextChunk {
    /// The text content
    pub text: String,
    /// Source identifier (URL, filename, etc.)
    pub source: String,
    /// Chunk index within the source
    pub chunk_index: usize,
}

pub struct Chunker {
    config: ChunkerConfig,
}

impl Chunker {
    pub fn new(config: ChunkerConfig) -> Self {
        Self { config }
    }

    /// Chunks every text, labelling each with the source it came from.
    ///
    /// Scraped texts carry a `Source: {url}` first line; other texts are
    /// labelled `document_{n}` by their position.
    pub fn chunk_texts(&self, texts: &[String]) -> Vec<TextChunk> {
        texts
            .iter()
            .enumerate()
            .flat_map(|(index, text)| {
                let (source, body) = split_source_line(text, index);
                self.split_into_chunks(body, &source)
            })
            .collect()
    }

    /// Split text into overlapping chunks.
    ///
    /// Each window after the first starts `chunk_overlap` characters before
    /// the previous cut, so no text falls between two chunks.
    pub fn split_into_chunks(&self, text: &str, source: &str) -> Vec<TextChunk> {
        let chunk_size = self.config.chunk_size.max(1);
        let overlap = self.config.chunk_overlap;
        let max_chunks = self.config.max_chunks;

        let mut chunks = Vec::new();
        let chars: Vec<char> = text.chars().collect();
        let total_chars = chars.len();

        if text.trim().is_empty() {
            return chunks;
        }

        let mut start = 0;
        let mut chunk_index = 0;

        while start < total_chars && chunks.len() < max_chunks {
            let end = (start + chunk_size).min(total_chars);
            let window = &chars[start..end];

            // Try to break at sentence boundary
            let cut = if end < total_chars {
                sentence_cut(window)
            } else {
                window.len()
            };

            let chunk_text: String = window[..cut].iter().collect();
            let trimmed = chunk_text.trim();
            if !trimmed.is_empty() {
                chunks.push(TextChunk {
                    text: trimmed.to_string(),
                    source: source.to_string(),
                    chunk_index,
                });
                chunk_index += 1;
            }

            if end == total_chars {
                break;
            }
            start = (start + cut).saturating_sub(overlap).max(start + 1);
        }

        chunks
    }
}

fn split_source_line(text: &str, index: usize) -> (String, &str) {
    if let Some(rest) = text.strip_prefix("Source: ") {
        let (first, body) = rest.split_once('\n').unwrap_or((rest, ""));
        let source = first.trim();
        if !source.is_empty() {
            return (source.to_string(), body);
        }
    }
    (format!("document_{}", index + 1), text)
}

/// Length of `window` up to its last sentence ending in the final fifth,
/// or the whole window when there is none.
fn sentence_cut(window: &[char]) -> usize {
    let search_start = (window.len() * 80) / 100;

    (search_start..window.len().saturating_sub(1))
        .rev()
        .find(|&i| matches!(window[i], '.' | '!' | '?') && matches!(window[i + 1], ' ' | '\n'))
        .map(|i| i + 2)
        .unwrap_or(window.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunker(chunk_size: usize, chunk_overlap: usize, max_chunks: usize) -> Chunker {
        Chunker::new(ChunkerConfig {
            chunk_size,
            chunk_overlap,
            max_chunks,
        })
    }

    #[test]
    fn test_chunk_splitting() {
        let engine = chunker(100, 20, 10);

        let text = "This is a test. ".repeat(20);
        let chunks = engine.split_into_chunks(&text, "test");

        assert!(chunks.len() > 1);
        assert!(chunks.len() <= 10);
        assert!(chunks.iter().all(|c| c.text.chars().count() <= 100));
        assert!(chunks[0].text.ends_with('.'));
        // the cut lands after the sixth sentence (char 96); the next window
        // begins 20 chars earlier
        assert!(chunks[1].text.starts_with("st. This is a test."));
    }

    #[test]
    fn text_after_an_early_sentence_cut_is_still_indexed() {
        let engine = Chunker::new(ChunkerConfig::default());
        let text = format!("{}. MARKERWORD {}", "a".repeat(408), "b".repeat(600));

        let chunks = engine.split_into_chunks(&text, "doc");

        assert!(chunks.iter().any(|c| c.text.contains("MARKERWORD")));
    }

    #[test]
    fn every_word_lands_in_some_chunk() {
        let engine = chunker(60, 10, 1000);
        let text: String = (0..300).map(|i| format!("w{}x. ", i)).collect();

        let chunks = engine.split_into_chunks(&text, "doc");

        for i in 0..300 {
            let word = format!("w{}x.", i);
            assert!(
                chunks.iter().any(|c| c.text.contains(&word)),
                "{} missing from every chunk",
                word
            );
        }
    }

    #[test]
    fn short_text_is_one_chunk() {
        let chunks = chunker(500, 50, 10).split_into_chunks("  Open daily.  ", "faq");
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "Open daily.");
        assert_eq!(chunks[0].source, "faq");
    }

    #[test]
    fn blank_text_has_no_chunks() {
        assert!(chunker(500, 50, 10).split_into_chunks(" \n ", "x").is_empty());
    }

    #[test]
    fn multibyte_text_does_not_split_inside_a_character() {
        let text = "日本語のテキスト。".repeat(30);
        let chunks = chunker(40, 5, 50).split_into_chunks(&text, "jp");
        assert!(!chunks.is_empty());
    }

    #[test]
    fn scraped_texts_keep_their_url_as_source() {
        let texts = vec![
            "Source: https://example.com\nWelcome to Example.".to_string(),
            "Uploaded notes".to_string(),
        ];
        let chunks = chunker(500, 50, 10).chunk_texts(&texts);

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].source, "https://example.com");
        assert_eq!(chunks[0].text, "Welcome to Example.");
        assert_eq!(chunks[1].source, "document_2");
    }
}
