//! Canned architecture advice for the builder chat.

use regex::Regex;
use std::sync::LazyLock;

static GREETING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:hi|hello|hey)\b").expect("valid regex"));

// "open source" is about licensing, not attribution
static OPEN_SOURCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bopen[\s-]+source\b").expect("valid regex"));

const DEFAULT_ANSWER: &str =
    "I am your RAG creation assistant. Based on what you need, I can recommend an architecture.";

const RULES: &[(&str, &str)] = &[
    (
        r"\b(?:faqs?|basic)\b",
        "For an FAQ bot, a Basic RAG with Pinecone should be perfect.",
    ),
    (
        r"\b(?:complex\w*|multi\w*|agentic)\b",
        "I recommend an Agentic RAG architecture. Tools will help break down complex queries.",
    ),
    (
        r"\b(?:docs|pdfs?)\b",
        "Hybrid RAG with ChromaDB or Pinecone works well for retrieving text from documents.",
    ),
    (
        r"\b(?:cite[sd]?|citations?|sources?)\b",
        "Citation RAG attaches the supporting sources to every answer, which suits research and compliance use cases.",
    ),
    (
        r"\b(?:conversations?|conversational|follow-?ups?|memory)\b",
        "Conversational RAG keeps recent turns in memory so users can ask follow-up questions naturally.",
    ),
];

static COMPILED_RULES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    RULES
        .iter()
        .map(|&(pattern, answer)| (Regex::new(pattern).expect("valid regex"), answer))
        .collect()
});

/// Picks a recommendation from whole-word keywords in `query`; first
/// matching rule wins.
pub fn advise(query: &str) -> &'static str {
    let lowered = query.to_lowercase();
    let q = OPEN_SOURCE.replace_all(&lowered, " ");

    for (pattern, answer) in COMPILED_RULES.iter() {
        if pattern.is_match(&q) {
            return *answer;
        }
    }

    if GREETING.is_match(&q) {
        return "Hello! Tell me about the kinds of data you have and what you want your chatbot to achieve.";
    }

    DEFAULT_ANSWER
}
