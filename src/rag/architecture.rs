use serde::Serialize;

/// Pipeline variants a user can deploy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RagArchitecture {
    Basic,
    Hybrid,
    Agentic,
    Conversational,
    Citation,
}

impl RagArchitecture {
    pub const ALL: [RagArchitecture; 5] = [
        RagArchitecture::Basic,
        RagArchitecture::Hybrid,
        RagArchitecture::Agentic,
        RagArchitecture::Conversational,
        RagArchitecture::Citation,
    ];

    /// Case-insensitive; `standard` is accepted as an alias of `basic`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "basic" | "standard" => Some(RagArchitecture::Basic),
            "hybrid" => Some(RagArchitecture::Hybrid),
            "agentic" => Some(RagArchitecture::Agentic),
            "conversational" => Some(RagArchitecture::Conversational),
            "citation" => Some(RagArchitecture::Citation),
            _ => None,
        }
    }

    /// Like [`parse`](Self::parse) but falls back to the basic topology.
    pub fn resolve(value: &str) -> Self {
        Self::parse(value).unwrap_or_else(|| {
            tracing::warn!("Unknown RAG type '{}', using basic pipeline", value);
            RagArchitecture::Basic
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RagArchitecture::Basic => "basic",
            RagArchitecture::Hybrid => "hybrid",
            RagArchitecture::Agentic => "agentic",
            RagArchitecture::Conversational => "conversational",
            RagArchitecture::Citation => "citation",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            RagArchitecture::Basic => "Basic RAG",
            RagArchitecture::Hybrid => "Hybrid RAG",
            RagArchitecture::Agentic => "Agentic RAG",
            RagArchitecture::Conversational => "Conversational RAG",
            RagArchitecture::Citation => "Citation RAG",
        }
    }

    /// Extra prompt lines inserted after the feature list.
    pub fn instructions(&self) -> Option<&'static str> {
        match self {
            RagArchitecture::Basic => None,
            RagArchitecture::Hybrid => Some(
                "The context was gathered by combining keyword and term-overlap search; prefer passages that match the query wording.",
            ),
            RagArchitecture::Agentic => Some(
                "The query was broken into sub-questions and context was retrieved for each. Address every part of the query.",
            ),
            RagArchitecture::Conversational => Some(
                "Use the conversation history to resolve follow-up questions and references to earlier answers.",
            ),
            RagArchitecture::Citation => Some(
                "Cite the supporting context passages by their bracketed number, for example [1].",
            ),
        }
    }
}

impl std::fmt::Display for RagArchitecture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
