use super::architecture::RagArchitecture;

/// One question/answer pair from a conversational pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange {
    pub query: String,
    pub answer: String,
}

pub const NO_CONTEXT_PLACEHOLDER: &str = "(no relevant documents found)";

/// Prompt template fixed at deployment time; the per-query parts are filled
/// in by [`PromptTemplate::render`].
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    use_case: String,
    features: Vec<String>,
    architecture: RagArchitecture,
}

impl PromptTemplate {
    pub fn new(use_case: impl Into<String>, features: Vec<String>, architecture: RagArchitecture) -> Self {
        Self {
            use_case: use_case.into(),
            features,
            architecture,
        }
    }

    fn features_line(&self) -> String {
        if self.features.is_empty() {
            "none".to_string()
        } else {
            self.features.join(", ")
        }
    }

    pub fn render(&self, context: &str, query: &str, history: &[Exchange]) -> String {
        let mut prompt = format!(
            "You are an AI assistant designed for the '{}' persona.\n\
             Given the following context, please answer the query.\n\
             Note these requested features: {}.\n",
            self.use_case,
            self.features_line()
        );

        if let Some(instructions) = self.architecture.instructions() {
            prompt.push_str(instructions);
            prompt.push('\n');
        }

        if !history.is_empty() {
            prompt.push_str("\nConversation so far:\n");
            for exchange in history {
                prompt.push_str(&format!("User: {}\nAssistant: {}\n", exchange.query, exchange.answer));
            }
        }

        let context = if context.trim().is_empty() {
            NO_CONTEXT_PLACEHOLDER
        } else {
            context
        };

        prompt.push_str(&format!("\nContext:\n{}\n\nQuery: {}\nAnswer:", context, query));
        prompt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_prompt_layout() {
        let template = PromptTemplate::new(
            "customer support",
            vec!["memory".to_string(), "guardrails".to_string()],
            RagArchitecture::Basic,
        );
        let prompt = template.render("[1] (Source: faq, relevance: 1.00)\nOpen 9-5.", "When are you open?", &[]);

        assert_eq!(
            prompt,
            "You are an AI assistant designed for the 'customer support' persona.\n\
             Given the following context, please answer the query.\n\
             Note these requested features: memory, guardrails.\n\
             \nContext:\n[1] (Source: faq, relevance: 1.00)\nOpen 9-5.\n\nQuery: When are you open?\nAnswer:"
        );
    }

    #[test]
    fn conversational_prompt_includes_history() {
        let template = PromptTemplate::new("tutor", vec![], RagArchitecture::Conversational);
        let history = vec![Exchange {
            query: "What is Rust?".to_string(),
            answer: "A systems language.".to_string(),
        }];
        let prompt = template.render("ctx", "Is it fast?", &history);

        assert!(prompt.contains("Note these requested features: none."));
        assert!(prompt.contains("Use the conversation history"));
        assert!(prompt.contains("User: What is Rust?\nAssistant: A systems language.\n"));
        assert!(prompt.ends_with("Query: Is it fast?\nAnswer:"));
    }

    #[test]
    fn empty_context_uses_placeholder() {
        let template = PromptTemplate::new("docs", vec![], RagArchitecture::Citation);
        let prompt = template.render("  ", "q", &[]);
        assert!(prompt.contains(&format!("Context:\n{}\n", NO_CONTEXT_PLACEHOLDER)));
        assert!(prompt.contains("[1]"));
    }
}
