//! Prompt template with `{context}` and `{question}` slots

use regex::{Captures, Regex};
use std::path::Path;
use std::sync::OnceLock;

use crate::error::{Error, Result};
use crate::providers::ChatMessage;

/// Built-in RAG prompt, sent as a single user turn
pub const RAG_PROMPT: &str = "You are an assistant for question-answering tasks. \
Use the following pieces of retrieved context to answer the question. \
If you don't know the answer, just say that you don't know. \
Use three sentences maximum and keep the answer concise.\n\
Question: {question} \n\
Context: {context} \n\
Answer:";

const REQUIRED_SLOTS: [&str; 2] = ["context", "question"];

fn slot_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    // `{{` and `}}` are literal braces
    PATTERN.get_or_init(|| Regex::new(r"\{\{|\}\}|\{(\w+)\}").expect("valid slot regex"))
}

/// Instruction template filled once per request
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    template: String,
}

impl PromptTemplate {
    /// Build a template, requiring exactly the `context` and `question` slots
    pub fn new(template: impl Into<String>) -> Result<Self> {
        let template = template.into();

        let slots: Vec<String> = slot_pattern()
            .captures_iter(&template)
            .filter_map(|c| c.get(1).map(|m| m.as_str().to_string()))
            .collect();

        for required in REQUIRED_SLOTS {
            if !slots.iter().any(|s| s == required) {
                return Err(Error::Config(format!(
                    "Prompt template is missing the {{{}}} slot",
                    required
                )));
            }
        }

        if let Some(unknown) = slots.iter().find(|s| !REQUIRED_SLOTS.contains(&s.as_str())) {
            return Err(Error::Config(format!(
                "Prompt template has unknown slot {{{}}}",
                unknown
            )));
        }

        Ok(Self { template })
    }

    /// Read a template from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read prompt template {}: {}", path.display(), e))
        })?;
        Self::new(raw)
    }

    /// The raw template text
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Substitute both slots in one pass; slot-like text inside the values is left alone
    pub fn render(&self, context: &str, question: &str) -> String {
        slot_pattern()
            .replace_all(&self.template, |caps: &Captures| match caps.get(1).map(|m| m.as_str()) {
                Some("context") => context.to_string(),
                Some("question") => question.to_string(),
                Some(other) => format!("{{{}}}", other),
                None => caps[0][..1].to_string(),
            })
            .into_owned()
    }

    /// Render into chat turns
    pub fn format_messages(&self, context: &str, question: &str) -> Vec<ChatMessage> {
        vec![ChatMessage::user(self.render(context, question))]
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self {
            template: RAG_PROMPT.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::ChatRole;

    #[test]
    fn test_builtin_template_is_valid() {
        assert!(PromptTemplate::new(RAG_PROMPT).is_ok());
    }

    #[test]
    fn test_render_fills_both_slots() {
        let prompt = PromptTemplate::default();
        let rendered = prompt.render("Weekdays: 8 AM - 8 PM", "When do you open?");

        assert!(rendered.contains("Question: When do you open? \n"));
        assert!(rendered.contains("Context: Weekdays: 8 AM - 8 PM \n"));
        assert!(rendered.ends_with("Answer:"));
        assert!(!rendered.contains("{question}"));
    }

    #[test]
    fn test_values_are_not_re_expanded() {
        let prompt = PromptTemplate::new("Q: {question}\nC: {context}").unwrap();
        let rendered = prompt.render("literal {question}", "what is {context}?");
        assert_eq!(rendered, "Q: what is {context}?\nC: literal {question}");
    }

    #[test]
    fn test_escaped_braces() {
        let prompt = PromptTemplate::new("{{json}} {context} {question}").unwrap();
        assert_eq!(prompt.render("c", "q"), "{json} c q");
    }

    #[test]
    fn test_rejects_missing_or_unknown_slots() {
        assert!(PromptTemplate::new("Only {question}").is_err());
        assert!(PromptTemplate::new("Only {context}").is_err());
        assert!(PromptTemplate::new("{context} {question} {history}").is_err());
    }

    #[test]
    fn test_format_messages_single_user_turn() {
        let messages = PromptTemplate::default().format_messages("ctx", "q?");
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, ChatRole::User);
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prompt.txt");
        std::fs::write(&path, "Answer {question} using {context}").unwrap();
        let prompt = PromptTemplate::from_file(&path).unwrap();
        assert_eq!(prompt.render("notes", "this"), "Answer this using notes");
    }
}
