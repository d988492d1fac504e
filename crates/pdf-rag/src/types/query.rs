//! Question request types

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Body of `POST /api/ask`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskRequest {
    /// The question to answer
    pub question: String,

    /// Include the retrieved chunks in the response (default: false)
    #[serde(default)]
    pub include_sources: bool,
}

impl AskRequest {
    /// Create a request for a bare question
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            include_sources: false,
        }
    }

    /// Reject requests the pipeline should never see
    pub fn validate(&self, max_chars: usize) -> Result<()> {
        if self.question.trim().is_empty() {
            return Err(Error::invalid_request("question must not be empty"));
        }

        let len = self.question.chars().count();
        if len > max_chars {
            return Err(Error::invalid_request(format!(
                "question is {} characters, limit is {}",
                len, max_chars
            )));
        }

        Ok(())
    }
}
