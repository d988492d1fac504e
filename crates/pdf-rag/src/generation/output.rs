//! Generator output parsing

use crate::providers::Generation;

/// Reduces a generation to its plain text
#[derive(Debug, Clone, Copy, Default)]
pub struct StrOutputParser;

impl StrOutputParser {
    pub fn parse(&self, generation: Generation) -> String {
        generation.text
    }
}
