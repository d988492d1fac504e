//! Joins retrieved chunks into one prompt-ready string

use crate::types::Chunk;

/// Separator placed between chunk contents
pub const CONTEXT_SEPARATOR: &str = "\n\n";

/// Concatenate chunk contents in order, separated by a blank line
pub fn format_context<'a, I>(chunks: I) -> String
where
    I: IntoIterator<Item = &'a Chunk>,
{
    chunks
        .into_iter()
        .map(|c| c.content.as_str())
        .collect::<Vec<_>>()
        .join(CONTEXT_SEPARATOR)
}
