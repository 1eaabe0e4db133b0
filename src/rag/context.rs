//! Context assembly for RAG prompts.

use crate::vector_store::SearchResult;

/// Separator placed between chunk texts in the assembled context.
pub const CONTEXT_SEPARATOR: &str = "\n\n";

/// Joins retrieved chunks into the context handed to the prompt.
#[derive(Debug, Clone, Default)]
pub struct ContextAssembler {
    max_chars: Option<usize>,
}

impl ContextAssembler {
    /// Create an assembler without a length budget.
    pub fn new() -> Self {
        Self::default()
    }

    /// Limit the assembled context to `max_chars` characters.
    pub fn with_max_chars(mut self, max_chars: Option<usize>) -> Self {
        self.max_chars = max_chars;
        self
    }

    /// Join chunk texts in the given (retrieval-rank) order.
    pub fn assemble(&self, results: &[SearchResult]) -> String {
        results
            .iter()
            .map(|r| r.chunk.text())
            .collect::<Vec<_>>()
            .join(CONTEXT_SEPARATOR)
    }

    /// Drop the lowest-ranked results until the assembled context fits the budget.
    ///
    /// The top result is always kept. Without a budget this is a no-op.
    pub fn fit(&self, mut results: Vec<SearchResult>) -> Vec<SearchResult> {
        let Some(max_chars) = self.max_chars else {
            return results;
        };

        while results.len() > 1 && assembled_len(&results) > max_chars {
            results.pop();
        }
        results
    }
}

/// Character length of the assembled context for `results`.
fn assembled_len(results: &[SearchResult]) -> usize {
    let text: usize = results.iter().map(|r| r.chunk.text().chars().count()).sum();
    let separators = results.len().saturating_sub(1) * CONTEXT_SEPARATOR.chars().count();
    text + separators
}

/// Format retrieved chunks as a sources footer for the user.
pub fn format_sources(results: &[SearchResult]) -> String {
    results
        .iter()
        .enumerate()
        .map(|(i, r)| {
            format!(
                "[{}] {} (score: {:.2}): {}",
                i + 1,
                r.chunk.format_location(),
                r.score,
                preview(r.chunk.text(), 80)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Single-line preview truncated on a character boundary.
fn preview(text: &str, max_chars: usize) -> String {
    let flat = text.replace('\n', " ");
    if flat.chars().count() <= max_chars {
        flat
    } else {
        format!("{}...", flat.chars().take(max_chars).collect::<String>())
    }
}
