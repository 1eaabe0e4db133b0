//! Fixed-window chunking implementation.
//!
//! Splits each page into windows of at most `chunk_size` characters, with
//! `chunk_overlap` characters repeated between consecutive windows. Windows
//! end on whitespace when there is some in the back half of the window.

use super::{Chunk, Chunker, ChunkingConfig, Page, SourceOffset};

/// Character-window chunker.
pub struct WindowChunker {
    config: ChunkingConfig,
}

impl WindowChunker {
    pub fn new(config: ChunkingConfig) -> Self {
        Self { config }
    }

    /// Split one page's text into (char_offset, text) windows.
    fn split(&self, text: &str) -> Vec<(usize, String)> {
        let chars: Vec<char> = text.chars().collect();
        let size = self.config.chunk_size.max(1);
        let overlap = self.config.chunk_overlap.min(size - 1);

        let mut windows = Vec::new();
        let mut start = 0;

        while start < chars.len() {
            let hard_end = (start + size).min(chars.len());
            let end = if hard_end < chars.len() {
                break_point(&chars, start + (size / 2).max(1), hard_end).unwrap_or(hard_end)
            } else {
                hard_end
            };

            let window: String = chars[start..end].iter().collect();
            let leading = window.chars().take_while(|c| c.is_whitespace()).count();
            let trimmed = window.trim();
            if !trimmed.is_empty() {
                windows.push((start + leading, trimmed.to_string()));
            }

            if end >= chars.len() {
                break;
            }

            let mut next = if end - start > overlap { end - overlap } else { end };
            // Overlap starts on a word boundary when the window allows it
            if next > 0 && !chars[next - 1].is_whitespace() {
                if let Some(ws) = chars[next..=end].iter().position(|c| c.is_whitespace()) {
                    next += ws + 1;
                }
            }
            start = next;
        }

        windows
    }
}

/// Latest whitespace position in `[from, to)`, preferring line breaks.
fn break_point(chars: &[char], from: usize, to: usize) -> Option<usize> {
    if from >= to {
        return None;
    }
    let range = &chars[from..to];

    let line = range.iter().rposition(|c| *c == '\n').map(|i| from + i);
    let space = range.iter().rposition(|c| c.is_whitespace()).map(|i| from + i);

    line.or(space)
}

impl Chunker for WindowChunker {
    fn chunk(&self, pages: &[Page]) -> Vec<Chunk> {
        let mut chunks = Vec::new();

        for page in pages {
            for (char_offset, text) in self.split(&page.text) {
                chunks.push(Chunk::new(
                    chunks.len(),
                    text,
                    SourceOffset {
                        page: page.number,
                        char_offset,
                    },
                ));
            }
        }

        chunks
    }
}
