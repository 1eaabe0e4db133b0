//! Page-based chunking implementation.

use super::{Chunk, Chunker, Page, SourceOffset};

/// Emits one chunk per non-blank page.
pub struct PageChunker;

impl PageChunker {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PageChunker {
    fn default() -> Self {
        Self::new()
    }
}

impl Chunker for PageChunker {
    fn chunk(&self, pages: &[Page]) -> Vec<Chunk> {
        pages
            .iter()
            .filter(|page| !page.text.trim().is_empty())
            .enumerate()
            .map(|(ordinal, page)| {
                Chunk::new(
                    ordinal,
                    page.text.trim(),
                    SourceOffset {
                        page: page.number,
                        char_offset: 0,
                    },
                )
            })
            .collect()
    }
}
