//! Chunking strategies for breaking extracted document text into retrievable units.

mod page;
mod window;

pub use page::PageChunker;
pub use window::WindowChunker;

use serde::{Deserialize, Serialize};

/// Text extracted from a single PDF page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// 1-based page number.
    pub number: u32,
    /// Normalised page text.
    pub text: String,
}

impl Page {
    pub fn new(number: u32, text: impl Into<String>) -> Self {
        Self {
            number,
            text: text.into(),
        }
    }
}

/// Opaque ordinal identifying a chunk within one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChunkId(usize);

impl ChunkId {
    pub fn ordinal(&self) -> usize {
        self.0
    }
}

impl std::fmt::Display for ChunkId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Where a chunk came from in the source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceOffset {
    /// 1-based page number.
    pub page: u32,
    /// Character offset of the chunk within the page text.
    pub char_offset: usize,
}

/// A unit of document text with stable identity and order.
///
/// Chunks are immutable once created.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    id: ChunkId,
    text: String,
    source: SourceOffset,
}

impl Chunk {
    /// Create a new chunk.
    pub fn new(ordinal: usize, text: impl Into<String>, source: SourceOffset) -> Self {
        Self {
            id: ChunkId(ordinal),
            text: text.into(),
            source,
        }
    }

    pub fn id(&self) -> ChunkId {
        self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn source(&self) -> SourceOffset {
        self.source
    }

    /// Format the source location for display.
    pub fn format_location(&self) -> String {
        if self.source.char_offset == 0 {
            format!("page {}", self.source.page)
        } else {
            format!("page {}, char {}", self.source.page, self.source.char_offset)
        }
    }
}

/// Chunking strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ChunkingStrategy {
    /// One chunk per page.
    Page,
    /// Fixed-size character windows with overlap, within each page.
    #[default]
    Window,
}

impl std::str::FromStr for ChunkingStrategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "page" => Ok(ChunkingStrategy::Page),
            "window" => Ok(ChunkingStrategy::Window),
            _ => Err(format!("Unknown chunking strategy: {}", s)),
        }
    }
}

/// Configuration for chunking.
#[derive(Debug, Clone)]
pub struct ChunkingConfig {
    /// Window size in characters.
    pub chunk_size: usize,
    /// Characters shared by consecutive windows.
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 4000,
            chunk_overlap: 200,
        }
    }
}

/// Trait for chunking implementations.
///
/// Output must be deterministic for a given input and follow page order.
/// Chunk ordinals are assigned consecutively from zero.
pub trait Chunker: Send + Sync {
    /// Split pages into chunks.
    fn chunk(&self, pages: &[Page]) -> Vec<Chunk>;
}

/// Create a chunker based on the strategy.
pub fn create_chunker(strategy: ChunkingStrategy, config: ChunkingConfig) -> Box<dyn Chunker> {
    match strategy {
        ChunkingStrategy::Page => Box::new(PageChunker::new()),
        ChunkingStrategy::Window => Box::new(WindowChunker::new(config)),
    }
}
