//! Vector index abstraction for pdfqa.
//!
//! Provides a trait-based interface so the brute-force in-memory index can be
//! swapped for an approximate nearest-neighbour structure without touching
//! the pipeline.

mod memory;

pub use memory::MemoryVectorIndex;

use crate::chunking::Chunk;
use crate::error::Result;
use async_trait::async_trait;

/// A chunk paired with its embedding.
#[derive(Debug, Clone)]
pub struct IndexEntry {
    /// The indexed chunk.
    pub chunk: Chunk,
    /// Embedding vector.
    pub vector: Vec<f32>,
}

impl IndexEntry {
    pub fn new(chunk: Chunk, vector: Vec<f32>) -> Self {
        Self { chunk, vector }
    }
}

/// A search result with score.
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// The matched chunk.
    pub chunk: Chunk,
    /// Cosine similarity (higher is better).
    pub score: f32,
}

/// Trait for vector index implementations.
///
/// An index is built once with `insert_all` and is read-only afterwards.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Build the index. Must be called exactly once.
    ///
    /// Every vector must have the dimensionality of the first one.
    async fn insert_all(&self, entries: Vec<IndexEntry>) -> Result<usize>;

    /// Return the `min(k, len)` entries most similar to `query`.
    ///
    /// Results are sorted by descending score; equal scores keep insertion order.
    async fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchResult>>;

    /// Number of indexed entries (0 before the index is built).
    fn len(&self) -> usize;

    /// Whether the index holds no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Compute cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    cosine_with_norms(a, b, norm(a), norm(b))
}

/// Euclidean norm.
pub(crate) fn norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// Cosine similarity with precomputed norms. Zero vectors score 0.0.
pub(crate) fn cosine_with_norms(a: &[f32], b: &[f32], norm_a: f32, norm_b: f32) -> f32 {
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    dot_product / (norm_a * norm_b)
}
