//! In-memory vector index.
//!
//! Brute-force linear scan with a partial sort, which is the right trade-off
//! for the few hundred chunks of a single document.

use super::{cosine_with_norms, norm, IndexEntry, SearchResult, VectorIndex};
use crate::error::{PdfQaError, Result};
use async_trait::async_trait;
use std::cmp::Ordering;
use std::sync::OnceLock;
use tracing::{debug, instrument};

/// Entries and derived data, fixed at build time.
struct Built {
    entries: Vec<IndexEntry>,
    norms: Vec<f32>,
    dimensions: usize,
}

/// Write-once in-memory vector index.
pub struct MemoryVectorIndex {
    built: OnceLock<Built>,
}

impl MemoryVectorIndex {
    /// Create a new, unbuilt index.
    pub fn new() -> Self {
        Self {
            built: OnceLock::new(),
        }
    }

    /// Vector dimensionality, once built with at least one entry.
    pub fn dimensions(&self) -> Option<usize> {
        self.built
            .get()
            .filter(|b| !b.entries.is_empty())
            .map(|b| b.dimensions)
    }
}

impl Default for MemoryVectorIndex {
    fn default() -> Self {
        Self::new()
    }
}

/// Rank by descending score, then ascending insertion position.
fn by_rank(a: &(usize, f32), b: &(usize, f32)) -> Ordering {
    b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0))
}

#[async_trait]
impl VectorIndex for MemoryVectorIndex {
    #[instrument(skip(self, entries), fields(count = entries.len()))]
    async fn insert_all(&self, entries: Vec<IndexEntry>) -> Result<usize> {
        if self.built.get().is_some() {
            return Err(PdfQaError::IndexAlreadyBuilt);
        }

        let dimensions = entries.first().map(|e| e.vector.len()).unwrap_or(0);
        if let Some(bad) = entries.iter().find(|e| e.vector.len() != dimensions) {
            return Err(PdfQaError::DimensionMismatch {
                expected: dimensions,
                actual: bad.vector.len(),
            });
        }

        let norms = entries.iter().map(|e| norm(&e.vector)).collect();
        let count = entries.len();

        self.built
            .set(Built {
                entries,
                norms,
                dimensions,
            })
            .map_err(|_| PdfQaError::IndexAlreadyBuilt)?;

        debug!("Built index with {} entries of dimension {}", count, dimensions);
        Ok(count)
    }

    async fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchResult>> {
        let built = self.built.get().ok_or(PdfQaError::EmptyIndex)?;

        if built.entries.is_empty() || k == 0 {
            return Ok(Vec::new());
        }
        if query.len() != built.dimensions {
            return Err(PdfQaError::DimensionMismatch {
                expected: built.dimensions,
                actual: query.len(),
            });
        }

        let query_norm = norm(query);
        let mut scored: Vec<(usize, f32)> = built
            .entries
            .iter()
            .zip(&built.norms)
            .enumerate()
            .map(|(i, (entry, entry_norm))| {
                let score = cosine_with_norms(query, &entry.vector, query_norm, *entry_norm);
                (i, if score.is_nan() { f32::NEG_INFINITY } else { score })
            })
            .collect();

        let k = k.min(scored.len());
        if k < scored.len() {
            scored.select_nth_unstable_by(k - 1, by_rank);
            scored.truncate(k);
        }
        scored.sort_by(by_rank);

        Ok(scored
            .into_iter()
            .map(|(i, score)| SearchResult {
                chunk: built.entries[i].chunk.clone(),
                score,
            })
            .collect())
    }

    fn len(&self) -> usize {
        self.built.get().map(|b| b.entries.len()).unwrap_or(0)
    }
}
