//! Document loading: PDF text extraction and chunking.

mod pdf;

pub use pdf::{extract_pages, PdfLoader};

use crate::chunking::Chunk;
use crate::error::Result;
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

/// Trait for document loaders.
pub trait DocumentLoader: Send + Sync {
    /// Load a document and split it into ordered chunks.
    fn load(&self, path: &Path) -> Result<Vec<Chunk>>;
}

static HORIZONTAL_SPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t\u{00A0}\u{000C}]+").expect("valid regex"));
static SPACE_AROUND_NEWLINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r" *\n *").expect("valid regex"));
static BLANK_LINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{2,}").expect("valid regex"));

/// Normalise extracted text.
///
/// Line endings become `\n`, horizontal whitespace runs collapse to one space,
/// blank lines are removed, and the ends are trimmed. The result never holds
/// the context separator, so assembled contexts split back into their chunks.
pub fn normalize_text(text: &str) -> String {
    let text = text.replace("\r\n", "\n").replace('\r', "\n");
    let text = HORIZONTAL_SPACE.replace_all(&text, " ");
    let text = SPACE_AROUND_NEWLINE.replace_all(&text, "\n");
    let text = BLANK_LINES.replace_all(&text, "\n");
    text.trim().to_string()
}
