//! Error types for pdfqa.

use thiserror::Error;

/// Library-level error type for pdfqa operations.
#[derive(Error, Debug)]
pub enum PdfQaError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Provider unreachable: {0}")]
    Connection(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Failed to parse PDF: {0}")]
    Parse(String),

    #[error("Vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Vector index has not been built")]
    EmptyIndex,

    #[error("Vector index has already been built")]
    IndexAlreadyBuilt,

    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    #[error("Answer generation failed: {0}")]
    Generation(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

impl PdfQaError {
    /// Whether a chat session can report this error and keep going.
    ///
    /// Provider failures only abort the current question. Index misuse and
    /// configuration problems are contract violations and end the session.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            PdfQaError::Connection(_)
                | PdfQaError::Embedding(_)
                | PdfQaError::Generation(_)
                | PdfQaError::Cancelled
                | PdfQaError::Io(_)
        )
    }
}

/// Result type alias for pdfqa operations.
pub type Result<T> = std::result::Result<T, PdfQaError>;
