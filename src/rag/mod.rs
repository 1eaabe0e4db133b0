//! RAG (Retrieval-Augmented Generation) building blocks.
//!
//! Turns retrieved chunks into a context string and the context plus the
//! question into the prompt sent to the language model.

pub mod context;
mod prompt;

pub use context::{format_sources, ContextAssembler, CONTEXT_SEPARATOR};
pub use prompt::PromptBuilder;
