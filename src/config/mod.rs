//! Configuration module for pdfqa.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{Prompts, CONTEXT_PLACEHOLDER, QUESTION_PLACEHOLDER};
pub use settings::{
    ChunkingSettings, EmbeddingSettings, GeneralSettings, GenerationSettings, PromptSettings,
    ProviderSettings, RetrievalSettings, Settings,
};
