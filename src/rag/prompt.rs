//! Prompt construction from the answer template.

use crate::config::Prompts;
use regex::{Captures, Regex};
use std::sync::LazyLock;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*(context|question)\s*\}\}").expect("valid regex"));

/// Fills the answer template with context and question.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    template: String,
}

impl PromptBuilder {
    /// Create a builder for a template containing `{{context}}` and `{{question}}`.
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    /// Create a builder from loaded prompts.
    pub fn from_prompts(prompts: &Prompts) -> Self {
        Self::new(prompts.answer.clone())
    }

    /// Substitute both values in a single pass.
    ///
    /// Inserted text is never re-scanned, so a question that happens to
    /// contain `{{context}}` is kept literally.
    pub fn build(&self, context: &str, question: &str) -> String {
        PLACEHOLDER
            .replace_all(&self.template, |caps: &Captures| match &caps[1] {
                "context" => context.to_string(),
                _ => question.to_string(),
            })
            .into_owned()
    }
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::from_prompts(&Prompts::default())
    }
}
