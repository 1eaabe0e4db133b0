//! Prompt templates for pdfqa.
//!
//! The answer template can be replaced by a TOML file named in
//! `prompts.template_file`.

use crate::error::{PdfQaError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Placeholder substituted with the assembled context.
pub const CONTEXT_PLACEHOLDER: &str = "{{context}}";

/// Placeholder substituted with the user's question.
pub const QUESTION_PLACEHOLDER: &str = "{{question}}";

/// Collection of prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Prompts {
    /// Template for answering a question from retrieved context.
    pub answer: String,
}

impl Default for Prompts {
    fn default() -> Self {
        Self {
            answer: r#"You are an expert PDF document assistant. Use the following pieces of retrieved context
to answer the question. If you don't know the answer, just say that you do not have
enough information from the document to answer, don't try to make up an answer.

Context:
{{context}}

Question:
{{question}}

Answer:
"#
            .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts, replacing the defaults with the given file if any.
    pub fn load(template_file: Option<&str>) -> Result<Self> {
        let prompts = match template_file {
            Some(file) => {
                let path = crate::config::Settings::expand_path(file);
                Self::load_file(&path)?
            }
            None => Prompts::default(),
        };

        prompts.validate()?;
        Ok(prompts)
    }

    fn load_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(PdfQaError::Config(format!(
                "Prompt file not found: {}",
                path.display()
            )));
        }
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Check that the answer template references both placeholders.
    pub fn validate(&self) -> Result<()> {
        for placeholder in [CONTEXT_PLACEHOLDER, QUESTION_PLACEHOLDER] {
            if !self.answer.contains(placeholder) {
                return Err(PdfQaError::Config(format!(
                    "Answer template is missing the {} placeholder",
                    placeholder
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_prompts() {
        let prompts = Prompts::default();
        assert!(prompts.answer.contains(CONTEXT_PLACEHOLDER));
        assert!(prompts.answer.contains(QUESTION_PLACEHOLDER));
        assert!(prompts.validate().is_ok());
    }

    #[test]
    fn test_load_custom_template() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "answer = \"Q: {{{{question}}}}\\nC: {{{{context}}}}\"").unwrap();

        let prompts = Prompts::load(file.path().to_str()).unwrap();
        assert_eq!(prompts.answer, "Q: {{question}}\nC: {{context}}");
    }

    #[test]
    fn test_template_without_context_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "answer = \"Just answer {{{{question}}}}\"").unwrap();

        let err = Prompts::load(file.path().to_str()).unwrap_err();
        assert!(matches!(err, PdfQaError::Config(msg) if msg.contains("{{context}}")));
    }
}
