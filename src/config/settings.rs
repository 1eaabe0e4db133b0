//! Configuration settings for pdfqa.

use crate::chunking::ChunkingStrategy;
use crate::error::{PdfQaError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub provider: ProviderSettings,
    pub embedding: EmbeddingSettings,
    pub generation: GenerationSettings,
    pub retrieval: RetrievalSettings,
    pub chunking: ChunkingSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
        }
    }
}

/// Connection settings for the OpenAI-compatible provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    /// Base URL of the API, including the `/v1` prefix.
    pub base_url: String,
    /// API key. Local Ollama servers do not need one.
    pub api_key: Option<String>,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Check at startup that the configured models are served.
    pub verify_models: bool,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434/v1".to_string(),
            api_key: None,
            timeout_secs: 300,
            verify_models: true,
        }
    }
}

/// Embedding generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// Embedding model identifier (e.g. "nomic-embed-text"). No default.
    pub model: Option<String>,
    /// Number of chunk texts sent per embedding request.
    pub batch_size: usize,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            model: None,
            batch_size: 32,
        }
    }
}

/// Answer generation settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GenerationSettings {
    /// Language model identifier (e.g. "mistral"). No default.
    pub model: Option<String>,
    /// Sampling temperature. Provider default when unset.
    pub temperature: Option<f32>,
}

/// Retrieval settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalSettings {
    /// Number of chunks retrieved per question.
    pub top_k: usize,
    /// Upper bound on the assembled context length in characters.
    /// Lowest-scoring chunks are dropped first. Unbounded when unset.
    pub max_context_chars: Option<usize>,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            top_k: 4,
            max_context_chars: None,
        }
    }
}

/// Document chunking settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingSettings {
    /// Chunking strategy (page, window).
    pub strategy: ChunkingStrategy,
    /// Window size in characters (window strategy).
    pub chunk_size: usize,
    /// Characters shared by consecutive windows (window strategy).
    pub chunk_overlap: usize,
}

impl Default for ChunkingSettings {
    fn default() -> Self {
        Self {
            strategy: ChunkingStrategy::Window,
            chunk_size: 4000,
            chunk_overlap: 200,
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PromptSettings {
    /// TOML file overriding the answer template.
    pub template_file: Option<String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else if path.is_some() {
            Err(PdfQaError::Config(format!(
                "Config file not found: {}",
                config_path.display()
            )))
        } else {
            Ok(Settings::default())
        }
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("pdfqa")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Configured language model, or a configuration error.
    pub fn generation_model(&self) -> Result<&str> {
        self.generation
            .model
            .as_deref()
            .filter(|m| !m.trim().is_empty())
            .ok_or_else(|| {
                PdfQaError::Config(
                    "No language model configured. Set generation.model, --model or PDFQA_LLM_MODEL"
                        .to_string(),
                )
            })
    }

    /// Configured embedding model, or a configuration error.
    pub fn embedding_model(&self) -> Result<&str> {
        self.embedding
            .model
            .as_deref()
            .filter(|m| !m.trim().is_empty())
            .ok_or_else(|| {
                PdfQaError::Config(
                    "No embedding model configured. Set embedding.model, --embedding-model or PDFQA_EMBEDDING_MODEL"
                        .to_string(),
                )
            })
    }

    /// Check that the settings describe a runnable session.
    pub fn validate(&self) -> Result<()> {
        self.generation_model()?;
        self.embedding_model()?;

        if self.retrieval.top_k == 0 {
            return Err(PdfQaError::Config("retrieval.top_k must be at least 1".to_string()));
        }
        if self.embedding.batch_size == 0 {
            return Err(PdfQaError::Config("embedding.batch_size must be at least 1".to_string()));
        }
        if self.chunking.chunk_size == 0 {
            return Err(PdfQaError::Config("chunking.chunk_size must be at least 1".to_string()));
        }
        if self.chunking.chunk_overlap >= self.chunking.chunk_size {
            return Err(PdfQaError::Config(format!(
                "chunking.chunk_overlap ({}) must be smaller than chunking.chunk_size ({})",
                self.chunking.chunk_overlap, self.chunking.chunk_size
            )));
        }

        let url = url::Url::parse(&self.provider.base_url).map_err(|e| {
            PdfQaError::Config(format!("Invalid provider.base_url '{}': {}", self.provider.base_url, e))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(PdfQaError::Config(format!(
                "provider.base_url must be http or https, got '{}'",
                url.scheme()
            )));
        }

        Ok(())
    }
}
