//! CLI module for pdfqa.

mod output;
pub mod preflight;

pub use output::Output;

use crate::config::Settings;
use clap::Parser;

/// pdfqa - Ask questions about a PDF
///
/// Loads a PDF, indexes it with a local embedding model and answers questions
/// about it with a local language model served by Ollama or any other
/// OpenAI-compatible endpoint.
#[derive(Parser, Debug)]
#[command(name = "pdfqa")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to the PDF document
    pub pdf: String,

    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Language model used to answer questions
    #[arg(long, env = "PDFQA_LLM_MODEL")]
    pub model: Option<String>,

    /// Embedding model used to index the document
    #[arg(long, env = "PDFQA_EMBEDDING_MODEL")]
    pub embedding_model: Option<String>,

    /// Number of chunks retrieved per question
    #[arg(short = 'k', long, env = "PDFQA_TOP_K")]
    pub top_k: Option<usize>,

    /// Base URL of the OpenAI-compatible API
    #[arg(long, env = "PDFQA_BASE_URL")]
    pub base_url: Option<String>,

    /// Print the pages each answer was drawn from
    #[arg(long)]
    pub show_sources: bool,

    /// Skip checking the provider and models before loading the document
    #[arg(long)]
    pub skip_preflight: bool,
}

impl Cli {
    /// Apply command-line values over the loaded settings.
    pub fn apply_overrides(&self, settings: &mut Settings) {
        if let Some(model) = &self.model {
            settings.generation.model = Some(model.clone());
        }
        if let Some(model) = &self.embedding_model {
            settings.embedding.model = Some(model.clone());
        }
        if let Some(top_k) = self.top_k {
            settings.retrieval.top_k = top_k;
        }
        if let Some(base_url) = &self.base_url {
            settings.provider.base_url = base_url.clone();
        }
    }

    /// Log level from `-v`, falling back to the configured level.
    pub fn log_level<'a>(&self, configured: &'a str) -> &'a str {
        match self.verbose {
            0 => configured,
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}
