//! pdfqa - Question answering over a single PDF
//!
//! A local-first CLI tool that loads one PDF, indexes it with an embedding
//! model and answers questions about it with a language model, both served by
//! Ollama or another OpenAI-compatible endpoint.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration management and prompt templates
//! - `loader` - PDF text extraction
//! - `chunking` - Page and sliding-window chunking strategies
//! - `embedding` - Embedding generation
//! - `vector_store` - Write-once vector index abstraction
//! - `generation` - Streaming answer generation
//! - `rag` - Context assembly and prompt construction
//! - `orchestrator` - Indexing and the per-question pipeline
//! - `session` - Interactive question loop
//!
//! # Example
//!
//! ```rust,no_run
//! use pdfqa::config::{Prompts, Settings};
//! use pdfqa::embedding::OpenAICompatEmbedder;
//! use pdfqa::generation::OpenAICompatGenerator;
//! use pdfqa::loader::{DocumentLoader, PdfLoader};
//! use pdfqa::openai::create_client;
//! use pdfqa::orchestrator::Orchestrator;
//! use futures::StreamExt;
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let client = create_client(&settings.provider)?;
//!     let embedder = Arc::new(OpenAICompatEmbedder::new(client.clone(), "nomic-embed-text"));
//!     let generator = Arc::new(OpenAICompatGenerator::new(client, "mistral"));
//!     let orchestrator = Orchestrator::from_settings(&settings, &Prompts::default(), embedder, generator);
//!
//!     let chunks = PdfLoader::default().load("report.pdf".as_ref())?;
//!     orchestrator.index_chunks(chunks).await?;
//!
//!     let mut answer = orchestrator
//!         .answer("What is the main finding?", &CancellationToken::new())
//!         .await?;
//!     while let Some(token) = answer.tokens.next().await {
//!         print!("{}", token?);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod chunking;
pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod generation;
pub mod loader;
pub mod openai;
pub mod orchestrator;
pub mod rag;
pub mod session;
pub mod vector_store;

pub use error::{PdfQaError, Result};
