//! pdfqa CLI entry point.

use anyhow::{Context, Result};
use clap::Parser;
use pdfqa::chunking::ChunkingConfig;
use pdfqa::cli::{preflight, Cli, Output};
use pdfqa::config::{Prompts, Settings};
use pdfqa::embedding::OpenAICompatEmbedder;
use pdfqa::generation::OpenAICompatGenerator;
use pdfqa::loader::{DocumentLoader, PdfLoader};
use pdfqa::openai::create_client;
use pdfqa::orchestrator::Orchestrator;
use pdfqa::session::{spawn_line_reader, ChatSession, CloseReason, SessionSummary};
use std::process::ExitCode;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Exit code after an interrupt, as shells report SIGINT.
const EXIT_INTERRUPTED: u8 = 130;

/// Exit code for any startup or session failure.
const EXIT_FAILURE: u8 = 1;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() { ExitCode::FAILURE } else { ExitCode::SUCCESS };
            let _ = e.print();
            return code;
        }
    };

    let result = run(cli).await;
    match &result {
        Ok(summary) if summary.reason == CloseReason::Interrupted => println!(),
        Ok(_) => {}
        Err(e) => Output::error(&format!("{:#}", e)),
    }
    ExitCode::from(exit_code(&result))
}

/// Map the session outcome to a process exit code.
fn exit_code(result: &Result<SessionSummary>) -> u8 {
    match result {
        Ok(summary) if summary.reason == CloseReason::Interrupted => EXIT_INTERRUPTED,
        Ok(_) => 0,
        Err(_) => EXIT_FAILURE,
    }
}

async fn run(cli: Cli) -> Result<SessionSummary> {
    // Load configuration
    let mut settings = match &cli.config {
        Some(path) => Settings::load_from(Some(&Settings::expand_path(path))),
        None => Settings::load(),
    }
    .context("Failed to load configuration")?;
    cli.apply_overrides(&mut settings);

    // Initialize logging
    let log_level = cli.log_level(&settings.general.log_level);
    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("pdfqa={}", log_level)),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    settings.validate()?;
    let prompts = Prompts::load(settings.prompts.template_file.as_deref())
        .context("Failed to load prompt template")?;

    let client = create_client(&settings.provider)?;
    if cli.skip_preflight {
        Output::warning("Skipping provider check");
    } else {
        preflight::check_provider(&client, &settings).await?;
    }

    // Load and chunk the document
    println!("--- Loading and Processing PDF: {} ---", cli.pdf);
    let pdf_path = Settings::expand_path(&cli.pdf);
    let loader = PdfLoader::new(
        settings.chunking.strategy,
        ChunkingConfig {
            chunk_size: settings.chunking.chunk_size,
            chunk_overlap: settings.chunking.chunk_overlap,
        },
    );
    let chunks = tokio::task::spawn_blocking(move || loader.load(&pdf_path))
        .await
        .context("PDF loader task failed")?
        .with_context(|| format!("Failed to load {}", cli.pdf))?;
    println!("Loaded {} pages/chunks.", chunks.len());

    // Build the index
    let embedder = Arc::new(
        OpenAICompatEmbedder::new(client.clone(), settings.embedding_model()?)
            .with_batch_size(settings.embedding.batch_size),
    );
    let generator = Arc::new(
        OpenAICompatGenerator::new(client, settings.generation_model()?)
            .with_temperature(settings.generation.temperature),
    );
    let orchestrator = Orchestrator::from_settings(&settings, &prompts, embedder, generator);

    println!("Creating in-memory vector store and retriever...");
    let spinner = Output::spinner("Embedding document...");
    let indexed = orchestrator.index_chunks(chunks).await;
    spinner.finish_and_clear();
    let count = indexed.context("Failed to index document")?;
    info!("Index ready with {} chunks", count);

    Output::banner(
        "--- Agent Ready! Ask a question about the document ---",
        "Type 'exit' or 'quit' to end the session.",
    );

    // Ctrl-C closes the session instead of killing the process
    let shutdown = CancellationToken::new();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                shutdown.cancel();
            }
        }
    });

    let stdin = spawn_line_reader(std::io::BufReader::new(std::io::stdin()))?;
    let mut session = ChatSession::new(Arc::new(orchestrator), stdin, std::io::stdout())
        .with_show_sources(cli.show_sources)
        .with_shutdown(shutdown);

    let summary = session.run().await?;
    info!(
        "Answered {} questions, closing ({:?})",
        summary.questions_answered, summary.reason
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn closed(reason: CloseReason) -> Result<SessionSummary> {
        Ok(SessionSummary {
            questions_answered: 2,
            reason,
        })
    }

    #[test]
    fn test_exit_command_and_end_of_input_succeed() {
        assert_eq!(exit_code(&closed(CloseReason::ExitCommand)), 0);
        assert_eq!(exit_code(&closed(CloseReason::EndOfInput)), 0);
    }

    #[test]
    fn test_interrupt_exits_130() {
        assert_eq!(exit_code(&closed(CloseReason::Interrupted)), 130);
    }

    #[test]
    fn test_load_failure_exits_1() {
        let err = anyhow::Error::new(pdfqa::PdfQaError::NotFound("missing.pdf".to_string()))
            .context("Failed to load missing.pdf");
        assert_eq!(exit_code(&Err(err)), 1);
    }
}
