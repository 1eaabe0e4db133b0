//! Interactive question-and-answer session.
//!
//! Reads one question per line, runs it through the orchestrator and writes
//! the answer as it streams in.

use crate::error::{PdfQaError, Result};
use crate::orchestrator::Orchestrator;
use crate::rag::format_sources;
use futures::StreamExt;
use std::io::{BufRead, Write};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Prompt written before each question is read.
pub const QUESTION_PROMPT: &str = "\nYour Question: ";

/// Prefix written before the streamed answer.
pub const ANSWER_PREFIX: &str = "\nAgent Answer: ";

/// Bytes buffered between the reader thread and the session.
const LINE_BUFFER: usize = 64 * 1024;

/// Read lines from a blocking reader on a dedicated thread.
///
/// `tokio::io::stdin` reads on the runtime's blocking pool, and runtime
/// shutdown waits for a pending read. A plain thread is left behind instead,
/// so an interrupted session can exit while the terminal read is still open.
pub fn spawn_line_reader<B>(reader: B) -> Result<BufReader<DuplexStream>>
where
    B: BufRead + Send + 'static,
{
    let (mut tx, rx) = tokio::io::duplex(LINE_BUFFER);

    std::thread::Builder::new()
        .name("pdfqa-input".to_string())
        .spawn(move || {
            let mut reader = reader;
            let mut line = String::new();
            loop {
                line.clear();
                match BufRead::read_line(&mut reader, &mut line) {
                    Ok(0) => break,
                    Ok(_) => {
                        if futures::executor::block_on(tx.write_all(line.as_bytes())).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        warn!("Failed to read input: {}", e);
                        break;
                    }
                }
            }
            // Dropping the writer signals end of input
        })?;

    Ok(BufReader::new(rx))
}

/// Where the session is in its question loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    AwaitingQuestion,
    Processing,
    Streaming,
    Closed,
}

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// The user typed `exit` or `quit`.
    ExitCommand,
    /// Input reached end-of-file.
    EndOfInput,
    /// The shutdown token fired.
    Interrupted,
}

/// Outcome of a finished session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
    pub questions_answered: usize,
    pub reason: CloseReason,
}

/// Interactive chat session over any line-oriented input and writer.
pub struct ChatSession<R, W> {
    orchestrator: Arc<Orchestrator>,
    input: R,
    output: W,
    state: SessionState,
    show_sources: bool,
    shutdown: CancellationToken,
    questions_answered: usize,
}

impl<R, W> ChatSession<R, W>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    /// Create a new session.
    pub fn new(orchestrator: Arc<Orchestrator>, input: R, output: W) -> Self {
        Self {
            orchestrator,
            input,
            output,
            state: SessionState::AwaitingQuestion,
            show_sources: false,
            shutdown: CancellationToken::new(),
            questions_answered: 0,
        }
    }

    /// Print the retrieved sources after each answer.
    pub fn with_show_sources(mut self, show_sources: bool) -> Self {
        self.show_sources = show_sources;
        self
    }

    /// Close the session when `shutdown` is cancelled.
    pub fn with_shutdown(mut self, shutdown: CancellationToken) -> Self {
        self.shutdown = shutdown;
        self
    }

    /// Current state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Run the question loop until exit, end-of-input or shutdown.
    ///
    /// Per-question provider failures are reported and the loop continues.
    /// Any other error ends the session and is returned.
    pub async fn run(&mut self) -> Result<SessionSummary> {
        let mut line = String::new();

        loop {
            self.state = SessionState::AwaitingQuestion;
            write!(self.output, "{}", QUESTION_PROMPT)?;
            self.output.flush()?;

            line.clear();
            let read = tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => None,
                read = self.input.read_line(&mut line) => Some(read?),
            };

            let question = match read {
                None => return self.close(CloseReason::Interrupted),
                Some(0) => {
                    writeln!(self.output)?;
                    return self.close(CloseReason::EndOfInput);
                }
                Some(_) => line.trim(),
            };

            if question.is_empty() {
                continue;
            }
            if question.eq_ignore_ascii_case("exit") || question.eq_ignore_ascii_case("quit") {
                return self.close(CloseReason::ExitCommand);
            }

            let question = question.to_string();
            match self.ask(&question).await {
                Ok(()) => self.questions_answered += 1,
                Err(_) if self.shutdown.is_cancelled() => {
                    writeln!(self.output)?;
                    return self.close(CloseReason::Interrupted);
                }
                Err(e) if e.is_recoverable() => {
                    warn!("Question failed: {}", e);
                    writeln!(self.output, "Error: {}", e)?;
                }
                Err(e) => {
                    self.state = SessionState::Closed;
                    return Err(e);
                }
            }
        }
    }

    /// Answer one question, writing tokens as they arrive.
    async fn ask(&mut self, question: &str) -> Result<()> {
        self.state = SessionState::Processing;
        debug!("Processing question: {}", question);

        let cancel = self.shutdown.child_token();
        let orchestrator = self.orchestrator.clone();
        let answer = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(PdfQaError::Cancelled),
            answer = orchestrator.answer(question, &cancel) => answer,
        };
        let mut answer = match answer {
            Ok(answer) => answer,
            Err(e) => {
                writeln!(self.output)?;
                return Err(e);
            }
        };

        self.state = SessionState::Streaming;
        write!(self.output, "{}", ANSWER_PREFIX)?;
        self.output.flush()?;

        while let Some(token) = answer.tokens.next().await {
            match token {
                Ok(token) => {
                    write!(self.output, "{}", token)?;
                    self.output.flush()?;
                }
                Err(e) => {
                    writeln!(self.output)?;
                    return Err(e);
                }
            }
        }
        writeln!(self.output)?;

        if cancel.is_cancelled() {
            return Err(PdfQaError::Cancelled);
        }

        if self.show_sources && !answer.sources.is_empty() {
            writeln!(self.output, "\nSources:\n{}", format_sources(&answer.sources))?;
        }
        self.output.flush()?;
        Ok(())
    }

    fn close(&mut self, reason: CloseReason) -> Result<SessionSummary> {
        self.state = SessionState::Closed;
        self.output.flush()?;
        info!(
            "Session closed ({:?}) after {} questions",
            reason, self.questions_answered
        );
        Ok(SessionSummary {
            questions_answered: self.questions_answered,
            reason,
        })
    }
}
