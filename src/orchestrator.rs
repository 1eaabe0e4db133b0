//! Pipeline orchestrator for pdfqa.
//!
//! Builds the index once from document chunks, then answers questions:
//! embed the question, retrieve the top k chunks, assemble the context,
//! build the prompt, and stream the generated answer.

use crate::chunking::Chunk;
use crate::config::{Prompts, Settings};
use crate::embedding::Embedder;
use crate::error::{PdfQaError, Result};
use crate::generation::{Generator, TokenStream};
use crate::rag::{ContextAssembler, PromptBuilder};
use crate::vector_store::{IndexEntry, MemoryVectorIndex, SearchResult, VectorIndex};
use futures::StreamExt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

/// Default number of chunks retrieved per question.
pub const DEFAULT_TOP_K: usize = 4;

/// An answer in progress.
pub struct Answer {
    /// Chunks the answer is grounded on, best first.
    pub sources: Vec<SearchResult>,
    /// Generated text, streamed as it is produced.
    pub tokens: TokenStream,
}

/// The main orchestrator for the pdfqa pipeline.
pub struct Orchestrator {
    embedder: Arc<dyn Embedder>,
    generator: Arc<dyn Generator>,
    index: Arc<dyn VectorIndex>,
    assembler: ContextAssembler,
    prompt_builder: PromptBuilder,
    top_k: usize,
}

impl Orchestrator {
    /// Create an orchestrator with an empty in-memory index and default settings.
    pub fn new(embedder: Arc<dyn Embedder>, generator: Arc<dyn Generator>) -> Self {
        Self::with_components(
            embedder,
            generator,
            Arc::new(MemoryVectorIndex::new()),
            PromptBuilder::default(),
        )
    }

    /// Create an orchestrator with custom components.
    pub fn with_components(
        embedder: Arc<dyn Embedder>,
        generator: Arc<dyn Generator>,
        index: Arc<dyn VectorIndex>,
        prompt_builder: PromptBuilder,
    ) -> Self {
        Self {
            embedder,
            generator,
            index,
            assembler: ContextAssembler::new(),
            prompt_builder,
            top_k: DEFAULT_TOP_K,
        }
    }

    /// Create an orchestrator configured from settings and prompts.
    pub fn from_settings(
        settings: &Settings,
        prompts: &Prompts,
        embedder: Arc<dyn Embedder>,
        generator: Arc<dyn Generator>,
    ) -> Self {
        Self::with_components(
            embedder,
            generator,
            Arc::new(MemoryVectorIndex::new()),
            PromptBuilder::from_prompts(prompts),
        )
        .with_top_k(settings.retrieval.top_k)
        .with_max_context_chars(settings.retrieval.max_context_chars)
    }

    /// Set the number of chunks retrieved per question.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Set the context length budget.
    pub fn with_max_context_chars(mut self, max_chars: Option<usize>) -> Self {
        self.assembler = self.assembler.with_max_chars(max_chars);
        self
    }

    /// Get a reference to the vector index.
    pub fn index(&self) -> Arc<dyn VectorIndex> {
        self.index.clone()
    }

    /// Number of chunks retrieved per question.
    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Embed every chunk and build the index.
    #[instrument(skip(self, chunks), fields(count = chunks.len()))]
    pub async fn index_chunks(&self, chunks: Vec<Chunk>) -> Result<usize> {
        info!("Embedding {} chunks with {}", chunks.len(), self.embedder.model());

        let texts: Vec<String> = chunks.iter().map(|c| c.text().to_string()).collect();
        let vectors = self.embedder.embed_batch(&texts).await?;

        if vectors.len() != chunks.len() {
            return Err(PdfQaError::Embedding(format!(
                "Expected {} embeddings, got {}",
                chunks.len(),
                vectors.len()
            )));
        }

        let entries: Vec<IndexEntry> = chunks
            .into_iter()
            .zip(vectors)
            .map(|(chunk, vector)| IndexEntry::new(chunk, vector))
            .collect();

        let count = self.index.insert_all(entries).await?;
        info!("Indexed {} chunks", count);
        Ok(count)
    }

    /// Embed a question and retrieve the most similar chunks.
    #[instrument(skip(self))]
    pub async fn retrieve(&self, question: &str) -> Result<Vec<SearchResult>> {
        let query = self.embedder.embed(question).await?;
        let results = self.index.search(&query, self.top_k).await?;
        debug!(
            "Retrieved {} chunks (best score {:.3})",
            results.len(),
            results.first().map(|r| r.score).unwrap_or(0.0)
        );
        Ok(results)
    }

    /// Answer a question from the indexed document.
    ///
    /// The returned stream stops early once `cancel` fires.
    #[instrument(skip(self, cancel))]
    pub async fn answer(&self, question: &str, cancel: &CancellationToken) -> Result<Answer> {
        let results = self.retrieve(question).await?;
        let sources = self.assembler.fit(results);

        let context = self.assembler.assemble(&sources);
        let prompt = self.prompt_builder.build(&context, question);
        debug!("Prompt is {} characters from {} chunks", prompt.len(), sources.len());

        if cancel.is_cancelled() {
            return Err(PdfQaError::Cancelled);
        }

        let tokens = self.generator.stream(&prompt).await?;
        let tokens = tokens.take_until(cancel.clone().cancelled_owned()).boxed();

        Ok(Answer { sources, tokens })
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-process providers for pipeline and session tests.

    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    const VOCABULARY: [&str; 8] = ["sky", "blue", "water", "boils", "paris", "capital", "france", "colour"];

    /// Bag-of-words embedder over a tiny fixed vocabulary.
    #[derive(Default)]
    pub struct KeywordEmbedder {
        pub calls: AtomicUsize,
        pub fail: bool,
    }

    impl KeywordEmbedder {
        pub fn failing() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail: true,
            }
        }

        pub fn vector(text: &str) -> Vec<f32> {
            let lower = text.to_lowercase();
            VOCABULARY
                .iter()
                .map(|word| lower.matches(word).count() as f32)
                .collect()
        }
    }

    #[async_trait]
    impl Embedder for KeywordEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(PdfQaError::Embedding("embedding service down".to_string()));
            }
            Ok(Self::vector(text))
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            let mut vectors = Vec::with_capacity(texts.len());
            for text in texts {
                vectors.push(self.embed(text).await?);
            }
            Ok(vectors)
        }

        fn model(&self) -> &str {
            "keywords"
        }
    }

    /// How a scripted generation ends.
    #[derive(Clone)]
    pub enum Script {
        /// Yield these tokens.
        Tokens(Vec<&'static str>),
        /// Yield these tokens, then fail.
        FailAfter(Vec<&'static str>),
        /// Fail before streaming.
        RefuseToStart,
    }

    /// Generator that replays scripted answers and records prompts.
    pub struct ScriptedGenerator {
        script: Script,
        pub prompts: Mutex<Vec<String>>,
    }

    impl ScriptedGenerator {
        pub fn new(script: Script) -> Self {
            Self {
                script,
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub fn answering(tokens: Vec<&'static str>) -> Self {
            Self::new(Script::Tokens(tokens))
        }

        pub fn prompt_count(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl Generator for ScriptedGenerator {
        async fn stream(&self, prompt: &str) -> Result<TokenStream> {
            self.prompts.lock().unwrap().push(prompt.to_string());

            let items: Vec<Result<String>> = match &self.script {
                Script::Tokens(tokens) => tokens.iter().map(|t| Ok(t.to_string())).collect(),
                Script::FailAfter(tokens) => tokens
                    .iter()
                    .map(|t| Ok(t.to_string()))
                    .chain(std::iter::once(Err(PdfQaError::Generation(
                        "model crashed".to_string(),
                    ))))
                    .collect(),
                Script::RefuseToStart => {
                    return Err(PdfQaError::Generation("model not loaded".to_string()))
                }
            };
            Ok(futures::stream::iter(items).boxed())
        }

        fn model(&self) -> &str {
            "scripted"
        }
    }

    pub fn document_chunks() -> Vec<Chunk> {
        use crate::chunking::SourceOffset;
        ["The sky is blue.", "Water boils at 100C.", "Paris is the capital of France."]
            .iter()
            .enumerate()
            .map(|(i, text)| {
                Chunk::new(i, *text, SourceOffset { page: i as u32 + 1, char_offset: 0 })
            })
            .collect()
    }
}
