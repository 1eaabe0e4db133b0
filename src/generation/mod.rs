//! Streaming answer generation.

mod openai;

pub use openai::OpenAICompatGenerator;

use crate::error::Result;
use async_trait::async_trait;
use futures::stream::BoxStream;

/// A lazy, finite, non-restartable sequence of generated text fragments.
///
/// An `Err` item ends the answer; nothing after it is meaningful.
pub type TokenStream = BoxStream<'static, Result<String>>;

/// Trait for streaming text generation.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Start generating a completion for `prompt`.
    ///
    /// Failing to start is reported here; failures after the first token
    /// arrive as `Err` items in the stream.
    async fn stream(&self, prompt: &str) -> Result<TokenStream>;

    /// Model identifier, for logging.
    fn model(&self) -> &str;
}
