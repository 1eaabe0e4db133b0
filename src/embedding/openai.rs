//! Embeddings over the OpenAI-compatible `/embeddings` endpoint.

use super::Embedder;
use crate::error::{PdfQaError, Result};
use crate::openai::{classify_error, ProviderClient};
use async_openai::types::{CreateEmbeddingRequestArgs, EmbeddingInput};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Default number of texts per request.
const DEFAULT_BATCH_SIZE: usize = 32;

/// Embedder for Ollama and other OpenAI-compatible servers.
pub struct OpenAICompatEmbedder {
    client: ProviderClient,
    model: String,
    batch_size: usize,
}

impl OpenAICompatEmbedder {
    /// Create a new embedder for a model.
    pub fn new(client: ProviderClient, model: &str) -> Self {
        Self {
            client,
            model: model.to_string(),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    /// Set how many texts are sent per request.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }
}

#[async_trait]
impl Embedder for OpenAICompatEmbedder {
    #[instrument(skip(self, text))]
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let embeddings = self.embed_batch(&[text.to_string()]).await?;
        embeddings
            .into_iter()
            .next()
            .ok_or_else(|| PdfQaError::Embedding("Empty embedding response".to_string()))
    }

    #[instrument(skip(self, texts), fields(count = texts.len()))]
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!("Generating embeddings for {} texts", texts.len());

        let mut all_embeddings = Vec::with_capacity(texts.len());

        for chunk in texts.chunks(self.batch_size) {
            let request = CreateEmbeddingRequestArgs::default()
                .model(&self.model)
                .input(EmbeddingInput::StringArray(chunk.to_vec()))
                .build()
                .map_err(|e| PdfQaError::Embedding(format!("Failed to build request: {}", e)))?;

            let response = self
                .client
                .embeddings()
                .create(request)
                .await
                .map_err(|e| classify_error(e, PdfQaError::Embedding))?;

            if response.data.len() != chunk.len() {
                return Err(PdfQaError::Embedding(format!(
                    "Requested {} embeddings, provider returned {}",
                    chunk.len(),
                    response.data.len()
                )));
            }

            // Sort by index to ensure correct order
            let mut embeddings: Vec<_> = response.data.into_iter().collect();
            embeddings.sort_by_key(|e| e.index);

            all_embeddings.extend(embeddings.into_iter().map(|e| e.embedding));
        }

        debug!("Generated {} embeddings", all_embeddings.len());
        Ok(all_embeddings)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::openai::create_client_with_timeout;
    use httpmock::prelude::*;
    use serde_json::json;
    use std::time::Duration;

    fn embedder(server: &MockServer) -> OpenAICompatEmbedder {
        let client =
            create_client_with_timeout(&server.url("/v1"), None, Duration::from_secs(5)).unwrap();
        OpenAICompatEmbedder::new(client, "nomic-embed-text")
    }

    fn embedding_response(vectors: &[(u32, Vec<f32>)]) -> serde_json::Value {
        json!({
            "object": "list",
            "model": "nomic-embed-text",
            "data": vectors
                .iter()
                .map(|(index, v)| json!({"object": "embedding", "index": index, "embedding": v}))
                .collect::<Vec<_>>(),
            "usage": {"prompt_tokens": 4, "total_tokens": 4}
        })
    }

    #[tokio::test]
    async fn test_embed_batch_restores_input_order() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/v1/embeddings");
                then.status(200)
                    .header("content-type", "application/json")
                    .json_body(embedding_response(&[(1, vec![0.0, 1.0]), (0, vec![1.0, 0.0])]));
            })
            .await;

        let texts = vec!["first".to_string(), "second".to_string()];
        let embeddings = embedder(&server).embed_batch(&texts).await.unwrap();

        mock.assert_async().await;
        assert_eq!(embeddings, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
    }

    #[tokio::test]
    async fn test_embed_batch_splits_requests() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/v1/embeddings");
                then.status(200)
                    .header("content-type", "application/json")
                    .json_body(embedding_response(&[(0, vec![0.5, 0.5])]));
            })
            .await;

        let texts = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let embeddings = embedder(&server)
            .with_batch_size(1)
            .embed_batch(&texts)
            .await
            .unwrap();

        mock.assert_hits_async(3).await;
        assert_eq!(embeddings.len(), 3);
    }

    #[tokio::test]
    async fn test_short_response_is_an_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/v1/embeddings");
                then.status(200)
                    .header("content-type", "application/json")
                    .json_body(embedding_response(&[(0, vec![1.0])]));
            })
            .await;

        let texts = vec!["a".to_string(), "b".to_string()];
        let err = embedder(&server).embed_batch(&texts).await.unwrap_err();
        assert!(matches!(err, PdfQaError::Embedding(msg) if msg.contains("returned 1")));
    }

    #[tokio::test]
    async fn test_api_error_is_embedding_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/v1/embeddings");
                then.status(404)
                    .header("content-type", "application/json")
                    .json_body(json!({
                        "error": {
                            "message": "model \"nomic-embed-text\" not found, try pulling it first",
                            "type": "api_error",
                            "param": null,
                            "code": null
                        }
                    }));
            })
            .await;

        let err = embedder(&server).embed("hello").await.unwrap_err();
        assert!(matches!(err, PdfQaError::Embedding(msg) if msg.contains("not found")));
    }

    #[tokio::test]
    async fn test_empty_input_makes_no_request() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/v1/embeddings");
                then.status(500);
            })
            .await;

        let embeddings = embedder(&server).embed_batch(&[]).await.unwrap();
        assert!(embeddings.is_empty());
        mock.assert_hits_async(0).await;
    }
}
