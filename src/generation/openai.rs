//! Streaming chat completions over the OpenAI-compatible API.

use super::{Generator, TokenStream};
use crate::error::{PdfQaError, Result};
use crate::openai::{classify_error, ProviderClient};
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use futures::StreamExt;
use tracing::{debug, instrument};

/// Generator for Ollama and other OpenAI-compatible servers.
pub struct OpenAICompatGenerator {
    client: ProviderClient,
    model: String,
    temperature: Option<f32>,
}

impl OpenAICompatGenerator {
    /// Create a new generator for a model.
    pub fn new(client: ProviderClient, model: &str) -> Self {
        Self {
            client,
            model: model.to_string(),
            temperature: None,
        }
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }
}

#[async_trait]
impl Generator for OpenAICompatGenerator {
    #[instrument(skip(self, prompt), fields(model = %self.model, prompt_len = prompt.len()))]
    async fn stream(&self, prompt: &str) -> Result<TokenStream> {
        let message = ChatCompletionRequestUserMessageArgs::default()
            .content(prompt)
            .build()
            .map_err(|e| PdfQaError::Generation(e.to_string()))?;

        let messages: Vec<ChatCompletionRequestMessage> = vec![message.into()];

        let mut args = CreateChatCompletionRequestArgs::default();
        args.model(&self.model).messages(messages);
        if let Some(temperature) = self.temperature {
            args.temperature(temperature);
        }
        let request = args
            .build()
            .map_err(|e| PdfQaError::Generation(e.to_string()))?;

        let stream = self
            .client
            .chat()
            .create_stream(request)
            .await
            .map_err(|e| classify_error(e, PdfQaError::Generation))?;

        debug!("Generation stream opened");

        let tokens = stream.filter_map(|event| async move {
            match event {
                Ok(response) => {
                    let text: String = response
                        .choices
                        .into_iter()
                        .filter_map(|choice| choice.delta.content)
                        .collect();
                    (!text.is_empty()).then_some(Ok(text))
                }
                Err(e) => Some(Err(classify_error(e, PdfQaError::Generation))),
            }
        });

        Ok(tokens.boxed())
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::openai::create_client_with_timeout;
    use futures::TryStreamExt;
    use httpmock::prelude::*;
    use serde_json::json;
    use std::time::Duration;

    fn generator(server: &MockServer) -> OpenAICompatGenerator {
        let client =
            create_client_with_timeout(&server.url("/v1"), None, Duration::from_secs(5)).unwrap();
        OpenAICompatGenerator::new(client, "mistral")
    }

    fn sse_event(content: Option<&str>, finish_reason: Option<&str>) -> String {
        let chunk = json!({
            "id": "chatcmpl-1",
            "object": "chat.completion.chunk",
            "created": 1_700_000_000u32,
            "model": "mistral",
            "system_fingerprint": "fp_ollama",
            "choices": [{
                "index": 0,
                "delta": {"role": "assistant", "content": content},
                "finish_reason": finish_reason
            }]
        });
        format!("data: {}\n\n", chunk)
    }

    #[tokio::test]
    async fn test_stream_yields_content_deltas_in_order() {
        let server = MockServer::start_async().await;
        let body = [
            sse_event(Some("Paris"), None),
            sse_event(Some(" is"), None),
            sse_event(Some(""), None),
            sse_event(Some(" the capital."), None),
            sse_event(None, Some("stop")),
            "data: [DONE]\n\n".to_string(),
        ]
        .concat();

        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/v1/chat/completions");
                then.status(200)
                    .header("content-type", "text/event-stream")
                    .body(body.as_str());
            })
            .await;

        let tokens: Vec<String> = generator(&server)
            .stream("What is the capital of France?")
            .await
            .unwrap()
            .try_collect()
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(tokens, vec!["Paris", " is", " the capital."]);
    }

    #[tokio::test]
    async fn test_stream_start_failure_is_generation_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/v1/chat/completions");
                then.status(400)
                    .header("content-type", "application/json")
                    .json_body(json!({
                        "error": {
                            "message": "model \"mistral\" not found",
                            "type": "api_error",
                            "param": null,
                            "code": null
                        }
                    }));
            })
            .await;

        let result = match generator(&server).stream("question").await {
            Ok(stream) => stream.try_collect::<Vec<_>>().await.map(|_| ()),
            Err(e) => Err(e),
        };

        assert!(matches!(result, Err(PdfQaError::Generation(_))));
    }
}
