//! Client setup for OpenAI-compatible providers (Ollama, vLLM, OpenAI).

use crate::config::ProviderSettings;
use crate::error::{PdfQaError, Result};
use async_openai::config::OpenAIConfig;
use async_openai::error::OpenAIError;
use async_openai::Client;
use std::time::Duration;

/// Key sent when none is configured. Ollama ignores it but the header must be present.
const PLACEHOLDER_API_KEY: &str = "ollama";

/// Shared client type for the embedding and generation adapters.
pub type ProviderClient = Client<OpenAIConfig>;

/// Create a provider client from settings.
pub fn create_client(settings: &ProviderSettings) -> Result<ProviderClient> {
    create_client_with_timeout(
        &settings.base_url,
        settings.api_key.as_deref(),
        Duration::from_secs(settings.timeout_secs),
    )
}

/// Create a provider client for a base URL with a custom timeout.
pub fn create_client_with_timeout(
    base_url: &str,
    api_key: Option<&str>,
    timeout: Duration,
) -> Result<ProviderClient> {
    let http_client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| PdfQaError::Config(format!("Failed to create HTTP client: {}", e)))?;

    let config = OpenAIConfig::new()
        .with_api_base(base_url.trim_end_matches('/'))
        .with_api_key(api_key.unwrap_or(PLACEHOLDER_API_KEY));

    Ok(Client::with_config(config).with_http_client(http_client))
}

/// Map a provider failure to the error taxonomy.
///
/// Transport failures become `Connection`; everything else is handed to `other`
/// so callers can tag it as an embedding or generation failure.
pub fn classify_error(err: OpenAIError, other: fn(String) -> PdfQaError) -> PdfQaError {
    match err {
        OpenAIError::Reqwest(e) if e.is_connect() || e.is_timeout() => {
            PdfQaError::Connection(e.to_string())
        }
        e => other(e.to_string()),
    }
}
