//! Pre-flight checks before loading the document.
//!
//! Validates that the provider is reachable and serves the configured models
//! before the PDF is parsed and embedded, so a missing model is reported up
//! front rather than after indexing.

use crate::config::Settings;
use crate::error::{PdfQaError, Result};
use crate::openai::ProviderClient;
use tracing::{debug, info};

/// Check that the provider answers and, if enabled, serves both models.
pub async fn check_provider(client: &ProviderClient, settings: &Settings) -> Result<()> {
    let response = client.models().list().await.map_err(|e| {
        PdfQaError::Connection(format!(
            "Could not list models at {}: {}. Is Ollama running?",
            settings.provider.base_url, e
        ))
    })?;

    let available: Vec<String> = response.data.into_iter().map(|m| m.id).collect();
    debug!("Provider serves {} models", available.len());

    if !settings.provider.verify_models {
        return Ok(());
    }

    for model in [settings.generation_model()?, settings.embedding_model()?] {
        if !model_available(&available, model) {
            return Err(PdfQaError::Config(format!(
                "Model '{}' is not available at {}. Pull it with: ollama pull {}",
                model, settings.provider.base_url, model
            )));
        }
    }

    info!("Provider check passed");
    Ok(())
}

/// Whether `wanted` is served, treating `name` and `name:latest` as the same model.
pub fn model_available(available: &[String], wanted: &str) -> bool {
    let wanted = strip_latest(wanted);
    available.iter().any(|id| strip_latest(id) == wanted)
}

fn strip_latest(id: &str) -> &str {
    id.strip_suffix(":latest").unwrap_or(id)
}
