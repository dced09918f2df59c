// src/infra/backend.rs — Local Ollama server preparation
//
// Runs before any question: server reachable, model present, model warm.
// The first two are hard requirements; warm-up is best effort.

use std::process::{Command, Stdio};
use std::time::Duration;

use crate::infra::config::OllamaConfig;
use crate::infra::errors::ReviseLabError;
use crate::provider::ollama::OllamaProvider;

const HEALTH_TIMEOUT: Duration = Duration::from_millis(1500);

/// Start the server if needed, pull `model` if missing, then warm it up.
pub async fn prepare_ollama(config: &OllamaConfig, model: &str) -> Result<(), ReviseLabError> {
    let client = OllamaProvider::new(Some(config.resolved_host()));
    tracing::info!("Preparing Ollama backend for model '{}'", model);

    ensure_server(&client, config).await?;
    ensure_model(&client, model).await?;

    if config.warm_up {
        match client.warm_up(model).await {
            Ok(snippet) => tracing::debug!("Model '{}' warm-up response: {}", model, snippet),
            Err(e) => tracing::warn!("Warm-up skipped ({})", e),
        }
    }

    tracing::info!("Ollama backend ready at {}", client.base_url());
    Ok(())
}

async fn ensure_server(client: &OllamaProvider, config: &OllamaConfig) -> Result<(), ReviseLabError> {
    if client.is_up(HEALTH_TIMEOUT).await {
        tracing::info!("Ollama server already running at {}", client.base_url());
        return Ok(());
    }

    let binary = which::which("ollama").map_err(|_| {
        ReviseLabError::Configuration(format!(
            "Ollama is not reachable at {} and the `ollama` binary is not on PATH",
            client.base_url()
        ))
    })?;

    tracing::info!("Starting Ollama server ({})", binary.display());
    // Detached: the server outlives this process.
    Command::new(&binary)
        .arg("serve")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| {
            ReviseLabError::Configuration(format!("failed to spawn `ollama serve`: {}", e))
        })?;

    for _ in 0..config.start_attempts {
        if client.is_up(HEALTH_TIMEOUT).await {
            tracing::info!("Ollama server is up and responsive");
            return Ok(());
        }
        tokio::time::sleep(Duration::from_millis(config.poll_interval_ms)).await;
    }

    tracing::error!("Failed to start Ollama server, timeout reached");
    Err(ReviseLabError::Configuration(
        "Failed to start Ollama server".into(),
    ))
}

/// Untagged names match their `:latest` tag.
pub fn model_available(available: &[String], model: &str) -> bool {
    available
        .iter()
        .any(|name| name == model || (!model.contains(':') && *name == format!("{}:latest", model)))
}

async fn ensure_model(client: &OllamaProvider, model: &str) -> Result<(), ReviseLabError> {
    let available = client.list_models().await.map_err(|e| {
        ReviseLabError::Configuration(format!("Failed to check model '{}': {}", model, e))
    })?;
    if model_available(&available, model) {
        return Ok(());
    }

    tracing::info!("Downloading model '{}', this may take a while", model);
    client.pull(model).await.map_err(|e| {
        ReviseLabError::Configuration(format!("Failed to pull model '{}': {}", model, e))
    })
}
