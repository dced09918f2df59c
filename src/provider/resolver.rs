// src/provider/resolver.rs — Provider construction from model references

use std::collections::HashMap;
use std::sync::Arc;

use super::ollama::OllamaProvider;
use super::openai::OpenAIProvider;
use super::{ModelProvider, ModelRef};
use crate::infra::config::Config;
use crate::infra::errors::ReviseLabError;

/// Build the client for a model reference.
///
/// OpenAI needs `OPENAI_API_KEY`; `OPENAI_BASE_URL` redirects it to a
/// compatible endpoint. Ollama uses the configured host.
pub fn build_provider(
    model: &ModelRef,
    config: &Config,
) -> Result<Arc<dyn ModelProvider>, ReviseLabError> {
    match model.provider.as_str() {
        "ollama" => Ok(Arc::new(OllamaProvider::new(Some(
            config.ollama.resolved_host(),
        )))),
        "openai" => {
            let key = non_empty_env("OPENAI_API_KEY").ok_or_else(|| {
                ReviseLabError::Configuration(format!(
                    "OPENAI_API_KEY is not set (needed for {})",
                    model
                ))
            })?;
            match non_empty_env("OPENAI_BASE_URL") {
                Some(base) => Ok(Arc::new(OpenAIProvider::with_base_url(key, base))),
                None => Ok(Arc::new(OpenAIProvider::new(key))),
            }
        }
        other => Err(ReviseLabError::Configuration(format!(
            "unknown provider '{}' in '{}' (expected ollama or openai)",
            other, model
        ))),
    }
}

/// Shares one client per provider id across every role of a run.
#[derive(Default)]
pub struct ProviderCache {
    providers: HashMap<String, Arc<dyn ModelProvider>>,
}

impl ProviderCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(
        &mut self,
        model: &ModelRef,
        config: &Config,
    ) -> Result<Arc<dyn ModelProvider>, ReviseLabError> {
        if let Some(p) = self.providers.get(&model.provider) {
            return Ok(p.clone());
        }
        let provider = build_provider(model, config)?;
        self.providers
            .insert(model.provider.clone(), provider.clone());
        Ok(provider)
    }
}

fn non_empty_env(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|v| !v.trim().is_empty())
}
