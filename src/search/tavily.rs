// src/search/tavily.rs — Tavily search API client

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use super::SearchBackend;
use crate::infra::config::SearchConfig;
use crate::infra::errors::ReviseLabError;

const SERVICE: &str = "tavily";

pub struct TavilySearch {
    api_key: String,
    base_url: String,
    max_results: u32,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    max_results: u32,
}

impl TavilySearch {
    pub fn new(api_key: String, config: &SearchConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .unwrap_or_default();
        Self {
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            max_results: config.max_results,
            client,
        }
    }

    /// Build from `TAVILY_API_KEY`. A missing key is fatal at startup.
    pub fn from_env(config: &SearchConfig) -> Result<Self, ReviseLabError> {
        let key = std::env::var("TAVILY_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ReviseLabError::Configuration("TAVILY_API_KEY is not set".into()))?;
        Ok(Self::new(key, config))
    }
}

#[async_trait]
impl SearchBackend for TavilySearch {
    fn name(&self) -> &str {
        "Tavily"
    }

    async fn search(&self, query: &str) -> Result<serde_json::Value, ReviseLabError> {
        tracing::debug!(query, "tavily search");
        let resp = self
            .client
            .post(format!("{}/search", self.base_url))
            .json(&SearchRequest {
                api_key: &self.api_key,
                query,
                max_results: self.max_results,
            })
            .send()
            .await
            .map_err(|e| ReviseLabError::from_transport(SERVICE, e))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ReviseLabError::external(
                SERVICE,
                format!("HTTP {}: {}", status, body),
            ));
        }

        let mut body: serde_json::Value = resp.json().await.map_err(|e| {
            ReviseLabError::external(SERVICE, format!("Failed to parse response: {}", e))
        })?;
        // Hits are handed to the revisor untouched.
        Ok(match body.get_mut("results").map(serde_json::Value::take) {
            Some(results @ serde_json::Value::Array(_)) => results,
            _ => serde_json::Value::Array(Vec::new()),
        })
    }
}
