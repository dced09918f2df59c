// src/provider/ollama.rs — Ollama local model provider

use std::time::Duration;

use async_trait::async_trait;

use super::{ChatRequest, ChatResponse, Message, ModelProvider, StopReason, TokenUsage, ToolCall};
use crate::infra::errors::ReviseLabError;

const SERVICE: &str = "ollama";

pub struct OllamaProvider {
    base_url: String,
    client: reqwest::Client,
}

impl OllamaProvider {
    pub fn new(base_url: Option<String>) -> Self {
        Self {
            base_url: base_url
                .unwrap_or_else(|| "http://localhost:11434".into())
                .trim_end_matches('/')
                .to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Health check against the tags endpoint.
    pub async fn is_up(&self, timeout: Duration) -> bool {
        self.client
            .get(format!("{}/api/tags", self.base_url))
            .timeout(timeout)
            .send()
            .await
            .is_ok()
    }

    /// Names of the locally available models.
    pub async fn list_models(&self) -> Result<Vec<String>, ReviseLabError> {
        let resp = self
            .client
            .get(format!("{}/api/tags", self.base_url))
            .timeout(Duration::from_secs(3))
            .send()
            .await
            .map_err(|e| ReviseLabError::external(SERVICE, format!("Cannot reach Ollama: {}", e)))?;

        if !resp.status().is_success() {
            return Err(ReviseLabError::external(
                SERVICE,
                format!("HTTP {} from /api/tags", resp.status()),
            ));
        }

        let body: serde_json::Value = resp.json().await.map_err(|e| {
            ReviseLabError::external(SERVICE, format!("Invalid Ollama response: {}", e))
        })?;

        Ok(body["models"]
            .as_array()
            .map(|models| {
                models
                    .iter()
                    .filter_map(|m| m["name"].as_str().map(|s| s.to_string()))
                    .collect()
            })
            .unwrap_or_default())
    }

    /// Download a model. Blocks until the pull has finished.
    pub async fn pull(&self, model: &str) -> Result<(), ReviseLabError> {
        let resp = self
            .client
            .post(format!("{}/api/pull", self.base_url))
            .json(&serde_json::json!({ "model": model, "stream": false }))
            .send()
            .await
            .map_err(|e| ReviseLabError::from_transport(SERVICE, e))?;

        if !resp.status().is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ReviseLabError::external(
                SERVICE,
                format!("pull of '{}' failed: {}", model, body),
            ));
        }

        let body: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| ReviseLabError::external(SERVICE, e.to_string()))?;
        if let Some(err) = body["error"].as_str() {
            return Err(ReviseLabError::external(
                SERVICE,
                format!("pull of '{}' failed: {}", model, err),
            ));
        }
        Ok(())
    }

    /// Throwaway generation that forces the model into memory.
    /// Returns the first characters of the reply.
    pub async fn warm_up(&self, model: &str) -> Result<String, ReviseLabError> {
        let resp = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .timeout(Duration::from_secs(30))
            .json(&serde_json::json!({ "model": model, "prompt": "ping", "stream": false }))
            .send()
            .await
            .map_err(|e| ReviseLabError::from_transport(SERVICE, e))?;

        if !resp.status().is_success() {
            return Err(ReviseLabError::external(
                SERVICE,
                format!("warm-up HTTP {}", resp.status()),
            ));
        }

        let body: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| ReviseLabError::external(SERVICE, e.to_string()))?;
        let reply = body["response"].as_str().unwrap_or("");
        Ok(crate::util::truncate_str(reply, 40).to_string())
    }
}

impl Default for OllamaProvider {
    fn default() -> Self {
        Self::new(None)
    }
}

fn wire_message(m: &Message) -> serde_json::Value {
    let mut msg = serde_json::json!({
        "role": m.role.as_str(),
        "content": m.content,
    });
    if !m.tool_calls.is_empty() {
        let calls: Vec<serde_json::Value> = m
            .tool_calls
            .iter()
            .map(|tc| {
                serde_json::json!({
                    "function": { "name": tc.name, "arguments": tc.arguments }
                })
            })
            .collect();
        msg["tool_calls"] = serde_json::json!(calls);
    }
    msg
}

#[async_trait]
impl ModelProvider for OllamaProvider {
    fn id(&self) -> &str {
        "ollama"
    }

    fn name(&self) -> &str {
        "Ollama"
    }

    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, ReviseLabError> {
        let mut messages = Vec::new();
        if let Some(system) = &request.system {
            messages.push(serde_json::json!({ "role": "system", "content": system }));
        }
        messages.extend(request.messages.iter().map(wire_message));

        let mut body = serde_json::json!({
            "model": request.model,
            "messages": messages,
            "stream": false,
        });

        let mut options = serde_json::Map::new();
        if let Some(temp) = request.temperature {
            options.insert("temperature".into(), serde_json::json!(temp));
        }
        if let Some(max_tokens) = request.max_tokens {
            options.insert("num_predict".into(), serde_json::json!(max_tokens));
        }
        if !options.is_empty() {
            body["options"] = serde_json::Value::Object(options);
        }

        if !request.tools.is_empty() {
            let tools: Vec<serde_json::Value> = request
                .tools
                .iter()
                .map(|t| {
                    serde_json::json!({
                        "type": "function",
                        "function": {
                            "name": t.name,
                            "description": t.description,
                            "parameters": t.parameters,
                        }
                    })
                })
                .collect();
            body["tools"] = serde_json::json!(tools);
        }

        let response = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| ReviseLabError::from_transport(SERVICE, e))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(ReviseLabError::external(
                SERVICE,
                format!("HTTP {}: {}", status, error_body),
            ));
        }

        let resp: serde_json::Value = response.json().await.map_err(|e| {
            ReviseLabError::external(SERVICE, format!("Failed to parse response: {}", e))
        })?;

        let content = resp["message"]["content"]
            .as_str()
            .unwrap_or("")
            .to_string();

        // Ollama sends arguments as a JSON object and no call ids.
        let tool_calls: Vec<ToolCall> = resp["message"]["tool_calls"]
            .as_array()
            .map(|calls| {
                calls
                    .iter()
                    .map(|tc| ToolCall {
                        id: format!("call_{}", uuid::Uuid::new_v4().simple()),
                        name: tc["function"]["name"].as_str().unwrap_or("").to_string(),
                        arguments: match &tc["function"]["arguments"] {
                            serde_json::Value::String(raw) => {
                                serde_json::from_str(raw).unwrap_or(serde_json::Value::Null)
                            }
                            other => other.clone(),
                        },
                    })
                    .collect()
            })
            .unwrap_or_default();

        let usage = TokenUsage {
            input_tokens: resp["prompt_eval_count"].as_u64().unwrap_or(0) as u32,
            output_tokens: resp["eval_count"].as_u64().unwrap_or(0) as u32,
        };

        let stop_reason = if !tool_calls.is_empty() {
            StopReason::ToolUse
        } else {
            match resp["done_reason"].as_str() {
                Some("length") => StopReason::MaxTokens,
                Some("stop") | None => StopReason::EndTurn,
                _ => StopReason::Unknown,
            }
        };

        Ok(ChatResponse {
            content,
            tool_calls,
            usage,
            stop_reason,
        })
    }
}
