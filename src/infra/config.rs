// src/infra/config.rs — Configuration loading (TOML)

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::infra::paths;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub models: ModelsConfig,

    #[serde(default, rename = "loop")]
    pub iteration: LoopConfig,

    #[serde(default)]
    pub run: RunConfig,

    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub ollama: OllamaConfig,

    #[serde(default)]
    pub evaluation: EvaluationConfig,
}

/// Responder/revisor pairs to compare, plus the judge model.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelsConfig {
    pub judge: String,
    pub pairs: Vec<PairConfig>,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            judge: "openai/gpt-4".into(),
            pairs: vec![
                PairConfig {
                    responder: "ollama/qwen3:32b".into(),
                    revisor: "ollama/qwen3:32b".into(),
                },
                PairConfig {
                    responder: "openai/gpt-4.1".into(),
                    revisor: "openai/gpt-4.1".into(),
                },
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairConfig {
    pub responder: String,
    pub revisor: String,
}

/// Which counter ends the draft-search-revise loop.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StopPolicyKind {
    MessageCount,
    ToolResults,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoopConfig {
    pub policy: StopPolicyKind,
    pub max: usize,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            policy: StopPolicyKind::MessageCount,
            max: 3,
        }
    }
}

/// What to do when an external call fails while processing one question.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    Skip,
    Abort,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub num_questions: usize,
    pub on_question_error: FailurePolicy,
    pub output: String,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            num_questions: 10,
            on_question_error: FailurePolicy::Skip,
            output: paths::default_results_path().display().to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub base_url: String,
    pub max_results: u32,
    pub timeout_seconds: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.tavily.com".into(),
            max_results: 5,
            timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OllamaConfig {
    pub host: String,
    pub start_attempts: u32,
    pub poll_interval_ms: u64,
    pub warm_up: bool,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: "http://localhost:11434".into(),
            start_attempts: 15,
            poll_interval_ms: 600,
            warm_up: true,
        }
    }
}

impl OllamaConfig {
    /// `OLLAMA_HOST` takes precedence over the file.
    pub fn resolved_host(&self) -> String {
        std::env::var("OLLAMA_HOST")
            .ok()
            .filter(|h| !h.trim().is_empty())
            .unwrap_or_else(|| self.host.clone())
            .trim_end_matches('/')
            .to_string()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationConfig {
    pub use_gold: bool,
    pub temperature: f32,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            use_gold: false,
            temperature: 0.0,
        }
    }
}

impl Config {
    /// Load config from file, falling back to defaults.
    pub fn load() -> anyhow::Result<Self> {
        let path = paths::config_file_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        if config.iteration.max == 0 {
            anyhow::bail!("[loop] max must be at least 1 in {}", path.display());
        }
        Ok(config)
    }
}
