// src/infra/errors.rs — Error types for reviselab

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReviseLabError {
    // External services (LLM, search, judge)
    #[error("{service} error: {message}")]
    ExternalService {
        service: String,
        message: String,
    },

    // Model or judge returned something we cannot use
    #[error("Malformed output from {source_name}: {message}")]
    MalformedOutput {
        source_name: String,
        message: String,
    },

    // Startup preconditions (fatal)
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ReviseLabError {
    pub fn external(service: impl Into<String>, message: impl Into<String>) -> Self {
        ReviseLabError::ExternalService {
            service: service.into(),
            message: message.into(),
        }
    }

    pub fn malformed(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        ReviseLabError::MalformedOutput {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    /// Map a reqwest transport error for the named service.
    pub fn from_transport(service: &str, e: reqwest::Error) -> Self {
        let message = if e.is_timeout() {
            format!("request timed out: {}", e)
        } else {
            e.to_string()
        };
        ReviseLabError::ExternalService {
            service: service.into(),
            message,
        }
    }

    /// Configuration errors end the whole run, even mid-run and under the
    /// `skip` question policy.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ReviseLabError::Configuration(_))
    }
}
