// src/search/mod.rs — Web search backends

pub mod tavily;

use async_trait::async_trait;

use crate::infra::errors::ReviseLabError;

/// A hosted search service answering one query at a time.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    fn name(&self) -> &str;

    /// Raw results for `query`, typically a JSON array of `{url, content}`.
    async fn search(&self, query: &str) -> Result<serde_json::Value, ReviseLabError>;
}
