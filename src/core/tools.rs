// src/core/tools.rs — Search query execution for the revise loop

use std::sync::Arc;

use futures::future::try_join_all;

use super::types::{ConversationState, Message, SearchBlock};
use crate::infra::errors::ReviseLabError;
use crate::search::SearchBackend;

/// Runs the follow-up queries of the latest agent output.
#[derive(Clone)]
pub struct ToolRunner {
    backend: Arc<dyn SearchBackend>,
}

impl ToolRunner {
    pub fn new(backend: Arc<dyn SearchBackend>) -> Self {
        Self { backend }
    }

    /// One block per query, in input order. An empty list never touches
    /// the backend. The first failing query fails the whole batch.
    pub async fn run_queries(&self, queries: &[String]) -> Result<Vec<SearchBlock>, ReviseLabError> {
        if queries.is_empty() {
            return Ok(Vec::new());
        }

        let calls = queries.iter().map(|q| {
            let backend = self.backend.clone();
            async move {
                let results = backend.search(q).await?;
                Ok::<_, ReviseLabError>(SearchBlock {
                    query: q.clone(),
                    results,
                })
            }
        });
        try_join_all(calls).await
    }

    /// Produce exactly one tool-result message for the latest agent output,
    /// with no blocks when it requested no searches.
    pub async fn execute(&self, state: &ConversationState) -> Result<Message, ReviseLabError> {
        let last = state.last();
        let call_id = match last {
            Some(Message::AgentOutput {
                tool_call: Some(call),
                ..
            }) => call.id.clone(),
            _ => String::new(),
        };
        let queries = last.map(Message::effective_queries).unwrap_or_default();
        tracing::debug!(count = queries.len(), "running search queries");

        let blocks = self.run_queries(&queries).await?;
        Ok(Message::ToolResult {
            tool_call_id: call_id,
            blocks,
        })
    }
}
