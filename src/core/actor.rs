// src/core/actor.rs — Responder and revisor model calls

use std::sync::Arc;

use super::prompts;
use super::types::{ActorRole, AnswerPayload, AnswerToolCall, ConversationState, Message};
use crate::infra::errors::ReviseLabError;
use crate::provider::{self, ChatRequest, ModelProvider, ModelRef, ToolCall};

const MAX_TOKENS: u32 = 2048;

/// A model bound to one answer schema.
pub struct Actor {
    role: ActorRole,
    provider: Arc<dyn ModelProvider>,
    model: ModelRef,
}

impl Actor {
    pub fn responder(provider: Arc<dyn ModelProvider>, model: ModelRef) -> Self {
        Self {
            role: ActorRole::Responder,
            provider,
            model,
        }
    }

    pub fn revisor(provider: Arc<dyn ModelProvider>, model: ModelRef) -> Self {
        Self {
            role: ActorRole::Revisor,
            provider,
            model,
        }
    }

    pub fn model(&self) -> &ModelRef {
        &self.model
    }

    /// One model turn over the whole conversation so far.
    pub async fn respond(&self, state: &ConversationState) -> Result<Message, ReviseLabError> {
        let mut messages = to_chat_messages(state);
        if self.role == ActorRole::Revisor {
            messages.push(provider::Message::user(prompts::respond_instruction(self.role)));
        }

        let request = ChatRequest {
            model: self.model.model.clone(),
            messages,
            tools: vec![prompts::tool_schema(self.role)],
            max_tokens: Some(MAX_TOKENS),
            temperature: None,
            system: Some(prompts::render_system_prompt(self.role, chrono::Utc::now())?),
        };

        let response = self.provider.chat(request).await?;
        tracing::debug!(
            role = %self.role,
            model = %self.model,
            tokens = response.usage.total(),
            tool_calls = response.tool_calls.len(),
            "actor turn finished"
        );

        let tool_call = response
            .tool_calls
            .iter()
            .find(|tc| tc.name == prompts::tool_name(self.role))
            .map(|tc| parse_tool_call(tc, &self.model))
            .transpose()?;

        Ok(Message::AgentOutput {
            role: self.role,
            content: response.content,
            tool_call,
        })
    }
}

fn parse_tool_call(tc: &ToolCall, model: &ModelRef) -> Result<AnswerToolCall, ReviseLabError> {
    if tc.arguments.get("answer").and_then(|a| a.as_str()).is_none() {
        return Err(ReviseLabError::malformed(
            model.to_string(),
            format!("{} call without an 'answer' string", tc.name),
        ));
    }
    let payload: AnswerPayload = serde_json::from_value(tc.arguments.clone()).map_err(|e| {
        ReviseLabError::malformed(model.to_string(), format!("{} arguments: {}", tc.name, e))
    })?;
    Ok(AnswerToolCall {
        id: tc.id.clone(),
        name: tc.name.clone(),
        payload,
    })
}

/// Map the conversation onto provider chat messages.
pub fn to_chat_messages(state: &ConversationState) -> Vec<provider::Message> {
    state
        .messages()
        .iter()
        .map(|m| match m {
            Message::UserQuestion { content } => provider::Message::user(content.clone()),
            Message::AgentOutput {
                content,
                tool_call: Some(call),
                ..
            } => provider::Message::assistant_with_tools(
                content.clone(),
                vec![ToolCall {
                    id: call.id.clone(),
                    name: call.name.clone(),
                    arguments: serde_json::to_value(&call.payload)
                        .unwrap_or(serde_json::Value::Null),
                }],
            ),
            Message::AgentOutput { content, .. } => provider::Message::assistant(content.clone()),
            Message::ToolResult {
                tool_call_id,
                blocks,
            } => {
                let body = serde_json::to_string(blocks).unwrap_or_else(|_| "[]".into());
                if tool_call_id.is_empty() {
                    // No call to answer; hand the results over as plain text.
                    provider::Message::user(format!("Search results: {}", body))
                } else {
                    provider::Message::tool_result(tool_call_id.clone(), body)
                }
            }
        })
        .collect()
}
