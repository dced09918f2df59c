// src/core/types.rs — Core domain types

use serde::{Deserialize, Serialize};

use crate::infra::config::{LoopConfig, StopPolicyKind};

/// Placeholder answer when neither side produced any text.
pub const NO_ANSWER: &str = "(No answer found)";

/// Which actor produced an agent output.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ActorRole {
    Responder,
    Revisor,
}

impl std::fmt::Display for ActorRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActorRole::Responder => write!(f, "responder"),
            ActorRole::Revisor => write!(f, "revisor"),
        }
    }
}

/// Self-critique attached to every answer.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Reflection {
    pub missing: String,
    pub superfluous: String,
}

/// Structured arguments of an `AnswerQuestion` / `ReviseAnswer` call.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AnswerPayload {
    pub answer: String,
    #[serde(default)]
    pub reflection: Reflection,
    #[serde(default)]
    pub search_queries: Vec<String>,
    /// Citations; only revisions carry them.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnswerToolCall {
    pub id: String,
    pub name: String,
    pub payload: AnswerPayload,
}

/// Raw search results for one query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchBlock {
    pub query: String,
    pub results: serde_json::Value,
}

/// One entry of a question's conversation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Message {
    UserQuestion {
        content: String,
    },
    AgentOutput {
        role: ActorRole,
        content: String,
        tool_call: Option<AnswerToolCall>,
    },
    ToolResult {
        tool_call_id: String,
        blocks: Vec<SearchBlock>,
    },
}

impl Message {
    pub fn is_tool_result(&self) -> bool {
        matches!(self, Message::ToolResult { .. })
    }

    /// Follow-up queries the tool runner will actually dispatch: trimmed,
    /// blanks dropped. Empty for other kinds.
    pub fn effective_queries(&self) -> Vec<String> {
        match self {
            Message::AgentOutput {
                tool_call: Some(call),
                ..
            } => call
                .payload
                .search_queries
                .iter()
                .map(|q| q.trim())
                .filter(|q| !q.is_empty())
                .map(str::to_string)
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Structured answer if present, otherwise non-empty text content.
    pub fn answer_text(&self) -> Option<&str> {
        match self {
            Message::AgentOutput {
                tool_call: Some(call),
                ..
            } => Some(call.payload.answer.as_str()),
            Message::AgentOutput { content, .. } if !content.trim().is_empty() => {
                Some(content.as_str())
            }
            _ => None,
        }
    }
}

/// Answer text of an optional agent output, with the placeholder fallback.
pub fn extract_answer(message: Option<&Message>) -> String {
    message
        .and_then(Message::answer_text)
        .unwrap_or(NO_ANSWER)
        .to_string()
}

/// Append-only message log for a single question.
#[derive(Debug, Clone, Serialize)]
pub struct ConversationState {
    messages: Vec<Message>,
}

impl ConversationState {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::UserQuestion {
                content: question.into(),
            }],
        }
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Never true: a state always holds its question.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn question(&self) -> &str {
        match self.messages.first() {
            Some(Message::UserQuestion { content }) => content,
            _ => "",
        }
    }

    pub fn tool_result_count(&self) -> usize {
        self.messages.iter().filter(|m| m.is_tool_result()).count()
    }

    /// The responder's first draft.
    pub fn draft(&self) -> Option<&Message> {
        self.messages.iter().find(|m| {
            matches!(
                m,
                Message::AgentOutput {
                    role: ActorRole::Responder,
                    ..
                }
            )
        })
    }

    /// The most recent agent output, i.e. the final revision once done.
    pub fn final_output(&self) -> Option<&Message> {
        self.messages
            .iter()
            .rev()
            .find(|m| matches!(m, Message::AgentOutput { .. }))
    }

    /// Number of revisor outputs so far.
    pub fn revision_count(&self) -> usize {
        self.messages
            .iter()
            .filter(|m| {
                matches!(
                    m,
                    Message::AgentOutput {
                        role: ActorRole::Revisor,
                        ..
                    }
                )
            })
            .count()
    }
}

/// States of the draft-search-revise loop.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LoopState {
    Drafting,
    ExecutingTools,
    Revising,
    Done,
}

impl std::fmt::Display for LoopState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LoopState::Drafting => "DRAFTING",
            LoopState::ExecutingTools => "EXECUTING_TOOLS",
            LoopState::Revising => "REVISING",
            LoopState::Done => "DONE",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Continue,
    Stop,
}

impl std::fmt::Display for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Signal::Continue => write!(f, "continue"),
            Signal::Stop => write!(f, "stop"),
        }
    }
}

/// When the loop stops after a revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopPolicy {
    /// Stop once the conversation holds at least `max` messages.
    MessageCount { max: usize },
    /// Stop once at least `max` tool results were recorded.
    ToolResults { max: usize },
}

impl Default for StopPolicy {
    fn default() -> Self {
        StopPolicy::MessageCount { max: 3 }
    }
}

impl From<&LoopConfig> for StopPolicy {
    fn from(cfg: &LoopConfig) -> Self {
        match cfg.policy {
            StopPolicyKind::MessageCount => StopPolicy::MessageCount { max: cfg.max },
            StopPolicyKind::ToolResults => StopPolicy::ToolResults { max: cfg.max },
        }
    }
}

impl std::fmt::Display for StopPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StopPolicy::MessageCount { max } => write!(f, "message_count>={}", max),
            StopPolicy::ToolResults { max } => write!(f, "tool_results>={}", max),
        }
    }
}

/// Lifecycle notifications for terminal progress output.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    QuestionStart {
        index: usize,
        total: usize,
        pair: String,
        question: String,
    },
    StateEntered {
        state: LoopState,
    },
    SearchDispatched {
        queries: usize,
    },
    Decision {
        signal: Signal,
        messages: usize,
        tool_results: usize,
    },
    Evaluated {
        winner: String,
    },
    QuestionFailed {
        index: usize,
        error: String,
    },
}
