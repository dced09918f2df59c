// src/core/orchestrator.rs — Per-question draft-search-revise driver

use std::sync::Arc;
use std::time::Instant;

use super::actor::Actor;
use super::controller::IterationController;
use super::tools::ToolRunner;
use super::types::*;
use crate::infra::errors::ReviseLabError;

/// Drives one question through the loop for a single responder/revisor pair.
pub struct QuestionRunner {
    responder: Actor,
    revisor: Actor,
    tools: ToolRunner,
    controller: IterationController,
    /// Optional callback for real-time progress events.
    on_progress: Option<Arc<dyn Fn(ProgressEvent) + Send + Sync>>,
}

/// Final conversation of one question plus what was extracted from it.
#[derive(Debug, Clone)]
pub struct QuestionOutcome {
    pub state: ConversationState,
    pub trace: Vec<LoopState>,
    pub iterations: usize,
    pub responder_answer: String,
    pub revisor_answer: String,
    pub responder_tool_used: bool,
    pub revisor_tool_used: bool,
}

impl QuestionOutcome {
    fn from_state(state: ConversationState, trace: Vec<LoopState>) -> Self {
        let draft = state.draft();
        let last = state.final_output();
        Self {
            responder_answer: extract_answer(draft),
            revisor_answer: extract_answer(last),
            responder_tool_used: draft.is_some_and(|m| !m.effective_queries().is_empty()),
            revisor_tool_used: last.is_some_and(|m| !m.effective_queries().is_empty()),
            iterations: state.revision_count(),
            trace,
            state,
        }
    }
}

impl QuestionRunner {
    pub fn new(
        responder: Actor,
        revisor: Actor,
        tools: ToolRunner,
        controller: IterationController,
    ) -> Self {
        Self {
            responder,
            revisor,
            tools,
            controller,
            on_progress: None,
        }
    }

    /// Set a callback for real-time progress events.
    pub fn with_progress(mut self, cb: Arc<dyn Fn(ProgressEvent) + Send + Sync>) -> Self {
        self.on_progress = Some(cb);
        self
    }

    pub fn responder(&self) -> &Actor {
        &self.responder
    }

    pub fn revisor(&self) -> &Actor {
        &self.revisor
    }

    fn emit(&self, event: ProgressEvent) {
        if let Some(ref cb) = self.on_progress {
            cb(event);
        }
    }

    /// Run the loop to completion. Any failing model or search call
    /// aborts the question; nothing is retried.
    pub async fn run(&self, question: &str) -> Result<QuestionOutcome, ReviseLabError> {
        let start = Instant::now();
        let mut state = ConversationState::new(question);
        let mut current = LoopState::Drafting;
        let mut trace = vec![current];
        self.emit(ProgressEvent::StateEntered { state: current });

        loop {
            let signal = match current {
                LoopState::Drafting => {
                    let draft = self.responder.respond(&state).await?;
                    state.push(draft);
                    Signal::Continue
                }
                LoopState::ExecutingTools => {
                    let result = self.tools.execute(&state).await?;
                    if let Message::ToolResult { ref blocks, .. } = result {
                        self.emit(ProgressEvent::SearchDispatched {
                            queries: blocks.len(),
                        });
                    }
                    state.push(result);
                    Signal::Continue
                }
                LoopState::Revising => {
                    let revision = self.revisor.respond(&state).await?;
                    state.push(revision);
                    let signal = self.controller.decide(&state);
                    tracing::debug!(
                        policy = %self.controller.policy(),
                        messages = state.len(),
                        %signal,
                        "loop decision"
                    );
                    self.emit(ProgressEvent::Decision {
                        signal,
                        messages: state.len(),
                        tool_results: state.tool_result_count(),
                    });
                    signal
                }
                LoopState::Done => break,
            };

            current = IterationController::transition(current, signal);
            trace.push(current);
            self.emit(ProgressEvent::StateEntered { state: current });
        }

        tracing::info!(
            responder = %self.responder.model(),
            revisor = %self.revisor.model(),
            messages = state.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "question finished"
        );
        Ok(QuestionOutcome::from_state(state, trace))
    }
}
