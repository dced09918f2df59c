// src/core/controller.rs — Stop/continue decision after each revision

use super::types::{ConversationState, LoopState, Signal, StopPolicy};

/// Decides whether another search-and-revise round is needed.
///
/// Pure over the conversation: no I/O, no failure modes. The configured
/// maximum is the only bound on the number of rounds.
#[derive(Debug, Clone, Copy, Default)]
pub struct IterationController {
    policy: StopPolicy,
}

impl IterationController {
    pub fn new(policy: StopPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> StopPolicy {
        self.policy
    }

    pub fn decide(&self, state: &ConversationState) -> Signal {
        let reached = match self.policy {
            StopPolicy::MessageCount { max } => state.len() >= max,
            StopPolicy::ToolResults { max } => state.tool_result_count() >= max,
        };
        if reached {
            Signal::Stop
        } else {
            Signal::Continue
        }
    }

    /// Next loop state. The signal only matters when leaving `Revising`.
    pub fn transition(from: LoopState, signal: Signal) -> LoopState {
        match (from, signal) {
            (LoopState::Drafting, _) => LoopState::ExecutingTools,
            (LoopState::ExecutingTools, _) => LoopState::Revising,
            (LoopState::Revising, Signal::Continue) => LoopState::ExecutingTools,
            (LoopState::Revising, Signal::Stop) => LoopState::Done,
            (LoopState::Done, _) => LoopState::Done,
        }
    }
}
