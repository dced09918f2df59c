// tests/evaluator_test.rs — Integration test: LLM judge with mock providers

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use pretty_assertions::assert_eq;

use reviselab::evaluator::{AnswerEvaluator, Judgment, LlmEvaluator, PairwiseWinner, CRITERIA};
use reviselab::infra::errors::ReviseLabError;
use reviselab::provider::{
    ChatRequest, ChatResponse, ModelProvider, ModelRef, StopReason, TokenUsage,
};

/// Replies by prompt kind: pairwise prompts get `pairwise`, gold grading
/// gets `grade`, everything else gets `criteria`.
struct CannedJudge {
    pairwise: String,
    criteria: String,
    grade: String,
    calls: AtomicUsize,
}

impl CannedJudge {
    fn new(pairwise: &str, criteria: &str) -> Self {
        Self {
            pairwise: pairwise.into(),
            criteria: criteria.into(),
            grade: "The answer matches.\nCORRECT".into(),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl ModelProvider for CannedJudge {
    fn id(&self) -> &str {
        "mock"
    }

    fn name(&self) -> &str {
        "Canned Judge"
    }

    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, ReviseLabError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let prompt = request
            .messages
            .first()
            .map(|m| m.content.clone())
            .unwrap_or_default();
        let content = if prompt.contains("[[C]]") {
            self.pairwise.clone()
        } else if prompt.contains("CORRECT") {
            self.grade.clone()
        } else {
            self.criteria.clone()
        };
        Ok(ChatResponse {
            content,
            tool_calls: vec![],
            usage: TokenUsage::default(),
            stop_reason: StopReason::EndTurn,
        })
    }
}

struct DownJudge;

#[async_trait]
impl ModelProvider for DownJudge {
    fn id(&self) -> &str {
        "mock"
    }

    fn name(&self) -> &str {
        "Down Judge"
    }

    async fn chat(&self, _request: ChatRequest) -> Result<ChatResponse, ReviseLabError> {
        Err(ReviseLabError::external("judge", "service unavailable"))
    }
}

fn judge(provider: Arc<dyn ModelProvider>) -> LlmEvaluator {
    LlmEvaluator::new(provider, ModelRef::new("mock", "judge"))
}

#[tokio::test]
async fn test_full_evaluation() {
    let provider = Arc::new(CannedJudge::new(
        "Assistant B gives the height with a source.\n[[B]]",
        "The answer is on topic.\nY",
    ));
    let result = judge(provider.clone())
        .evaluate("How tall is the Eiffel Tower?", "It is tall.", "330 m [1].", None)
        .await;

    assert_eq!(result.pairwise_winner, PairwiseWinner::Second);
    assert_eq!(result.criteria.len(), CRITERIA.len());
    for pair in result.criteria.values() {
        assert_eq!(pair.responder.score(), Some(1.0));
        assert_eq!(pair.revisor.score(), Some(1.0));
    }
    assert!(result.reference.is_none());
    // two calls per criterion plus the pairwise comparison
    assert_eq!(provider.calls.load(Ordering::SeqCst), CRITERIA.len() * 2 + 1);
}

#[tokio::test]
async fn test_unreachable_judge_never_fails() {
    let result = judge(Arc::new(DownJudge))
        .evaluate("q", "a", "b", Some("gold"))
        .await;

    assert_eq!(result.pairwise_winner, PairwiseWinner::Invalid);
    assert!(result.pairwise_reasoning.starts_with("Error: "));
    assert!(result.pairwise_reasoning.contains("service unavailable"));
    for pair in result.criteria.values() {
        assert!(matches!(pair.responder, Judgment::Failed { .. }));
        assert!(matches!(pair.revisor, Judgment::Failed { .. }));
    }
}

#[tokio::test]
async fn test_garbled_pairwise_verdict_is_invalid() {
    let provider = Arc::new(CannedJudge::new("Both are fine I guess.", "ok\nY"));
    let result = judge(provider).evaluate("q", "a", "b", None).await;

    assert_eq!(result.pairwise_winner, PairwiseWinner::Invalid);
    assert!(result
        .pairwise_reasoning
        .starts_with("Malformed pairwise verdict:"));
}

#[tokio::test]
async fn test_unparseable_criterion_is_recorded_as_error() {
    let provider = Arc::new(CannedJudge::new("[[C]]", "I cannot decide."));
    let result = judge(provider).evaluate("q", "a", "b", None).await;

    assert_eq!(result.pairwise_winner, PairwiseWinner::Tie);
    let correctness = &result.criteria["correctness"];
    assert!(matches!(correctness.responder, Judgment::Failed { .. }));
}

#[tokio::test]
async fn test_gold_grading_when_enabled() {
    let provider = Arc::new(CannedJudge::new("[[A]]", "fine\nN"));
    let result = judge(provider)
        .with_gold(true)
        .evaluate("Capital of France?", "paris", "Paris, France", Some(" Paris "))
        .await;

    let reference = result.reference.expect("gold grading requested");
    assert_eq!(reference.gold_answer, "Paris");
    assert!(reference.responder.exact_match);
    assert!(!reference.revisor.exact_match);
    assert_eq!(reference.revisor.qa.score(), Some(1.0));
    assert_eq!(result.criteria["helpfulness"].revisor.score(), Some(0.0));
}

#[tokio::test]
async fn test_gold_ignored_when_disabled() {
    let provider = Arc::new(CannedJudge::new("[[A]]", "fine\nY"));
    let result = judge(provider).evaluate("q", "a", "b", Some("gold")).await;
    assert!(result.reference.is_none());
}

#[test]
fn test_evaluation_serializes_errors_inline() {
    let failed = Judgment::Failed {
        error: "timeout".into(),
    };
    assert_eq!(
        serde_json::to_value(&failed).unwrap(),
        serde_json::json!({"error": "timeout"})
    );
}
