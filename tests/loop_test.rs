// tests/loop_test.rs — Integration test: draft-search-revise loop and experiment driver with mocks

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use pretty_assertions::assert_eq;

use reviselab::core::actor::Actor;
use reviselab::core::controller::IterationController;
use reviselab::core::experiment::{Experiment, PairRunner};
use reviselab::core::orchestrator::QuestionRunner;
use reviselab::core::tools::ToolRunner;
use reviselab::core::types::*;
use reviselab::dataset::QuestionRecord;
use reviselab::evaluator::{AnswerEvaluator, EvaluationResult, PairwiseWinner};
use reviselab::infra::config::FailurePolicy;
use reviselab::infra::errors::ReviseLabError;
use reviselab::provider::roles::ModelPair;
use reviselab::provider::{
    ChatRequest, ChatResponse, ModelProvider, ModelRef, StopReason, TokenUsage, ToolCall,
};
use reviselab::search::SearchBackend;

/// Answers through whichever answer tool the request offers. Questions
/// containing "boom" fail with a service error, "vanished" with a
/// configuration error.
struct ScriptedProvider {
    calls: AtomicUsize,
    draft_queries: Vec<&'static str>,
}

impl ScriptedProvider {
    fn new() -> Self {
        Self::with_draft_queries(vec!["eiffel tower height", "eiffel tower opening year"])
    }

    fn with_draft_queries(draft_queries: Vec<&'static str>) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            draft_queries,
        }
    }
}

#[async_trait]
impl ModelProvider for ScriptedProvider {
    fn id(&self) -> &str {
        "mock"
    }

    fn name(&self) -> &str {
        "Scripted Provider"
    }

    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, ReviseLabError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if request.messages.first().is_some_and(|m| m.content.contains("boom")) {
            return Err(ReviseLabError::external("mock", "connection reset"));
        }
        if request.messages.first().is_some_and(|m| m.content.contains("vanished")) {
            return Err(ReviseLabError::Configuration("model vanished".into()));
        }

        let tool = request.tools.first().map(|t| t.name.clone()).unwrap_or_default();
        let arguments = if tool == "AnswerQuestion" {
            serde_json::json!({
                "answer": "The Eiffel Tower is in Paris.",
                "reflection": {"missing": "height", "superfluous": "none"},
                "search_queries": self.draft_queries
            })
        } else {
            serde_json::json!({
                "answer": "The Eiffel Tower in Paris is 330 m tall [1].",
                "reflection": {"missing": "none", "superfluous": "none"},
                "search_queries": ["eiffel tower renovation"],
                "references": ["[1] https://example.org/eiffel"]
            })
        };

        Ok(ChatResponse {
            content: String::new(),
            tool_calls: vec![ToolCall {
                id: format!("call_{}", n),
                name: tool,
                arguments,
            }],
            usage: TokenUsage {
                input_tokens: 100,
                output_tokens: 50,
            },
            stop_reason: StopReason::ToolUse,
        })
    }
}

/// Counts dispatched queries; the first query of a batch answers last.
struct CountingSearch {
    dispatched: AtomicUsize,
    queries: Mutex<Vec<String>>,
}

impl CountingSearch {
    fn new() -> Self {
        Self {
            dispatched: AtomicUsize::new(0),
            queries: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl SearchBackend for CountingSearch {
    fn name(&self) -> &str {
        "counting"
    }

    async fn search(&self, query: &str) -> Result<serde_json::Value, ReviseLabError> {
        let n = self.dispatched.fetch_add(1, Ordering::SeqCst);
        self.queries.lock().unwrap().push(query.to_string());
        if n == 0 {
            tokio::time::sleep(Duration::from_millis(30)).await;
        }
        Ok(serde_json::json!([
            {"url": format!("https://example.org/{}", query.replace(' ', "-")), "content": query}
        ]))
    }
}

struct FixedEvaluator;

#[async_trait]
impl AnswerEvaluator for FixedEvaluator {
    async fn evaluate(
        &self,
        _question: &str,
        _responder: &str,
        _revisor: &str,
        _gold: Option<&str>,
    ) -> EvaluationResult {
        EvaluationResult {
            criteria: BTreeMap::new(),
            pairwise_winner: PairwiseWinner::Second,
            pairwise_reasoning: "B cites a source.".into(),
            reference: None,
        }
    }
}

fn runner(policy: StopPolicy, search: Arc<CountingSearch>) -> QuestionRunner {
    runner_with(ScriptedProvider::new(), policy, search)
}

fn runner_with(
    provider: ScriptedProvider,
    policy: StopPolicy,
    search: Arc<CountingSearch>,
) -> QuestionRunner {
    let provider: Arc<dyn ModelProvider> = Arc::new(provider);
    QuestionRunner::new(
        Actor::responder(provider.clone(), ModelRef::new("mock", "small")),
        Actor::revisor(provider, ModelRef::new("mock", "large")),
        ToolRunner::new(search),
        IterationController::new(policy),
    )
}

fn experiment(policy: FailurePolicy) -> Experiment {
    let pair = ModelPair::new(ModelRef::new("mock", "small"), ModelRef::new("mock", "large"));
    Experiment::new(
        vec![PairRunner {
            pair,
            runner: runner(StopPolicy::default(), Arc::new(CountingSearch::new())),
        }],
        Arc::new(FixedEvaluator),
        policy,
    )
}

// ─── Controller ─────────────────────────────────────────────

#[test]
fn test_transition_table() {
    use LoopState::*;
    for signal in [Signal::Continue, Signal::Stop] {
        assert_eq!(IterationController::transition(Drafting, signal), ExecutingTools);
        assert_eq!(IterationController::transition(ExecutingTools, signal), Revising);
        assert_eq!(IterationController::transition(Done, signal), Done);
    }
    assert_eq!(IterationController::transition(Revising, Signal::Continue), ExecutingTools);
    assert_eq!(IterationController::transition(Revising, Signal::Stop), Done);
}

#[test]
fn test_decide_is_monotonic_in_length() {
    let controller = IterationController::new(StopPolicy::MessageCount { max: 5 });
    let mut state = ConversationState::new("q");
    let mut stopped = false;
    for _ in 0..8 {
        state.push(Message::ToolResult {
            tool_call_id: String::new(),
            blocks: vec![],
        });
        let signal = controller.decide(&state);
        if stopped {
            assert_eq!(signal, Signal::Stop, "stop must persist as the log grows");
        }
        stopped = signal == Signal::Stop;
        assert_eq!(stopped, state.len() >= 5);
    }
}

// ─── Tool runner ────────────────────────────────────────────

#[tokio::test]
async fn test_empty_queries_dispatch_nothing() {
    let search = Arc::new(CountingSearch::new());
    let tools = ToolRunner::new(search.clone());
    let blocks = tools.run_queries(&[]).await.unwrap();
    assert!(blocks.is_empty());
    assert_eq!(search.dispatched.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_results_keep_query_order() {
    let search = Arc::new(CountingSearch::new());
    let tools = ToolRunner::new(search.clone());
    let queries = vec!["q1".to_string(), "q2".to_string()];
    let blocks = tools.run_queries(&queries).await.unwrap();

    let got: Vec<&str> = blocks.iter().map(|b| b.query.as_str()).collect();
    assert_eq!(got, vec!["q1", "q2"]);
    assert_eq!(blocks[0].results[0]["content"], "q1");
    assert_eq!(search.dispatched.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_repeated_batch_yields_same_block_count() {
    let tools = ToolRunner::new(Arc::new(CountingSearch::new()));
    let queries = vec!["q1".to_string(), "q2".to_string(), "q3".to_string()];
    let first = tools.run_queries(&queries).await.unwrap();
    let second = tools.run_queries(&queries).await.unwrap();
    assert_eq!(first.len(), queries.len());
    assert_eq!(second.len(), first.len());
}

#[tokio::test]
async fn test_execute_without_tool_call_yields_empty_result() {
    let search = Arc::new(CountingSearch::new());
    let tools = ToolRunner::new(search.clone());
    let mut state = ConversationState::new("q");
    state.push(Message::AgentOutput {
        role: ActorRole::Responder,
        content: "plain text".into(),
        tool_call: None,
    });

    let msg = tools.execute(&state).await.unwrap();
    assert_eq!(
        msg,
        Message::ToolResult {
            tool_call_id: String::new(),
            blocks: vec![],
        }
    );
    assert_eq!(search.dispatched.load(Ordering::SeqCst), 0);
}

// ─── Question loop ──────────────────────────────────────────

#[tokio::test]
async fn test_single_round_with_default_threshold() {
    let search = Arc::new(CountingSearch::new());
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    let runner = runner(StopPolicy::default(), search.clone())
        .with_progress(Arc::new(move |e: ProgressEvent| sink.lock().unwrap().push(e)));

    let out = runner.run("How tall is the Eiffel Tower?").await.unwrap();

    assert_eq!(
        out.trace,
        vec![
            LoopState::Drafting,
            LoopState::ExecutingTools,
            LoopState::Revising,
            LoopState::Done
        ]
    );
    assert_eq!(out.iterations, 1);
    assert_eq!(out.state.len(), 4);
    assert_eq!(out.responder_answer, "The Eiffel Tower is in Paris.");
    assert_eq!(out.revisor_answer, "The Eiffel Tower in Paris is 330 m tall [1].");
    assert!(out.responder_tool_used);
    assert!(out.revisor_tool_used);
    assert_eq!(
        *search.queries.lock().unwrap(),
        vec!["eiffel tower height", "eiffel tower opening year"]
    );

    let events = events.lock().unwrap();
    let entered = events
        .iter()
        .filter(|e| matches!(e, ProgressEvent::StateEntered { .. }))
        .count();
    assert_eq!(entered, 4);
}

#[tokio::test]
async fn test_tool_result_policy_runs_extra_rounds() {
    let search = Arc::new(CountingSearch::new());
    let runner = runner(StopPolicy::ToolResults { max: 2 }, search.clone());

    let out = runner.run("How tall is the Eiffel Tower?").await.unwrap();

    assert_eq!(
        out.trace,
        vec![
            LoopState::Drafting,
            LoopState::ExecutingTools,
            LoopState::Revising,
            LoopState::ExecutingTools,
            LoopState::Revising,
            LoopState::Done
        ]
    );
    assert_eq!(out.iterations, 2);
    assert_eq!(out.state.tool_result_count(), 2);
    // two draft queries, then the revisor's one follow-up
    assert_eq!(search.dispatched.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_blank_draft_queries_are_not_tool_use() {
    let search = Arc::new(CountingSearch::new());
    let runner = runner_with(
        ScriptedProvider::with_draft_queries(vec!["   "]),
        StopPolicy::default(),
        search.clone(),
    );

    let out = runner.run("What is the capital of France?").await.unwrap();

    assert!(!out.responder_tool_used);
    assert!(out.revisor_tool_used);
    assert_eq!(search.dispatched.load(Ordering::SeqCst), 0);
    match &out.state.messages()[2] {
        Message::ToolResult { blocks, .. } => assert!(blocks.is_empty()),
        other => panic!("expected a tool result, got {other:?}"),
    }
}

#[tokio::test]
async fn test_failing_model_aborts_question() {
    let runner = runner(StopPolicy::default(), Arc::new(CountingSearch::new()));
    let err = runner.run("boom").await.unwrap_err();
    assert!(matches!(err, ReviseLabError::ExternalService { .. }));
}

// ─── Experiment ─────────────────────────────────────────────

#[tokio::test]
async fn test_experiment_records_one_result_per_question() {
    let questions = vec![QuestionRecord::new("How tall is the Eiffel Tower?").with_gold("330 m")];
    let results = experiment(FailurePolicy::Skip).run(&questions).await.unwrap();

    assert_eq!(results.len(), 1);
    let r = &results[0];
    assert_eq!(r.responder_model, "mock/small");
    assert_eq!(r.revisor_model, "mock/large");
    assert_eq!(r.gold_answer.as_deref(), Some("330 m"));
    assert_eq!(r.evaluation.pairwise_winner, PairwiseWinner::Second);
    assert!(r.responder_tool_used && r.revisor_tool_used);
    assert_eq!(r.trace.last(), Some(&LoopState::Done));
}

#[tokio::test]
async fn test_skip_policy_drops_failed_question() {
    let questions = vec![
        QuestionRecord::new("boom"),
        QuestionRecord::new("Who designed the Eiffel Tower?"),
    ];
    let results = experiment(FailurePolicy::Skip).run(&questions).await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].question, "Who designed the Eiffel Tower?");
}

#[tokio::test]
async fn test_abort_policy_returns_error() {
    let questions = vec![
        QuestionRecord::new("boom"),
        QuestionRecord::new("Who designed the Eiffel Tower?"),
    ];
    let err = experiment(FailurePolicy::Abort).run(&questions).await.unwrap_err();
    assert!(err.to_string().contains("connection reset"));
}

#[tokio::test]
async fn test_configuration_error_ends_run_under_skip() {
    let questions = vec![
        QuestionRecord::new("Which model vanished?"),
        QuestionRecord::new("Who designed the Eiffel Tower?"),
    ];
    let err = experiment(FailurePolicy::Skip).run(&questions).await.unwrap_err();
    assert!(err.is_fatal());
    assert!(err.to_string().contains("model vanished"));
}
