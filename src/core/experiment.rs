// src/core/experiment.rs — All questions across all model pairs

use std::sync::Arc;

use super::orchestrator::QuestionRunner;
use super::types::ProgressEvent;
use crate::dataset::QuestionRecord;
use crate::evaluator::AnswerEvaluator;
use crate::infra::config::FailurePolicy;
use crate::infra::errors::ReviseLabError;
use crate::provider::roles::ModelPair;
use crate::report::ResultRecord;

/// A question runner labelled with the pair it runs.
pub struct PairRunner {
    pub pair: ModelPair,
    pub runner: QuestionRunner,
}

/// Runs every question for every pair, one at a time, and evaluates each
/// finished question before moving on.
pub struct Experiment {
    pairs: Vec<PairRunner>,
    evaluator: Arc<dyn AnswerEvaluator>,
    on_error: FailurePolicy,
    on_progress: Option<Arc<dyn Fn(ProgressEvent) + Send + Sync>>,
}

impl Experiment {
    pub fn new(
        pairs: Vec<PairRunner>,
        evaluator: Arc<dyn AnswerEvaluator>,
        on_error: FailurePolicy,
    ) -> Self {
        Self {
            pairs,
            evaluator,
            on_error,
            on_progress: None,
        }
    }

    pub fn with_progress(mut self, cb: Arc<dyn Fn(ProgressEvent) + Send + Sync>) -> Self {
        self.on_progress = Some(cb);
        self
    }

    fn emit(&self, event: ProgressEvent) {
        if let Some(ref cb) = self.on_progress {
            cb(event);
        }
    }

    /// Records of every question that completed. With `Skip`, a failing
    /// question is logged and left out; with `Abort`, the error is returned.
    /// Configuration errors are returned under either policy.
    pub async fn run(&self, questions: &[QuestionRecord]) -> Result<Vec<ResultRecord>, ReviseLabError> {
        let mut results = Vec::new();
        let total = questions.len();

        for PairRunner { pair, runner } in &self.pairs {
            tracing::info!("Running pair {}", pair.label());

            for (idx, record) in questions.iter().enumerate() {
                self.emit(ProgressEvent::QuestionStart {
                    index: idx + 1,
                    total,
                    pair: pair.label(),
                    question: record.question.clone(),
                });

                let outcome = match runner.run(&record.question).await {
                    Ok(o) => o,
                    Err(e) if e.is_fatal() => return Err(e),
                    Err(e) => match self.on_error {
                        FailurePolicy::Skip => {
                            tracing::error!(
                                "Question {}/{} failed for {}: {}",
                                idx + 1,
                                total,
                                pair.label(),
                                e
                            );
                            self.emit(ProgressEvent::QuestionFailed {
                                index: idx + 1,
                                error: e.to_string(),
                            });
                            continue;
                        }
                        FailurePolicy::Abort => return Err(e),
                    },
                };

                let evaluation = self
                    .evaluator
                    .evaluate(
                        &record.question,
                        &outcome.responder_answer,
                        &outcome.revisor_answer,
                        record.gold_answer.as_deref(),
                    )
                    .await;
                self.emit(ProgressEvent::Evaluated {
                    winner: evaluation.pairwise_winner.to_string(),
                });

                results.push(ResultRecord {
                    question: record.question.clone(),
                    responder_answer: outcome.responder_answer,
                    revisor_answer: outcome.revisor_answer,
                    responder_tool_used: outcome.responder_tool_used,
                    revisor_tool_used: outcome.revisor_tool_used,
                    responder_model: pair.responder.to_string(),
                    revisor_model: pair.revisor.to_string(),
                    evaluation,
                    gold_answer: record.gold_answer.clone(),
                    iterations: outcome.iterations,
                    trace: outcome.trace,
                });
            }
        }

        Ok(results)
    }
}
