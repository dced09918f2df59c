// src/evaluator/mod.rs — LLM-judged comparison of responder and revisor answers

pub mod judge;
pub mod pairwise;
pub mod parser;

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::provider::{ModelProvider, ModelRef};

/// Single-answer criteria judged for both sides.
pub const CRITERIA: [&str; 5] = [
    "helpfulness",
    "correctness",
    "relevance",
    "conciseness",
    "coherence",
];

/// Outcome of one judge call for one answer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Judgment {
    Verdict {
        value: String,
        score: f64,
        reasoning: String,
    },
    Failed {
        error: String,
    },
}

impl Judgment {
    pub fn score(&self) -> Option<f64> {
        match self {
            Judgment::Verdict { score, .. } => Some(*score),
            Judgment::Failed { .. } => None,
        }
    }
}

impl From<parser::ParsedVerdict> for Judgment {
    fn from(v: parser::ParsedVerdict) -> Self {
        Judgment::Verdict {
            value: v.value,
            score: v.score,
            reasoning: v.reasoning,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CriterionPair {
    pub responder: Judgment,
    pub revisor: Judgment,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PairwiseWinner {
    First,
    Second,
    Tie,
    Invalid,
}

impl std::fmt::Display for PairwiseWinner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PairwiseWinner::First => "First",
            PairwiseWinner::Second => "Second",
            PairwiseWinner::Tie => "Tie",
            PairwiseWinner::Invalid => "Invalid",
        };
        f.write_str(s)
    }
}

/// Grading of one answer against the gold answer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GoldGrade {
    pub exact_match: bool,
    pub qa: Judgment,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReferenceEvaluation {
    pub gold_answer: String,
    pub responder: GoldGrade,
    pub revisor: GoldGrade,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EvaluationResult {
    pub criteria: BTreeMap<String, CriterionPair>,
    pub pairwise_winner: PairwiseWinner,
    pub pairwise_reasoning: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<ReferenceEvaluation>,
}

/// Judges two answers to the same question. Never fails: judge errors
/// are recorded inside the result.
#[async_trait]
pub trait AnswerEvaluator: Send + Sync {
    async fn evaluate(
        &self,
        question: &str,
        responder: &str,
        revisor: &str,
        gold: Option<&str>,
    ) -> EvaluationResult;
}

/// Case-insensitive comparison of trimmed strings.
pub fn exact_match(prediction: &str, reference: &str) -> bool {
    prediction.trim().to_lowercase() == reference.trim().to_lowercase()
}

/// Evaluator backed by a chat model acting as judge.
pub struct LlmEvaluator {
    provider: Arc<dyn ModelProvider>,
    model: ModelRef,
    temperature: f32,
    use_gold: bool,
}

impl LlmEvaluator {
    pub fn new(provider: Arc<dyn ModelProvider>, model: ModelRef) -> Self {
        Self {
            provider,
            model,
            temperature: 0.0,
            use_gold: false,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Also grade both answers against the gold answer when one is given.
    pub fn with_gold(mut self, use_gold: bool) -> Self {
        self.use_gold = use_gold;
        self
    }

    pub fn model(&self) -> &ModelRef {
        &self.model
    }

    async fn grade_against_gold(
        &self,
        question: &str,
        responder: &str,
        revisor: &str,
        gold: &str,
    ) -> ReferenceEvaluation {
        let responder_qa = self.qa_grade(question, responder, gold).await;
        let revisor_qa = self.qa_grade(question, revisor, gold).await;
        ReferenceEvaluation {
            gold_answer: gold.to_string(),
            responder: GoldGrade {
                exact_match: exact_match(responder, gold),
                qa: responder_qa,
            },
            revisor: GoldGrade {
                exact_match: exact_match(revisor, gold),
                qa: revisor_qa,
            },
        }
    }
}

#[async_trait]
impl AnswerEvaluator for LlmEvaluator {
    async fn evaluate(
        &self,
        question: &str,
        responder: &str,
        revisor: &str,
        gold: Option<&str>,
    ) -> EvaluationResult {
        tracing::info!(
            question = %crate::util::preview(question, 60),
            judge = %self.model,
            "evaluating answers"
        );

        let mut criteria = BTreeMap::new();
        for criterion in CRITERIA {
            let pair = match self.judge_pair(criterion, question, responder, revisor).await {
                Ok(pair) => pair,
                Err(e) => {
                    tracing::error!("{} evaluator failed: {}", criterion, e);
                    let failed = Judgment::Failed {
                        error: e.to_string(),
                    };
                    CriterionPair {
                        responder: failed.clone(),
                        revisor: failed,
                    }
                }
            };
            criteria.insert(criterion.to_string(), pair);
        }

        let (pairwise_winner, pairwise_reasoning) =
            self.compare(question, responder, revisor).await;

        let reference = match gold.map(str::trim).filter(|g| !g.is_empty()) {
            Some(g) if self.use_gold => {
                Some(self.grade_against_gold(question, responder, revisor, g).await)
            }
            _ => None,
        };

        EvaluationResult {
            criteria,
            pairwise_winner,
            pairwise_reasoning,
            reference,
        }
    }
}
