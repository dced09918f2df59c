// src/report/mod.rs — Result records, results file, summary table

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::types::LoopState;
use crate::evaluator::{EvaluationResult, PairwiseWinner, CRITERIA};
use crate::infra::errors::ReviseLabError;

/// One evaluated question for one model pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResultRecord {
    pub question: String,
    pub responder_answer: String,
    pub revisor_answer: String,
    pub responder_tool_used: bool,
    pub revisor_tool_used: bool,
    pub responder_model: String,
    pub revisor_model: String,
    pub evaluation: EvaluationResult,
    pub gold_answer: Option<String>,
    /// Revision rounds performed.
    #[serde(default)]
    pub iterations: usize,
    #[serde(default)]
    pub trace: Vec<LoopState>,
}

/// Write all records as one pretty JSON array.
pub fn write_results(path: &Path, records: &[ResultRecord]) -> Result<(), ReviseLabError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(records)?;
    std::fs::write(path, json)?;
    tracing::info!("Wrote {} result(s) to {}", records.len(), path.display());
    Ok(())
}

pub fn read_results(path: &Path) -> Result<Vec<ResultRecord>, ReviseLabError> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Aggregates for one responder/revisor pair.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PairSummary {
    pub responder_model: String,
    pub revisor_model: String,
    pub questions: usize,
    pub wins: BTreeMap<PairwiseWinner, usize>,
    pub responder_tool_used: usize,
    pub revisor_tool_used: usize,
    /// criterion -> (responder mean, revisor mean); `None` when every
    /// judgment of that side failed.
    pub criteria: BTreeMap<String, (Option<f64>, Option<f64>)>,
    pub gold_graded: usize,
    pub responder_correct: usize,
    pub revisor_correct: usize,
}

impl PairSummary {
    pub fn wins_for(&self, winner: PairwiseWinner) -> usize {
        self.wins.get(&winner).copied().unwrap_or(0)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Summary {
    pub pairs: Vec<PairSummary>,
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Group records by model pair, in first-seen order.
pub fn summarize(records: &[ResultRecord]) -> Summary {
    let mut groups: Vec<(String, String, Vec<&ResultRecord>)> = Vec::new();
    for r in records {
        match groups
            .iter_mut()
            .find(|(a, b, _)| *a == r.responder_model && *b == r.revisor_model)
        {
            Some((_, _, rs)) => rs.push(r),
            None => groups.push((r.responder_model.clone(), r.revisor_model.clone(), vec![r])),
        }
    }

    let pairs = groups
        .into_iter()
        .map(|(responder_model, revisor_model, rs)| {
            let mut s = PairSummary {
                responder_model,
                revisor_model,
                questions: rs.len(),
                ..Default::default()
            };
            for r in &rs {
                *s.wins.entry(r.evaluation.pairwise_winner).or_insert(0) += 1;
                s.responder_tool_used += r.responder_tool_used as usize;
                s.revisor_tool_used += r.revisor_tool_used as usize;
                if let Some(reference) = &r.evaluation.reference {
                    s.gold_graded += 1;
                    s.responder_correct += (reference.responder.qa.score() == Some(1.0)) as usize;
                    s.revisor_correct += (reference.revisor.qa.score() == Some(1.0)) as usize;
                }
            }
            for criterion in CRITERIA {
                let scores = |side: fn(&crate::evaluator::CriterionPair) -> Option<f64>| {
                    rs.iter()
                        .filter_map(|r| r.evaluation.criteria.get(criterion).and_then(side))
                        .collect::<Vec<f64>>()
                };
                let responder = scores(|p| p.responder.score());
                let revisor = scores(|p| p.revisor.score());
                s.criteria
                    .insert(criterion.to_string(), (mean(&responder), mean(&revisor)));
            }
            s
        })
        .collect();

    Summary { pairs }
}

fn fmt_mean(v: Option<f64>) -> String {
    v.map(|m| format!("{:.2}", m)).unwrap_or_else(|| "-".into())
}

impl Summary {
    /// Plain-text table, one block per model pair.
    pub fn render(&self) -> String {
        let mut out = String::new();
        if self.pairs.is_empty() {
            out.push_str("No results.\n");
            return out;
        }
        for p in &self.pairs {
            let _ = writeln!(out, "{} -> {}", p.responder_model, p.revisor_model);
            let _ = writeln!(out, "  questions: {}", p.questions);
            let _ = writeln!(
                out,
                "  pairwise:  responder {}  revisor {}  tie {}  invalid {}",
                p.wins_for(PairwiseWinner::First),
                p.wins_for(PairwiseWinner::Second),
                p.wins_for(PairwiseWinner::Tie),
                p.wins_for(PairwiseWinner::Invalid),
            );
            let _ = writeln!(
                out,
                "  tool use:  responder {}/{}  revisor {}/{}",
                p.responder_tool_used, p.questions, p.revisor_tool_used, p.questions,
            );
            let _ = writeln!(out, "  {:<14} {:>9} {:>9}", "criterion", "responder", "revisor");
            for (name, (a, b)) in &p.criteria {
                let _ = writeln!(out, "  {:<14} {:>9} {:>9}", name, fmt_mean(*a), fmt_mean(*b));
            }
            if p.gold_graded > 0 {
                let _ = writeln!(
                    out,
                    "  gold:      responder {}/{}  revisor {}/{} correct",
                    p.responder_correct, p.gold_graded, p.revisor_correct, p.gold_graded,
                );
            }
            out.push('\n');
        }
        out
    }
}
