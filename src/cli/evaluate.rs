// src/cli/evaluate.rs — `reviselab evaluate`: judge one saved answer pair

use std::path::Path;

use serde::Deserialize;

use crate::evaluator::{AnswerEvaluator, LlmEvaluator};
use crate::infra::config::Config;
use crate::provider::resolver;
use crate::provider::roles::ModelRoles;

/// Input file shape.
#[derive(Debug, Deserialize)]
pub struct EvaluationInput {
    pub question: String,
    pub responder_answer: String,
    pub revisor_answer: String,
    #[serde(default)]
    pub gold_answer: Option<String>,
}

pub fn read_input(path: &Path) -> anyhow::Result<EvaluationInput> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("cannot read {}: {}", path.display(), e))?;
    let input = serde_json::from_str(&content)
        .map_err(|e| anyhow::anyhow!("invalid evaluation input {}: {}", path.display(), e))?;
    Ok(input)
}

/// Always grades against the gold answer when the file has one.
pub async fn run_evaluate(config: &Config, path: &Path) -> anyhow::Result<()> {
    let input = read_input(path)?;
    let roles = ModelRoles::from_config(&config.models)?;
    let provider = resolver::build_provider(&roles.judge, config)?;

    let gold = input
        .gold_answer
        .as_deref()
        .map(str::trim)
        .filter(|g| !g.is_empty());
    if gold.is_none() {
        tracing::warn!("No gold_answer in {}, skipping reference grading", path.display());
    }

    let evaluator = LlmEvaluator::new(provider, roles.judge)
        .with_temperature(config.evaluation.temperature)
        .with_gold(true);
    let result = evaluator
        .evaluate(
            &input.question,
            &input.responder_answer,
            &input.revisor_answer,
            gold,
        )
        .await;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
