// src/cli/run.rs — Default command: run the responder/revisor experiment

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::core::actor::Actor;
use crate::core::controller::IterationController;
use crate::core::experiment::{Experiment, PairRunner};
use crate::core::orchestrator::QuestionRunner;
use crate::core::tools::ToolRunner;
use crate::core::types::{ProgressEvent, StopPolicy};
use crate::dataset::hotpotqa::HotpotQaSampler;
use crate::dataset::{self, QuestionRecord};
use crate::evaluator::LlmEvaluator;
use crate::infra::backend;
use crate::infra::config::Config;
use crate::infra::paths;
use crate::provider::resolver::ProviderCache;
use crate::provider::roles::ModelRoles;
use crate::report;
use crate::search::tavily::TavilySearch;
use crate::search::SearchBackend;

/// Prepare backends, load questions, run every pair and write the results.
pub async fn run_experiment(
    config: &Config,
    questions: Option<&str>,
    output: Option<&str>,
    quiet: bool,
) -> anyhow::Result<()> {
    // Startup preconditions: any failure here ends the run before question 1.
    let roles = ModelRoles::from_config(&config.models)?;

    let mut ollama_models = roles.ollama_models();
    if roles.judge.provider == "ollama" && !ollama_models.contains(&roles.judge.model) {
        ollama_models.push(roles.judge.model.clone());
    }
    for model in &ollama_models {
        backend::prepare_ollama(&config.ollama, model).await?;
    }

    let mut providers = ProviderCache::new();
    let search: Arc<dyn SearchBackend> = Arc::new(TavilySearch::from_env(&config.search)?);
    let tools = ToolRunner::new(search);
    let policy = StopPolicy::from(&config.iteration);

    let progress: Option<Arc<dyn Fn(ProgressEvent) + Send + Sync>> = if quiet {
        None
    } else {
        Some(Arc::new(super::progress::terminal_progress()))
    };

    let mut pairs = Vec::with_capacity(roles.pairs.len());
    for pair in &roles.pairs {
        let responder = Actor::responder(
            providers.get(&pair.responder, config)?,
            pair.responder.clone(),
        );
        let revisor = Actor::revisor(providers.get(&pair.revisor, config)?, pair.revisor.clone());
        let mut runner = QuestionRunner::new(
            responder,
            revisor,
            tools.clone(),
            IterationController::new(policy),
        );
        if let Some(ref cb) = progress {
            runner = runner.with_progress(cb.clone());
        }
        pairs.push(PairRunner {
            pair: pair.clone(),
            runner,
        });
    }

    let evaluator = LlmEvaluator::new(providers.get(&roles.judge, config)?, roles.judge.clone())
        .with_temperature(config.evaluation.temperature)
        .with_gold(config.evaluation.use_gold);

    let records = load_questions(config, questions).await?;
    tracing::info!(
        "{} question(s), {} pair(s), stop policy {}",
        records.len(),
        roles.pairs.len(),
        policy
    );

    let mut experiment = Experiment::new(pairs, Arc::new(evaluator), config.run.on_question_error);
    if let Some(cb) = progress {
        experiment = experiment.with_progress(cb);
    }
    let results = experiment.run(&records).await?;

    let output_path = output
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(&config.run.output));
    report::write_results(&output_path, &results)?;

    if !quiet {
        eprintln!("\nSaved {} result(s) to {}", results.len(), output_path.display());
    }
    print!("{}", report::summarize(&results).render());
    Ok(())
}

async fn load_questions(
    config: &Config,
    questions: Option<&str>,
) -> anyhow::Result<Vec<QuestionRecord>> {
    match questions {
        Some(path) => {
            let path = Path::new(path);
            let cached = path
                .file_name()
                .is_some_and(|n| n.to_string_lossy().starts_with("hotpotqa_subset_"));
            if cached {
                Ok(dataset::load_cached_sample(path)?)
            } else {
                Ok(dataset::load_custom_questions(path)?)
            }
        }
        None => {
            let sampler = HotpotQaSampler::new(paths::data_dir());
            let (records, path) = sampler.sample(config.run.num_questions).await?;
            tracing::debug!("Sample cached at {}", path.display());
            Ok(records)
        }
    }
}
