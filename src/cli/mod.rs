// src/cli/mod.rs — CLI definition (clap derive)

pub mod evaluate;
pub mod progress;
pub mod run;
pub mod summarize;

use std::path::Path;

use clap::{Parser, Subcommand};

use crate::infra::config::Config;

#[derive(Parser)]
#[command(
    name = "reviselab",
    about = "Compare responder and revisor answers to open-domain questions",
    version
)]
pub struct Cli {
    /// JSON file of questions (default: fresh HotpotQA sample)
    #[arg(long)]
    pub questions: Option<String>,

    /// Config file path
    #[arg(long)]
    pub config: Option<String>,

    /// Results file (default: [run] output)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Suppress progress output and lower logging to warnings
    #[arg(long)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Evaluate one {question, responder_answer, revisor_answer, gold_answer?} file
    Evaluate {
        /// Input JSON file
        input: String,
    },
    /// Print win counts and mean criterion scores of a results file
    Summarize {
        /// Results JSON file
        results: String,
    },
}

/// Run the parsed command. The config file is read only by the commands
/// that call models; `summarize` works from the results file alone.
pub async fn dispatch(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Some(Commands::Summarize { ref results }) => summarize::run_summarize(Path::new(results)),
        Some(Commands::Evaluate { ref input }) => {
            let config = load_config(cli.config.as_deref())?;
            evaluate::run_evaluate(&config, Path::new(input)).await
        }
        None => {
            let config = load_config(cli.config.as_deref())?;
            run::run_experiment(
                &config,
                cli.questions.as_deref(),
                cli.output.as_deref(),
                cli.quiet,
            )
            .await
        }
    }
}

/// Explicit path, else the default location (defaults if no config.toml).
fn load_config(path: Option<&str>) -> anyhow::Result<Config> {
    match path {
        Some(p) => Config::load_from(Path::new(p)),
        None => Config::load(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_run_flags() {
        let cli = Cli::try_parse_from(["reviselab", "--questions", "my_questions.json"]).unwrap();
        assert_eq!(cli.questions.as_deref(), Some("my_questions.json"));
        assert!(cli.command.is_none());
        assert!(!cli.quiet);
    }

    #[test]
    fn test_subcommands() {
        let cli = Cli::try_parse_from(["reviselab", "summarize", "results.json"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Summarize { ref results }) if results == "results.json"));

        let cli = Cli::try_parse_from(["reviselab", "--quiet", "evaluate", "in.json"]).unwrap();
        assert!(cli.quiet);
        assert!(matches!(cli.command, Some(Commands::Evaluate { .. })));
    }

    #[test]
    fn test_unknown_flag_rejected() {
        assert!(Cli::try_parse_from(["reviselab", "--iterate", "3"]).is_err());
    }

    #[tokio::test]
    async fn test_summarize_ignores_config() {
        let dir = tempfile::tempdir().unwrap();
        let results = dir.path().join("results.json");
        std::fs::write(&results, "[]").unwrap();
        let missing = dir.path().join("no-such-config.toml");

        let cli = Cli::try_parse_from([
            "reviselab",
            "--config",
            missing.to_str().unwrap(),
            "summarize",
            results.to_str().unwrap(),
        ])
        .unwrap();
        dispatch(cli).await.unwrap();
    }

    #[tokio::test]
    async fn test_evaluate_reads_config() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("no-such-config.toml");
        let cli = Cli::try_parse_from([
            "reviselab",
            "--config",
            missing.to_str().unwrap(),
            "evaluate",
            "in.json",
        ])
        .unwrap();
        assert!(dispatch(cli).await.is_err());
    }
}
