//! `chunkeval` - score retrieval runs against ground truth.
//!
//! ```bash
//! # Summary table for every experiment in the file
//! chunkeval evaluate --input runs.jsonl
//!
//! # Fact-level matching, top-5, JSON with per-query rows
//! chunkeval evaluate -i runs.jsonl --match containment -k 5 --format json --per-query
//!
//! # Show the configuration that would be used
//! chunkeval config
//! ```

mod input;
mod output;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chunkeval_core::{CorpusEvaluator, EvalConfig, MatchPolicy, MetricCalculator};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::output::OutputFormat;

/// chunkeval - retrieval quality metrics for RAG chunk evaluation
#[derive(Parser, Debug)]
#[command(name = "chunkeval")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Score every case in a JSON Lines file and print per-experiment means
    Evaluate(EvaluateArgs),
    /// Print the resolved configuration as TOML
    Config(ConfigArgs),
}

#[derive(Args, Debug)]
struct ConfigArgs {
    /// Configuration file (default: ./chunkeval.toml if present)
    #[arg(short, long, env = "CHUNKEVAL_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct EvaluateArgs {
    /// JSON Lines file with one case per line (`-` for stdin)
    #[arg(short, long)]
    input: PathBuf,

    /// Configuration file (default: ./chunkeval.toml if present)
    #[arg(short, long, env = "CHUNKEVAL_CONFIG")]
    config: Option<PathBuf>,

    /// Cutoff: number of top-ranked items scored per query
    #[arg(short)]
    k: Option<usize>,

    /// Match policy: `exact` or `containment`
    #[arg(long = "match")]
    match_policy: Option<MatchPolicy>,

    /// Noise cost of a retrieved item that matches no ground-truth id
    #[arg(long)]
    noise_penalty: Option<f64>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// Include one row per query
    #[arg(long)]
    per_query: bool,
}

fn load_config(path: Option<&Path>) -> Result<EvalConfig> {
    match path {
        Some(path) => EvalConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => EvalConfig::load().context("failed to load config"),
    }
}

impl EvaluateArgs {
    /// Config file and environment first, then command-line flags.
    fn resolve_config(&self) -> Result<EvalConfig> {
        let mut config = load_config(self.config.as_deref())?;
        if let Some(k) = self.k {
            config.cutoff = Some(k);
        }
        if let Some(policy) = self.match_policy {
            config.match_policy = policy;
        }
        if let Some(penalty) = self.noise_penalty {
            config.noise_penalty = penalty;
        }
        config.validate().context("invalid command-line option")?;
        Ok(config)
    }
}

fn run_evaluate(args: &EvaluateArgs) -> Result<()> {
    let config = args.resolve_config()?;
    tracing::info!(
        match_policy = %config.match_policy,
        noise_penalty = config.noise_penalty,
        cutoff = ?config.cutoff,
        "Evaluating"
    );

    let experiments = input::load_cases(&args.input)?;
    if experiments.is_empty() {
        anyhow::bail!("{}: no cases to evaluate", args.input.display());
    }

    let evaluator = CorpusEvaluator::new(MetricCalculator::from_config(&config)?);
    let reports = evaluator.evaluate_experiments(&experiments)?;

    println!("{}", output::render(&reports, args.format, args.per_query)?);
    Ok(())
}

fn run_config(args: &ConfigArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    print!("{}", toml::to_string(&config)?);
    Ok(())
}

fn main() -> Result<()> {
    // Logs go to stderr so stdout stays machine-readable
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    match &cli.command {
        Command::Evaluate(args) => run_evaluate(args),
        Command::Config(args) => run_config(args),
    }
}
