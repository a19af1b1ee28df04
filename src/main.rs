//! RAG Evaluator CLI
//!
//! Scores RAG pipeline outputs with LLM-judged quality metrics.
//!
//! Usage:
//!   rag-eval evaluate <dataset.json>   # Score a dataset file
//!   rag-eval sample                    # Score the built-in sample dataset
//!   rag-eval test                      # Test LLM connection
//!
//! Options:
//!   --metrics <names>        # Comma-separated metric names (default: all applicable)
//!   --max-items <N>          # Limit number of rows
//!   --strictness <N>         # Regenerated questions per answer (answer relevancy)
//!   --output <path>          # Save per-row scores to a JSON file

use anyhow::Result;
use clap::{Parser, Subcommand};
use rag_evaluator::config::Config;
use rag_evaluator::dataset::{EvaluationDataset, create_sample_dataset};
use rag_evaluator::embedding::EmbeddingClient;
use rag_evaluator::llm::LlmClient;
use rag_evaluator::metrics::{
    AnswerRelevancy, ContextPrecision, ContextRecall, Faithfulness, Metric, MetricReport,
};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// RAG Evaluator - LLM-judged quality metrics for RAG pipelines
#[derive(Parser)]
#[command(name = "rag-eval")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Metrics to run (comma-separated): faithfulness, answer_relevancy,
    /// context_precision, context_recall. Defaults to every metric the
    /// dataset has the columns for.
    #[arg(long, global = true, value_delimiter = ',')]
    metrics: Vec<String>,

    /// Maximum number of rows to score
    #[arg(long, global = true)]
    max_items: Option<usize>,

    /// Number of regenerated questions per answer (answer relevancy)
    #[arg(long, global = true)]
    strictness: Option<usize>,

    /// Save per-row scores to a JSON file
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Score a JSON dataset file (array of {question, answer, contexts, ground_truths})
    Evaluate {
        /// Path to the dataset JSON file
        path: PathBuf,
    },

    /// Score the built-in sample dataset (for quick testing)
    Sample,

    /// Test LLM connection
    Test,
}

/// Report written by `--output`.
#[derive(Serialize)]
struct EvaluationReport {
    dataset: String,
    rows: usize,
    metrics: Vec<MetricReport>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    // Load config
    let config = Config::load()?;

    if let Commands::Test = cli.command {
        config.validate()?;
        let client = LlmClient::new(config.llm.clone());
        println!("Testing connection to {}...", config.llm.api_base);
        client.test_connection().await?;
        println!("Connection OK (model: {})", config.llm.model);
        return Ok(());
    }

    // Load dataset
    let (dataset, dataset_name) = match &cli.command {
        Commands::Evaluate { path } => {
            println!("Loading dataset from {:?}...", path);
            (
                EvaluationDataset::load_json(path)?,
                path.display().to_string(),
            )
        }
        Commands::Sample => {
            println!("Using sample dataset...");
            (create_sample_dataset(), "sample".to_string())
        }
        Commands::Test => unreachable!(),
    };

    let dataset = match cli.max_items {
        Some(n) => dataset.take(n),
        None => dataset,
    };

    if dataset.is_empty() {
        eprintln!("Error: dataset has no rows");
        std::process::exit(1);
    }

    println!("Dataset: {} ({} rows)", dataset_name, dataset.len());

    config.validate()?;
    let strictness = cli.strictness.unwrap_or(config.eval.strictness);

    let llm: Arc<LlmClient> = Arc::new(LlmClient::new(config.llm.clone()));
    let embeddings = Arc::new(EmbeddingClient::new(config.resolved_embedding()));

    let metrics = select_metrics(&cli.metrics, &dataset, llm, embeddings, strictness)?;

    // Run each metric over the whole batch
    let mut reports = Vec::with_capacity(metrics.len());
    for metric in &metrics {
        println!("Scoring {}...", metric.name());
        let scores = metric.score_batch(&dataset).await?;
        reports.push(MetricReport::new(metric.name(), scores));
    }

    print_summary(&reports);

    // Save results if requested
    if let Some(output_path) = cli.output {
        let report = EvaluationReport {
            dataset: dataset_name,
            rows: dataset.len(),
            metrics: reports,
        };
        let json = serde_json::to_string_pretty(&report)?;
        std::fs::write(&output_path, json)?;
        println!("Results saved to {:?}", output_path);
    }

    Ok(())
}

/// Resolve the requested metric names against the dataset's columns.
///
/// With no explicit request, every applicable metric runs; context recall is
/// skipped (with a note) when the dataset has no ground truths. Explicitly
/// requesting it on an unannotated dataset fails when the metric runs.
fn select_metrics(
    requested: &[String],
    dataset: &EvaluationDataset,
    llm: Arc<LlmClient>,
    embeddings: Arc<EmbeddingClient>,
    strictness: usize,
) -> Result<Vec<Box<dyn Metric>>> {
    let names: Vec<String> = if requested.is_empty() {
        let mut names = vec![
            "faithfulness".to_string(),
            "answer_relevancy".to_string(),
            "context_precision".to_string(),
        ];
        if dataset.ground_truths().is_some() {
            names.push("context_recall".to_string());
        } else {
            println!("Note: no ground_truths column, skipping context_recall");
        }
        names
    } else {
        requested.to_vec()
    };

    let mut metrics: Vec<Box<dyn Metric>> = Vec::with_capacity(names.len());
    for name in &names {
        match name.trim() {
            "faithfulness" => metrics.push(Box::new(Faithfulness::new(llm.clone()))),
            "answer_relevancy" => metrics.push(Box::new(
                AnswerRelevancy::new(llm.clone(), embeddings.clone()).with_strictness(strictness),
            )),
            "context_precision" => metrics.push(Box::new(ContextPrecision::new(llm.clone()))),
            "context_recall" => metrics.push(Box::new(ContextRecall::new(llm.clone()))),
            other => {
                anyhow::bail!(
                    "Unknown metric '{}'. Available: faithfulness, answer_relevancy, context_precision, context_recall",
                    other
                );
            }
        }
    }

    Ok(metrics)
}

/// Print the summary table to stdout.
fn print_summary(reports: &[MetricReport]) {
    println!("\n========== Evaluation Results ==========");
    for report in reports {
        match report.mean {
            Some(mean) => println!(
                "{:<20} {:.4}  ({} undefined)",
                report.metric, mean, report.undefined
            ),
            None => println!(
                "{:<20} n/a     ({} undefined)",
                report.metric, report.undefined
            ),
        }
    }
    println!("========================================\n");
}
