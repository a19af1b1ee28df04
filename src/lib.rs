//! RAG Evaluator - LLM-judged quality metrics for RAG pipelines.
//!
//! This library is a Rust port of the [Ragas](https://github.com/explodinggradients/ragas)
//! evaluation metrics: it prompts a judge LLM about the relationships between
//! a question, the retrieved context passages, the generated answer, and an
//! optional ground truth, then aggregates the judge's structured verdicts
//! into one score per example.
//!
//! # Metrics
//!
//! - **Faithfulness**: fraction of the answer's atomic claims supported by
//!   the retrieved context.
//! - **Answer Relevancy**: embedding similarity between the original
//!   question and questions regenerated from the answer.
//! - **Context Precision**: rank-weighted usefulness of the retrieved
//!   passages.
//! - **Context Recall**: fraction of ground-truth claims attributable to the
//!   retrieved context.
//!
//! Scores are `Option<f64>`: judge output that cannot be parsed, or
//! degenerate input (no passages, no statements, a zero-norm embedding),
//! yields `None` at that row while the rest of the batch scores normally.
//! The score list always has exactly one entry per input row.
//!
//! # Quick Start
//!
//! ```no_run
//! use rag_evaluator::{
//!     config::Config,
//!     dataset::EvaluationDataset,
//!     embedding::EmbeddingClient,
//!     llm::LlmClient,
//!     metrics::{Faithfulness, Metric, MetricReport},
//! };
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // Load configuration
//!     let config = Config::load()?;
//!     config.validate()?;
//!
//!     // Create clients
//!     let llm = Arc::new(LlmClient::new(config.llm.clone()));
//!     let _embeddings = Arc::new(EmbeddingClient::new(config.resolved_embedding()));
//!
//!     // Load the RAG outputs to score
//!     let dataset = EvaluationDataset::load_json(Path::new("dataset.json"))?;
//!
//!     // Score the batch
//!     let metric = Faithfulness::new(llm);
//!     let scores = metric.score_batch(&dataset).await?;
//!
//!     let report = MetricReport::new(metric.name(), scores);
//!     println!("{}: mean {:?} ({} undefined)", report.metric, report.mean, report.undefined);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - **EvaluationDataset**: column-oriented batch of RAG outputs
//! - **LlmClient / EmbeddingClient**: OpenAI-compatible API clients behind
//!   the `TextGeneration` / `TextEmbedding` seams
//! - **judgment**: tolerant parser from judge output to verdict records
//! - **similarity**: cosine similarity over embedding vectors
//! - **metrics**: one driver + pure aggregator per metric

pub mod config;
pub mod dataset;
pub mod embedding;
pub mod error;
pub mod judgment;
pub mod llm;
pub mod metrics;
pub mod similarity;

// Re-export commonly used types
pub use config::Config;
pub use dataset::{EvaluationDataset, RagRecord};
pub use embedding::{EmbeddingClient, TextEmbedding};
pub use error::{RagEvalError, Result};
pub use judgment::{Judgment, Verdict};
pub use llm::{LlmClient, TextGeneration};
pub use metrics::{
    AnswerRelevancy, ContextPrecision, ContextRecall, Faithfulness, Metric, MetricReport, Score,
};
