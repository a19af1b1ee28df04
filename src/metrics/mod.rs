//! The four RAG quality metrics.
//!
//! Each metric is a driver struct owning its external clients plus a pure
//! aggregation function. Drivers submit one order-preserving batch of judge
//! prompts per phase and slice the flat result back into per-example groups;
//! aggregators reduce the parsed judgments for one example to a [`Score`].

pub mod answer_relevancy;
pub mod context_precision;
pub mod context_recall;
pub mod faithfulness;

pub use answer_relevancy::AnswerRelevancy;
pub use context_precision::ContextPrecision;
pub use context_recall::ContextRecall;
pub use faithfulness::Faithfulness;

use crate::dataset::EvaluationDataset;
use crate::error::Result;
use async_trait::async_trait;
use serde::Serialize;

/// One score per example. `None` marks an undefined score (unparseable
/// judge output or degenerate input); defined values are in [0, 1] for the
/// judgment metrics and [-1, 1] for Answer Relevancy.
pub type Score = Option<f64>;

/// Convert a score to a float for numeric sinks that cannot represent null.
pub fn score_to_f64(score: Score) -> f64 {
    score.unwrap_or(f64::NAN)
}

/// A batch-scoring metric.
///
/// Implementations must return exactly one score per dataset row, in row
/// order, with undefined entries kept in position.
#[async_trait]
pub trait Metric: Send + Sync {
    /// Metric name, as used in reports and on the CLI.
    fn name(&self) -> &'static str;

    /// Score every row of the dataset.
    async fn score_batch(&self, dataset: &EvaluationDataset) -> Result<Vec<Score>>;
}

/// Scores and summary statistics for one metric over one dataset.
#[derive(Debug, Clone, Serialize)]
pub struct MetricReport {
    /// Metric name.
    pub metric: String,
    /// One score per row; undefined scores serialize as `null`.
    pub scores: Vec<Score>,
    /// Mean over the defined scores (absent if none are defined).
    pub mean: Option<f64>,
    /// Number of undefined scores.
    pub undefined: usize,
}

impl MetricReport {
    /// Summarize a score column.
    pub fn new(metric: impl Into<String>, scores: Vec<Score>) -> Self {
        let defined: Vec<f64> = scores.iter().flatten().copied().collect();
        let undefined = scores.len() - defined.len();
        let mean = if defined.is_empty() {
            None
        } else {
            Some(defined.iter().sum::<f64>() / defined.len() as f64)
        };

        Self {
            metric: metric.into(),
            scores,
            mean,
            undefined,
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted client doubles for driver tests.

    use crate::embedding::TextEmbedding;
    use crate::error::{RagEvalError, Result};
    use crate::llm::TextGeneration;
    use async_trait::async_trait;
    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;

    /// A generation client that replays canned batches, one per
    /// `generate` call, checking that prompt counts line up.
    pub struct ScriptedGeneration {
        batches: Mutex<VecDeque<Vec<Vec<String>>>>,
    }

    impl ScriptedGeneration {
        pub fn new(batches: Vec<Vec<Vec<String>>>) -> Self {
            Self {
                batches: Mutex::new(batches.into()),
            }
        }

        /// Single-phase, single-completion shorthand.
        pub fn single_phase(completions: Vec<&str>) -> Self {
            Self::new(vec![
                completions
                    .into_iter()
                    .map(|c| vec![c.to_string()])
                    .collect(),
            ])
        }
    }

    #[async_trait]
    impl TextGeneration for ScriptedGeneration {
        async fn generate(&self, prompts: &[String], _n: usize) -> Result<Vec<Vec<String>>> {
            let batch = self
                .batches
                .lock()
                .unwrap()
                .pop_front()
                .expect("unexpected generate call");
            assert_eq!(
                batch.len(),
                prompts.len(),
                "scripted batch size does not match submitted prompts"
            );
            Ok(batch)
        }
    }

    /// An embedding client that looks vectors up by exact text.
    pub struct StaticEmbedding {
        vectors: HashMap<String, Vec<f32>>,
    }

    impl StaticEmbedding {
        pub fn new(entries: Vec<(&str, Vec<f32>)>) -> Self {
            Self {
                vectors: entries
                    .into_iter()
                    .map(|(text, vector)| (text.to_string(), vector))
                    .collect(),
            }
        }

        fn lookup(&self, text: &str) -> Result<Vec<f32>> {
            self.vectors
                .get(text)
                .cloned()
                .ok_or_else(|| RagEvalError::EmbeddingApi(format!("no vector for '{}'", text)))
        }
    }

    #[async_trait]
    impl TextEmbedding for StaticEmbedding {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            self.lookup(text)
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            texts.iter().map(|text| self.lookup(text)).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_report_summary() {
        let report = MetricReport::new("faithfulness", vec![Some(1.0), None, Some(0.5)]);
        assert_eq!(report.undefined, 1);
        assert!((report.mean.unwrap() - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_metric_report_all_undefined() {
        let report = MetricReport::new("faithfulness", vec![None, None]);
        assert_eq!(report.undefined, 2);
        assert!(report.mean.is_none());
    }

    #[test]
    fn test_undefined_serializes_as_null() {
        let report = MetricReport::new("context_recall", vec![Some(0.5), None]);
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("[0.5,null]"));
    }

    #[test]
    fn test_score_to_f64() {
        assert_eq!(score_to_f64(Some(0.25)), 0.25);
        assert!(score_to_f64(None).is_nan());
    }
}
