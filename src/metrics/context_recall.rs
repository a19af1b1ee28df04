//! Context Recall: fraction of ground-truth statements attributable to the
//! retrieved context.
//!
//! The judge decomposes the ground-truth answer into sentences and
//! classifies each as attributable to the context or not. Requires the
//! `ground_truths` column.

use crate::dataset::EvaluationDataset;
use crate::error::{RagEvalError, Result};
use crate::judgment::{Judgment, Verdict, parse_judgment_list};
use crate::llm::{Prompts, TextGeneration};
use crate::metrics::{Metric, Score};
use async_trait::async_trait;
use std::sync::Arc;

/// Context Recall metric driver.
pub struct ContextRecall {
    llm: Arc<dyn TextGeneration>,
}

impl ContextRecall {
    /// Create a new driver with the given generation client.
    pub fn new(llm: Arc<dyn TextGeneration>) -> Self {
        Self { llm }
    }

    fn build_prompt(question: &str, contexts: &[String], ground_truth: &[String]) -> String {
        Prompts::context_recall()
            .replace("{question}", question)
            .replace("{context}", &contexts.join("\n"))
            .replace("{answer}", &ground_truth.join("\n"))
    }
}

#[async_trait]
impl Metric for ContextRecall {
    fn name(&self) -> &'static str {
        "context_recall"
    }

    async fn score_batch(&self, dataset: &EvaluationDataset) -> Result<Vec<Score>> {
        let ground_truths = dataset
            .ground_truths()
            .ok_or(RagEvalError::MissingColumn {
                metric: "context_recall",
                column: "ground_truths",
            })?;

        let prompts: Vec<String> = dataset
            .questions()
            .iter()
            .zip(dataset.contexts())
            .zip(ground_truths)
            .map(|((question, contexts), ground_truth)| {
                Self::build_prompt(question, contexts, ground_truth)
            })
            .collect();

        tracing::debug!(rows = prompts.len(), "submitting context recall batch");
        let results = self.llm.generate(&prompts, 1).await?;

        let scores = results
            .iter()
            .enumerate()
            .map(|(row, completions)| match parse_judgment_list(&completions[0]) {
                Ok(judgments) => aggregate(&judgments),
                Err(err) => {
                    tracing::warn!(row, %err, "unparseable attribution list");
                    None
                }
            })
            .collect();

        Ok(scores)
    }
}

/// Attributed statements over total statements. An empty classification is
/// undefined, never 0 or 1. Statements the judge could not settle count
/// against recall (denominator only).
fn aggregate(judgments: &[Judgment]) -> Score {
    if judgments.is_empty() {
        return None;
    }
    let attributed = judgments
        .iter()
        .filter(|j| j.verdict == Verdict::Affirmative)
        .count();
    Some(attributed as f64 / judgments.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::testing::ScriptedGeneration;

    fn judgment(verdict: Verdict) -> Judgment {
        Judgment {
            statement: "s".to_string(),
            reason: "r".to_string(),
            verdict,
        }
    }

    fn dataset(rows: usize) -> EvaluationDataset {
        EvaluationDataset::from_columns(
            (0..rows).map(|i| format!("q{}", i)).collect(),
            (0..rows).map(|i| format!("a{}", i)).collect(),
            (0..rows).map(|i| vec![format!("c{}", i)]).collect(),
            Some((0..rows).map(|i| vec![format!("gt{}", i)]).collect()),
        )
        .unwrap()
    }

    #[test]
    fn test_all_attributed_scores_one() {
        let judgments = vec![judgment(Verdict::Affirmative); 3];
        assert_eq!(aggregate(&judgments), Some(1.0));
    }

    #[test]
    fn test_none_attributed_scores_zero() {
        let judgments = vec![judgment(Verdict::Negative); 3];
        assert_eq!(aggregate(&judgments), Some(0.0));
    }

    #[test]
    fn test_half_attributed() {
        // Attributions [Ja, Ja, Nein, Nein] -> 0.5
        let judgments = vec![
            judgment(Verdict::Affirmative),
            judgment(Verdict::Affirmative),
            judgment(Verdict::Negative),
            judgment(Verdict::Negative),
        ];
        assert_eq!(aggregate(&judgments), Some(0.5));
    }

    #[test]
    fn test_undeterminable_counts_in_denominator_only() {
        let judgments = vec![
            judgment(Verdict::Affirmative),
            judgment(Verdict::Undeterminable),
        ];
        assert_eq!(aggregate(&judgments), Some(0.5));
    }

    #[test]
    fn test_empty_classification_is_undefined() {
        assert_eq!(aggregate(&[]), None);
    }

    #[tokio::test]
    async fn test_requires_ground_truths() {
        let ds = EvaluationDataset::from_columns(
            vec!["q".to_string()],
            vec!["a".to_string()],
            vec![vec!["c".to_string()]],
            None,
        )
        .unwrap();
        let llm = Arc::new(ScriptedGeneration::new(vec![]));

        let result = ContextRecall::new(llm).score_batch(&ds).await;
        assert!(matches!(
            result,
            Err(RagEvalError::MissingColumn {
                metric: "context_recall",
                column: "ground_truths",
            })
        ));
    }

    #[tokio::test]
    async fn test_one_malformed_row_in_five_keeps_alignment() {
        let ds = dataset(5);
        let attributed = r#"[{"statement_1": "s", "reason": "r", "Attributed": "Yes"}]"#;
        let llm = Arc::new(ScriptedGeneration::single_phase(vec![
            attributed,
            attributed,
            "Sorry, I can only answer in prose.",
            attributed,
            attributed,
        ]));

        let scores = ContextRecall::new(llm).score_batch(&ds).await.unwrap();
        assert_eq!(scores.len(), 5);
        assert_eq!(scores.iter().filter(|s| s.is_some()).count(), 4);
        assert_eq!(scores[2], None);
    }

    #[tokio::test]
    async fn test_score_batch_end_to_end() {
        let ds = dataset(2);
        let llm = Arc::new(ScriptedGeneration::single_phase(vec![
            r#"[
                {"statement_1": "s1", "reason": "r", "Attributed": "Ja"},
                {"statement_2": "s2", "reason": "r", "Attributed": "Ja"},
                {"statement_3": "s3", "reason": "r", "Attributed": "Nein"},
                {"statement_4": "s4", "reason": "r", "Attributed": "Nein"}
            ]"#,
            "no json here",
        ]));

        let scores = ContextRecall::new(llm).score_batch(&ds).await.unwrap();
        assert_eq!(scores, vec![Some(0.5), None]);
    }
}
