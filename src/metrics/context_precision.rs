//! Context Precision: rank-weighted usefulness of the retrieved passages.
//!
//! The judge renders an independent useful/not-useful verdict for every
//! passage. Useful passages appearing earlier in retrieval-rank order are
//! rewarded: each passage contributes its running precision, and only if it
//! is itself useful.

use crate::dataset::EvaluationDataset;
use crate::error::Result;
use crate::judgment::{Verdict, parse_judgment_list};
use crate::llm::{Prompts, TextGeneration};
use crate::metrics::{Metric, Score};
use async_trait::async_trait;
use std::sync::Arc;

/// Guards the denominator when no passage is judged useful; the none-useful
/// score is then exactly 0.0 rather than a division failure.
const EPSILON: f64 = 1e-10;

/// Context Precision metric driver.
pub struct ContextPrecision {
    llm: Arc<dyn TextGeneration>,
}

impl ContextPrecision {
    /// Create a new driver with the given generation client.
    pub fn new(llm: Arc<dyn TextGeneration>) -> Self {
        Self { llm }
    }

    fn build_prompt(question: &str, context: &str) -> String {
        Prompts::context_precision()
            .replace("{question}", question)
            .replace("{context}", context)
    }
}

#[async_trait]
impl Metric for ContextPrecision {
    fn name(&self) -> &'static str {
        "context_precision"
    }

    async fn score_batch(&self, dataset: &EvaluationDataset) -> Result<Vec<Score>> {
        // One prompt per passage, flattened in row order.
        let mut prompts = Vec::new();
        let mut passage_counts = Vec::with_capacity(dataset.len());

        for (question, contexts) in dataset.questions().iter().zip(dataset.contexts()) {
            passage_counts.push(contexts.len());
            for context in contexts {
                prompts.push(Self::build_prompt(question, context));
            }
        }

        tracing::debug!(
            rows = dataset.len(),
            prompts = prompts.len(),
            "submitting context precision batch"
        );
        let results = self.llm.generate(&prompts, 1).await?;

        // Slice the flat completion list back into per-row groups.
        let mut scores = Vec::with_capacity(dataset.len());
        let mut cursor = 0;

        for (row, count) in passage_counts.into_iter().enumerate() {
            if count == 0 {
                // Nothing was retrieved; there is no precision to measure.
                scores.push(None);
                continue;
            }

            let group = &results[cursor..cursor + count];
            cursor += count;

            let verdicts: Vec<Verdict> = group
                .iter()
                .map(|completions| match parse_judgment_list(&completions[0]) {
                    Ok(judgments) => judgments
                        .first()
                        .map(|j| j.verdict)
                        .unwrap_or(Verdict::Undeterminable),
                    Err(err) => {
                        tracing::warn!(row, %err, "unparseable usefulness verdict");
                        Verdict::Undeterminable
                    }
                })
                .collect();

            scores.push(aggregate(&verdicts));
        }

        Ok(scores)
    }
}

/// Reduce per-passage verdicts, in retrieval-rank order, to a score.
///
/// score = Σ_i (precision@i · v_i) / (Σ v_i + ε), with v_i ∈ {0, 1}.
/// An undeterminable verdict poisons both sums (NaN), making the row's
/// score undefined; an all-negative row divides 0 by ε and stays 0.0.
fn aggregate(verdicts: &[Verdict]) -> Score {
    if verdicts.is_empty() {
        return None;
    }

    let values: Vec<f64> = verdicts
        .iter()
        .map(|verdict| match verdict {
            Verdict::Affirmative => 1.0,
            Verdict::Negative => 0.0,
            Verdict::Undeterminable => f64::NAN,
        })
        .collect();

    let mut cumulative = 0.0;
    let mut numerator = 0.0;
    for (i, value) in values.iter().enumerate() {
        cumulative += value;
        numerator += (cumulative / (i + 1) as f64) * value;
    }

    let denominator = values.iter().sum::<f64>() + EPSILON;
    let score = numerator / denominator;

    (!score.is_nan()).then_some(score)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::testing::ScriptedGeneration;

    fn dataset(rows: Vec<(&str, Vec<&str>)>) -> EvaluationDataset {
        let questions = rows.iter().map(|(q, _)| q.to_string()).collect();
        let answers = rows.iter().map(|_| "answer".to_string()).collect();
        let contexts = rows
            .iter()
            .map(|(_, ctx)| ctx.iter().map(|c| c.to_string()).collect())
            .collect();
        EvaluationDataset::from_columns(questions, answers, contexts, None).unwrap()
    }

    #[test]
    fn test_all_useful_scores_one() {
        let verdicts = vec![Verdict::Affirmative; 4];
        let score = aggregate(&verdicts).unwrap();
        assert!((score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_none_useful_scores_zero_not_undefined() {
        let verdicts = vec![Verdict::Negative; 3];
        assert_eq!(aggregate(&verdicts), Some(0.0));
    }

    #[test]
    fn test_useful_first_beats_useful_last() {
        let early = aggregate(&[Verdict::Affirmative, Verdict::Negative]).unwrap();
        let late = aggregate(&[Verdict::Negative, Verdict::Affirmative]).unwrap();
        assert!(early > late);
        assert!((early - 1.0).abs() < 1e-9);
        assert!((late - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_undeterminable_verdict_is_undefined() {
        let verdicts = [Verdict::Affirmative, Verdict::Undeterminable];
        assert_eq!(aggregate(&verdicts), None);
    }

    #[test]
    fn test_empty_is_undefined() {
        assert_eq!(aggregate(&[]), None);
    }

    #[tokio::test]
    async fn test_score_batch_groups_by_passage_count() {
        let ds = dataset(vec![
            ("q1", vec!["c1", "c2"]),
            ("q2", vec!["c3"]),
        ]);
        let llm = Arc::new(ScriptedGeneration::single_phase(vec![
            r#"{"reason": "on topic", "verdict": "Yes"}"#,
            r#"{"reason": "off topic", "verdict": "No"}"#,
            r#"{"reason": "off topic", "verdict": "No"}"#,
        ]));

        let scores = ContextPrecision::new(llm).score_batch(&ds).await.unwrap();
        assert_eq!(scores.len(), 2);
        assert!((scores[0].unwrap() - 1.0).abs() < 1e-9);
        assert_eq!(scores[1], Some(0.0));
    }

    #[tokio::test]
    async fn test_zero_passages_is_undefined() {
        let ds = dataset(vec![("q1", vec![]), ("q2", vec!["c1"])]);
        let llm = Arc::new(ScriptedGeneration::single_phase(vec![
            r#"{"reason": "on topic", "verdict": "Yes"}"#,
        ]));

        let scores = ContextPrecision::new(llm).score_batch(&ds).await.unwrap();
        assert_eq!(scores.len(), 2);
        assert_eq!(scores[0], None);
        assert!((scores[1].unwrap() - 1.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_malformed_verdict_keeps_position() {
        let ds = dataset(vec![
            ("q1", vec!["c1"]),
            ("q2", vec!["c2"]),
            ("q3", vec!["c3"]),
        ]);
        let llm = Arc::new(ScriptedGeneration::single_phase(vec![
            r#"{"reason": "on topic", "verdict": "Yes"}"#,
            "I refuse to answer in JSON.",
            r#"{"reason": "off topic", "verdict": "No"}"#,
        ]));

        let scores = ContextPrecision::new(llm).score_batch(&ds).await.unwrap();
        assert_eq!(scores.len(), 3);
        assert!(scores[0].is_some());
        assert_eq!(scores[1], None);
        assert_eq!(scores[2], Some(0.0));
    }
}
