//! Faithfulness: fraction of the generated answer's claims supported by the
//! retrieved context.
//!
//! Two judge phases per batch: the answer is first decomposed into atomic
//! statements, then each statement is checked against the context with a
//! three-valued verdict (supported / unsupported / undeterminable). A single
//! undeterminable verdict makes the row's score undefined.

use crate::dataset::EvaluationDataset;
use crate::error::Result;
use crate::judgment::{Judgment, Verdict, parse_judgment_list, parse_statements};
use crate::llm::{Prompts, TextGeneration};
use crate::metrics::{Metric, Score};
use async_trait::async_trait;
use std::sync::Arc;

/// Faithfulness metric driver.
pub struct Faithfulness {
    llm: Arc<dyn TextGeneration>,
}

impl Faithfulness {
    /// Create a new driver with the given generation client.
    pub fn new(llm: Arc<dyn TextGeneration>) -> Self {
        Self { llm }
    }

    fn extraction_prompt(question: &str, answer: &str) -> String {
        Prompts::statement_extraction()
            .replace("{question}", question)
            .replace("{answer}", answer)
    }

    fn nli_prompt(contexts: &[String], statements: &[String]) -> String {
        let statements_block = statements
            .iter()
            .enumerate()
            .map(|(i, statement)| format!("statement_{}: {}", i + 1, statement))
            .collect::<Vec<_>>()
            .join("\n");

        Prompts::nli_statements()
            .replace("{context}", &contexts.join("\n"))
            .replace("{statements}", &statements_block)
    }
}

#[async_trait]
impl Metric for Faithfulness {
    fn name(&self) -> &'static str {
        "faithfulness"
    }

    async fn score_batch(&self, dataset: &EvaluationDataset) -> Result<Vec<Score>> {
        // Phase 1: decompose each answer into atomic statements.
        let extraction_prompts: Vec<String> = dataset
            .questions()
            .iter()
            .zip(dataset.answers())
            .map(|(question, answer)| Self::extraction_prompt(question, answer))
            .collect();

        tracing::debug!(
            rows = extraction_prompts.len(),
            "submitting statement extraction batch"
        );
        let extractions = self.llm.generate(&extraction_prompts, 1).await?;

        // Rows whose extraction failed or produced nothing get an undefined
        // score without a second judge call; `nli_rows` remembers which
        // dataset row each surviving prompt belongs to.
        let mut nli_prompts = Vec::new();
        let mut nli_rows = Vec::new();

        for (row, completions) in extractions.iter().enumerate() {
            let statements = match parse_statements(&completions[0]) {
                Ok(statements) => statements,
                Err(err) => {
                    tracing::warn!(row, %err, "unparseable statement extraction");
                    continue;
                }
            };
            if statements.is_empty() {
                tracing::warn!(row, "answer decomposed into zero statements");
                continue;
            }
            nli_prompts.push(Self::nli_prompt(&dataset.contexts()[row], &statements));
            nli_rows.push(row);
        }

        // Phase 2: verdict per statement, judged against the context.
        let verdicts = self.llm.generate(&nli_prompts, 1).await?;

        let mut scores = vec![None; dataset.len()];
        for (row, completions) in nli_rows.into_iter().zip(&verdicts) {
            scores[row] = match parse_judgment_list(&completions[0]) {
                Ok(judgments) => aggregate(&judgments),
                Err(err) => {
                    tracing::warn!(row, %err, "unparseable faithfulness verdicts");
                    None
                }
            };
        }

        Ok(scores)
    }
}

/// Mean verdict value with supported=1, unsupported=0, undeterminable=NaN.
/// The NaN propagates through the sum, so any undeterminable statement
/// makes the score undefined; the denominator is always the raw statement
/// count. Zero statements is undefined.
fn aggregate(judgments: &[Judgment]) -> Score {
    if judgments.is_empty() {
        return None;
    }

    let supported: f64 = judgments
        .iter()
        .map(|j| match j.verdict {
            Verdict::Affirmative => 1.0,
            Verdict::Negative => 0.0,
            Verdict::Undeterminable => f64::NAN,
        })
        .sum();

    let score = supported / judgments.len() as f64;
    (!score.is_nan()).then_some(score)
}
