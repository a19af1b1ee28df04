//! Answer Relevancy: how well the answer addresses the original question.
//!
//! Rather than judging the answer directly, the LLM regenerates the question
//! from the answer `strictness` times; the score is the mean cosine
//! similarity between the original question's embedding and the regenerated
//! ones. Incomplete or off-topic answers regenerate into diverging
//! questions and score low.

use crate::dataset::EvaluationDataset;
use crate::embedding::TextEmbedding;
use crate::error::Result;
use crate::llm::{Prompts, TextGeneration};
use crate::metrics::{Metric, Score};
use crate::similarity::{cosine_similarities, mean_similarity};
use async_trait::async_trait;
use std::sync::Arc;

/// Answer Relevancy metric driver.
pub struct AnswerRelevancy {
    llm: Arc<dyn TextGeneration>,
    embeddings: Arc<dyn TextEmbedding>,
    strictness: usize,
}

impl AnswerRelevancy {
    /// Create a new driver with the default strictness of 3.
    pub fn new(llm: Arc<dyn TextGeneration>, embeddings: Arc<dyn TextEmbedding>) -> Self {
        Self {
            llm,
            embeddings,
            strictness: 3,
        }
    }

    /// Set the number of questions regenerated per answer (at least 1).
    /// The ideal range is 3 to 5.
    pub fn with_strictness(mut self, strictness: usize) -> Self {
        self.strictness = strictness.max(1);
        self
    }

    fn build_prompt(answer: &str) -> String {
        Prompts::question_generation().replace("{answer}", answer)
    }
}

#[async_trait]
impl Metric for AnswerRelevancy {
    fn name(&self) -> &'static str {
        "answer_relevancy"
    }

    async fn score_batch(&self, dataset: &EvaluationDataset) -> Result<Vec<Score>> {
        let prompts: Vec<String> = dataset
            .answers()
            .iter()
            .map(|answer| Self::build_prompt(answer))
            .collect();

        tracing::debug!(
            rows = prompts.len(),
            strictness = self.strictness,
            "submitting question regeneration batch"
        );
        let generated = self.llm.generate(&prompts, self.strictness).await?;

        let mut scores = Vec::with_capacity(dataset.len());
        for (question, regenerated) in dataset.questions().iter().zip(&generated) {
            let question_vector = self.embeddings.embed(question).await?;
            let regenerated_vectors = self.embeddings.embed_batch(regenerated).await?;

            let similarities = cosine_similarities(&question_vector, &regenerated_vectors)?;
            scores.push(mean_similarity(&similarities));
        }

        Ok(scores)
    }
}
