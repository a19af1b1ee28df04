//! LLM module: the text-generation seam and its OpenAI-compatible client.

pub mod client;
pub mod prompts;

pub use client::{LlmClient, LlmResponse, Message, Role, TokenUsage};
pub use prompts::Prompts;

use crate::error::Result;
use async_trait::async_trait;

/// The text-generation collaborator the metric drivers talk to.
///
/// Implementations must be order-preserving: the outer vector matches the
/// prompt order, and each inner vector holds the `n` completions sampled
/// for that prompt.
#[async_trait]
pub trait TextGeneration: Send + Sync {
    async fn generate(&self, prompts: &[String], n: usize) -> Result<Vec<Vec<String>>>;
}
