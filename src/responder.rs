//! Response generation seam.
//!
//! The chat loop only needs `prompt -> answer`. Retrieval and answer
//! synthesis plug in here by implementing [`ResponseGenerator`].

use async_trait::async_trait;

use crate::error::AppError;

/// Prefix the placeholder puts in front of every echoed prompt.
pub const PLACEHOLDER_PREFIX: &str = "Will be modified: ";

/// Produces an assistant answer for a user prompt.
#[async_trait]
pub trait ResponseGenerator: Send + Sync + std::fmt::Debug {
    /// Generate an answer for `prompt`.
    async fn generate(&self, prompt: &str) -> Result<String, AppError>;

    /// Generator name for logging.
    fn name(&self) -> &'static str;
}

/// Echoes the prompt behind [`PLACEHOLDER_PREFIX`] until a QA engine exists.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderGenerator;

#[async_trait]
impl ResponseGenerator for PlaceholderGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, AppError> {
        Ok(format!("{PLACEHOLDER_PREFIX}{prompt}"))
    }

    fn name(&self) -> &'static str {
        "placeholder"
    }
}
