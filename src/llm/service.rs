//! Seams between the pipeline and the external embedding/generation services.

use crate::error::Result;
use serde::Serialize;
use std::future::Future;

/// Retrieval role of the text being embedded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskType {
    /// A corpus chunk that will be searched.
    RetrievalDocument,
    /// A user question used to search the corpus.
    RetrievalQuery,
}

/// Maps one text to one vector.
pub trait EmbeddingService {
    fn embed(&self, text: &str, task: TaskType) -> impl Future<Output = Result<Vec<f32>>> + Send;
}

/// Produces a text response for a prompt.
pub trait GenerationService {
    /// Free-text generation.
    fn generate(&self, prompt: &str) -> impl Future<Output = Result<String>> + Send;

    /// Generation constrained to JSON matching `schema`.
    ///
    /// Services without schema support may ignore the schema and return free text;
    /// callers must still parse defensively.
    fn generate_json(
        &self,
        prompt: &str,
        schema: &serde_json::Value,
    ) -> impl Future<Output = Result<String>> + Send;
}
