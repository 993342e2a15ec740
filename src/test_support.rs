//! Deterministic stand-ins for the Gemini services.

use crate::error::{RagError, Result};
use crate::llm::{EmbeddingService, GenerationService, TaskType};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

type EmbedFn = Box<dyn Fn(&str) -> Option<Vec<f32>> + Send + Sync>;

/// Embeds text with a closure; `None` from the closure is a service failure.
pub struct MockEmbedder {
    embed_fn: EmbedFn,
    document_calls: AtomicUsize,
    query_calls: AtomicUsize,
}

impl MockEmbedder {
    pub fn new(embed_fn: impl Fn(&str) -> Option<Vec<f32>> + Send + Sync + 'static) -> Self {
        Self {
            embed_fn: Box::new(embed_fn),
            document_calls: AtomicUsize::new(0),
            query_calls: AtomicUsize::new(0),
        }
    }

    pub fn constant(vector: Vec<f32>) -> Self {
        Self::new(move |_| Some(vector.clone()))
    }

    pub fn document_calls(&self) -> usize {
        self.document_calls.load(Ordering::SeqCst)
    }

    pub fn query_calls(&self) -> usize {
        self.query_calls.load(Ordering::SeqCst)
    }
}

impl EmbeddingService for MockEmbedder {
    async fn embed(&self, text: &str, task: TaskType) -> Result<Vec<f32>> {
        match task {
            TaskType::RetrievalDocument => self.document_calls.fetch_add(1, Ordering::SeqCst),
            TaskType::RetrievalQuery => self.query_calls.fetch_add(1, Ordering::SeqCst),
        };
        (self.embed_fn)(text).ok_or_else(|| RagError::LlmApi("mock embedding failure".to_string()))
    }
}

/// Replays scripted responses in order and records every prompt.
///
/// `None` entries are failures; once the script runs out every call fails.
pub struct MockGenerator {
    responses: Mutex<VecDeque<Option<String>>>,
    prompts: Mutex<Vec<String>>,
    json_calls: AtomicUsize,
}

impl MockGenerator {
    pub fn new(responses: impl IntoIterator<Item = Option<String>>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().collect()),
            prompts: Mutex::new(Vec::new()),
            json_calls: AtomicUsize::new(0),
        }
    }

    pub fn scripted<S: Into<String>>(responses: impl IntoIterator<Item = S>) -> Self {
        Self::new(responses.into_iter().map(|r| Some(r.into())))
    }

    pub fn failing() -> Self {
        Self::new([])
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn json_calls(&self) -> usize {
        self.json_calls.load(Ordering::SeqCst)
    }

    fn next(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .flatten()
            .ok_or_else(|| RagError::LlmApi("mock generation failure".to_string()))
    }
}

impl GenerationService for MockGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.next(prompt)
    }

    async fn generate_json(&self, prompt: &str, _schema: &serde_json::Value) -> Result<String> {
        self.json_calls.fetch_add(1, Ordering::SeqCst);
        self.next(prompt)
    }
}
