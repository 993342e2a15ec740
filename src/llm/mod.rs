//! Gemini integration module.
//!
//! Provides the service traits the pipeline is written against, a REST
//! client implementing them, and the prompts used for answering and grading.

mod client;
mod prompts;
mod service;

pub use client::{GeminiClient, LlmResponse, TokenUsage};
pub use prompts::{Labels, Language, Prompts};
pub use service::{EmbeddingService, GenerationService, TaskType};
