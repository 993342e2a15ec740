//! Gemini REST client.
//!
//! Talks to the `generateContent` and `embedContent` endpoints of the
//! Generative Language API and implements both service traits.

use super::prompts::Prompts;
use super::service::{EmbeddingService, GenerationService, TaskType};
use crate::config::LlmConfig;
use crate::error::{RagError, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Author of a piece of content.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
}

/// A piece of content sent to the API.
#[derive(Debug, Clone, Serialize)]
pub struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    pub parts: Vec<Part>,
}

impl Content {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Some(Role::User),
            parts: vec![Part { text: text.into() }],
        }
    }

    /// Content without a role, as `embedContent` expects.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            role: None,
            parts: vec![Part { text: text.into() }],
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Part {
    pub text: String,
}

/// Request body for `generateContent`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content>,
    generation_config: GenerationConfig<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<&'a serde_json::Value>,
}

/// Response from `generateContent`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
    #[serde(default)]
    total_token_count: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

/// Request body for `embedContent`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EmbedContentRequest {
    model: String,
    content: Content,
    task_type: TaskType,
}

#[derive(Debug, Deserialize)]
struct EmbedContentResponse {
    embedding: ContentEmbedding,
}

#[derive(Debug, Deserialize)]
struct ContentEmbedding {
    values: Vec<f32>,
}

/// Google API error response.
#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
    #[serde(default)]
    status: Option<String>,
}

/// Response from a generation call including metadata.
#[derive(Debug)]
pub struct LlmResponse {
    /// The generated text.
    pub content: String,
    /// Reason the model stopped generating.
    pub finish_reason: Option<String>,
    /// Token usage (if available).
    pub usage: Option<TokenUsage>,
}

#[derive(Debug)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Gemini client for generation and embeddings.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    config: LlmConfig,
}

impl GeminiClient {
    /// Create a new client with the given configuration.
    pub fn new(config: LlmConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Get the URL of `method` on `model`.
    fn endpoint(&self, model: &str, method: &str) -> String {
        let base = self.config.api_base.trim_end_matches('/');
        let model = model.trim_start_matches("models/");
        format!("{}/v1beta/models/{}:{}", base, model, method)
    }

    /// POST a JSON body and return the raw success body.
    async fn post<T: Serialize>(&self, url: &str, body: &T) -> Result<String> {
        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.config.api_key)
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            if let Ok(api_error) = serde_json::from_str::<ApiError>(&body) {
                return Err(RagError::LlmApi(format!(
                    "API error ({}{}): {}",
                    status,
                    api_error
                        .error
                        .status
                        .map(|s| format!(", {}", s))
                        .unwrap_or_default(),
                    api_error.error.message
                )));
            }
            return Err(RagError::LlmApi(format!(
                "Request failed ({}): {}",
                status, body
            )));
        }

        Ok(body)
    }

    /// Send a `generateContent` request, optionally constrained to a JSON schema.
    pub async fn generate_content(
        &self,
        prompt: &str,
        schema: Option<&serde_json::Value>,
    ) -> Result<LlmResponse> {
        let request = GenerateContentRequest {
            contents: vec![Content::user(prompt)],
            generation_config: GenerationConfig {
                temperature: Some(self.config.temperature),
                max_output_tokens: Some(self.config.max_tokens),
                response_mime_type: schema.map(|_| "application/json"),
                response_schema: schema,
            },
        };

        debug!(
            model = %self.config.model,
            prompt_chars = prompt.len(),
            structured = schema.is_some(),
            "generateContent"
        );

        let body = self
            .post(&self.endpoint(&self.config.model, "generateContent"), &request)
            .await?;
        let completion: GenerateContentResponse = serde_json::from_str(&body)?;

        let Some(candidate) = completion.candidates.into_iter().next() else {
            let reason = completion
                .prompt_feedback
                .and_then(|f| f.block_reason)
                .unwrap_or_else(|| "no reason given".to_string());
            return Err(RagError::LlmApi(format!(
                "No candidates in response ({})",
                reason
            )));
        };

        let content = candidate
            .content
            .map(|c| {
                c.parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .concat()
            })
            .unwrap_or_default();

        Ok(LlmResponse {
            content,
            finish_reason: candidate.finish_reason,
            usage: completion.usage_metadata.map(|u| TokenUsage {
                prompt_tokens: u.prompt_token_count,
                completion_tokens: u.candidates_token_count,
                total_tokens: u.total_token_count,
            }),
        })
    }

    /// Send an `embedContent` request.
    pub async fn embed_content(&self, text: &str, task: TaskType) -> Result<Vec<f32>> {
        let model = &self.config.embedding_model;
        let request = EmbedContentRequest {
            model: format!("models/{}", model.trim_start_matches("models/")),
            content: Content::text(text),
            task_type: task,
        };

        let body = self
            .post(&self.endpoint(model, "embedContent"), &request)
            .await?;
        let response: EmbedContentResponse = serde_json::from_str(&body)?;
        Ok(response.embedding.values)
    }

    /// Test connectivity to the API.
    pub async fn test_connection(&self) -> Result<()> {
        let response = self
            .generate_content(Prompts::connection_check(), None)
            .await?;

        if response.content.to_lowercase().contains("hello") {
            Ok(())
        } else {
            Err(RagError::LlmApi(format!(
                "Unexpected response: {}",
                response.content
            )))
        }
    }
}

impl EmbeddingService for GeminiClient {
    async fn embed(&self, text: &str, task: TaskType) -> Result<Vec<f32>> {
        self.embed_content(text, task).await
    }
}

impl GenerationService for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        Ok(self.generate_content(prompt, None).await?.content)
    }

    async fn generate_json(&self, prompt: &str, schema: &serde_json::Value) -> Result<String> {
        Ok(self.generate_content(prompt, Some(schema)).await?.content)
    }
}
