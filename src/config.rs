//! Configuration for the RAG chatbot.
//!
//! Supports environment variables (optionally loaded from a `.env` file by the
//! binaries) and a YAML config file. Environment variables take precedence over
//! config file values.

use crate::error::{RagError, Result};
use crate::llm::Language;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

/// Gemini API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Base URL for the Gemini API.
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// API key for authentication
    #[serde(default)]
    pub api_key: String,

    /// Generative model used for answering and grading.
    #[serde(default = "default_model")]
    pub model: String,

    /// Embedding model used for chunks and queries.
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// Dimension of the vectors returned by the embedding model.
    #[serde(default = "default_embedding_dimension")]
    pub embedding_dimension: usize,

    /// Maximum output tokens for a generation call.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Temperature for generation.
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_api_base() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_embedding_model() -> String {
    "embedding-001".to_string()
}

fn default_embedding_dimension() -> usize {
    768
}

fn default_max_tokens() -> u32 {
    2048
}

fn default_temperature() -> f32 {
    0.0
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            api_key: String::new(),
            model: default_model(),
            embedding_model: default_embedding_model(),
            embedding_dimension: default_embedding_dimension(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

/// Retrieval pipeline settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagConfig {
    /// Target chunk length in characters.
    pub chunk_size: usize,
    /// Characters shared by consecutive chunks.
    pub chunk_overlap: usize,
    /// Number of chunks placed in the answer context.
    pub top_k: usize,
    /// Language of prompts and report labels.
    pub language: Language,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
            top_k: 5,
            language: Language::default(),
        }
    }
}

/// Locations of the cache and report files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Directory holding every cache file.
    pub dir: PathBuf,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("data"),
        }
    }
}

impl CacheConfig {
    pub fn chunks_path(&self) -> PathBuf {
        self.dir.join("chunks.json")
    }

    pub fn embeddings_path(&self) -> PathBuf {
        self.dir.join("embeddings.bin")
    }

    pub fn results_path(&self) -> PathBuf {
        self.dir.join("evaluation_results.json")
    }

    pub fn report_path(&self) -> PathBuf {
        self.dir.join("evaluation_results.md")
    }
}

/// Full application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Gemini settings
    pub llm: LlmConfig,
    /// Chunking and retrieval settings
    pub rag: RagConfig,
    /// Cache file locations
    pub cache: CacheConfig,
}

/// Configuration file structure (YAML format).
#[derive(Debug, Deserialize)]
struct ConfigFile {
    llm: Option<LlmFileSection>,
    rag: Option<RagFileSection>,
    cache: Option<CacheFileSection>,
}

#[derive(Debug, Deserialize)]
struct LlmFileSection {
    api_base: Option<String>,
    api_key: Option<String>,
    model: Option<String>,
    embedding_model: Option<String>,
    embedding_dimension: Option<usize>,
    max_tokens: Option<u32>,
    temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct RagFileSection {
    chunk_size: Option<usize>,
    chunk_overlap: Option<usize>,
    top_k: Option<usize>,
    language: Option<Language>,
}

#[derive(Debug, Deserialize)]
struct CacheFileSection {
    dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration from environment variables and optional config file.
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (GEMINI_API_KEY / API_KEY, GEMINI_MODEL, RAG_TOP_K, ...)
    /// 2. Config file (~/.config/doc-rag-chatbot/config.yaml)
    /// 3. Default values
    pub fn load() -> Result<Self> {
        let mut config = Config::default();

        if let Some(config_path) = Self::config_file_path() {
            if config_path.exists() {
                config = Self::load_from_file(&config_path)?;
            }
        }

        config.apply_overrides(|key| env::var(key).ok());
        Ok(config)
    }

    /// Apply overrides from a variable lookup (the process environment in `load`).
    ///
    /// Numeric values that fail to parse are ignored.
    pub fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(api_base) = var("GEMINI_API_BASE") {
            self.llm.api_base = api_base;
        }

        if let Some(api_key) = var("GEMINI_API_KEY").or_else(|| var("API_KEY")) {
            self.llm.api_key = api_key;
        }

        if let Some(model) = var("GEMINI_MODEL") {
            self.llm.model = model;
        }

        if let Some(model) = var("GEMINI_EMBEDDING_MODEL") {
            self.llm.embedding_model = model;
        }

        if let Some(tokens) = var("GEMINI_MAX_TOKENS").and_then(|v| v.parse().ok()) {
            self.llm.max_tokens = tokens;
        }

        if let Some(temp) = var("GEMINI_TEMPERATURE").and_then(|v| v.parse().ok()) {
            self.llm.temperature = temp;
        }

        if let Some(size) = var("RAG_CHUNK_SIZE").and_then(|v| v.parse().ok()) {
            self.rag.chunk_size = size;
        }

        if let Some(overlap) = var("RAG_CHUNK_OVERLAP").and_then(|v| v.parse().ok()) {
            self.rag.chunk_overlap = overlap;
        }

        if let Some(top_k) = var("RAG_TOP_K").and_then(|v| v.parse().ok()) {
            self.rag.top_k = top_k;
        }

        if let Some(language) = var("RAG_LANGUAGE").and_then(|v| v.parse().ok()) {
            self.rag.language = language;
        }

        if let Some(dir) = var("RAG_CACHE_DIR") {
            self.cache.dir = PathBuf::from(dir);
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| RagError::io(path, e))?;
        Self::from_yaml(&content)
    }

    fn from_yaml(content: &str) -> Result<Self> {
        let file_config: ConfigFile = serde_yaml::from_str(content)
            .map_err(|e| RagError::Config(format!("Failed to parse config file: {}", e)))?;

        let mut config = Config::default();

        if let Some(llm) = file_config.llm {
            if let Some(api_base) = llm.api_base {
                config.llm.api_base = api_base;
            }
            if let Some(api_key) = llm.api_key {
                config.llm.api_key = api_key;
            }
            if let Some(model) = llm.model {
                config.llm.model = model;
            }
            if let Some(model) = llm.embedding_model {
                config.llm.embedding_model = model;
            }
            if let Some(dimension) = llm.embedding_dimension {
                config.llm.embedding_dimension = dimension;
            }
            if let Some(max_tokens) = llm.max_tokens {
                config.llm.max_tokens = max_tokens;
            }
            if let Some(temperature) = llm.temperature {
                config.llm.temperature = temperature;
            }
        }

        if let Some(rag) = file_config.rag {
            if let Some(size) = rag.chunk_size {
                config.rag.chunk_size = size;
            }
            if let Some(overlap) = rag.chunk_overlap {
                config.rag.chunk_overlap = overlap;
            }
            if let Some(top_k) = rag.top_k {
                config.rag.top_k = top_k;
            }
            if let Some(language) = rag.language {
                config.rag.language = language;
            }
        }

        if let Some(dir) = file_config.cache.and_then(|c| c.dir) {
            config.cache.dir = dir;
        }

        Ok(config)
    }

    /// Get the default config file path.
    pub fn config_file_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "doc-rag-chatbot")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Validate that required configuration is present and consistent.
    pub fn validate(&self) -> Result<()> {
        if self.llm.api_key.is_empty() {
            return Err(RagError::Config(
                "API key is required. Set GEMINI_API_KEY (or API_KEY) in the environment or a .env file.".to_string(),
            ));
        }

        if self.llm.api_base.is_empty() {
            return Err(RagError::Config("API base URL must not be empty.".to_string()));
        }

        if self.llm.model.is_empty() || self.llm.embedding_model.is_empty() {
            return Err(RagError::Config(
                "Both a generation model and an embedding model are required.".to_string(),
            ));
        }

        if self.llm.embedding_dimension == 0 {
            return Err(RagError::Config(
                "Embedding dimension must be positive.".to_string(),
            ));
        }

        if self.rag.chunk_size == 0 || self.rag.chunk_overlap >= self.rag.chunk_size {
            return Err(RagError::InvalidChunkConfig {
                size: self.rag.chunk_size,
                overlap: self.rag.chunk_overlap,
            });
        }

        if self.rag.top_k == 0 {
            return Err(RagError::Config("top_k must be at least 1.".to_string()));
        }

        Ok(())
    }

    /// Create a config with an explicit API base and key (useful for testing).
    pub fn with_api(api_base: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            llm: LlmConfig {
                api_base: api_base.into(),
                api_key: api_key.into(),
                ..Default::default()
            },
            ..Default::default()
        }
    }
}
