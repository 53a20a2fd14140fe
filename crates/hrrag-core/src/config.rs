use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

use crate::types::{FusionPolicy, FusionWeights};

pub struct Config {
    figment: Figment,
    env_name: String,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::new().merge(Toml::file("config.toml"));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        let config = Self { figment, env_name };
        config.validate_for_env(&config.env_name)?;
        Ok(config)
    }

    /// Build from an inline TOML document; no files or environment involved.
    pub fn from_toml_str(toml: &str) -> anyhow::Result<Self> {
        let config = Self { figment: Figment::new().merge(Toml::string(toml)), env_name: "test".to_string() };
        config.validate_for_env(&config.env_name)?;
        Ok(config)
    }

    pub fn settings(&self) -> anyhow::Result<Settings> {
        self.figment
            .extract()
            .map_err(|e| anyhow::anyhow!("Failed to read settings: {}", e))
    }

    pub fn env_name(&self) -> &str { &self.env_name }

    fn validate_for_env(&self, env: &str) -> anyhow::Result<()> {
        let settings = self.settings()?;
        settings.validate()?;
        match env {
            "prod" | "production" => {
                if settings.embedding.provider == EmbeddingBackend::Fake {
                    anyhow::bail!("embedding.provider = \"fake\" is not allowed in production");
                }
            }
            "dev" | "development" | "test" | "testing" => {}
            _ => {}
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub data: DataSettings,
    pub ingest: IngestSettings,
    pub embedding: EmbeddingSettings,
    pub retrieval: RetrievalSettings,
    pub llm: LlmSettings,
    pub server: ServerSettings,
    pub chat: ChatSettings,
}

impl Settings {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.ingest.chunk_size == 0 {
            anyhow::bail!("ingest.chunk_size must be positive");
        }
        if self.ingest.chunk_overlap > self.ingest.chunk_size {
            anyhow::bail!("ingest.chunk_overlap ({}) exceeds ingest.chunk_size ({})", self.ingest.chunk_overlap, self.ingest.chunk_size);
        }
        let w = self.retrieval.weights;
        if !(w.dense.is_finite() && w.lexical.is_finite()) || w.dense < 0.0 || w.lexical < 0.0 {
            anyhow::bail!("retrieval.weights must be finite and non-negative");
        }
        if self.embedding.provider == EmbeddingBackend::Remote && self.embedding.remote_url.is_none() {
            anyhow::bail!("embedding.remote_url is required for the remote provider");
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSettings {
    pub source_path: String,
    pub store_path: String,
    pub index_path: String,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            source_path: "data/hr_text.json".to_string(),
            store_path: "data/hr_embeddings.json".to_string(),
            index_path: "data/hr_index.bin".to_string(),
        }
    }
}

impl DataSettings {
    pub fn source_path(&self) -> PathBuf { expand_path(&self.source_path) }
    pub fn store_path(&self) -> PathBuf { expand_path(&self.store_path) }
    pub fn index_path(&self) -> PathBuf { expand_path(&self.index_path) }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestSettings {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub separators: Vec<String>,
    pub embed_batch_size: usize,
}

impl Default for IngestSettings {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            chunk_overlap: 100,
            separators: vec!["\n".to_string(), ".".to_string(), " ".to_string()],
            embed_batch_size: 32,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingBackend {
    #[default]
    Local,
    Remote,
    Fake,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    pub provider: EmbeddingBackend,
    pub model_dir: String,
    pub dim: usize,
    pub max_len: usize,
    pub remote_url: Option<String>,
    /// Deadline handed to the provider for each query embedding.
    pub timeout_ms: u64,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: EmbeddingBackend::Local,
            model_dir: "models/all-MiniLM-L6-v2".to_string(),
            dim: 384,
            max_len: 256,
            remote_url: None,
            timeout_ms: 10_000,
        }
    }
}

impl EmbeddingSettings {
    pub fn model_dir(&self) -> PathBuf { expand_path(&self.model_dir) }
    pub fn timeout(&self) -> std::time::Duration { std::time::Duration::from_millis(self.timeout_ms) }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalSettings {
    pub top_k: usize,
    pub fusion: FusionPolicy,
    pub weights: FusionWeights,
    pub bm25_k1: f64,
    pub bm25_b: f64,
    pub bm25_epsilon: f64,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            top_k: 5,
            fusion: FusionPolicy::Direct,
            weights: FusionWeights::default(),
            bm25_k1: 1.5,
            bm25_b: 0.75,
            bm25_epsilon: 0.25,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    pub url: String,
    pub model: String,
    pub temperature: f32,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    pub timeout_secs: u64,
    pub cache_capacity: usize,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            url: "https://api.groq.com/openai/v1/chat/completions".to_string(),
            model: "llama-3.1-8b-instant".to_string(),
            temperature: 0.2,
            api_key_env: "GROQ_API_KEY".to_string(),
            timeout_secs: 60,
            cache_capacity: 64,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self { host: "0.0.0.0".to_string(), port: 5000 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatSettings {
    pub history_path: String,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self { history_path: "data/chat_history.json".to_string() }
    }
}

impl ChatSettings {
    pub fn history_path(&self) -> PathBuf { expand_path(&self.history_path) }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

