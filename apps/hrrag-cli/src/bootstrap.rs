use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use hrrag_core::config::{Config, LlmSettings, Settings};
use hrrag_hybrid::open_service;
use hrrag_llm::{CachedChatModel, ChatModel, GroqClient};

use crate::qa::QaPipeline;

/// `RUST_LOG` wins; otherwise `info`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_target(false).try_init();
}

pub fn load_settings() -> anyhow::Result<Settings> {
    let config = Config::load().context("loading configuration")?;
    tracing::debug!(env = config.env_name(), "configuration loaded");
    config.settings()
}

pub fn build_chat_model(settings: &LlmSettings) -> anyhow::Result<Arc<dyn ChatModel>> {
    let client = GroqClient::from_settings(settings)?;
    Ok(Arc::new(CachedChatModel::new(client, settings.cache_capacity)))
}

/// Load the store and indexes, the embedder and the LLM client.
pub fn open_pipeline(settings: &Settings) -> anyhow::Result<QaPipeline> {
    let retriever = open_service(settings).context("opening retrieval context")?;
    let model = build_chat_model(&settings.llm)?;
    Ok(QaPipeline::from_settings(Arc::new(retriever), model, settings))
}
