use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use hrrag_core::config::Settings;
use hrrag_hybrid::RetrievalService;
use hrrag_llm::{build_prompt, ChatModel, LlmError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QaAnswer {
    pub answer: String,
    pub sources: Vec<String>,
}

#[derive(Debug, Error)]
pub enum QaError {
    #[error(transparent)]
    Retrieval(#[from] hrrag_core::Error),
    #[error(transparent)]
    Llm(#[from] LlmError),
    #[error("retrieval task failed: {0}")]
    Join(String),
}

/// Retrieve, build the prompt, ask the model.
#[derive(Clone)]
pub struct QaPipeline {
    retriever: Arc<RetrievalService>,
    model: Arc<dyn ChatModel>,
    top_k: usize,
    embed_timeout: Duration,
}

impl QaPipeline {
    pub fn new(retriever: Arc<RetrievalService>, model: Arc<dyn ChatModel>, top_k: usize, embed_timeout: Duration) -> Self {
        Self { retriever, model, top_k, embed_timeout }
    }

    pub fn from_settings(retriever: Arc<RetrievalService>, model: Arc<dyn ChatModel>, settings: &Settings) -> Self {
        Self::new(retriever, model, settings.retrieval.top_k, settings.embedding.timeout())
    }

    /// Runs on the blocking pool; the embedding deadline starts now.
    pub async fn retrieve(&self, question: &str) -> Result<Vec<String>, QaError> {
        let retriever = Arc::clone(&self.retriever);
        let question = question.to_string();
        let top_k = self.top_k;
        let deadline = Instant::now() + self.embed_timeout;
        tokio::task::spawn_blocking(move || retriever.retrieve_within(&question, top_k, Some(deadline)))
            .await
            .map_err(|e| QaError::Join(e.to_string()))?
            .map_err(QaError::from)
    }

    pub async fn answer(&self, question: &str) -> Result<QaAnswer, QaError> {
        let sources = self.retrieve(question).await?;
        let prompt = build_prompt(&sources, question);
        let answer = self.model.complete(&prompt).await?;
        tracing::info!(sources = sources.len(), model = self.model.name(), "answered question");
        Ok(QaAnswer { answer, sources })
    }

    pub fn retriever(&self) -> &Arc<RetrievalService> { &self.retriever }
    pub fn top_k(&self) -> usize { self.top_k }
}
