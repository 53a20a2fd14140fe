//! OpenAI-compatible chat completions client (Groq by default).

use std::time::Duration;

use async_trait::async_trait;
use hrrag_core::config::LlmSettings;
use serde_json::{json, Value};

use crate::error::{LlmError, Result};

/// A language model that turns one prompt into one answer.
#[async_trait]
pub trait ChatModel: Send + Sync {
    fn name(&self) -> &str;
    async fn complete(&self, prompt: &str) -> Result<String>;
}

pub struct GroqClient {
    url: String,
    model: String,
    temperature: f32,
    api_key: String,
    api_key_env: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl GroqClient {
    /// The key is read from `settings.api_key_env` now; a missing key only
    /// fails when a completion is requested.
    pub fn from_settings(settings: &LlmSettings) -> Result<Self> {
        let api_key = std::env::var(&settings.api_key_env).unwrap_or_default();
        if api_key.is_empty() {
            tracing::warn!(var = %settings.api_key_env, "no API key for the language model");
        }
        Self::with_key(settings, api_key)
    }

    pub fn with_key(settings: &LlmSettings, api_key: impl Into<String>) -> Result<Self> {
        let timeout = Duration::from_secs(settings.timeout_secs);
        let client = reqwest::Client::builder().timeout(timeout).build().map_err(|e| LlmError::Http(e.to_string()))?;
        Ok(Self {
            url: settings.url.clone(),
            model: settings.model.clone(),
            temperature: settings.temperature,
            api_key: api_key.into(),
            api_key_env: settings.api_key_env.clone(),
            timeout,
            client,
        })
    }
}

#[async_trait]
impl ChatModel for GroqClient {
    fn name(&self) -> &str { &self.model }

    async fn complete(&self, prompt: &str) -> Result<String> {
        if self.api_key.is_empty() {
            return Err(LlmError::ApiKeyMissing(self.api_key_env.clone()));
        }
        let body = json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": prompt }],
            "temperature": self.temperature,
        });
        let resp = self
            .client
            .post(&self.url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| if e.is_timeout() { LlmError::Timeout(self.timeout.as_secs()) } else { LlmError::Http(format!("{} connection failed: {}", self.url, e)) })?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(LlmError::Provider { status: status.as_u16(), body: text });
        }
        let json: Value = resp.json().await.map_err(|e| LlmError::Malformed(e.to_string()))?;
        let answer = json["choices"]
            .get(0)
            .and_then(|c| c["message"]["content"].as_str())
            .ok_or_else(|| LlmError::Malformed("no choices[0].message.content in response".to_string()))?;
        tracing::debug!(model = %self.model, chars = answer.len(), "completion received");
        Ok(answer.to_string())
    }
}
