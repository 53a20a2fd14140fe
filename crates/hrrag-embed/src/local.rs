use std::collections::HashMap;
use std::path::Path;
use std::time::Instant;

use anyhow::{anyhow, Context};
use candle_core::{Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config as BertConfig, DTYPE};
use tokenizers::Tokenizer;

use hrrag_core::error::{Error, Result};
use hrrag_core::traits::Embedder;

use crate::device::select_device;
use crate::pool::masked_mean_l2;
use crate::tokenize::{configure_tokenizer, encode_batch_on_device};

/// Sentence encoder with the BERT architecture (all-MiniLM-L6-v2 by default),
/// mean pooled over the attention mask and L2 normalized.
pub struct MiniLmEmbedder { model: BertModel, tokenizer: Tokenizer, device: Device, dim: usize, max_len: usize }

impl MiniLmEmbedder {
    /// Load `tokenizer.json`, `config.json` and either `model.safetensors` or
    /// `pytorch_model.bin` from `model_dir`.
    pub fn load(model_dir: &Path, max_len: usize) -> Result<Self> {
        if !model_dir.is_dir() {
            return Err(Error::NotFound(format!("embedding model directory {}", model_dir.display())));
        }
        Self::load_inner(model_dir, max_len).map_err(|e| Error::Embedding(format!("{e:#}")))
    }

    fn load_inner(model_dir: &Path, max_len: usize) -> anyhow::Result<Self> {
        let device = select_device();
        tracing::info!(dir = %model_dir.display(), "loading sentence encoder");
        let tokenizer_path = model_dir.join("tokenizer.json");
        let mut tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow!("Failed to load tokenizer from {}: {}", tokenizer_path.display(), e))?;
        let config_path = model_dir.join("config.json");
        let config_text = std::fs::read_to_string(&config_path).with_context(|| format!("reading {}", config_path.display()))?;
        let config: BertConfig = serde_json::from_str(&config_text)?;
        let raw: serde_json::Value = serde_json::from_str(&config_text)?;
        let dim = raw.get("hidden_size").and_then(|v| v.as_u64()).ok_or_else(|| anyhow!("{} has no hidden_size", config_path.display()))? as usize;
        let max_positions = raw.get("max_position_embeddings").and_then(|v| v.as_u64()).map_or(max_len, |p| p as usize);

        let max_len = max_len.min(max_positions);
        configure_tokenizer(&mut tokenizer, max_len)?;

        let safetensors = model_dir.join("model.safetensors");
        let weights: HashMap<String, Tensor> = if safetensors.exists() {
            candle_core::safetensors::load(&safetensors, &device)?
        } else {
            candle_core::pickle::read_all(model_dir.join("pytorch_model.bin"))?.into_iter().collect()
        };
        let vb = VarBuilder::from_tensors(weights, DTYPE, &device);
        let model = BertModel::load(vb, &config)?;
        tracing::info!(dim, max_len, "sentence encoder ready");
        Ok(Self { model, tokenizer, device, dim, max_len })
    }

    fn encode(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        let start = Instant::now();
        let batch = encode_batch_on_device(&self.tokenizer, texts, self.max_len, &self.device)?;
        let hidden = self.model.forward(&batch.input_ids, &batch.token_type_ids, Some(&batch.attention_mask))?;
        let pooled = masked_mean_l2(&hidden, &batch.attention_mask)?;
        let out: Vec<Vec<f32>> = pooled.to_device(&Device::Cpu)?.to_vec2()?;
        let elapsed = start.elapsed();
        if texts.len() == 1 && elapsed.as_millis() > 100 { tracing::warn!(?elapsed, "slow query embedding"); }
        tracing::debug!(batch = texts.len(), ?elapsed, "encoded batch");
        Ok(out)
    }
}

impl Embedder for MiniLmEmbedder {
    fn dim(&self) -> usize { self.dim }
    fn max_len(&self) -> usize { self.max_len }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() { return Ok(Vec::new()); }
        self.encode(texts).map_err(|e| Error::Embedding(format!("{e:#}")))
    }
}
