use anyhow::{anyhow, Result};
use candle_core::{Device, Tensor};
use tokenizers::{Tokenizer, TruncationParams};

/// Token ids, token type ids and attention mask for a batch, each `[B, T]` u32.
pub struct EncodedBatch {
    pub input_ids: Tensor,
    pub token_type_ids: Tensor,
    pub attention_mask: Tensor,
}

/// Replace whatever truncation and padding `tokenizer.json` carries: truncate at
/// `max_len` tokens, no padding (batches are padded in [`encode_batch_on_device`]).
pub fn configure_tokenizer(tokenizer: &mut Tokenizer, max_len: usize) -> Result<()> {
    if max_len == 0 { return Err(anyhow!("max_len must be positive")); }
    tokenizer
        .with_truncation(Some(TruncationParams { max_length: max_len, ..Default::default() }))
        .map_err(|e| anyhow!("Failed to configure tokenizer truncation: {}", e))?;
    tokenizer.with_padding(None);
    Ok(())
}

/// Encode `texts`, truncate each to `max_len` tokens (keeping the closing special
/// token) and right-pad to the longest sequence in the batch.
pub fn encode_batch_on_device(tokenizer: &Tokenizer, texts: &[String], max_len: usize, device: &Device) -> Result<EncodedBatch> {
    if max_len == 0 { return Err(anyhow!("max_len must be positive")); }
    let pad_id = tokenizer.get_padding().map_or(0, |p| p.pad_id);
    let mut rows = Vec::with_capacity(texts.len());
    for text in texts {
        let enc = tokenizer.encode(text.as_str(), true).map_err(|e| anyhow!("Tokenization failed: {}", e))?;
        let mut ids = enc.get_ids().to_vec();
        let mut mask = enc.get_attention_mask().to_vec();
        if ids.len() > max_len {
            let last = ids[ids.len() - 1];
            ids.truncate(max_len); mask.truncate(max_len);
            ids[max_len - 1] = last;
        }
        rows.push((ids, mask));
    }
    let width = rows.iter().map(|(ids, _)| ids.len()).max().unwrap_or(0).max(1);
    let mut flat_ids = Vec::with_capacity(rows.len() * width);
    let mut flat_mask = Vec::with_capacity(rows.len() * width);
    for (ids, mask) in rows {
        let pad = width - ids.len();
        flat_ids.extend(ids); flat_ids.extend(std::iter::repeat(pad_id).take(pad));
        flat_mask.extend(mask); flat_mask.extend(std::iter::repeat(0u32).take(pad));
    }
    let batch = texts.len();
    let input_ids = Tensor::from_vec(flat_ids, (batch, width), device)?;
    let attention_mask = Tensor::from_vec(flat_mask, (batch, width), device)?;
    let token_type_ids = input_ids.zeros_like()?;
    Ok(EncodedBatch { input_ids, token_type_ids, attention_mask })
}
