use anyhow::{bail, Result};
use candle_core::{DType, Tensor};

fn eps_for(dtype: DType) -> f32 {
    match dtype { DType::F16 | DType::BF16 => 1e-6, _ => 1e-12 }
}

/// Mean over the unmasked positions of `hidden` (`[B, T, H]`), then L2 normalize
/// each row. Returns `[B, H]`.
pub fn masked_mean_l2(hidden: &Tensor, attention_mask: &Tensor) -> Result<Tensor> {
    let (batch, hidden_dim) = match hidden.dims() {
        [b, _, h] => (*b, *h),
        other => bail!("hidden shape must be [B,T,H], got {:?}", other),
    };
    let mask = attention_mask.to_device(hidden.device())?.to_dtype(hidden.dtype())?.unsqueeze(2)?;
    let summed = hidden.broadcast_mul(&mask)?.sum(1)?;
    let eps = Tensor::new(&[eps_for(hidden.dtype())], hidden.device())?.to_dtype(hidden.dtype())?;
    // All-padding rows come out as zeros instead of NaN.
    let counts = mask.sum(1)?.broadcast_maximum(&eps)?;
    let mean = summed.broadcast_div(&counts)?;
    let norms = mean.sqr()?.sum_keepdim(1)?.sqrt()?.broadcast_add(&eps)?;
    let pooled = mean.broadcast_div(&norms)?;
    if pooled.dims() != [batch, hidden_dim].as_slice() { bail!("pooled shape {:?}, expected [{batch}, {hidden_dim}]", pooled.dims()); }
    Ok(pooled)
}
