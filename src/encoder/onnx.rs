// Local ONNX sentence encoder using all-MiniLM-L6-v2.
//
// Headers are tokenized, run through the BERT encoder, and mean-pooled
// (averaged across tokens, weighted by attention mask) into a single
// 384-dimensional vector. Runs locally — no API calls, no rate limits.
//
// The Session sits behind Arc<Mutex<..>> for thread safety; the Tokenizer
// behind Arc for shared ownership across spawn_blocking.

use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use async_trait::async_trait;
use ort::session::Session;
use ort::value::Tensor;
use tokenizers::Tokenizer;
use tracing::debug;

use super::traits::TextEncoder;

/// Embedding dimension for all-MiniLM-L6-v2.
pub const EMBEDDING_DIM: usize = 384;

pub struct OnnxTextEncoder {
    session: Arc<Mutex<Session>>,
    tokenizer: Arc<Tokenizer>,
}

impl OnnxTextEncoder {
    /// Load the encoder and tokenizer from the given directory.
    ///
    /// Expects `model.onnx` and `tokenizer.json`. Run
    /// `broadsheet download-model` first if they don't exist.
    pub fn load(model_dir: &Path) -> Result<Self> {
        let model_path = model_dir.join("model.onnx");
        let tokenizer_path = model_dir.join("tokenizer.json");

        if !model_path.exists() {
            anyhow::bail!(
                "Encoder model not found: {}\nRun `broadsheet download-model` to download it.",
                model_path.display()
            );
        }
        if !tokenizer_path.exists() {
            anyhow::bail!(
                "Encoder tokenizer not found: {}\nRun `broadsheet download-model` to download it.",
                tokenizer_path.display()
            );
        }

        let session = Session::builder()
            .context("Failed to create ONNX session builder")?
            .commit_from_file(&model_path)
            .with_context(|| format!("Failed to load encoder model from {}", model_path.display()))?;

        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow::anyhow!("Failed to load encoder tokenizer: {}", e))?;

        debug!("Loaded sentence encoder from {}", model_dir.display());

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            tokenizer: Arc::new(tokenizer),
        })
    }
}

#[async_trait]
impl TextEncoder for OnnxTextEncoder {
    async fn encode(&self, text: &str) -> Result<Vec<f64>> {
        let mut vectors = self.encode_batch(&[text.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| anyhow::anyhow!("Encoder returned no vector for input"))
    }

    /// CPU-bound inference is offloaded to spawn_blocking to keep the
    /// async runtime responsive.
    async fn encode_batch(&self, texts: &[String]) -> Result<Vec<Vec<f64>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let session = Arc::clone(&self.session);
        let tokenizer = Arc::clone(&self.tokenizer);
        let texts = texts.to_vec();

        tokio::task::spawn_blocking(move || encode_sync(&session, &tokenizer, &texts))
            .await
            .context("spawn_blocking panicked")?
    }
}

/// Synchronous path: tokenization, padded tensor construction, ONNX
/// forward pass, and mean pooling.
fn encode_sync(
    session: &Arc<Mutex<Session>>,
    tokenizer: &Arc<Tokenizer>,
    texts: &[String],
) -> Result<Vec<Vec<f64>>> {
    let encodings: Vec<_> = texts
        .iter()
        .map(|t| {
            tokenizer
                .encode(t.as_str(), true)
                .map_err(|e| anyhow::anyhow!("Tokenization failed: {}", e))
        })
        .collect::<Result<Vec<_>>>()?;

    let batch_size = encodings.len();
    let max_len = encodings
        .iter()
        .map(|e| e.get_ids().len())
        .max()
        .unwrap_or(0);

    if max_len == 0 {
        return Ok(vec![vec![0.0; EMBEDDING_DIM]; batch_size]);
    }

    // BERT input layout:
    //   input_ids: token IDs (pad with 0)
    //   attention_mask: 1 for real tokens, 0 for padding
    //   token_type_ids: all zeros for single-sentence input
    let mut input_ids: Vec<i64> = Vec::with_capacity(batch_size * max_len);
    let mut attention_mask: Vec<i64> = Vec::with_capacity(batch_size * max_len);
    let mut token_type_ids: Vec<i64> = Vec::with_capacity(batch_size * max_len);

    for enc in &encodings {
        let ids = enc.get_ids();
        let mask = enc.get_attention_mask();
        let seq_len = ids.len();

        input_ids.extend(ids.iter().map(|&id| id as i64));
        attention_mask.extend(mask.iter().map(|&m| m as i64));
        token_type_ids.extend(std::iter::repeat_n(0i64, seq_len));

        let pad_len = max_len - seq_len;
        input_ids.extend(std::iter::repeat_n(0i64, pad_len));
        attention_mask.extend(std::iter::repeat_n(0i64, pad_len));
        token_type_ids.extend(std::iter::repeat_n(0i64, pad_len));
    }

    let shape = [batch_size as i64, max_len as i64];

    let input_ids_tensor =
        Tensor::from_array((shape, input_ids)).context("Failed to create input_ids tensor")?;
    let attention_mask_tensor = Tensor::from_array((shape, attention_mask.clone()))
        .context("Failed to create attention_mask tensor")?;
    let token_type_ids_tensor = Tensor::from_array((shape, token_type_ids))
        .context("Failed to create token_type_ids tensor")?;

    // Forward pass — output is last_hidden_state: [batch, seq_len, 384]
    let hidden_states = {
        let mut session = session
            .lock()
            .map_err(|e| anyhow::anyhow!("Session lock poisoned: {}", e))?;

        let outputs = session
            .run(ort::inputs! {
                "input_ids" => input_ids_tensor,
                "attention_mask" => attention_mask_tensor,
                "token_type_ids" => token_type_ids_tensor
            })
            .context("Encoder ONNX inference failed")?;

        let (_shape, data) = outputs[0]
            .try_extract_tensor::<f32>()
            .context("Failed to extract encoder output tensor")?;

        data.to_vec()
    };

    Ok(mean_pool(&hidden_states, &attention_mask, batch_size, max_len))
}

/// Mean pooling: for each text, average the token embeddings weighted by
/// the attention mask, matching how the model was trained for sentence
/// similarity.
fn mean_pool(
    hidden_states: &[f32],
    attention_mask: &[i64],
    batch_size: usize,
    max_len: usize,
) -> Vec<Vec<f64>> {
    let mut vectors = Vec::with_capacity(batch_size);

    for i in 0..batch_size {
        let mut sum = vec![0.0_f64; EMBEDDING_DIM];
        let mut mask_sum = 0.0_f64;

        for j in 0..max_len {
            let mask_val = attention_mask[i * max_len + j] as f64;
            if mask_val > 0.0 {
                mask_sum += mask_val;
                let offset = (i * max_len + j) * EMBEDDING_DIM;
                for k in 0..EMBEDDING_DIM {
                    sum[k] += hidden_states[offset + k] as f64 * mask_val;
                }
            }
        }

        if mask_sum > 0.0 {
            for val in &mut sum {
                *val /= mask_sum;
            }
        }

        vectors.push(sum);
    }

    debug!(
        batch_size = batch_size,
        dim = EMBEDDING_DIM,
        "Computed header embeddings"
    );

    vectors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_pool_averages_unmasked_tokens() {
        // One text, two tokens, both unmasked: result is the per-dim mean.
        let mut hidden = vec![0.0_f32; 2 * EMBEDDING_DIM];
        hidden[0] = 1.0; // token 0, dim 0
        hidden[EMBEDDING_DIM] = 3.0; // token 1, dim 0
        let mask = vec![1_i64, 1];

        let pooled = mean_pool(&hidden, &mask, 1, 2);
        assert_eq!(pooled.len(), 1);
        assert!((pooled[0][0] - 2.0).abs() < 1e-10);
        assert!(pooled[0][1].abs() < 1e-10);
    }

    #[test]
    fn test_mean_pool_ignores_padding() {
        // Second token is padding — only the first contributes.
        let mut hidden = vec![0.0_f32; 2 * EMBEDDING_DIM];
        hidden[0] = 1.0;
        hidden[EMBEDDING_DIM] = 100.0;
        let mask = vec![1_i64, 0];

        let pooled = mean_pool(&hidden, &mask, 1, 2);
        assert!((pooled[0][0] - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_mean_pool_all_masked_yields_zero_vector() {
        let hidden = vec![5.0_f32; EMBEDDING_DIM];
        let mask = vec![0_i64];

        let pooled = mean_pool(&hidden, &mask, 1, 1);
        assert!(pooled[0].iter().all(|&v| v == 0.0));
    }
}
