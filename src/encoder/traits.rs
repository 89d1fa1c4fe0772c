// Text encoder trait — the swap-ready abstraction over the embedding model.
//
// The model is a frozen pretrained encoder: deterministic, no side effects,
// potentially expensive. Keeping it behind a trait means the feed engine
// takes an injected encoder instead of a hidden process-wide model
// instance, and tests can substitute a deterministic stub.

use anyhow::Result;
use async_trait::async_trait;

/// Trait for encoding text into a fixed-length embedding vector.
/// Implementations must be async because inference is CPU-bound (offloaded
/// to a worker thread) or remote.
#[async_trait]
pub trait TextEncoder: Send + Sync {
    /// Encode a single text. The same input always produces the same
    /// vector for a given model.
    async fn encode(&self, text: &str) -> Result<Vec<f64>>;

    /// Encode multiple texts, returning vectors in input order.
    /// Default implementation calls encode sequentially — implementations
    /// can override for true batching.
    async fn encode_batch(&self, texts: &[String]) -> Result<Vec<Vec<f64>>> {
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            vectors.push(self.encode(text).await?);
        }
        Ok(vectors)
    }
}
