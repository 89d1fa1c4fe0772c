// Header embedding cache.
//
// Maps a header string to its embedding, backed by a key-value store so
// the encoder runs at most once per distinct header in the steady state.
// Vectors are stored as JSON arrays of f64 under the exact header text.
//
// Concurrent callers racing on the same uncached header may each invoke
// the encoder; the encoder is a pure function of the text, so every racer
// computes the same vector and last-write-wins in the store is harmless.
// Accepted inefficiency — correctness never depends on at-most-once
// computation.

use std::sync::Arc;

use tracing::debug;

use crate::encoder::traits::TextEncoder;
use crate::error::FeedError;
use crate::store::traits::VectorStore;

pub struct EmbeddingCache {
    store: Arc<dyn VectorStore>,
    encoder: Arc<dyn TextEncoder>,
}

impl EmbeddingCache {
    pub fn new(store: Arc<dyn VectorStore>, encoder: Arc<dyn TextEncoder>) -> Self {
        Self { store, encoder }
    }

    /// Return the embedding for `header`, computing and storing it on a miss.
    ///
    /// Store failures surface as `CacheUnavailable`; encoder failures as
    /// `Encoder`. Neither is retried here.
    pub async fn get_or_compute(&self, header: &str) -> Result<Vec<f64>, FeedError> {
        if self
            .store
            .exists(header)
            .await
            .map_err(FeedError::CacheUnavailable)?
        {
            // A racing writer may have been observed by exists() but not
            // yet by get(); a None here just falls through to compute.
            if let Some(bytes) = self
                .store
                .get(header)
                .await
                .map_err(FeedError::CacheUnavailable)?
            {
                let vector: Vec<f64> = serde_json::from_slice(&bytes)
                    .map_err(|e| FeedError::CacheUnavailable(e.into()))?;
                return Ok(vector);
            }
        }

        debug!(header = header, "Embedding cache miss, encoding header");
        let vector = self
            .encoder
            .encode(header)
            .await
            .map_err(FeedError::Encoder)?;

        let bytes = serde_json::to_vec(&vector).map_err(|e| FeedError::CacheUnavailable(e.into()))?;
        self.store
            .set(header, &bytes)
            .await
            .map_err(FeedError::CacheUnavailable)?;

        Ok(vector)
    }
}
