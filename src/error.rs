// Engine error taxonomy.
//
// The recommendation engine surfaces typed failures so the caller layer
// can map them to user-facing messages. Infrastructure internals (SQLite,
// tokenizer, ONNX session) keep reporting through anyhow with context;
// the engine folds those into the variants below at its boundary.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeedError {
    /// The key-value store backing the embedding cache cannot be reached.
    /// Not retried at this layer.
    #[error("embedding cache store unavailable")]
    CacheUnavailable(#[source] anyhow::Error),

    /// A post was looked up by id and does not exist. Feed assembly never
    /// raises this — history entries for deleted posts are skipped there.
    #[error("post with id = {0} was not found")]
    PostNotFound(i64),

    /// The requested page exceeds the number of available pages.
    #[error("page number {page} is too big (total pages: {total_pages})")]
    InvalidPage { page: usize, total_pages: usize },

    /// The sentence encoder failed. Headers are always present strings,
    /// so this is unexpected and fatal to the request.
    #[error("header encoding failed")]
    Encoder(#[source] anyhow::Error),

    /// A posts or browsing-history store operation failed.
    #[error("store operation failed")]
    Store(#[source] anyhow::Error),
}
