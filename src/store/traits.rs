// Storage traits — backend-agnostic async interfaces for the engine's
// external collaborators.
//
// The recommendation engine only ever sees these narrow contracts, so
// tests can swap in plain in-memory doubles and the SQLite backend stays
// an implementation detail. All methods are async so both sync (rusqlite
// via Mutex) and native async backends fit behind the same interface.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::models::Post;

/// Durable post storage: the recent-posts provider and post resolver.
#[async_trait]
pub trait PostStore: Send + Sync {
    /// Insert a new post and return it with its assigned id.
    async fn create_post(
        &self,
        header: &str,
        photo: Option<&[u8]>,
        text: &str,
        author: &str,
        posted_at: DateTime<Utc>,
    ) -> Result<Post>;

    /// Look up a post by id; None when it doesn't exist (or was deleted).
    async fn get_post(&self, post_id: i64) -> Result<Option<Post>>;

    /// Delete a post. Returns false when no row matched.
    async fn remove_post(&self, post_id: i64) -> Result<bool>;

    /// All posts created at or after `start`, in insertion order,
    /// unpaginated — the trailing window keeps this bounded.
    async fn list_posts_since(&self, start: DateTime<Utc>) -> Result<Vec<Post>>;
}

/// Per-user, time-ordered view log. Writes are append-only and partitioned
/// by user, so concurrent writers never conflict.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Append a view event.
    async fn record_view(&self, user_id: i64, post_id: i64, viewed_at: DateTime<Utc>)
        -> Result<()>;

    /// Post ids viewed at or after `start`, oldest first; may contain
    /// duplicates when the user re-viewed a post.
    async fn list_views_since(&self, user_id: i64, start: DateTime<Utc>) -> Result<Vec<i64>>;

    /// Drop view rows strictly older than `cutoff`; returns rows removed.
    async fn prune_views_before(&self, user_id: i64, cutoff: DateTime<Utc>) -> Result<usize>;

    /// Users with at least one view row (for the maintenance sweep).
    async fn user_ids_with_history(&self) -> Result<Vec<i64>>;
}

/// Key-value store backing the embedding cache.
///
/// Values are opaque bytes. Entries are content-addressed by header text
/// and deterministic, so duplicate-key races are harmless.
#[async_trait]
pub trait VectorStore: Send + Sync {
    async fn exists(&self, key: &str) -> Result<bool>;

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    async fn set(&self, key: &str, value: &[u8]) -> Result<()>;
}
