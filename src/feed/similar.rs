// Similar-posts search over the trailing-week candidate set.
//
// Candidates are every post from the last seven days — a bounded, small
// corpus, so exhaustive pairwise scoring beats any index. Embedding
// lookups fan out concurrently (gather-style, one per distinct header),
// so latency is bounded by the slowest single lookup rather than the sum.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::cache::EmbeddingCache;
use crate::config::{recent_window, MAX_SIMILAR_POSTS, SIMILARITY_THRESHOLD};
use crate::error::FeedError;
use crate::similarity;
use crate::store::models::Post;
use crate::store::traits::PostStore;

/// Find posts from the trailing week similar to `original`, with their
/// cosine scores, best first.
///
/// The original post is excluded from its own results by id — it would
/// otherwise always win with self-similarity 1.0 when it falls inside the
/// window. At most `MAX_SIMILAR_POSTS` survivors are returned, all with
/// scores strictly above `SIMILARITY_THRESHOLD`.
pub async fn search_scored(
    posts: &dyn PostStore,
    cache: &EmbeddingCache,
    original: &Post,
    now: DateTime<Utc>,
) -> Result<Vec<(Post, f64)>, FeedError> {
    let window_start = now - recent_window();
    let recent = posts
        .list_posts_since(window_start)
        .await
        .map_err(FeedError::Store)?;

    let original_embedding = cache.get_or_compute(&original.header).await?;

    // One cache lookup per candidate header, all in flight at once.
    let lookups = recent.iter().map(|post| cache.get_or_compute(&post.header));
    let embeddings = futures::future::try_join_all(lookups).await?;

    let mut scored: Vec<(Post, f64)> = similarity::rank(
        &original_embedding,
        recent.into_iter().zip(embeddings).collect(),
    )
    .into_iter()
    .filter(|(post, score)| post.id != original.id && *score > SIMILARITY_THRESHOLD)
    .collect();

    // Stable sort: ties keep the provider's return order.
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    scored.truncate(MAX_SIMILAR_POSTS);

    debug!(
        original_id = original.id,
        matches = scored.len(),
        "Similar-posts search complete"
    );

    Ok(scored)
}
