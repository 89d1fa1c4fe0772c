// The recommendation assembler.
//
// Holds the injected collaborators (post store, view log, embedding cache)
// and produces per-post similar lists and per-user feeds. Feeds are
// computed fresh on every call and never cached.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::cmp::Ordering;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use super::similar;
use crate::cache::EmbeddingCache;
use crate::config::recent_window;
use crate::error::FeedError;
use crate::store::models::Post;
use crate::store::traits::{HistoryStore, PostStore};

pub struct Recommender {
    posts: Arc<dyn PostStore>,
    history: Arc<dyn HistoryStore>,
    cache: EmbeddingCache,
}

impl Recommender {
    pub fn new(
        posts: Arc<dyn PostStore>,
        history: Arc<dyn HistoryStore>,
        cache: EmbeddingCache,
    ) -> Self {
        Self {
            posts,
            history,
            cache,
        }
    }

    /// Posts from the trailing week similar to `original`, best first.
    pub async fn find_similar_posts(
        &self,
        original: &Post,
        now: DateTime<Utc>,
    ) -> Result<Vec<Post>, FeedError> {
        let scored = similar::search_scored(self.posts.as_ref(), &self.cache, original, now).await?;
        Ok(scored.into_iter().map(|(post, _)| post).collect())
    }

    /// Assemble the user's recommendation feed: posts similar to anything
    /// they viewed in the trailing week, minus the viewed posts themselves.
    ///
    /// Ordering is deterministic for reproducible pagination: descending
    /// best similarity to any viewed post, ties by ascending post id.
    pub async fn get_feed(
        &self,
        user_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Vec<Post>, FeedError> {
        let window_start = now - recent_window();

        let view_log = self
            .history
            .list_views_since(user_id, window_start)
            .await
            .map_err(FeedError::Store)?;

        // Re-views appear as duplicate entries; keep first occurrence.
        let mut seen_ids = HashSet::new();
        let viewed_ids: Vec<i64> = view_log
            .into_iter()
            .filter(|id| seen_ids.insert(*id))
            .collect();

        // Resolve ids to posts; entries pointing at deleted posts are
        // silently dropped (history outlives deletion).
        let lookups = viewed_ids.iter().map(|id| self.posts.get_post(*id));
        let resolved = futures::future::try_join_all(lookups)
            .await
            .map_err(FeedError::Store)?;
        let viewed: Vec<Post> = resolved.into_iter().flatten().collect();

        if viewed.len() < viewed_ids.len() {
            debug!(
                user_id = user_id,
                dropped = viewed_ids.len() - viewed.len(),
                "Dropped view entries for deleted posts"
            );
        }

        // One similar-posts search per viewed post, all concurrent.
        let searches = viewed
            .iter()
            .map(|post| similar::search_scored(self.posts.as_ref(), &self.cache, post, now));
        let results = futures::future::try_join_all(searches).await?;

        // Union by post id, keeping each candidate's best score across all
        // viewed source posts, and never recommend what was just viewed.
        let viewed_id_set: HashSet<i64> = viewed.iter().map(|post| post.id).collect();
        let mut best: HashMap<i64, (Post, f64)> = HashMap::new();

        for (post, score) in results.into_iter().flatten() {
            if viewed_id_set.contains(&post.id) {
                continue;
            }
            match best.entry(post.id) {
                Entry::Occupied(mut entry) => {
                    if score > entry.get().1 {
                        entry.get_mut().1 = score;
                    }
                }
                Entry::Vacant(entry) => {
                    entry.insert((post, score));
                }
            }
        }

        let mut feed: Vec<(Post, f64)> = best.into_values().collect();
        feed.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.0.id.cmp(&b.0.id))
        });

        debug!(
            user_id = user_id,
            viewed = viewed.len(),
            recommended = feed.len(),
            "Assembled feed"
        );

        Ok(feed.into_iter().map(|(post, _)| post).collect())
    }
}
