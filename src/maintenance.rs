// View-log maintenance.
//
// Entries older than the trailing week never influence a feed, so they
// are dead weight. Pruning runs as an explicit sweep over every user's
// log — deterministic and schedulable (cron, or the `maintain` command)
// instead of piggybacking on feed requests.

use anyhow::Result;
use chrono::{DateTime, Utc};
use tracing::info;

use crate::config::recent_window;
use crate::store::traits::HistoryStore;

/// Prune every user's view log down to the trailing week.
/// Returns the total number of rows removed.
pub async fn prune_stale_history(history: &dyn HistoryStore, now: DateTime<Utc>) -> Result<usize> {
    let cutoff = now - recent_window();
    let user_ids = history.user_ids_with_history().await?;

    let mut removed = 0;
    for user_id in &user_ids {
        removed += history.prune_views_before(*user_id, cutoff).await?;
    }

    info!(
        users = user_ids.len(),
        removed = removed,
        "Pruned stale browsing history"
    );

    Ok(removed)
}
