// Data models — Rust structs that map to database rows.
//
// These are the types that flow through the engine. They're separate from
// the queries so other modules can use them without depending on rusqlite
// directly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A news post. Immutable once created except for deletion — the header
/// is the similarity key and never changes, so a cached header embedding
/// never needs invalidation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    /// Short title text — what gets embedded and compared
    pub header: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<Vec<u8>>,
    pub author: String,
    pub posted_at: DateTime<Utc>,
}
