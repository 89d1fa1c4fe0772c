// Database queries — CRUD operations for all tables.
//
// Every database interaction goes through this module. This keeps SQL
// contained in one place and gives the rest of the app clean Rust
// interfaces. All functions are synchronous; the async layer in sqlite.rs
// wraps them behind the storage traits.

use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use super::models::Post;

fn post_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Post> {
    let posted_at_raw: String = row.get(5)?;
    let posted_at = DateTime::parse_from_rfc3339(&posted_at_raw)
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(e))
        })?
        .with_timezone(&Utc);

    Ok(Post {
        id: row.get(0)?,
        header: row.get(1)?,
        text: row.get(2)?,
        photo: row.get(3)?,
        author: row.get(4)?,
        posted_at,
    })
}

// --- Posts ---

/// Insert a new post and return it with its assigned id.
pub fn insert_post(
    conn: &Connection,
    header: &str,
    photo: Option<&[u8]>,
    text: &str,
    author: &str,
    posted_at: DateTime<Utc>,
) -> Result<Post> {
    conn.execute(
        "INSERT INTO posts (header, body, photo, author, posted_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![header, text, photo, author, posted_at.to_rfc3339()],
    )?;

    Ok(Post {
        id: conn.last_insert_rowid(),
        header: header.to_string(),
        text: text.to_string(),
        photo: photo.map(|p| p.to_vec()),
        author: author.to_string(),
        posted_at,
    })
}

/// Look up a single post by id.
pub fn get_post(conn: &Connection, post_id: i64) -> Result<Option<Post>> {
    let mut stmt = conn.prepare(
        "SELECT id, header, body, photo, author, posted_at FROM posts WHERE id = ?1",
    )?;
    let result = stmt.query_row(params![post_id], post_from_row).optional()?;
    Ok(result)
}

/// Delete a post. Returns false when no row matched the id.
pub fn remove_post(conn: &Connection, post_id: i64) -> Result<bool> {
    let deleted = conn.execute("DELETE FROM posts WHERE id = ?1", params![post_id])?;
    Ok(deleted > 0)
}

/// All posts created at or after `start`, in insertion order.
pub fn posts_since(conn: &Connection, start: DateTime<Utc>) -> Result<Vec<Post>> {
    let mut stmt = conn.prepare(
        "SELECT id, header, body, photo, author, posted_at
         FROM posts WHERE posted_at >= ?1 ORDER BY id",
    )?;
    let posts = stmt
        .query_map(params![start.to_rfc3339()], post_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(posts)
}

pub fn count_posts(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM posts", [], |row| row.get(0))?;
    Ok(count)
}

// --- Browsing history ---

/// Append a view event. Re-views of the same post insert fresh rows.
pub fn record_view(
    conn: &Connection,
    user_id: i64,
    post_id: i64,
    viewed_at: DateTime<Utc>,
) -> Result<()> {
    conn.execute(
        "INSERT INTO browsing_history (user_id, post_id, viewed_at)
         VALUES (?1, ?2, ?3)",
        params![user_id, post_id, viewed_at.to_rfc3339()],
    )?;
    Ok(())
}

/// Post ids the user viewed at or after `start`, oldest view first.
/// Ties on the timestamp keep insertion order.
pub fn views_since(conn: &Connection, user_id: i64, start: DateTime<Utc>) -> Result<Vec<i64>> {
    let mut stmt = conn.prepare(
        "SELECT post_id FROM browsing_history
         WHERE user_id = ?1 AND viewed_at >= ?2
         ORDER BY viewed_at, id",
    )?;
    let ids = stmt
        .query_map(params![user_id, start.to_rfc3339()], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<i64>>>()?;
    Ok(ids)
}

/// Delete a user's view rows strictly older than `cutoff`.
/// Returns how many rows were removed.
pub fn prune_views_before(
    conn: &Connection,
    user_id: i64,
    cutoff: DateTime<Utc>,
) -> Result<usize> {
    let deleted = conn.execute(
        "DELETE FROM browsing_history WHERE user_id = ?1 AND viewed_at < ?2",
        params![user_id, cutoff.to_rfc3339()],
    )?;
    Ok(deleted)
}

/// Every user id that has at least one view row. Drives the maintenance sweep.
pub fn history_user_ids(conn: &Connection) -> Result<Vec<i64>> {
    let mut stmt = conn.prepare("SELECT DISTINCT user_id FROM browsing_history ORDER BY user_id")?;
    let ids = stmt
        .query_map([], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<i64>>>()?;
    Ok(ids)
}

pub fn count_views(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM browsing_history", [], |row| row.get(0))?;
    Ok(count)
}

// --- Header embedding cache ---

pub fn embedding_exists(conn: &Connection, header: &str) -> Result<bool> {
    let present: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM header_embeddings WHERE header = ?1",
        params![header],
        |row| row.get(0),
    )?;
    Ok(present)
}

pub fn embedding_get(conn: &Connection, header: &str) -> Result<Option<Vec<u8>>> {
    let mut stmt = conn.prepare("SELECT vector FROM header_embeddings WHERE header = ?1")?;
    let result = stmt
        .query_row(params![header], |row| row.get(0))
        .optional()?;
    Ok(result)
}

/// Store a header's embedding (upsert — concurrent writers racing on the
/// same header all write the same value, so last write wins is fine).
pub fn embedding_set(conn: &Connection, header: &str, vector: &[u8]) -> Result<()> {
    conn.execute(
        "INSERT INTO header_embeddings (header, vector, created_at)
         VALUES (?1, ?2, datetime('now'))
         ON CONFLICT(header) DO UPDATE SET vector = ?2, created_at = datetime('now')",
        params![header, vector],
    )?;
    Ok(())
}

pub fn count_embeddings(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM header_embeddings", [], |row| row.get(0))?;
    Ok(count)
}
