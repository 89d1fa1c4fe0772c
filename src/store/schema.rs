// Database schema — table creation and migrations.
//
// A `schema_version` table tracks which migrations have run; future
// schema changes get a version row and an ALTER statement guarded by it.
//
// Timestamps are stored as RFC 3339 TEXT in UTC, so lexicographic
// comparison in SQL matches chronological order.

use anyhow::{Context, Result};
use rusqlite::Connection;

/// Create all tables if they don't exist yet.
///
/// This is idempotent — safe to call on every startup.
pub fn create_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        -- Tracks schema version for future migrations
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- News posts. Rows are inserted and deleted, never updated.
        CREATE TABLE IF NOT EXISTS posts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            header TEXT NOT NULL,
            body TEXT NOT NULL,
            photo BLOB,
            author TEXT NOT NULL,
            posted_at TEXT NOT NULL
        );

        -- Per-user view log. One row per view event; re-views append
        -- new rows rather than updating old ones.
        CREATE TABLE IF NOT EXISTS browsing_history (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            post_id INTEGER NOT NULL,
            viewed_at TEXT NOT NULL
        );

        -- Header embedding cache, keyed by the exact header text.
        -- Best-effort: rebuildable from the posts table at any time.
        CREATE TABLE IF NOT EXISTS header_embeddings (
            header TEXT PRIMARY KEY,
            vector BLOB NOT NULL,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- Index for the trailing-window candidate scan
        CREATE INDEX IF NOT EXISTS idx_posts_posted_at
            ON posts(posted_at);

        -- Index for per-user window reads and pruning of the view log
        CREATE INDEX IF NOT EXISTS idx_history_user_viewed
            ON browsing_history(user_id, viewed_at);
        ",
    )
    .context("Failed to create database tables")?;

    // Record initial schema version if not already set
    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [1],
    )?;

    Ok(())
}

/// Count the number of tables in the database (useful for init confirmation).
pub fn table_count(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
        [],
        |row| row.get(0),
    )?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_tables_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();
        create_tables(&conn).unwrap();
    }

    #[test]
    fn test_table_count() {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();
        let count = table_count(&conn).unwrap();
        // schema_version, posts, browsing_history, header_embeddings
        assert_eq!(count, 4i64);
    }

    #[test]
    fn test_embedding_rows_are_upsertable() {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();

        conn.execute(
            "INSERT INTO header_embeddings (header, vector) VALUES (?1, ?2)
             ON CONFLICT(header) DO UPDATE SET vector = ?2",
            rusqlite::params!["Some header", b"[0.1, 0.2]".as_slice()],
        )
        .unwrap();

        let stored: Vec<u8> = conn
            .query_row(
                "SELECT vector FROM header_embeddings WHERE header = 'Some header'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(stored, b"[0.1, 0.2]");
    }
}
