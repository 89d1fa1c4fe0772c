// SqliteStore — rusqlite backend implementing the storage traits.
//
// The Connection is wrapped in tokio::sync::Mutex because Connection is
// !Send. Trait methods lock the mutex, do synchronous rusqlite work, and
// return. The lock is never held across .await points — Rust enforces
// this because MutexGuard is !Send.
//
// The free functions in queries.rs stay synchronous so tests can run
// against a Connection directly.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use tokio::sync::Mutex;

use super::models::Post;
use super::traits::{HistoryStore, PostStore, VectorStore};

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Wrap an already-opened rusqlite Connection.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    pub async fn table_count(&self) -> Result<i64> {
        let conn = self.conn.lock().await;
        super::schema::table_count(&conn)
    }

    pub async fn count_posts(&self) -> Result<i64> {
        let conn = self.conn.lock().await;
        super::queries::count_posts(&conn)
    }

    pub async fn count_views(&self) -> Result<i64> {
        let conn = self.conn.lock().await;
        super::queries::count_views(&conn)
    }

    pub async fn count_embeddings(&self) -> Result<i64> {
        let conn = self.conn.lock().await;
        super::queries::count_embeddings(&conn)
    }
}

#[async_trait]
impl PostStore for SqliteStore {
    async fn create_post(
        &self,
        header: &str,
        photo: Option<&[u8]>,
        text: &str,
        author: &str,
        posted_at: DateTime<Utc>,
    ) -> Result<Post> {
        let conn = self.conn.lock().await;
        super::queries::insert_post(&conn, header, photo, text, author, posted_at)
    }

    async fn get_post(&self, post_id: i64) -> Result<Option<Post>> {
        let conn = self.conn.lock().await;
        super::queries::get_post(&conn, post_id)
    }

    async fn remove_post(&self, post_id: i64) -> Result<bool> {
        let conn = self.conn.lock().await;
        super::queries::remove_post(&conn, post_id)
    }

    async fn list_posts_since(&self, start: DateTime<Utc>) -> Result<Vec<Post>> {
        let conn = self.conn.lock().await;
        super::queries::posts_since(&conn, start)
    }
}

#[async_trait]
impl HistoryStore for SqliteStore {
    async fn record_view(
        &self,
        user_id: i64,
        post_id: i64,
        viewed_at: DateTime<Utc>,
    ) -> Result<()> {
        let conn = self.conn.lock().await;
        super::queries::record_view(&conn, user_id, post_id, viewed_at)
    }

    async fn list_views_since(&self, user_id: i64, start: DateTime<Utc>) -> Result<Vec<i64>> {
        let conn = self.conn.lock().await;
        super::queries::views_since(&conn, user_id, start)
    }

    async fn prune_views_before(&self, user_id: i64, cutoff: DateTime<Utc>) -> Result<usize> {
        let conn = self.conn.lock().await;
        super::queries::prune_views_before(&conn, user_id, cutoff)
    }

    async fn user_ids_with_history(&self) -> Result<Vec<i64>> {
        let conn = self.conn.lock().await;
        super::queries::history_user_ids(&conn)
    }
}

#[async_trait]
impl VectorStore for SqliteStore {
    async fn exists(&self, key: &str) -> Result<bool> {
        let conn = self.conn.lock().await;
        super::queries::embedding_exists(&conn, key)
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let conn = self.conn.lock().await;
        super::queries::embedding_get(&conn, key)
    }

    async fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        let conn = self.conn.lock().await;
        super::queries::embedding_set(&conn, key, value)
    }
}
