use std::env;
use std::path::PathBuf;

use anyhow::Result;
use chrono::Duration;

/// Minimum cosine similarity a candidate must exceed (strictly) to count
/// as related to a post.
pub const SIMILARITY_THRESHOLD: f64 = 0.4;

/// How many similar posts a single lookup returns at most.
pub const MAX_SIMILAR_POSTS: usize = 3;

/// The trailing window that bounds both the candidate set and the
/// browsing history reads.
pub fn recent_window() -> Duration {
    Duration::weeks(1)
}

/// Central configuration loaded from environment variables.
///
/// The .env file is loaded at startup via dotenvy; everything here has a
/// working default so `broadsheet init` runs on a fresh checkout.
pub struct Config {
    pub db_path: String,
    /// Directory containing the ONNX encoder files
    pub model_dir: PathBuf,
    /// Posts per page for paginated listings and feeds
    pub page_size: usize,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        let model_dir = env::var("BROADSHEET_MODEL_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| crate::encoder::download::default_model_dir());

        let page_size = match env::var("BROADSHEET_PAGE_SIZE") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| anyhow::anyhow!("BROADSHEET_PAGE_SIZE must be a positive integer, got {raw:?}"))?,
            Err(_) => 10,
        };
        if page_size == 0 {
            anyhow::bail!("BROADSHEET_PAGE_SIZE must be a positive integer, got 0");
        }

        Ok(Self {
            db_path: env::var("BROADSHEET_DB_PATH").unwrap_or_else(|_| "./broadsheet.db".to_string()),
            model_dir,
            page_size,
        })
    }

    /// Check that the encoder files are available on disk.
    /// Call this before any command that computes embeddings.
    pub fn require_encoder(&self) -> Result<()> {
        if !crate::encoder::download::model_files_present(&self.model_dir) {
            anyhow::bail!(
                "Encoder files not found in {}\n\
                 Run `broadsheet download-model` to fetch them.",
                self.model_dir.display()
            );
        }
        Ok(())
    }
}
