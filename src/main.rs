use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::info;

use broadsheet::cache::EmbeddingCache;
use broadsheet::config::Config;
use broadsheet::encoder::onnx::OnnxTextEncoder;
use broadsheet::error::FeedError;
use broadsheet::feed::pagination::paginate;
use broadsheet::feed::Recommender;
use broadsheet::output::terminal;
use broadsheet::store;
use broadsheet::store::sqlite::SqliteStore;
use broadsheet::store::traits::{HistoryStore, PostStore};

/// Broadsheet: content-based news feed recommendations.
///
/// Embeds post headers with a local sentence encoder and recommends
/// recent posts similar to what each user has been reading.
#[derive(Parser)]
#[command(name = "broadsheet", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database
    Init,

    /// Download the ONNX sentence encoder (~90 MB)
    DownloadModel,

    /// Add a new post
    AddPost {
        /// Post header — the title used for similarity matching
        #[arg(long)]
        header: String,

        /// Post body text
        #[arg(long)]
        text: String,

        /// Author name
        #[arg(long)]
        author: String,

        /// Optional path to a photo to attach
        #[arg(long)]
        photo: Option<PathBuf>,
    },

    /// Remove a post by id
    RemovePost {
        post_id: i64,
    },

    /// Show a single post; with --user, the view is recorded in that
    /// user's browsing history
    Show {
        post_id: i64,

        #[arg(long)]
        user: Option<i64>,
    },

    /// List posts from the last week
    Recent {
        /// Page number (omit to list everything)
        #[arg(long)]
        page: Option<usize>,
    },

    /// Find posts similar to the given post
    Similar {
        post_id: i64,
    },

    /// Build a user's recommendation feed
    Feed {
        /// The user to recommend for
        user: i64,

        /// Page number (omit to list everything)
        #[arg(long)]
        page: Option<usize>,
    },

    /// Prune browsing history older than the trailing week
    Maintain,

    /// Show system status (DB stats, encoder availability)
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("broadsheet=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Commands::Init => {
            info!("Initializing broadsheet database...");
            let conn = store::initialize(&config.db_path)?;
            let db = SqliteStore::new(conn);
            let table_count = db.table_count().await?;
            println!("Database initialized at: {}", config.db_path);
            println!("Tables created: {table_count}");
            println!("\nNext step: run `broadsheet download-model`, then add posts.");
        }

        Commands::DownloadModel => {
            broadsheet::encoder::download::download_model(&config.model_dir).await?;
            println!("\n{}", "Encoder ready.".bold());
        }

        Commands::AddPost {
            header,
            text,
            author,
            photo,
        } => {
            let db = open_store(&config)?;
            let photo_bytes = match photo {
                Some(path) => Some(
                    std::fs::read(&path)
                        .with_context(|| format!("Failed to read photo at {}", path.display()))?,
                ),
                None => None,
            };

            let post = db
                .create_post(&header, photo_bytes.as_deref(), &text, &author, Utc::now())
                .await?;
            println!("Created post {}", post.id);
        }

        Commands::RemovePost { post_id } => {
            let db = open_store(&config)?;
            if !db.remove_post(post_id).await? {
                return Err(FeedError::PostNotFound(post_id).into());
            }
            println!("Removed post {post_id}");
        }

        Commands::Show { post_id, user } => {
            let db = open_store(&config)?;
            let post = db
                .get_post(post_id)
                .await?
                .ok_or(FeedError::PostNotFound(post_id))?;

            if let Some(user_id) = user {
                db.record_view(user_id, post.id, Utc::now()).await?;
                info!(user_id = user_id, post_id = post.id, "Recorded view");
            }

            terminal::display_post(&post);
        }

        Commands::Recent { page } => {
            let db = open_store(&config)?;
            let window_start = Utc::now() - broadsheet::config::recent_window();
            let posts = db.list_posts_since(window_start).await?;

            let (page_posts, total_pages) = paginate(&posts, page, config.page_size)?;
            terminal::display_posts("Recent posts", &page_posts);
            terminal::display_page_info(page.unwrap_or(1), total_pages);
        }

        Commands::Similar { post_id } => {
            config.require_encoder()?;
            let db = open_store(&config)?;
            let recommender = build_recommender(&config, Arc::clone(&db))?;

            let post = db
                .get_post(post_id)
                .await?
                .ok_or(FeedError::PostNotFound(post_id))?;

            let similar = recommender.find_similar_posts(&post, Utc::now()).await?;
            terminal::display_posts(&format!("Posts similar to {}", post_id), &similar);
        }

        Commands::Feed { user, page } => {
            config.require_encoder()?;
            let db = open_store(&config)?;
            let recommender = build_recommender(&config, Arc::clone(&db))?;

            let feed = recommender.get_feed(user, Utc::now()).await?;
            let (page_posts, total_pages) = paginate(&feed, page, config.page_size)?;

            terminal::display_posts(&format!("Feed for user {}", user), &page_posts);
            terminal::display_page_info(page.unwrap_or(1), total_pages);
        }

        Commands::Maintain => {
            let db = open_store(&config)?;
            let removed =
                broadsheet::maintenance::prune_stale_history(db.as_ref(), Utc::now()).await?;
            println!("Pruned {removed} stale history entries");
        }

        Commands::Status => {
            let db = open_store(&config)?;
            println!("\n{}", "=== Broadsheet status ===".bold());
            println!("  Database: {}", config.db_path);
            println!("  Posts: {}", db.count_posts().await?);
            println!("  History entries: {}", db.count_views().await?);
            println!("  Cached embeddings: {}", db.count_embeddings().await?);

            let encoder_state =
                if broadsheet::encoder::download::model_files_present(&config.model_dir) {
                    "present".green()
                } else {
                    "missing (run `broadsheet download-model`)".yellow()
                };
            println!("  Encoder files: {encoder_state}");
        }
    }

    Ok(())
}

/// Open the SQLite store (must have been created by `broadsheet init`).
fn open_store(config: &Config) -> Result<Arc<SqliteStore>> {
    let conn = store::open(&config.db_path)?;
    Ok(Arc::new(SqliteStore::new(conn)))
}

/// Wire the recommendation engine: ONNX encoder + embedding cache over
/// the shared store.
fn build_recommender(config: &Config, db: Arc<SqliteStore>) -> Result<Recommender> {
    let encoder = OnnxTextEncoder::load(&config.model_dir)?;
    let cache = EmbeddingCache::new(db.clone(), Arc::new(encoder));
    Ok(Recommender::new(db.clone(), db, cache))
}
