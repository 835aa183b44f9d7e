//! Configuration module for the relay store.
//!
//! Loads configuration from environment variables, once, before the stores
//! initialize. Nothing here is re-read at runtime.

use std::env;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// MongoDB connection string.
    ///
    /// Optional - when absent the stores boot straight into fallback mode
    /// and operate on in-memory state only.
    pub database_url: Option<String>,

    /// MongoDB database name.
    pub database_name: String,

    /// Directory holding the local thumbnail file.
    pub thumbnail_dir: String,

    /// Directory relayed files are downloaded into.
    pub download_dir: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").ok().filter(|s| !s.is_empty());

        Self {
            database_url,
            database_name: env::var("MONGODB_DATABASE")
                .unwrap_or_else(|_| "relay_bot".to_string()),
            thumbnail_dir: env::var("THUMBNAIL_DIR")
                .unwrap_or_else(|_| "thumbnails".to_string()),
            download_dir: env::var("DOWNLOAD_DIR")
                .unwrap_or_else(|_| "downloads".to_string()),
        }
    }
}
