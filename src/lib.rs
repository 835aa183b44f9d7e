//! Relay Store - Settings & asset persistence for a channel file-relay bot.
//!
//! The bot copies files between Telegram channels according to
//! operator-configured routing and rename rules. This crate is its
//! persistence core: the in-memory settings cache that stays authoritative
//! for reads, the tolerant MongoDB gateway behind it, the canonical
//! thumbnail image, and the remote-backed admin set.
//!
//! The bot must boot and keep operating even when the database is
//! unreachable, so every store here degrades to cache-only ("fallback
//! mode") instead of raising for connectivity reasons.
//!
//! ## Architecture
//!
//! - `config` - Environment configuration
//! - `database` - MongoDB gateway, document models, settings and admin stores
//! - `thumbnail` - Canonical thumbnail asset (local disk + remote copy)
//!
//! ## Startup sequence
//!
//! ```rust,no_run
//! # async fn boot() {
//! use relay_store::config::Config;
//! use relay_store::database::{AdminStore, RemoteStore, SettingsStore};
//! use relay_store::thumbnail::ThumbnailStore;
//!
//! let config = Config::from_env();
//!
//! // Never fails; a dead deployment yields a disconnected store.
//! let remote = RemoteStore::connect(config.database_url.as_deref(), &config.database_name).await;
//!
//! let settings = SettingsStore::new(remote.clone());
//! settings.load().await;
//!
//! let admins = AdminStore::new(remote.clone());
//! admins.load().await;
//!
//! let thumbnails = ThumbnailStore::new(remote, &config.thumbnail_dir);
//! thumbnails.restore_on_startup().await;
//! # }
//! ```

pub mod config;
pub mod database;
pub mod thumbnail;
