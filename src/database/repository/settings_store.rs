//! Settings store with cache-first architecture.
//!
//! The in-memory cache is the single source of truth for reads during
//! normal operation. Every mutation lands in the cache first, so readers
//! observe the new value immediately, and is then propagated to the remote
//! store best-effort. The remote store is only consulted at defined sync
//! points: `load` at startup and the backup operations.

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::database::RemoteStore;
use crate::database::models::{Settings, SettingsField, SettingsUpdate};

const SETTINGS_COLLECTION: &str = "settings";
const SETTINGS_KEY: &str = "main_settings";
const BACKUP_KEY: &str = "backup_settings";

/// How far a write made it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Propagation {
    /// Applied to the cache and acknowledged by the remote store.
    Synced,
    /// Applied to the cache only; the remote store is unreachable or
    /// rejected the write. The bot keeps operating on the cached value.
    CacheOnly,
}

/// Single source of truth for relay settings.
pub struct SettingsStore {
    remote: RemoteStore,
    cache: RwLock<Settings>,
}

impl SettingsStore {
    /// Create a store holding the built-in defaults.
    pub fn new(remote: RemoteStore) -> Self {
        Self {
            remote,
            cache: RwLock::new(Settings::default()),
        }
    }

    /// Pull persisted settings into the cache. Called once at startup.
    ///
    /// A partial remote document merges over the defaults per-field; an
    /// absent document or disconnected store keeps the defaults. Bounded by
    /// the gateway's server selection timeout.
    pub async fn load(&self) {
        match self
            .remote
            .get::<Settings>(SETTINGS_COLLECTION, SETTINGS_KEY)
            .await
        {
            Some(settings) => {
                *self.cache.write() = settings;
                info!("Settings loaded from remote store");
            }
            None => {
                info!("No persisted settings, using defaults");
            }
        }
    }

    /// Snapshot of the current settings. Never touches the remote store.
    pub fn read(&self) -> Settings {
        self.cache.read().clone()
    }

    /// Replace the entire mapping.
    ///
    /// The cache is swapped before the remote write is issued, so readers
    /// see the new mapping regardless of the remote outcome.
    pub async fn save(&self, mut settings: Settings) -> Propagation {
        settings.parallel_downloads = settings.parallel_downloads.max(1);
        *self.cache.write() = settings.clone();

        if self
            .remote
            .replace(SETTINGS_COLLECTION, SETTINGS_KEY, &settings)
            .await
        {
            Propagation::Synced
        } else {
            Propagation::CacheOnly
        }
    }

    /// Change a single field, cache first, remote best-effort.
    pub async fn update(&self, update: SettingsUpdate) -> Propagation {
        let field = update.field();
        let value = update.to_bson();

        update.apply(&mut self.cache.write());
        debug!("Updated setting {}", field.as_str());

        if self
            .remote
            .update_field(SETTINGS_COLLECTION, SETTINGS_KEY, field.as_str(), value)
            .await
        {
            Propagation::Synced
        } else {
            Propagation::CacheOnly
        }
    }

    /// Restore a single field to its documented default.
    pub async fn reset(&self, field: SettingsField) -> Propagation {
        self.update(SettingsUpdate::reset(field)).await
    }

    /// Snapshot the current cache under the backup key.
    ///
    /// Unlike routine updates the remote outcome is surfaced here: a backup
    /// that silently did not persist is worse than a failed one.
    pub async fn backup(&self) -> bool {
        let snapshot = self.read();

        let ok = self
            .remote
            .replace(SETTINGS_COLLECTION, BACKUP_KEY, &snapshot)
            .await;
        if ok {
            info!("Settings backup saved");
        } else {
            warn!("Settings backup was not persisted");
        }
        ok
    }

    /// Fetch the backup snapshot without applying it.
    ///
    /// Returns `None` if no backup exists or the store is disconnected.
    /// Applying the candidate is the caller's decision - compose with
    /// [`SettingsStore::save`].
    pub async fn restore_from_backup(&self) -> Option<Settings> {
        self.remote.get(SETTINGS_COLLECTION, BACKUP_KEY).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offline_store() -> SettingsStore {
        SettingsStore::new(RemoteStore::disconnected())
    }

    #[tokio::test]
    async fn load_keeps_defaults_when_disconnected() {
        let store = offline_store();
        store.load().await;

        assert_eq!(store.read(), Settings::default());
    }

    #[tokio::test]
    async fn update_is_visible_immediately_despite_dead_remote() {
        let store = offline_store();
        store.load().await;

        let outcome = store
            .update(SettingsUpdate::FilePrefix("S01_".to_string()))
            .await;

        assert_eq!(outcome, Propagation::CacheOnly);
        assert_eq!(store.read().file_prefix, "S01_");
    }

    #[tokio::test]
    async fn updates_on_different_fields_both_stick() {
        let store = offline_store();

        store
            .update(SettingsUpdate::SourceChannels(vec![-1001, -1002]))
            .await;
        store.update(SettingsUpdate::RemoveUsername(true)).await;

        let settings = store.read();
        assert_eq!(settings.source_channels, vec![-1001, -1002]);
        assert!(settings.remove_username);
    }

    #[tokio::test]
    async fn save_replaces_the_whole_mapping() {
        let store = offline_store();
        store
            .update(SettingsUpdate::CustomCaption("old".to_string()))
            .await;

        let outcome = store
            .save(Settings {
                file_suffix: "_done".to_string(),
                parallel_downloads: 0,
                ..Settings::default()
            })
            .await;

        assert_eq!(outcome, Propagation::CacheOnly);
        let settings = store.read();
        assert_eq!(settings.custom_caption, "");
        assert_eq!(settings.file_suffix, "_done");
        // The floor holds on full saves too
        assert_eq!(settings.parallel_downloads, 1);
    }

    #[tokio::test]
    async fn reset_restores_the_default() {
        let store = offline_store();
        store
            .update(SettingsUpdate::BlacklistWords(vec!["cam".to_string()]))
            .await;

        store.reset(SettingsField::BlacklistWords).await;

        assert!(store.read().blacklist_words.is_empty());
    }

    #[tokio::test]
    async fn backup_failure_is_surfaced() {
        let store = offline_store();

        assert!(!store.backup().await);
        assert_eq!(store.restore_from_backup().await, None);
    }
}
