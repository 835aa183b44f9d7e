//! Admin identity store.
//!
//! The set of user IDs permitted elevated bot commands, held in the remote
//! `admins` collection (one document per admin) and mirrored into an owned
//! in-memory set for per-message checks. Mutations go remote-first: the
//! mirror only changes once the remote write succeeded, so the two views
//! stay in sync on failure.

use std::collections::HashSet;

use parking_lot::RwLock;
use tracing::{info, warn};

use crate::database::RemoteStore;
use crate::database::models::AdminRecord;

const ADMINS_COLLECTION: &str = "admins";

/// Result of scanning the remote admin set.
///
/// An empty set and an unreachable store are different answers. Conflating
/// them would make the bot forget every admin on a network hiccup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminSync {
    /// The remote collection was scanned; the set may legitimately be empty.
    Loaded(HashSet<u64>),
    /// The remote store did not answer; membership is unknown.
    Unreachable,
}

/// Remote-backed set of administrator user IDs.
pub struct AdminStore {
    remote: RemoteStore,
    admins: RwLock<HashSet<u64>>,
}

impl AdminStore {
    /// Create a store with an empty in-memory set.
    pub fn new(remote: RemoteStore) -> Self {
        Self {
            remote,
            admins: RwLock::new(HashSet::new()),
        }
    }

    /// Scan the remote collection for the full admin set.
    pub async fn load_all(&self) -> AdminSync {
        match self.remote.scan::<AdminRecord>(ADMINS_COLLECTION).await {
            Some(records) => AdminSync::Loaded(
                records
                    .into_iter()
                    .map(|record| record.user_id as u64)
                    .collect(),
            ),
            None => AdminSync::Unreachable,
        }
    }

    /// Seed the in-memory set at startup.
    ///
    /// An unreachable store leaves the current set untouched.
    pub async fn load(&self) -> AdminSync {
        let sync = self.load_all().await;
        match &sync {
            AdminSync::Loaded(ids) => {
                info!("Loaded {} admin(s)", ids.len());
                *self.admins.write() = ids.clone();
            }
            AdminSync::Unreachable => {
                warn!("Admin store unreachable, keeping current admin set");
            }
        }
        sync
    }

    /// Grant `user_id` admin rights.
    ///
    /// The remote upsert must succeed before the mirror changes; duplicate
    /// adds are no-ops. Returns whether the grant was persisted.
    pub async fn add(&self, user_id: u64) -> bool {
        let record = AdminRecord::new(user_id);
        if !self
            .remote
            .replace(ADMINS_COLLECTION, &user_id.to_string(), &record)
            .await
        {
            return false;
        }

        self.admins.write().insert(user_id);
        info!("Added admin {user_id}");
        true
    }

    /// Revoke `user_id`'s admin rights.
    ///
    /// The mirror only drops the ID once the remote delete succeeded.
    pub async fn remove(&self, user_id: u64) -> bool {
        if !self
            .remote
            .delete(ADMINS_COLLECTION, &user_id.to_string())
            .await
        {
            return false;
        }

        self.admins.write().remove(&user_id);
        info!("Removed admin {user_id}");
        true
    }

    /// Whether `user_id` is currently in the mirrored set.
    pub fn is_admin(&self, user_id: u64) -> bool {
        self.admins.read().contains(&user_id)
    }

    /// Copy of the current in-memory admin set.
    pub fn snapshot(&self) -> HashSet<u64> {
        self.admins.read().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn failed_remote_write_leaves_mirror_unchanged() {
        let store = AdminStore::new(RemoteStore::disconnected());

        assert!(!store.add(42).await);
        assert!(!store.is_admin(42));
        assert!(store.snapshot().is_empty());

        assert!(!store.remove(42).await);
    }

    #[tokio::test]
    async fn unreachable_store_is_not_an_empty_set() {
        let store = AdminStore::new(RemoteStore::disconnected());

        assert_eq!(store.load_all().await, AdminSync::Unreachable);
        assert_eq!(store.load().await, AdminSync::Unreachable);
        assert!(store.snapshot().is_empty());
    }
}
