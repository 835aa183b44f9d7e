//! Tolerant MongoDB gateway.
//!
//! The remote store is a durability backstop, not a hard dependency: the
//! bot keeps running when the deployment is unreachable. Every operation
//! here degrades to its "absent"/failure value instead of raising, and the
//! failure is logged where it happens.

use std::time::Duration;

use anyhow::Result;
use futures::stream::TryStreamExt;
use mongodb::bson::{Bson, Document, doc};
use mongodb::options::{ClientOptions, ReplaceOptions, Tls, UpdateOptions};
use mongodb::{Client, Collection};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{info, warn};

/// Server selection bound so startup cannot hang on a dead deployment.
const SERVER_SELECTION_TIMEOUT: Duration = Duration::from_secs(5);

/// Best-effort gateway to the MongoDB deployment.
///
/// A disconnected store is fully usable - every call reports absence or
/// failure through its return value, never through an error the caller has
/// to handle. Writes are last-write-wins; there is no versioning and
/// concurrent writers overwrite each other.
#[derive(Debug, Clone)]
pub struct RemoteStore {
    db: Option<mongodb::Database>,
}

impl RemoteStore {
    /// Connect to MongoDB with the given URI and database name.
    ///
    /// Never fails: a missing URL, parse error, auth failure or timeout all
    /// yield a disconnected store and a warning in the log.
    pub async fn connect(url: Option<&str>, db_name: &str) -> Self {
        let Some(url) = url else {
            warn!("No database URL configured, using in-memory settings only");
            return Self::disconnected();
        };

        match Self::try_connect(url, db_name).await {
            Ok(db) => {
                info!("Successfully connected to MongoDB");
                Self { db: Some(db) }
            }
            Err(e) => {
                warn!("MongoDB unreachable, using in-memory settings only: {e:#}");
                Self::disconnected()
            }
        }
    }

    /// A store with no backing database.
    pub fn disconnected() -> Self {
        Self { db: None }
    }

    async fn try_connect(url: &str, db_name: &str) -> Result<mongodb::Database> {
        let mut options = ClientOptions::parse(url).await?;
        options.server_selection_timeout = Some(SERVER_SELECTION_TIMEOUT);
        options.connect_timeout = Some(SERVER_SELECTION_TIMEOUT);

        // Trust the configured CA bundle but tolerate certificate
        // mismatches; managed deployments rotate certificates under us.
        if let Some(Tls::Enabled(tls)) = options.tls.as_mut() {
            tls.allow_invalid_certificates = Some(true);
        }

        let client = Client::with_options(options)?;

        // Ping the deployment to verify it is actually reachable
        client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await?;

        Ok(client.database(db_name))
    }

    /// Whether a deployment answered the startup ping.
    pub fn is_connected(&self) -> bool {
        self.db.is_some()
    }

    fn collection<T: Send + Sync>(&self, name: &str) -> Option<Collection<T>> {
        self.db.as_ref().map(|db| db.collection(name))
    }

    /// Fetch the document stored under `key`.
    ///
    /// Returns `None` if the document is absent, the store is disconnected,
    /// or the read failed.
    pub async fn get<T>(&self, collection: &str, key: &str) -> Option<T>
    where
        T: DeserializeOwned + Send + Sync,
    {
        let coll = self.collection::<T>(collection)?;

        match coll.find_one(doc! { "_id": key }).await {
            Ok(found) => found,
            Err(e) => {
                warn!("Failed to read {collection}/{key}: {e}");
                None
            }
        }
    }

    /// Upsert the full document under `key`, stamping `updated_at`.
    ///
    /// Returns whether the remote write was acknowledged.
    pub async fn replace<T>(&self, collection: &str, key: &str, value: &T) -> bool
    where
        T: Serialize,
    {
        let Some(coll) = self.collection::<Document>(collection) else {
            return false;
        };

        let mut document = match mongodb::bson::to_document(value) {
            Ok(document) => document,
            Err(e) => {
                warn!("Failed to serialize {collection}/{key}: {e}");
                return false;
            }
        };
        document.insert("_id", key);
        document.insert("updated_at", chrono::Utc::now().timestamp());

        let options = ReplaceOptions::builder().upsert(true).build();

        match coll
            .replace_one(doc! { "_id": key }, &document)
            .with_options(options)
            .await
        {
            Ok(_) => true,
            Err(e) => {
                warn!("Failed to write {collection}/{key}: {e}");
                false
            }
        }
    }

    /// `$set` a single field under `key`, creating the document if missing.
    pub async fn update_field(
        &self,
        collection: &str,
        key: &str,
        field: &str,
        value: Bson,
    ) -> bool {
        let Some(coll) = self.collection::<Document>(collection) else {
            return false;
        };

        let mut set = Document::new();
        set.insert(field, value);
        set.insert("updated_at", chrono::Utc::now().timestamp());

        let options = UpdateOptions::builder().upsert(true).build();

        match coll
            .update_one(doc! { "_id": key }, doc! { "$set": set })
            .with_options(options)
            .await
        {
            Ok(_) => true,
            Err(e) => {
                warn!("Failed to update {collection}/{key}.{field}: {e}");
                false
            }
        }
    }

    /// Delete the document under `key`. Idempotent - deleting an absent
    /// document is success.
    pub async fn delete(&self, collection: &str, key: &str) -> bool {
        let Some(coll) = self.collection::<Document>(collection) else {
            return false;
        };

        match coll.delete_one(doc! { "_id": key }).await {
            Ok(_) => true,
            Err(e) => {
                warn!("Failed to delete {collection}/{key}: {e}");
                false
            }
        }
    }

    /// Every document in `collection`.
    ///
    /// `None` means the store is disconnected or the cursor failed, which
    /// callers must not conflate with an empty collection.
    pub async fn scan<T>(&self, collection: &str) -> Option<Vec<T>>
    where
        T: DeserializeOwned + Send + Sync,
    {
        let coll = self.collection::<T>(collection)?;

        let mut cursor = match coll.find(doc! {}).await {
            Ok(cursor) => cursor,
            Err(e) => {
                warn!("Failed to scan {collection}: {e}");
                return None;
            }
        };

        let mut documents = Vec::new();
        loop {
            match cursor.try_next().await {
                Ok(Some(document)) => documents.push(document),
                Ok(None) => break,
                Err(e) => {
                    warn!("Cursor failed while scanning {collection}: {e}");
                    return None;
                }
            }
        }

        Some(documents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn disconnected_store_reports_absence() {
        let store = RemoteStore::disconnected();

        assert!(!store.is_connected());
        assert_eq!(store.get::<Document>("settings", "main_settings").await, None);
        assert!(!store.replace("settings", "main_settings", &doc! {}).await);
        assert!(
            !store
                .update_field("settings", "main_settings", "file_prefix", Bson::Null)
                .await
        );
        assert!(!store.delete("settings", "main_settings").await);
        assert_eq!(store.scan::<Document>("admins").await, None);
    }
}
