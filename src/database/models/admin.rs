//! Administrator identity document.

use serde::{Deserialize, Serialize};

/// One document per administrator in the `admins` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminRecord {
    /// Telegram user ID.
    pub user_id: i64,

    /// Unix timestamp of when the admin was added.
    pub added_at: i64,
}

impl AdminRecord {
    /// Create a record for `user_id`, stamped now.
    pub fn new(user_id: u64) -> Self {
        Self {
            user_id: user_id as i64,
            added_at: chrono::Utc::now().timestamp(),
        }
    }
}
