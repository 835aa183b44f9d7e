//! Database model exports.

pub mod admin;
pub mod settings;
pub mod thumbnail;

pub use admin::AdminRecord;
pub use settings::{Settings, SettingsField, SettingsUpdate, UnknownField};
pub use thumbnail::ThumbnailDoc;
