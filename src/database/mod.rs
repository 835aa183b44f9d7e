//! Database module exports.

pub mod models;
mod remote;
mod repository;

pub use remote::RemoteStore;
pub use repository::{AdminStore, AdminSync, Propagation, SettingsStore};
