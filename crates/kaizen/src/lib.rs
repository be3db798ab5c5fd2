//! `kaizen` - A local-first personal productivity store
//!
//! Budget entries, habits, bookmarked links, reminders and quick-launch
//! cards live in one JSON document kept in a local key-value store, with
//! optional backups to a bucket store.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod admin;
pub mod auth;
pub mod backup;
pub mod budget;
pub mod cards;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod document;
pub mod error;
pub mod format;
pub mod habits;
pub mod logging;
pub mod model;
pub mod reminders;
pub mod session;
pub mod storage;
pub mod vault;

pub use backup::{BackupError, BackupService};
pub use config::Config;
pub use document::DocumentStore;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use model::{AppState, User};
pub use storage::{Storage, StorageStats};
