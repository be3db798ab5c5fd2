//! Cloud backup of user documents and feedback.
//!
//! Backups live in an object store made of flat, named buckets. The
//! [`ObjectStore`] trait is the seam between the backup logic in
//! [`BackupService`] and where the bytes actually go; [`FsObjectStore`]
//! keeps one directory per bucket.

mod fs;
mod service;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

pub use fs::FsObjectStore;
pub use service::{BackupService, Bucket, PushOutcome};

/// Errors raised by object stores.
#[derive(Debug, Error)]
pub enum BackupError {
    /// Backups are disabled or no store is configured.
    #[error("cloud backup is not available")]
    Unavailable,

    /// The object does not exist.
    #[error("object {name} not found in bucket {bucket}")]
    NotFound {
        /// Bucket searched.
        bucket: String,
        /// Object name.
        name: String,
    },

    /// The object exists and overwriting was not allowed.
    #[error("object {name} already exists in bucket {bucket}")]
    AlreadyExists {
        /// Target bucket.
        bucket: String,
        /// Object name.
        name: String,
    },

    /// A bucket or object name that cannot be stored.
    #[error("invalid object name: {name:?}")]
    InvalidName {
        /// The rejected name.
        name: String,
    },

    /// The store could not be read or written.
    #[error("storage error in bucket {bucket}: {source}")]
    Io {
        /// Bucket being accessed.
        bucket: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// An object's content is not valid JSON.
    #[error("object {name} is not valid JSON: {source}")]
    Decode {
        /// Object name.
        name: String,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },
}

/// Result type for object store operations.
pub type Result<T> = std::result::Result<T, BackupError>;

/// Metadata about a stored object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectInfo {
    /// Object name within its bucket.
    pub name: String,
    /// Size in bytes.
    pub size: u64,
    /// When the object was first written.
    pub created_at: DateTime<Utc>,
    /// When the object was last written.
    pub updated_at: DateTime<Utc>,
    /// BLAKE3 hex digest of the content, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
}

/// Options for [`ObjectStore::list`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListOptions {
    /// Maximum number of objects returned.
    pub limit: Option<usize>,
    /// Only names containing this text.
    pub search: Option<String>,
}

impl ListOptions {
    /// List at most `limit` objects.
    #[must_use]
    pub fn limit(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            search: None,
        }
    }
}

/// A store of named objects grouped in buckets.
#[async_trait::async_trait]
pub trait ObjectStore: Send + Sync + std::fmt::Debug {
    /// Write `bytes` as `name` in `bucket`.
    ///
    /// # Errors
    ///
    /// Returns [`BackupError::AlreadyExists`] if the object exists and
    /// `upsert` is false, or an I/O error.
    async fn put(&self, bucket: &str, name: &str, bytes: Vec<u8>, upsert: bool)
        -> Result<ObjectInfo>;

    /// Read the content of `name` in `bucket`.
    ///
    /// # Errors
    ///
    /// Returns [`BackupError::NotFound`] if the object does not exist.
    async fn get(&self, bucket: &str, name: &str) -> Result<Vec<u8>>;

    /// List objects in `bucket`, newest first.
    ///
    /// A bucket that was never written to is empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the bucket cannot be read.
    async fn list(&self, bucket: &str, options: &ListOptions) -> Result<Vec<ObjectInfo>>;

    /// Metadata of `name` in `bucket`, if it exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the bucket cannot be read.
    async fn stat(&self, bucket: &str, name: &str) -> Result<Option<ObjectInfo>>;
}

/// BLAKE3 hex digest of `bytes`.
#[must_use]
pub fn checksum(bytes: &[u8]) -> String {
    blake3::hash(bytes).to_hex().to_string()
}

/// An object store whose every operation fails, for exercising the
/// offline paths.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct OfflineStore;

#[cfg(test)]
impl OfflineStore {
    fn offline(bucket: &str) -> BackupError {
        BackupError::Io {
            bucket: bucket.to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotConnected, "offline"),
        }
    }
}

#[cfg(test)]
#[async_trait::async_trait]
impl ObjectStore for OfflineStore {
    async fn put(&self, bucket: &str, _: &str, _: Vec<u8>, _: bool) -> Result<ObjectInfo> {
        Err(Self::offline(bucket))
    }

    async fn get(&self, bucket: &str, _: &str) -> Result<Vec<u8>> {
        Err(Self::offline(bucket))
    }

    async fn list(&self, bucket: &str, _: &ListOptions) -> Result<Vec<ObjectInfo>> {
        Err(Self::offline(bucket))
    }

    async fn stat(&self, bucket: &str, _: &str) -> Result<Option<ObjectInfo>> {
        Err(Self::offline(bucket))
    }
}
