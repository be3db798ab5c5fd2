//! Backup operations on top of an [`ObjectStore`].

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::auth::email_key;
use crate::config::{BackupConfig, Config};
use crate::document::restore_from;
use crate::error::{Error, Result};
use crate::model::{AppState, Feedback};

use super::{checksum, BackupError, FsObjectStore, ListOptions, ObjectInfo, ObjectStore};

/// The two buckets the app writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    /// One backup document per user, named after the email.
    Users,
    /// One file per feedback message.
    Feedback,
}

impl std::fmt::Display for Bucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Users => write!(f, "users"),
            Self::Feedback => write!(f, "feedback"),
        }
    }
}

/// What [`BackupService::push_state`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushOutcome {
    /// The document was uploaded.
    Uploaded(ObjectInfo),
    /// The remote copy already had the same content.
    Unchanged {
        /// Name of the remote object.
        name: String,
    },
}

/// Backup operations bound to a store and bucket configuration.
#[derive(Debug, Clone)]
pub struct BackupService {
    store: Arc<dyn ObjectStore>,
    config: BackupConfig,
}

impl BackupService {
    /// Create a service over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn ObjectStore>, config: BackupConfig) -> Self {
        Self { store, config }
    }

    /// The filesystem-backed service described by `config`, or `None` when
    /// backups are disabled.
    #[must_use]
    pub fn from_config(config: &Config) -> Option<Self> {
        if !config.backup.enabled {
            debug!("Cloud backup disabled");
            return None;
        }
        let store = FsObjectStore::new(config.backup_root());
        Some(Self::new(Arc::new(store), config.backup.clone()))
    }

    /// Configured name of `bucket`.
    #[must_use]
    pub fn bucket_name(&self, bucket: Bucket) -> &str {
        match bucket {
            Bucket::Users => &self.config.users_bucket,
            Bucket::Feedback => &self.config.feedback_bucket,
        }
    }

    /// Whether a backup named `<key>.json` exists in the users bucket.
    ///
    /// Store errors are logged and reported as "does not exist".
    pub async fn check_user_exists(&self, key: &str) -> bool {
        let target = format!("{key}.json");
        let options = ListOptions {
            limit: None,
            search: Some(key.to_string()),
        };
        match self.store.list(self.bucket_name(Bucket::Users), &options).await {
            Ok(objects) => objects.iter().any(|o| o.name == target),
            Err(e) => {
                warn!(key, error = %e, "Failed to check for existing user");
                false
            }
        }
    }

    /// Upload a user backup, replacing any previous one.
    ///
    /// `.json` is appended to `identifier` unless already present.
    ///
    /// # Errors
    ///
    /// Returns an error if the upload fails.
    pub async fn upload_user_backup(&self, bytes: Vec<u8>, identifier: &str) -> Result<ObjectInfo> {
        let name = if identifier.ends_with(".json") {
            identifier.to_string()
        } else {
            format!("{identifier}.json")
        };
        let info = self
            .store
            .put(self.bucket_name(Bucket::Users), &name, bytes, true)
            .await?;
        info!(name = %info.name, bytes = info.size, "Uploaded user backup");
        Ok(info)
    }

    /// Upload a feedback message as `feedback_<userId>_<millis>.json`.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails or a file with the same
    /// name already exists.
    pub async fn upload_feedback(
        &self,
        feedback: &Feedback,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<ObjectInfo> {
        let name = format!("feedback_{user_id}_{}.json", now.timestamp_millis());
        let bytes = serde_json::to_vec_pretty(feedback)?;
        let info = self
            .store
            .put(self.bucket_name(Bucket::Feedback), &name, bytes, false)
            .await?;
        info!(name = %info.name, kind = %feedback.kind, "Uploaded feedback");
        Ok(info)
    }

    /// Objects in `bucket`, newest first, up to the configured limit.
    ///
    /// # Errors
    ///
    /// Returns an error if the bucket cannot be listed.
    pub async fn fetch_bucket_files(&self, bucket: Bucket) -> Result<Vec<ObjectInfo>> {
        let options = ListOptions::limit(self.config.list_limit);
        Ok(self.store.list(self.bucket_name(bucket), &options).await?)
    }

    /// Download `name` from `bucket` and parse it as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the object is missing or not JSON.
    pub async fn get_file_content(&self, bucket: Bucket, name: &str) -> Result<Value> {
        let bytes = self.store.get(self.bucket_name(bucket), name).await?;
        serde_json::from_slice(&bytes).map_err(|source| {
            Error::Backup(BackupError::Decode {
                name: name.to_string(),
                source,
            })
        })
    }

    /// Upload the signed-in user's document to the users bucket.
    ///
    /// `password` is embedded in the uploaded `currentUser` so the backup
    /// keeps the same layout as the one written at sign-up. Nothing is
    /// uploaded when the remote copy is byte-identical.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotSignedIn`] when nobody is signed in, or an upload
    /// error.
    pub async fn push_state(&self, state: &AppState, password: Option<&str>) -> Result<PushOutcome> {
        let user = state.current_user.as_ref().ok_or(Error::NotSignedIn)?;
        let name = format!("{}.json", email_key(&user.email));

        let mut document = serde_json::to_value(state)?;
        if let (Some(password), Some(Value::Object(current))) =
            (password, document.get_mut("currentUser"))
        {
            current.insert("password".to_string(), Value::String(password.to_string()));
        }
        let bytes = serde_json::to_vec(&document)?;

        let bucket = self.bucket_name(Bucket::Users);
        if let Some(existing) = self.store.stat(bucket, &name).await? {
            if existing.checksum.as_deref() == Some(checksum(&bytes).as_str()) {
                debug!(name = %name, "Remote backup unchanged");
                return Ok(PushOutcome::Unchanged { name });
            }
        }

        let info = self.upload_user_backup(bytes, &name).await?;
        Ok(PushOutcome::Uploaded(info))
    }

    /// Download the backup for `email` and merge it over the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the backup is missing or unreadable.
    pub async fn pull_state(&self, email: &str) -> Result<AppState> {
        let name = format!("{}.json", email_key(email));
        let value = self.get_file_content(Bucket::Users, &name).await?;
        info!(name = %name, "Restored backup");
        Ok(restore_from(value))
    }
}
