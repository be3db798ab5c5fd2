//! Configuration management for kaizen.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "kaizen";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "kaizen.db";

/// Default backup directory name (under the data directory).
const BACKUP_DIR_NAME: &str = "buckets";

/// Key under which the application document is stored.
pub const DEFAULT_DOCUMENT_KEY: &str = "kaizen_app_db_v1";

/// Approximate local storage quota (5 MiB).
pub const DEFAULT_QUOTA_BYTES: u64 = 5 * 1024 * 1024;

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `KAIZEN_`)
/// 2. TOML config file at `~/.config/kaizen/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Local storage configuration.
    pub storage: StorageConfig,
    /// Cloud backup configuration.
    pub backup: BackupConfig,
    /// Local auth configuration.
    pub auth: AuthConfig,
}

/// Local storage configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/kaizen/kaizen.db`
    pub database_path: Option<PathBuf>,
    /// Key of the application document.
    pub document_key: String,
    /// Storage quota used for the health report.
    pub quota_bytes: u64,
}

/// Cloud backup configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackupConfig {
    /// Whether the backup store is reachable. Sign-up and feedback need it.
    pub enabled: bool,
    /// Root directory of the bucket store.
    /// Defaults to `~/.local/share/kaizen/buckets`
    pub root: Option<PathBuf>,
    /// Bucket holding per-user backups.
    pub users_bucket: String,
    /// Bucket holding feedback submissions.
    pub feedback_bucket: String,
    /// Maximum number of files returned by a bucket listing.
    pub list_limit: usize,
    /// Maximum number of feedback files loaded by the admin report.
    pub feedback_sample: usize,
}

/// Local auth configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Email that signs in as the built-in admin.
    pub admin_email: String,
    /// Password of the built-in admin.
    pub admin_password: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            document_key: DEFAULT_DOCUMENT_KEY.to_string(),
            quota_bytes: DEFAULT_QUOTA_BYTES,
        }
    }
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            root: None,
            users_bucket: "kaizenusers".to_string(),
            feedback_bucket: "kaizenfeedback".to_string(),
            list_limit: 100,
            feedback_sample: 50,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            admin_email: "admin@kaizen.com".to_string(),
            admin_password: "2025".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("KAIZEN_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.storage.document_key.trim().is_empty() {
            return Err(Error::ConfigValidation {
                message: "document_key cannot be empty".to_string(),
            });
        }

        if self.storage.quota_bytes == 0 {
            return Err(Error::ConfigValidation {
                message: "quota_bytes must be greater than 0".to_string(),
            });
        }

        for (name, bucket) in [
            ("users_bucket", &self.backup.users_bucket),
            ("feedback_bucket", &self.backup.feedback_bucket),
        ] {
            if bucket.trim().is_empty() || bucket.contains(['/', '\\']) {
                return Err(Error::ConfigValidation {
                    message: format!("{name} must be a plain, non-empty name: {bucket:?}"),
                });
            }
        }

        if self.backup.users_bucket == self.backup.feedback_bucket {
            return Err(Error::ConfigValidation {
                message: "users_bucket and feedback_bucket must differ".to_string(),
            });
        }

        if self.backup.list_limit == 0 {
            return Err(Error::ConfigValidation {
                message: "list_limit must be greater than 0".to_string(),
            });
        }

        if self.auth.admin_email.trim().is_empty() {
            return Err(Error::ConfigValidation {
                message: "admin_email cannot be empty".to_string(),
            });
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Get the backup root, resolving defaults if not set.
    #[must_use]
    pub fn backup_root(&self) -> PathBuf {
        self.backup
            .root
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(BACKUP_DIR_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.storage.document_key, "kaizen_app_db_v1");
        assert_eq!(config.storage.quota_bytes, 5 * 1024 * 1024);
        assert!(config.backup.enabled);
        assert_eq!(config.backup.users_bucket, "kaizenusers");
        assert_eq!(config.backup.feedback_bucket, "kaizenfeedback");
        assert_eq!(config.backup.list_limit, 100);
        assert_eq!(config.backup.feedback_sample, 50);
        assert_eq!(config.auth.admin_email, "admin@kaizen.com");
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_empty_document_key() {
        let mut config = Config::default();
        config.storage.document_key = "  ".to_string();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("document_key"));
    }

    #[test]
    fn test_validate_zero_quota() {
        let mut config = Config::default();
        config.storage.quota_bytes = 0;

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("quota_bytes"));
    }

    #[test]
    fn test_validate_bucket_with_separator() {
        let mut config = Config::default();
        config.backup.users_bucket = "a/b".to_string();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("users_bucket"));
    }

    #[test]
    fn test_validate_same_buckets() {
        let mut config = Config::default();
        config.backup.feedback_bucket = config.backup.users_bucket.clone();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("must differ"));
    }

    #[test]
    fn test_validate_zero_list_limit() {
        let mut config = Config::default();
        config.backup.list_limit = 0;

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_database_path_default() {
        let path = Config::default().database_path();
        assert!(path.to_string_lossy().contains("kaizen.db"));
    }

    #[test]
    fn test_database_path_custom() {
        let mut config = Config::default();
        config.storage.database_path = Some(PathBuf::from("/custom/path/db.sqlite"));

        assert_eq!(
            config.database_path(),
            PathBuf::from("/custom/path/db.sqlite")
        );
    }

    #[test]
    fn test_backup_root_default() {
        let path = Config::default().backup_root();
        assert!(path.to_string_lossy().contains("buckets"));
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path();
        assert!(path.to_string_lossy().contains("kaizen"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_load_nonexistent_config() {
        let config = Config::load_from(Some(PathBuf::from("/nonexistent/config.toml"))).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_from_toml_file() {
        let dir = std::env::temp_dir().join(format!("kaizen_config_test_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(
            &path,
            "[backup]\nenabled = false\nlist_limit = 10\n\n[auth]\nadmin_password = \"9999\"\n",
        )
        .unwrap();

        let config = Config::load_from(Some(path)).unwrap();
        assert!(!config.backup.enabled);
        assert_eq!(config.backup.list_limit, 10);
        assert_eq!(config.auth.admin_password, "9999");
        assert_eq!(config.storage, StorageConfig::default());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_storage_config_deserialize() {
        let json = r#"{"document_key": "custom_key", "quota_bytes": 1024}"#;
        let storage: StorageConfig = serde_json::from_str(json).unwrap();
        assert_eq!(storage.document_key, "custom_key");
        assert_eq!(storage.quota_bytes, 1024);
        assert!(storage.database_path.is_none());
    }
}
