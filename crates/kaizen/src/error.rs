//! Error types for kaizen.
//!
//! This module defines all error types used throughout the kaizen crate,
//! providing detailed context for debugging and user-friendly error messages.

use std::path::PathBuf;
use thiserror::Error;

use crate::backup::BackupError;

/// The main error type for kaizen operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Storage Errors ===
    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Document Errors ===
    /// User input was rejected by a reducer.
    #[error("invalid input: {message}")]
    InvalidInput {
        /// Why the input was rejected.
        message: String,
    },

    /// A record with the given id does not exist.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// The kind of record (habit, transaction, ...).
        kind: &'static str,
        /// The id that was looked up.
        id: String,
    },

    /// The operation needs a signed-in user.
    #[error("no user is signed in")]
    NotSignedIn,

    // === Auth Errors ===
    /// No local account exists for the email.
    #[error("no local account found for {email}")]
    AccountNotFound {
        /// The email that was looked up.
        email: String,
    },

    /// The password did not match the stored account.
    #[error("incorrect password")]
    IncorrectPassword,

    /// The email is already registered in the cloud.
    #[error("{email} is already registered")]
    AccountExists {
        /// The email that is taken.
        email: String,
    },

    /// Identity verification during password recovery failed.
    #[error("identity verification failed: name does not match records")]
    IdentityMismatch,

    /// The signed-in user is not an administrator.
    #[error("administrator access required")]
    AdminRequired,

    // === Backup Errors ===
    /// An object store operation failed.
    #[error("backup error: {0}")]
    Backup(#[from] BackupError),

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for kaizen operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new invalid input error.
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Create a new not-found error.
    #[must_use]
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// Check if this error means a record lookup missed.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::NotSignedIn;
        assert_eq!(err.to_string(), "no user is signed in");

        let err = Error::invalid_input("title is required");
        assert_eq!(err.to_string(), "invalid input: title is required");
    }

    #[test]
    fn test_not_found_display() {
        let err = Error::not_found("habit", "1700000000000");
        assert_eq!(err.to_string(), "habit not found: 1700000000000");
        assert!(err.is_not_found());
        assert!(!Error::NotSignedIn.is_not_found());
    }

    #[test]
    fn test_account_exists_display() {
        let err = Error::AccountExists {
            email: "juan@example.com".to_string(),
        };
        assert!(err.to_string().contains("juan@example.com"));
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_from_backup_error() {
        let err: Error = BackupError::Unavailable.into();
        assert!(matches!(err, Error::Backup(BackupError::Unavailable)));
    }

    #[test]
    fn test_from_rusqlite_error() {
        let result = rusqlite::Connection::open_with_flags(
            "/nonexistent/path/db.sqlite",
            rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY,
        );
        if let Err(sqlite_err) = result {
            let err: Error = sqlite_err.into();
            assert!(matches!(err, Error::DatabaseQuery(_)));
        }
    }

    #[test]
    fn test_from_json_error() {
        let json_result: std::result::Result<i32, serde_json::Error> =
            serde_json::from_str("not valid json");
        if let Err(json_err) = json_result {
            let err: Error = json_err.into();
            assert!(matches!(err, Error::Json(_)));
        }
    }

    #[test]
    fn test_database_migration_error_display() {
        let err = Error::DatabaseMigration {
            message: "version mismatch".to_string(),
        };
        assert!(err.to_string().contains("version mismatch"));
    }

    #[test]
    fn test_directory_create_error_display() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = Error::DirectoryCreate {
            path: PathBuf::from("/root/forbidden"),
            source: io_err,
        };
        assert!(err.to_string().contains("/root/forbidden"));
    }
}
