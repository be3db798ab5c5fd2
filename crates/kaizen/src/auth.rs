//! Local accounts: sign-in, sign-up and password recovery.
//!
//! Accounts are kept on this device as the user JSON plus a four-digit
//! password under `kaizen_auth_<email key>`. Signing up also writes an
//! initial backup to the users bucket, which is how duplicate emails are
//! detected across devices.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::backup::{BackupError, BackupService};
use crate::config::AuthConfig;
use crate::error::{Error, Result};
use crate::format::pascal_case;
use crate::model::{next_id, Preferences, User};
use crate::storage::Storage;

/// Prefix of local account keys.
pub const ACCOUNT_KEY_PREFIX: &str = "kaizen_auth_";

static EMAIL_SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[@.]").expect("separator pattern is valid"));

static PIN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{4}$").expect("pin pattern is valid"));

/// Lowercased email with `@` and `.` replaced by `_`.
///
/// Used as the backup object name and in the local account key.
#[must_use]
pub fn email_key(email: &str) -> String {
    EMAIL_SEPARATORS
        .replace_all(&email.to_lowercase(), "_")
        .into_owned()
}

/// Storage key of the local account for `email`.
#[must_use]
pub fn account_key(email: &str) -> String {
    format!("{ACCOUNT_KEY_PREFIX}{}", email_key(email))
}

/// Check that `password` is exactly four ASCII digits.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] otherwise.
pub fn validate_pin(password: &str) -> Result<()> {
    if PIN.is_match(password) && password.is_ascii() {
        Ok(())
    } else {
        Err(Error::invalid_input("password must be a 4-digit number"))
    }
}

/// A stored local account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalAccount {
    /// The account's user record.
    #[serde(flatten)]
    pub user: User,
    /// Four-digit password.
    #[serde(default)]
    pub password: String,
}

/// Details entered on sign-up.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registration {
    /// Email address.
    pub email: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Four-digit password.
    pub password: String,
}

/// Account operations against local storage.
#[derive(Debug)]
pub struct Accounts<'a> {
    storage: &'a Storage,
    config: &'a AuthConfig,
}

impl<'a> Accounts<'a> {
    /// Bind to `storage` with the admin credentials in `config`.
    #[must_use]
    pub fn new(storage: &'a Storage, config: &'a AuthConfig) -> Self {
        Self { storage, config }
    }

    /// Load the local account for `email`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if storage fails or the stored account is not
    /// valid JSON.
    pub fn find(&self, email: &str) -> Result<Option<LocalAccount>> {
        self.storage
            .get_item(&account_key(email))?
            .map(|raw| serde_json::from_str(&raw))
            .transpose()
            .map_err(Error::from)
    }

    /// Sign in and return the user (never the password).
    ///
    /// The configured admin email bypasses local accounts.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AccountNotFound`] when no local account exists and
    /// [`Error::IncorrectPassword`] on a password mismatch.
    pub fn login(&self, email: &str, password: &str) -> Result<User> {
        let email = email.trim();
        if email == self.config.admin_email {
            if password != self.config.admin_password {
                warn!("Rejected admin sign-in");
                return Err(Error::IncorrectPassword);
            }
            info!("Admin signed in");
            return Ok(admin_user(email));
        }

        let account = self.find(email)?.ok_or_else(|| Error::AccountNotFound {
            email: email.to_string(),
        })?;
        if account.password != password {
            return Err(Error::IncorrectPassword);
        }
        Ok(account.user)
    }

    /// Create an account, upload its initial backup and store it locally.
    ///
    /// Requires a backup service: an email already present in the users
    /// bucket is refused. A failed initial upload is logged and does not
    /// stop the sign-up.
    ///
    /// # Errors
    ///
    /// Returns [`BackupError::Unavailable`] without a backup service,
    /// [`Error::InvalidInput`] for bad details and [`Error::AccountExists`]
    /// for a known email.
    pub async fn register(
        &self,
        registration: &Registration,
        backup: Option<&BackupService>,
        now: DateTime<Utc>,
    ) -> Result<User> {
        let backup = backup.ok_or(BackupError::Unavailable)?;

        let email = registration.email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(Error::invalid_input(format!("not a valid email: {email:?}")));
        }
        validate_pin(&registration.password)?;

        let key = email_key(email);
        if backup.check_user_exists(&key).await {
            return Err(Error::AccountExists {
                email: email.to_string(),
            });
        }

        let user = User {
            id: next_id(now, []),
            first_name: pascal_case(registration.first_name.trim()),
            last_name: pascal_case(registration.last_name.trim()),
            email: email.to_string(),
            phone: None,
            is_admin: false,
            preferences: Preferences::default(),
        };
        let account = LocalAccount {
            user: user.clone(),
            password: registration.password.clone(),
        };

        let mut initial = Map::new();
        initial.insert("currentUser".to_string(), serde_json::to_value(&account)?);
        for field in ["cards", "links", "transactions", "reminders"] {
            initial.insert(field.to_string(), Value::Array(Vec::new()));
        }
        match serde_json::to_vec(&initial) {
            Ok(bytes) => {
                if let Err(e) = backup.upload_user_backup(bytes, &key).await {
                    warn!(error = %e, "Cloud backup failed during sign-up");
                }
            }
            Err(e) => warn!(error = %e, "Failed to encode initial backup"),
        }

        self.storage
            .set_item(&account_key(email), &serde_json::to_string(&account)?)?;
        info!(email, "Registered account");
        Ok(user)
    }

    /// Return the stored password when the names match the account.
    ///
    /// Names are compared trimmed and case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AccountNotFound`] or [`Error::IdentityMismatch`].
    pub fn recover(&self, email: &str, first_name: &str, last_name: &str) -> Result<String> {
        let account = self.find(email.trim())?.ok_or_else(|| Error::AccountNotFound {
            email: email.trim().to_string(),
        })?;

        let same = |input: &str, stored: &str| input.trim().to_lowercase() == stored.to_lowercase();
        if same(first_name, &account.user.first_name) && same(last_name, &account.user.last_name) {
            Ok(account.password)
        } else {
            Err(Error::IdentityMismatch)
        }
    }
}

/// The built-in administrator.
fn admin_user(email: &str) -> User {
    User {
        id: "admin".to_string(),
        first_name: "Admin".to_string(),
        last_name: "User".to_string(),
        email: email.to_string(),
        phone: None,
        is_admin: true,
        preferences: Preferences::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backup::{Bucket, FsObjectStore, OfflineStore};
    use crate::config::BackupConfig;
    use chrono::TimeZone;
    use std::sync::Arc;

    fn temp_backup(test: &str) -> (BackupService, std::path::PathBuf) {
        let root = std::env::temp_dir().join(format!("kaizen_auth_{test}_{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&root);
        let service = BackupService::new(Arc::new(FsObjectStore::new(&root)), BackupConfig::default());
        (service, root)
    }

    fn registration() -> Registration {
        Registration {
            email: "Ana.Reyes@Example.com".to_string(),
            first_name: "ana".to_string(),
            last_name: "dela cruz".to_string(),
            password: "1234".to_string(),
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.timestamp_millis_opt(1_700_000_000_000).unwrap()
    }

    #[test]
    fn test_email_key() {
        assert_eq!(email_key("Ana.Reyes@Example.com"), "ana_reyes_example_com");
        assert_eq!(account_key("a@b.c"), "kaizen_auth_a_b_c");
    }

    #[test]
    fn test_validate_pin() {
        assert!(validate_pin("0123").is_ok());
        assert!(validate_pin("123").is_err());
        assert!(validate_pin("12345").is_err());
        assert!(validate_pin("12a4").is_err());
        assert!(validate_pin("١٢٣٤").is_err());
    }

    #[test]
    fn test_admin_login() {
        let storage = Storage::open_in_memory().unwrap();
        let config = AuthConfig::default();
        let accounts = Accounts::new(&storage, &config);

        let admin = accounts.login("admin@kaizen.com", "2025").unwrap();
        assert!(admin.is_admin);
        assert_eq!(admin.id, "admin");

        let err = accounts.login("admin@kaizen.com", "0000").unwrap_err();
        assert!(matches!(err, Error::IncorrectPassword));
    }

    #[test]
    fn test_login_unknown_account() {
        let storage = Storage::open_in_memory().unwrap();
        let config = AuthConfig::default();
        let err = Accounts::new(&storage, &config)
            .login("ghost@example.com", "1234")
            .unwrap_err();
        assert!(matches!(err, Error::AccountNotFound { .. }));
    }

    #[tokio::test]
    async fn test_register_requires_backup() {
        let storage = Storage::open_in_memory().unwrap();
        let config = AuthConfig::default();
        let err = Accounts::new(&storage, &config)
            .register(&registration(), None, now())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Backup(BackupError::Unavailable)));
    }

    #[tokio::test]
    async fn test_register_validates_pin() {
        let (backup, root) = temp_backup("pin");
        let storage = Storage::open_in_memory().unwrap();
        let config = AuthConfig::default();
        let mut bad = registration();
        bad.password = "12".to_string();

        let err = Accounts::new(&storage, &config)
            .register(&bad, Some(&backup), now())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput { .. }));
        let _ = std::fs::remove_dir_all(root);
    }

    #[tokio::test]
    async fn test_register_login_recover() {
        let (backup, root) = temp_backup("flow");
        let storage = Storage::open_in_memory().unwrap();
        let config = AuthConfig::default();
        let accounts = Accounts::new(&storage, &config);

        let user = accounts
            .register(&registration(), Some(&backup), now())
            .await
            .unwrap();
        assert_eq!(user.first_name, "Ana");
        assert_eq!(user.last_name, "Dela Cruz");
        assert_eq!(user.id, "1700000000000");
        assert!(!user.is_admin);

        let initial = backup
            .get_file_content(Bucket::Users, "ana_reyes_example_com.json")
            .await
            .unwrap();
        assert_eq!(initial["currentUser"]["password"], "1234");
        assert_eq!(initial["cards"], serde_json::json!([]));

        let signed_in = accounts.login("ana.reyes@example.com", "1234").unwrap();
        assert_eq!(signed_in, user);
        let value = serde_json::to_value(&signed_in).unwrap();
        assert!(value.get("password").is_none());

        let err = accounts.login("Ana.Reyes@Example.com", "9999").unwrap_err();
        assert!(matches!(err, Error::IncorrectPassword));

        let password = accounts
            .recover("ana.reyes@example.com", "  ANA ", "dela CRUZ")
            .unwrap();
        assert_eq!(password, "1234");
        let err = accounts
            .recover("ana.reyes@example.com", "Maria", "Dela Cruz")
            .unwrap_err();
        assert!(matches!(err, Error::IdentityMismatch));
        let _ = std::fs::remove_dir_all(root);
    }

    #[tokio::test]
    async fn test_register_refuses_existing_backup() {
        let (backup, root) = temp_backup("exists");
        backup
            .upload_user_backup(b"{}".to_vec(), "ana_reyes_example_com")
            .await
            .unwrap();
        let storage = Storage::open_in_memory().unwrap();
        let config = AuthConfig::default();

        let err = Accounts::new(&storage, &config)
            .register(&registration(), Some(&backup), now())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::AccountExists { .. }));
        assert!(storage.is_empty().unwrap());
        let _ = std::fs::remove_dir_all(root);
    }

    #[tokio::test]
    async fn test_register_survives_failed_upload() {
        let backup = BackupService::new(Arc::new(OfflineStore), BackupConfig::default());
        let storage = Storage::open_in_memory().unwrap();
        let config = AuthConfig::default();
        let accounts = Accounts::new(&storage, &config);

        let user = accounts
            .register(&registration(), Some(&backup), now())
            .await
            .unwrap();
        assert_eq!(user.email, "Ana.Reyes@Example.com");

        let signed_in = accounts.login("ana.reyes@example.com", "1234").unwrap();
        assert_eq!(signed_in, user);
    }

    #[test]
    fn test_local_account_layout() {
        let account = LocalAccount {
            user: admin_user("x@y.z"),
            password: "1111".to_string(),
        };
        let value = serde_json::to_value(&account).unwrap();
        assert_eq!(value["firstName"], "Admin");
        assert_eq!(value["password"], "1111");
        assert!(value.get("user").is_none());
    }
}
