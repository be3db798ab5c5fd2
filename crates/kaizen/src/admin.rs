//! Administrator overview of every backed-up user and all feedback.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::backup::{BackupService, Bucket, ObjectInfo};
use crate::config::BackupConfig;
use crate::error::{Error, Result};
use crate::format;
use crate::model::{iso_timestamp, AppState, Feedback, FeedbackKind};

/// Shown when a backup has no password.
const MISSING_PASSWORD: &str = "N/A";

/// One user, read from their backup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    /// Backup object name.
    pub file: String,
    /// Email, or one reconstructed from the file name.
    pub email: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Password stored in the backup, or `N/A`.
    pub password: String,
    /// Whether the backup belongs to an administrator.
    pub is_admin: bool,
    /// When the backup was first uploaded.
    pub file_created: DateTime<Utc>,
    /// When the backup was last uploaded.
    pub file_modified: DateTime<Utc>,
}

impl UserRecord {
    fn from_backup(info: &ObjectInfo, backup: Option<&Value>) -> Self {
        let empty = Map::new();
        let user = backup
            .and_then(|doc| doc.get("currentUser"))
            .and_then(Value::as_object)
            .unwrap_or(&empty);
        let text = |field: &str| {
            user.get(field)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(ToString::to_string)
        };

        Self {
            file: info.name.clone(),
            email: text("email").unwrap_or_else(|| email_from_file_name(&info.name)),
            first_name: text("firstName").unwrap_or_default(),
            last_name: text("lastName").unwrap_or_default(),
            password: text("password").unwrap_or_else(|| MISSING_PASSWORD.to_string()),
            is_admin: user.get("isAdmin").and_then(Value::as_bool).unwrap_or(false),
            file_created: info.created_at,
            file_modified: info.updated_at,
        }
    }

    /// `First Last`.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    /// First letters of the first and last name, uppercased.
    #[must_use]
    pub fn initials(&self) -> String {
        self.first_name
            .chars()
            .take(1)
            .chain(self.last_name.chars().take(1))
            .flat_map(char::to_uppercase)
            .collect()
    }
}

/// One feedback message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRecord {
    /// Feedback object name.
    pub file: String,
    /// Sender's user id.
    pub user_id: String,
    /// Sender's display name.
    pub user_name: String,
    /// Message text.
    pub message: String,
    /// Feedback type as stored; unknown types are kept verbatim.
    #[serde(rename = "type")]
    pub kind: String,
    /// When it was sent.
    pub date: String,
}

impl FeedbackRecord {
    fn from_value(file: &str, value: &Value, now: DateTime<Utc>) -> Option<Self> {
        let object = value.as_object()?;
        let text = |field: &str| match object.get(field) {
            Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        };

        let date = text("date")
            .or_else(|| match object.get("timestamp") {
                Some(Value::Number(n)) => n
                    .as_i64()
                    .and_then(DateTime::from_timestamp_millis)
                    .map(iso_timestamp),
                _ => text("timestamp"),
            })
            .unwrap_or_else(|| iso_timestamp(now));

        Some(Self {
            file: file.to_string(),
            user_id: text("userId").unwrap_or_default(),
            user_name: text("userName").unwrap_or_default(),
            message: text("message").unwrap_or_default(),
            kind: text("type").unwrap_or_default(),
            date,
        })
    }

    /// Initials of the sender's display name.
    #[must_use]
    pub fn initials(&self) -> String {
        format::initials(&self.user_name)
    }

    /// Whether this is a bug report.
    #[must_use]
    pub fn is_bug(&self) -> bool {
        self.kind.eq_ignore_ascii_case(FeedbackKind::Bug.as_str())
    }
}

/// Totals for the overview charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    /// User backup files.
    pub total_users: usize,
    /// Readable feedback messages.
    pub total_feedback: usize,
    /// Bug reports.
    pub bug_count: usize,
    /// Everything that is not a bug report.
    pub feature_count: usize,
}

/// Everything the admin overview shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdminReport {
    /// Users, newest backup first.
    pub users: Vec<UserRecord>,
    /// Feedback, newest first.
    pub feedback: Vec<FeedbackRecord>,
    /// Totals.
    pub stats: AdminStats,
}

impl AdminReport {
    /// Users whose email, first or last name contains `term`.
    #[must_use]
    pub fn filter_users(&self, term: &str) -> Vec<&UserRecord> {
        let needle = term.to_lowercase();
        self.users
            .iter()
            .filter(|u| {
                [&u.email, &u.first_name, &u.last_name]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&needle))
            })
            .collect()
    }

    /// Feedback whose message, sender name, type or sender id contains `term`.
    #[must_use]
    pub fn filter_feedback(&self, term: &str) -> Vec<&FeedbackRecord> {
        let needle = term.to_lowercase();
        self.feedback
            .iter()
            .filter(|f| {
                [&f.message, &f.user_name, &f.kind, &f.user_id]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&needle))
            })
            .collect()
    }
}

/// Rebuild an email from a backup file name.
///
/// The key replaced `@` and `.` with `_`, so the first `_` is taken as the
/// `@` and the rest as dots: `ana_example_com.json` gives
/// `ana@example.com`. Names with dots in the local part come back wrong.
#[must_use]
pub fn email_from_file_name(name: &str) -> String {
    let stem = name.strip_suffix(".json").unwrap_or(name);
    match stem.split_once('_') {
        Some((local, domain)) => format!("{local}@{}", domain.replace('_', ".")),
        None => stem.to_string(),
    }
}

/// Load the admin overview from the backup buckets.
///
/// Unreadable user backups still produce a record from their file name;
/// unreadable feedback files are skipped.
///
/// # Errors
///
/// Returns an error if a bucket cannot be listed.
pub async fn load_report(
    backup: &BackupService,
    config: &BackupConfig,
    now: DateTime<Utc>,
) -> Result<AdminReport> {
    let user_files = backup.fetch_bucket_files(Bucket::Users).await?;
    let mut users = Vec::with_capacity(user_files.len());
    for info in &user_files {
        let content = match backup.get_file_content(Bucket::Users, &info.name).await {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(file = %info.name, error = %e, "Unreadable user backup");
                None
            }
        };
        users.push(UserRecord::from_backup(info, content.as_ref()));
    }

    let feedback_files = backup.fetch_bucket_files(Bucket::Feedback).await?;
    let mut feedback = Vec::new();
    for info in feedback_files.iter().take(config.feedback_sample) {
        match backup.get_file_content(Bucket::Feedback, &info.name).await {
            Ok(value) => {
                if let Some(record) = FeedbackRecord::from_value(&info.name, &value, now) {
                    feedback.push(record);
                }
            }
            Err(e) => warn!(file = %info.name, error = %e, "Skipping unreadable feedback"),
        }
    }

    let bug_count = feedback.iter().filter(|f| f.is_bug()).count();
    let stats = AdminStats {
        total_users: user_files.len(),
        total_feedback: feedback.len(),
        bug_count,
        feature_count: feedback.len() - bug_count,
    };
    debug!(users = stats.total_users, feedback = stats.total_feedback, "Loaded admin report");

    Ok(AdminReport {
        users,
        feedback,
        stats,
    })
}

/// Fail unless the signed-in user is an administrator.
///
/// # Errors
///
/// Returns [`Error::NotSignedIn`] or [`Error::AdminRequired`].
pub fn require_admin(state: &AppState) -> Result<()> {
    match &state.current_user {
        None => Err(Error::NotSignedIn),
        Some(user) if !user.is_admin => Err(Error::AdminRequired),
        Some(_) => Ok(()),
    }
}

/// Build the feedback a signed-in user sends.
///
/// # Errors
///
/// Returns [`Error::NotSignedIn`] when nobody is signed in and
/// [`Error::InvalidInput`] for a blank message.
pub fn compose_feedback(
    state: &AppState,
    kind: FeedbackKind,
    message: &str,
    now: DateTime<Utc>,
) -> Result<Feedback> {
    let user = state
        .current_user
        .as_ref()
        .ok_or(Error::NotSignedIn)?;
    let message = message.trim();
    if message.is_empty() {
        return Err(Error::invalid_input("feedback message is required"));
    }
    Ok(Feedback {
        user_id: user.id.clone(),
        user_name: user.full_name(),
        message: message.to_string(),
        kind,
        date: iso_timestamp(now),
    })
}
