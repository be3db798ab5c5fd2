//! Storage inspection: what is stored, how big it is, and what is safe to
//! delete.

use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::error::Result;
use crate::model::date_of;

use super::{Storage, StoredItem};

/// Maximum characters of a plain string shown in a summary.
const SUMMARY_TEXT_LIMIT: usize = 50;

/// Object keys listed in a summary before eliding the rest.
const SUMMARY_KEY_LIMIT: usize = 4;

/// Fields checked, in order, for a date to show next to an item.
const DATE_FIELDS: [&str; 5] = ["date", "createdAt", "updatedAt", "timestamp", "lastModified"];

/// How risky it is to delete a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Safety {
    /// Deleting wipes the application document.
    Critical,
    /// Likely session or account data.
    Caution,
    /// Cache or unknown data.
    Safe,
}

impl Safety {
    /// Classify `key`, given the key of the application document.
    #[must_use]
    pub fn of(key: &str, document_key: &str) -> Self {
        if key == document_key {
            Self::Critical
        } else if ["supabase", "auth", "token", "user"]
            .iter()
            .any(|needle| key.contains(*needle))
        {
            Self::Caution
        } else {
            Self::Safe
        }
    }
}

impl std::fmt::Display for Safety {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Critical => "critical",
            Self::Caution => "caution",
            Self::Safe => "safe",
        })
    }
}

/// Overall storage usage against the quota.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Health {
    /// Up to 70% used.
    Optimal,
    /// More than 70% used.
    Warning,
    /// More than 90% used.
    Critical,
}

impl Health {
    /// Health for `used` bytes out of `quota`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_usage(used: u64, quota: u64) -> Self {
        let usage = if quota == 0 {
            1.0
        } else {
            used as f64 / quota as f64
        };
        if usage > 0.9 {
            Self::Critical
        } else if usage > 0.7 {
            Self::Warning
        } else {
            Self::Optimal
        }
    }
}

impl std::fmt::Display for Health {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Optimal => "Optimal",
            Self::Warning => "Warning",
            Self::Critical => "Critical",
        })
    }
}

/// One inspected key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemReport {
    /// Storage key.
    pub key: String,
    /// Value size in bytes.
    pub size: u64,
    /// Whether the value parses as JSON.
    pub valid: bool,
    /// Date found inside the value, formatted for display.
    pub date: Option<String>,
    /// Which component most likely wrote the key.
    pub source: &'static str,
    /// Deletion risk.
    pub safety: Safety,
    /// One-line description of the value.
    pub summary: String,
}

/// Result of scanning the whole store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StorageReport {
    /// Items, critical first, then largest first.
    pub items: Vec<ItemReport>,
    /// Sum of all value sizes.
    pub total_bytes: u64,
    /// Quota the usage is measured against.
    pub quota_bytes: u64,
    /// Usage as a percentage of the quota, capped at 100.
    pub usage_percent: f64,
    /// Usage health.
    pub health: Health,
}

impl StorageReport {
    /// Whether every value is valid JSON.
    #[must_use]
    pub fn all_valid(&self) -> bool {
        self.items.iter().all(|item| item.valid)
    }
}

/// Scan every key in `storage`.
///
/// # Errors
///
/// Returns an error if the store cannot be read.
pub fn scan(storage: &Storage, document_key: &str, quota_bytes: u64) -> Result<StorageReport> {
    let items = storage.items()?;
    Ok(build_report(&items, document_key, quota_bytes))
}

/// Build a report from already-loaded items.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn build_report(items: &[StoredItem], document_key: &str, quota_bytes: u64) -> StorageReport {
    let mut reports: Vec<ItemReport> = items
        .iter()
        .map(|item| inspect_item(item, document_key))
        .collect();
    reports.sort_by(|a, b| match (a.safety, b.safety) {
        (Safety::Critical, s) if s != Safety::Critical => Ordering::Less,
        (s, Safety::Critical) if s != Safety::Critical => Ordering::Greater,
        _ => b.size.cmp(&a.size),
    });

    let total_bytes: u64 = reports.iter().map(|r| r.size).sum();
    let usage_percent = if quota_bytes == 0 {
        100.0
    } else {
        (total_bytes as f64 / quota_bytes as f64 * 100.0).min(100.0)
    };

    StorageReport {
        items: reports,
        total_bytes,
        quota_bytes,
        usage_percent,
        health: Health::from_usage(total_bytes, quota_bytes),
    }
}

/// Inspect a single stored item.
#[must_use]
pub fn inspect_item(item: &StoredItem, document_key: &str) -> ItemReport {
    let parsed = serde_json::from_str::<Value>(&item.value).ok();

    ItemReport {
        key: item.key.clone(),
        size: item.size(),
        valid: parsed.is_some(),
        date: parsed.as_ref().and_then(extract_date),
        source: identify_source(&item.key),
        safety: Safety::of(&item.key, document_key),
        summary: summarize(parsed.as_ref(), &item.value),
    }
}

/// Guess which component wrote `key`.
#[must_use]
pub fn identify_source(key: &str) -> &'static str {
    const SOURCES: [(&str, &str); 5] = [
        ("kaizen", "Kaizen Core"),
        ("supabase", "Supabase Auth"),
        ("vite", "Vite Dev"),
        ("google", "Google Services"),
        ("firebase", "Firebase"),
    ];
    SOURCES
        .iter()
        .find(|(needle, _)| key.contains(*needle))
        .map_or("External / System", |(_, label)| *label)
}

/// Find a displayable date in a JSON value.
#[must_use]
pub fn extract_date(value: &Value) -> Option<String> {
    let object = value.as_object()?;

    for field in DATE_FIELDS {
        if let Some(at) = object.get(field).and_then(parse_moment) {
            return Some(at.format("%b %d, %Y %H:%M").to_string());
        }
    }

    object
        .get("transactions")
        .and_then(Value::as_array)
        .and_then(|txs| txs.first())
        .and_then(|tx| tx.get("date"))
        .and_then(Value::as_str)
        .and_then(date_of)
        .map(|day: NaiveDate| day.format("%b %d, %Y").to_string())
}

/// Interpret a JSON value as a point in time: epoch milliseconds, an
/// RFC 3339 timestamp, or a bare day.
fn parse_moment(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .filter(|ms| *ms != 0)
            .and_then(DateTime::from_timestamp_millis),
        Value::String(s) if !s.is_empty() => DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
            .or_else(|| date_of(s).map(|day| day.and_time(chrono::NaiveTime::MIN).and_utc())),
        _ => None,
    }
}

/// One-line description of a stored value.
#[must_use]
pub fn summarize(parsed: Option<&Value>, raw: &str) -> String {
    let keys: Option<Vec<String>> = match parsed {
        Some(Value::Object(map)) => Some(map.keys().cloned().collect()),
        Some(Value::Array(items)) => Some((0..items.len()).map(|i| i.to_string()).collect()),
        _ => None,
    };

    let Some(keys) = keys else {
        return quote_truncated(raw);
    };

    if keys.is_empty() {
        return "Empty Object {}".to_string();
    }

    if let Some(Value::Object(map)) = parsed {
        if map.contains_key("currentUser") {
            return summarize_document(map);
        }
    }

    let preview = keys
        .iter()
        .take(SUMMARY_KEY_LIMIT)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    let more = if keys.len() > SUMMARY_KEY_LIMIT { ", ..." } else { "" };
    format!("Contains: {preview}{more}")
}

fn summarize_document(map: &serde_json::Map<String, Value>) -> String {
    let user = match map.get("currentUser") {
        Some(Value::Object(user)) => {
            let name = |field: &str| user.get(field).and_then(Value::as_str).unwrap_or_default();
            format!("{} {}", name("firstName"), name("lastName"))
        }
        _ => "Guest".to_string(),
    };
    let count = |field: &str| map.get(field).and_then(Value::as_array).map_or(0, Vec::len);
    format!(
        "User: {user} • Tx: {} • Links: {}",
        count("transactions"),
        count("links")
    )
}

fn quote_truncated(raw: &str) -> String {
    if raw.chars().count() > SUMMARY_TEXT_LIMIT {
        let head: String = raw.chars().take(SUMMARY_TEXT_LIMIT).collect();
        format!("\"{head}...\"")
    } else {
        format!("\"{raw}\"")
    }
}
