//! Core document types for kaizen.
//!
//! Everything here serializes to the camelCase JSON layout of the persisted
//! application document, so a document written by older versions of the app
//! loads without conversion.

mod records;
mod state;
mod user;

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use thiserror::Error;

pub use records::{
    AdminSettings, Feedback, FeedbackKind, Habit, LinkItem, QuickCard, Reminder, Transaction,
    TransactionKind,
};
pub use state::{default_cards, default_habits, AppState};
pub use user::{Background, ColorTheme, Currency, Language, Preferences, Theme, User};

/// Format of habit history entries and date-only input.
pub const DAY_FORMAT: &str = "%Y-%m-%d";

/// Returned when a string does not name a variant of a document enum.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}', expected one of: {expected}")]
pub struct ParseEnumError {
    kind: &'static str,
    value: String,
    expected: String,
}

/// Implements `Display`, `FromStr` and an `ALL` list for a unit-only enum
/// using the same spelling as its serde representation.
macro_rules! string_enum {
    ($name:ident, $kind:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// The persisted spelling of this variant.
            #[must_use]
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::model::ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim() {
                    $(v if v.eq_ignore_ascii_case($text) => Ok(Self::$variant),)+
                    other => Err($crate::model::ParseEnumError::new(
                        $kind,
                        other,
                        &[$($text),+],
                    )),
                }
            }
        }
    };
}

pub(crate) use string_enum;

impl ParseEnumError {
    pub(crate) fn new(kind: &'static str, value: &str, expected: &[&str]) -> Self {
        Self {
            kind,
            value: value.to_string(),
            expected: expected.join(", "),
        }
    }
}

/// Generate a record id from the current time.
///
/// Ids are epoch milliseconds as a string. When that value is already taken
/// in `existing`, the next free millisecond is used.
#[must_use]
pub fn next_id<'a>(now: DateTime<Utc>, existing: impl IntoIterator<Item = &'a str>) -> String {
    let taken: HashSet<&str> = existing.into_iter().collect();
    let mut candidate = now.timestamp_millis();
    loop {
        let id = candidate.to_string();
        if !taken.contains(id.as_str()) {
            return id;
        }
        candidate += 1;
    }
}

/// Render a calendar day as `YYYY-MM-DD`.
#[must_use]
pub fn day_key(day: NaiveDate) -> String {
    day.format(DAY_FORMAT).to_string()
}

/// Parse a `YYYY-MM-DD` string.
#[must_use]
pub fn parse_day(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DAY_FORMAT).ok()
}

/// Render a timestamp the way the document stores dates (`toISOString`).
#[must_use]
pub fn iso_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Midnight UTC of `day`, in document date format.
#[must_use]
pub fn iso_day(day: NaiveDate) -> String {
    iso_timestamp(day.and_time(chrono::NaiveTime::MIN).and_utc())
}

/// Calendar day of a stored date string.
///
/// Accepts RFC 3339 timestamps and bare `YYYY-MM-DD` days.
#[must_use]
pub fn date_of(value: &str) -> Option<NaiveDate> {
    DateTime::parse_from_rfc3339(value.trim())
        .map(|dt| dt.with_timezone(&Utc).date_naive())
        .ok()
        .or_else(|| value.get(..10).and_then(parse_day))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_next_id_uses_millis() {
        let now = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        assert_eq!(next_id(now, []), "1700000000123");
    }

    #[test]
    fn test_next_id_skips_taken() {
        let now = Utc.timestamp_millis_opt(1_000).unwrap();
        let id = next_id(now, ["1000", "1001", "1003"]);
        assert_eq!(id, "1002");
    }

    #[test]
    fn test_day_key_and_parse() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(day_key(day), "2024-03-07");
        assert_eq!(parse_day("2024-03-07"), Some(day));
        assert_eq!(parse_day("07/03/2024"), None);
    }

    #[test]
    fn test_iso_day() {
        let day = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        assert_eq!(iso_day(day), "2024-01-31T00:00:00.000Z");
    }

    #[test]
    fn test_date_of() {
        let day = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        assert_eq!(date_of("2024-05-01T00:00:00.000Z"), Some(day));
        assert_eq!(date_of("2024-05-01"), Some(day));
        assert_eq!(date_of("2024-05-01T23:30:00+08:00"), Some(day));
        assert_eq!(date_of("garbage"), None);
        assert_eq!(date_of(""), None);
    }

    #[test]
    fn test_parse_enum_error_display() {
        let err = "purple".parse::<Theme>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "unknown theme 'purple', expected one of: light, dark"
        );
    }
}
