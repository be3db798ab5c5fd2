//! Display helpers shared by the CLI and the admin views.

use std::sync::LazyLock;

use chrono::{NaiveDate, Timelike};
use regex::Regex;

static WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\w)(\w*)").expect("word pattern is valid"));

/// Capitalize the first letter of every word and lowercase the rest.
///
/// `"juan DELA cruz"` becomes `"Juan Dela Cruz"`.
#[must_use]
pub fn pascal_case(name: &str) -> String {
    WORD.replace_all(name, |caps: &regex::Captures<'_>| {
        format!("{}{}", caps[1].to_uppercase(), caps[2].to_lowercase())
    })
    .into_owned()
}

/// Part of the day, used for the dashboard greeting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Greeting {
    /// Before noon.
    Morning,
    /// Noon until 6 PM.
    Afternoon,
    /// 6 PM onwards.
    Evening,
}

impl Greeting {
    /// Greeting for an hour of the day (0-23).
    #[must_use]
    pub fn for_hour(hour: u32) -> Self {
        match hour {
            0..=11 => Self::Morning,
            12..=17 => Self::Afternoon,
            _ => Self::Evening,
        }
    }

    /// Greeting for a wall-clock time.
    #[must_use]
    pub fn at(time: &impl Timelike) -> Self {
        Self::for_hour(time.hour())
    }

    /// English greeting text.
    #[must_use]
    pub fn text(self) -> &'static str {
        match self {
            Self::Morning => "Good Morning",
            Self::Afternoon => "Good Afternoon",
            Self::Evening => "Good Evening",
        }
    }
}

impl std::fmt::Display for Greeting {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.text())
    }
}

/// `Jan 5, 2024`.
#[must_use]
pub fn short_date(day: NaiveDate) -> String {
    day.format("%b %-d, %Y").to_string()
}

/// Human-readable byte size: `0 B`, `512 B`, `1.5 KB`, `2 MB`.
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut exponent = 0;
    let mut threshold = 1024_u64;
    while bytes >= threshold && exponent < UNITS.len() - 1 {
        exponent += 1;
        threshold = threshold.saturating_mul(1024);
    }
    let scaled = bytes as f64 / 1024_f64.powi(exponent as i32);
    let rounded = (scaled * 100.0).round() / 100.0;

    // Trim trailing zeros the way a float-to-string conversion would.
    let text = format!("{rounded:.2}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    format!("{text} {}", UNITS[exponent])
}

/// Two-letter initials for a display name.
///
/// Two or more words use the first letter of the first two; a single word
/// uses its first two letters; an empty name yields `??`.
#[must_use]
pub fn initials(name: &str) -> String {
    let parts: Vec<&str> = name.split_whitespace().collect();
    let letters: String = match parts.as_slice() {
        [] => return "??".to_string(),
        [single] => single.chars().take(2).collect(),
        [first, second, ..] => first.chars().take(1).chain(second.chars().take(1)).collect(),
    };
    letters.to_uppercase()
}
