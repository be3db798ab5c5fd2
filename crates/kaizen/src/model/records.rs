use serde::{Deserialize, Deserializer, Serialize};

use super::string_enum;

/// A quick-launch shortcut on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct QuickCard {
    /// Record id.
    pub id: String,
    /// Label.
    pub title: String,
    /// Target URL.
    pub url: String,
    /// Color class.
    pub color: String,
    /// Optional icon name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

/// A bookmarked link in the vault.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LinkItem {
    /// Record id.
    pub id: String,
    /// Label.
    pub title: String,
    /// Target URL.
    pub url: String,
    /// Free-form category.
    pub category: String,
    /// Tags.
    pub tags: Vec<String>,
    /// Pinned as a favorite.
    pub is_favorite: bool,
    /// Creation time in epoch milliseconds.
    pub created_at: i64,
}

/// Direction of a budget transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money in.
    Income,
    /// Money out.
    #[default]
    Expense,
}

string_enum!(TransactionKind, "transaction type", {
    Income => "income",
    Expense => "expense",
});

/// A budget entry.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Transaction {
    /// Record id.
    pub id: String,
    /// Description.
    pub title: String,
    /// Non-negative amount; the sign comes from `kind`.
    #[serde(deserialize_with = "lenient_amount")]
    pub amount: f64,
    /// Income or expense.
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    /// Category label.
    pub category: String,
    /// ISO-8601 timestamp.
    pub date: String,
}

impl Transaction {
    /// Amount with income positive and expense negative.
    #[must_use]
    pub fn signed_amount(&self) -> f64 {
        match self.kind {
            TransactionKind::Income => self.amount,
            TransactionKind::Expense => -self.amount,
        }
    }
}

/// Older documents stored amounts as strings; accept both. A missing
/// amount (`null`) reads as zero.
fn lenient_amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Amount {
        Number(f64),
        Text(String),
    }

    match Option::<Amount>::deserialize(deserializer)? {
        None => Ok(0.0),
        Some(Amount::Number(n)) => Ok(n),
        Some(Amount::Text(s)) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

/// A dashboard to-do.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Reminder {
    /// Record id.
    pub id: String,
    /// Text.
    pub title: String,
    /// ISO-8601 creation time.
    pub date: String,
    /// Checked off.
    pub completed: bool,
}

/// A tracked daily habit.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Habit {
    /// Record id.
    pub id: String,
    /// Label.
    pub title: String,
    /// Color class.
    pub color: String,
    /// Completed days as sorted `YYYY-MM-DD` strings.
    pub history: Vec<String>,
    /// Creation time in epoch milliseconds.
    pub created_at: i64,
}

/// Settings only the admin edits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AdminSettings {
    /// Base64 GCash QR image.
    pub gcash_qr: Option<String>,
    /// Base64 RCBC QR image.
    pub rcbc_qr: Option<String>,
    /// Text shown with the donation options.
    pub donation_message: String,
}

impl Default for AdminSettings {
    fn default() -> Self {
        Self {
            gcash_qr: None,
            rcbc_qr: None,
            donation_message: "Support the developer (Optional)".to_string(),
        }
    }
}

/// Kind of a feedback submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackKind {
    /// Feature idea.
    #[default]
    Suggestion,
    /// Bug report.
    Bug,
    /// Anything else.
    Other,
}

string_enum!(FeedbackKind, "feedback type", {
    Suggestion => "suggestion",
    Bug => "bug",
    Other => "other",
});

/// A feedback submission uploaded to the feedback bucket.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Feedback {
    /// Id of the submitting user.
    pub user_id: String,
    /// Display name of the submitting user.
    pub user_name: String,
    /// Free text.
    pub message: String,
    /// Suggestion, bug or other.
    #[serde(rename = "type")]
    pub kind: FeedbackKind,
    /// ISO-8601 submission time.
    pub date: String,
}
