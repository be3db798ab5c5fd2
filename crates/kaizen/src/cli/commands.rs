//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Subcommand, ValueEnum};

use crate::backup::Bucket;
use crate::model::{
    Background, ColorTheme, Currency, FeedbackKind, Language, Theme, TransactionKind,
};
use crate::session::PreferencesPatch;

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Budget commands.
#[derive(Debug, Subcommand)]
pub enum BudgetCommand {
    /// Record a transaction
    Add {
        /// What the money was for
        title: String,

        /// Amount, without sign
        amount: String,

        /// Income or expense
        #[arg(short = 't', long = "type", default_value = "expense")]
        kind: TransactionKind,

        /// Category (defaults to "Others")
        #[arg(long, default_value = "")]
        category: String,

        /// Day of the transaction, YYYY-MM-DD (defaults to today)
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },

    /// Change a transaction
    Edit {
        /// Transaction id
        id: String,

        /// New title
        #[arg(long)]
        title: Option<String>,

        /// New amount
        #[arg(long)]
        amount: Option<String>,

        /// New type
        #[arg(short = 't', long = "type")]
        kind: Option<TransactionKind>,

        /// New category
        #[arg(long)]
        category: Option<String>,

        /// New day, YYYY-MM-DD
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },

    /// Delete a transaction
    Remove {
        /// Transaction id
        id: String,
    },

    /// List transactions, newest first
    List {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show income, expenses, savings rate and spending by category
    Summary {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },
}

/// Habit commands.
#[derive(Debug, Subcommand)]
pub enum HabitCommand {
    /// Start tracking a habit
    Add {
        /// Habit name
        title: String,

        /// Color class (defaults to blue)
        #[arg(long)]
        color: Option<String>,
    },

    /// Stop tracking a habit
    Remove {
        /// Habit id
        id: String,
    },

    /// Mark a habit done or not done
    Toggle {
        /// Habit id
        id: String,

        /// Day to toggle, YYYY-MM-DD (defaults to today)
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },

    /// List habits with streaks and the last seven days
    List {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },
}

/// Link vault commands.
#[derive(Debug, Subcommand)]
pub enum LinkCommand {
    /// Save a link
    Add {
        /// Display title
        title: String,

        /// Target URL
        url: String,

        /// Category (defaults to "General")
        #[arg(long, default_value = "")]
        category: String,

        /// Comma-separated tags
        #[arg(short, long, default_value = "")]
        tags: String,
    },

    /// Delete a link
    Remove {
        /// Link id
        id: String,
    },

    /// Star or unstar a link
    Favorite {
        /// Link id
        id: String,
    },

    /// List saved links
    List {
        /// Only links whose title or category contains this text
        #[arg(short, long)]
        search: Option<String>,

        /// Only favorites
        #[arg(short, long)]
        favorites: bool,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },
}

/// Reminder commands.
#[derive(Debug, Subcommand)]
pub enum ReminderCommand {
    /// Add a reminder
    Add {
        /// Reminder text
        title: String,
    },

    /// Check or uncheck a reminder
    Toggle {
        /// Reminder id
        id: String,
    },

    /// Delete a reminder
    Remove {
        /// Reminder id
        id: String,
    },

    /// List reminders
    List {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },
}

/// Quick-launch card commands.
#[derive(Debug, Subcommand)]
pub enum CardCommand {
    /// Add a shortcut card
    Add {
        /// Card title
        title: String,

        /// Target URL
        url: String,

        /// Color class (defaults to the accent color)
        #[arg(long)]
        color: Option<String>,
    },

    /// Delete a card
    Remove {
        /// Card id
        id: String,
    },

    /// List cards
    List {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },
}

/// Preference commands.
#[derive(Debug, Subcommand)]
pub enum PrefsCommand {
    /// Show preferences in effect
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Change preferences of the signed-in user
    Set(PrefsSetArgs),

    /// Switch between light and dark mode
    ToggleTheme,
}

/// Preference fields to change; omitted fields keep their value.
#[derive(Debug, Args)]
pub struct PrefsSetArgs {
    /// light or dark
    #[arg(long)]
    pub theme: Option<Theme>,

    /// blue, violet, emerald or orange
    #[arg(long)]
    pub color_theme: Option<ColorTheme>,

    /// Currency code, e.g. PHP or USD
    #[arg(long)]
    pub currency: Option<Currency>,

    /// en, fil or ceb
    #[arg(long)]
    pub language: Option<Language>,

    /// Background scene
    #[arg(long)]
    pub background: Option<Background>,
}

impl From<&PrefsSetArgs> for PreferencesPatch {
    fn from(args: &PrefsSetArgs) -> Self {
        Self {
            theme: args.theme,
            color_theme: args.color_theme,
            currency: args.currency,
            language: args.language,
            background: args.background,
        }
    }
}

/// Account commands.
#[derive(Debug, Subcommand)]
pub enum AuthCommand {
    /// Sign in
    Login {
        /// Account email
        email: String,

        /// Four-digit password
        #[arg(short, long)]
        password: String,
    },

    /// Create an account
    Register {
        /// Account email
        email: String,

        /// Given name
        #[arg(long)]
        first_name: String,

        /// Family name
        #[arg(long)]
        last_name: String,

        /// Four-digit password
        #[arg(short, long)]
        password: String,
    },

    /// Show a forgotten password after verifying the account's names
    Recover {
        /// Account email
        email: String,

        /// Given name on the account
        #[arg(long)]
        first_name: String,

        /// Family name on the account
        #[arg(long)]
        last_name: String,
    },

    /// Sign out
    Logout,

    /// Show the signed-in user
    Whoami {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },
}

/// Cloud backup commands.
#[derive(Debug, Subcommand)]
pub enum BackupCommand {
    /// Upload the document of the signed-in user
    Push,

    /// Replace the local document with a user's backup
    Pull {
        /// Whose backup to restore (defaults to the signed-in user)
        #[arg(short, long)]
        email: Option<String>,
    },

    /// List files in a bucket, newest first
    List {
        /// Bucket to list
        #[arg(value_enum, default_value = "users")]
        bucket: BucketArg,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Print the content of a backup file
    Show {
        /// Bucket holding the file
        #[arg(value_enum)]
        bucket: BucketArg,

        /// File name
        name: String,
    },
}

/// Feedback command arguments.
#[derive(Debug, Args)]
pub struct FeedbackCommand {
    /// Message text
    pub message: String,

    /// suggestion, bug or other
    #[arg(short = 't', long = "type", default_value = "suggestion")]
    pub kind: FeedbackKind,
}

/// Admin commands. Require the built-in admin to be signed in.
#[derive(Debug, Subcommand)]
pub enum AdminCommand {
    /// Show user and feedback totals
    Stats {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// List backed-up users
    Users {
        /// Only users whose email or name contains this text
        #[arg(short, long)]
        search: Option<String>,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// List feedback messages
    Feedback {
        /// Only feedback whose message, sender or type contains this text
        #[arg(short, long)]
        search: Option<String>,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },
}

/// Local storage commands.
#[derive(Debug, Subcommand)]
pub enum StorageCommand {
    /// Inspect every stored item with size, source and safety
    Inspect {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Print the raw value of a key
    Show {
        /// Storage key
        key: String,
    },

    /// Delete one key
    Remove {
        /// Storage key
        key: String,

        /// Allow removing the app document itself
        #[arg(long)]
        force: bool,
    },

    /// Delete everything in local storage
    Clear {
        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Bucket argument for backup commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BucketArg {
    /// Per-user backups
    Users,
    /// Feedback submissions
    Feedback,
}

impl From<BucketArg> for Bucket {
    fn from(arg: BucketArg) -> Self {
        match arg {
            BucketArg::Users => Self::Users,
            BucketArg::Feedback => Self::Feedback,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_arg_conversion() {
        assert_eq!(Bucket::from(BucketArg::Users), Bucket::Users);
        assert_eq!(Bucket::from(BucketArg::Feedback), Bucket::Feedback);
    }

    #[test]
    fn test_prefs_args_to_patch() {
        let args = PrefsSetArgs {
            theme: Some(Theme::Dark),
            color_theme: None,
            currency: Some(Currency::Usd),
            language: None,
            background: None,
        };
        let patch = PreferencesPatch::from(&args);
        assert_eq!(patch.theme, Some(Theme::Dark));
        assert_eq!(patch.currency, Some(Currency::Usd));
        assert!(patch.color_theme.is_none());
        assert!(!patch.is_empty());
    }

    #[test]
    fn test_empty_prefs_args() {
        let args = PrefsSetArgs {
            theme: None,
            color_theme: None,
            currency: None,
            language: None,
            background: None,
        };
        assert!(PreferencesPatch::from(&args).is_empty());
    }

    #[test]
    fn test_status_command_debug() {
        let cmd = StatusCommand { json: true };
        let debug_str = format!("{cmd:?}");
        assert!(debug_str.contains("json"));
    }
}
