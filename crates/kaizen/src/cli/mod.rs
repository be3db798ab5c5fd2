//! Command-line interface for kaizen.
//!
//! This module provides the CLI structure and command arguments for the
//! `kaizen` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    AdminCommand, AuthCommand, BackupCommand, BucketArg, BudgetCommand, CardCommand,
    ConfigCommand, FeedbackCommand, HabitCommand, LinkCommand, PrefsCommand, PrefsSetArgs,
    ReminderCommand, StatusCommand, StorageCommand,
};

/// kaizen - Budget, habits, links and reminders in one local document
///
/// Everything is kept in a single JSON document in local storage, with
/// optional backups to a bucket store.
#[derive(Debug, Parser)]
#[command(name = "kaizen")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for info, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the dashboard summary
    Status(StatusCommand),

    /// Track income and expenses
    #[command(subcommand)]
    Budget(BudgetCommand),

    /// Track daily habits
    #[command(subcommand)]
    Habit(HabitCommand),

    /// Manage the link vault
    #[command(subcommand)]
    Link(LinkCommand),

    /// Manage reminders
    #[command(subcommand)]
    Reminder(ReminderCommand),

    /// Manage quick-launch cards
    #[command(subcommand)]
    Card(CardCommand),

    /// View or change preferences
    #[command(subcommand)]
    Prefs(PrefsCommand),

    /// Sign in, sign up and recover accounts
    #[command(subcommand)]
    Auth(AuthCommand),

    /// Push, pull and browse cloud backups
    #[command(subcommand)]
    Backup(BackupCommand),

    /// Send feedback to the developers
    Feedback(FeedbackCommand),

    /// Review users and feedback (admin only)
    #[command(subcommand)]
    Admin(AdminCommand),

    /// Inspect and clean local storage
    #[command(subcommand)]
    Storage(StorageCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        crate::logging::Verbosity::from_flags(self.quiet, self.verbose)
    }
}
