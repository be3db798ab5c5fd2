//! `kaizen` - CLI for the kaizen productivity store
//!
//! This binary reads and updates the local document and talks to the
//! backup buckets.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use anyhow::{bail, Context};
use chrono::{Local, NaiveDate, Timelike, Utc};
use clap::Parser;
use serde::Serialize;

use kaizen::auth::{Accounts, Registration};
use kaizen::backup::{BackupError, BackupService, Bucket, PushOutcome};
use kaizen::budget::{self, CategoryTotal, DailyNet, TransactionDraft};
use kaizen::cli::{
    AdminCommand, AuthCommand, BackupCommand, BudgetCommand, CardCommand, Cli, Command,
    ConfigCommand, FeedbackCommand, HabitCommand, LinkCommand, PrefsCommand, ReminderCommand,
    StorageCommand,
};
use kaizen::format::{format_bytes, short_date};
use kaizen::habits::{self, DayCell};
use kaizen::model::{date_of, Habit, LinkItem};
use kaizen::session::{self, PreferencesPatch};
use kaizen::storage::inspect::{self, Safety};
use kaizen::vault::{self, LinkDraft};
use kaizen::{
    admin, cards, dashboard, init_logging, reminders, Config, DocumentStore, Error, Storage,
};

type CliResult = anyhow::Result<()>;

/// Everything a command needs.
#[derive(Debug)]
struct App {
    config: Config,
    storage: Storage,
    backup: Option<BackupService>,
}

impl App {
    fn open(config: Config) -> anyhow::Result<Self> {
        config.validate()?;
        let path = config.database_path();
        let storage = Storage::open(&path)
            .with_context(|| format!("failed to open local storage at {}", path.display()))?;
        let backup = BackupService::from_config(&config);
        Ok(Self {
            config,
            storage,
            backup,
        })
    }

    fn document(&self) -> DocumentStore<'_> {
        DocumentStore::new(&self.storage, self.config.storage.document_key.clone())
    }

    fn accounts(&self) -> Accounts<'_> {
        Accounts::new(&self.storage, &self.config.auth)
    }

    fn backup(&self) -> Result<&BackupService, BackupError> {
        self.backup.as_ref().ok_or(BackupError::Unavailable)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let config = Config::load_from(cli.config.clone())?;

    // Configuration commands work without opening storage
    if let Command::Config(config_cmd) = cli.command {
        handle_config(&config, config_cmd)?;
        return Ok(());
    }

    let app = App::open(config)?;
    match cli.command {
        Command::Status(status_cmd) => handle_status(&app, status_cmd.json)?,
        Command::Budget(budget_cmd) => handle_budget(&app, budget_cmd)?,
        Command::Habit(habit_cmd) => handle_habit(&app, habit_cmd)?,
        Command::Link(link_cmd) => handle_link(&app, link_cmd)?,
        Command::Reminder(reminder_cmd) => handle_reminder(&app, reminder_cmd)?,
        Command::Card(card_cmd) => handle_card(&app, card_cmd)?,
        Command::Prefs(prefs_cmd) => handle_prefs(&app, prefs_cmd)?,
        Command::Auth(auth_cmd) => handle_auth(&app, auth_cmd).await?,
        Command::Backup(backup_cmd) => handle_backup(&app, backup_cmd).await?,
        Command::Feedback(feedback_cmd) => handle_feedback(&app, feedback_cmd).await?,
        Command::Admin(admin_cmd) => handle_admin(&app, admin_cmd).await?,
        Command::Storage(storage_cmd) => handle_storage(&app, storage_cmd)?,
        Command::Config(config_cmd) => handle_config(&app.config, config_cmd)?,
    }
    Ok(())
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn display_date(stored: &str) -> String {
    date_of(stored).map_or_else(|| stored.to_string(), short_date)
}

fn handle_status(app: &App, json: bool) -> CliResult {
    let state = app.document().load()?;
    let now = Local::now();
    let dashboard = dashboard::build(&state, now.date_naive(), now.hour());

    if json {
        return print_json(&dashboard);
    }

    println!("{}", dashboard.greeting);
    println!("{}", dashboard.date);
    println!();
    println!("Balance:      {}", dashboard.balance_display);
    println!(
        "Habits:       {}/{} done today (best streak {})",
        dashboard.habits.done_today, dashboard.habits.total, dashboard.habits.best_streak
    );
    println!("Reminders:    {} pending", dashboard.pending_reminders);
    let cards: Vec<&str> = dashboard.cards.iter().map(|c| c.title.as_str()).collect();
    println!("Cards:        {}", cards.join(", "));
    if !dashboard.recent_links.is_empty() {
        println!();
        println!("Recent links:");
        for link in &dashboard.recent_links {
            println!("  {}  {}", link.title, link.url);
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct BudgetReport {
    #[serde(flatten)]
    summary: budget::BudgetSummary,
    categories: Vec<CategoryTotal>,
    daily: Vec<DailyNet>,
}

fn handle_budget(app: &App, cmd: BudgetCommand) -> CliResult {
    let document = app.document();
    match cmd {
        BudgetCommand::Add {
            title,
            amount,
            kind,
            category,
            date,
        } => {
            let draft = TransactionDraft {
                title,
                amount: budget::parse_amount(&amount)?,
                kind,
                category,
                date: date.unwrap_or_else(today),
            };
            let id = document.update(|state| budget::add(&mut state.transactions, &draft, Utc::now()))?;
            println!("Added {kind} {id}");
        }
        BudgetCommand::Edit {
            id,
            title,
            amount,
            kind,
            category,
            date,
        } => {
            let amount = amount.as_deref().map(budget::parse_amount).transpose()?;
            document.update(|state| {
                let existing = state
                    .transactions
                    .iter()
                    .find(|tx| tx.id == id)
                    .ok_or_else(|| Error::not_found("transaction", id.as_str()))?;
                let draft = TransactionDraft {
                    title: title.clone().unwrap_or_else(|| existing.title.clone()),
                    amount: amount.unwrap_or(existing.amount),
                    kind: kind.unwrap_or(existing.kind),
                    category: category.clone().unwrap_or_else(|| existing.category.clone()),
                    date: date
                        .or_else(|| date_of(&existing.date))
                        .unwrap_or_else(today),
                };
                budget::edit(&mut state.transactions, &id, &draft)
            })?;
            println!("Updated transaction {id}");
        }
        BudgetCommand::Remove { id } => {
            let removed = document.update(|state| budget::remove(&mut state.transactions, &id))?;
            println!("Removed \"{}\"", removed.title);
        }
        BudgetCommand::List { json } => {
            let state = document.load()?;
            if json {
                return print_json(&state.transactions);
            }
            if state.transactions.is_empty() {
                println!("No transactions yet.");
                return Ok(());
            }
            let currency = session::preferences(&state).currency;
            for tx in &state.transactions {
                println!(
                    "{:<15} {:<13} {:>14}  {} [{}]",
                    tx.id,
                    display_date(&tx.date),
                    currency.format_amount(tx.signed_amount()),
                    tx.title,
                    tx.category
                );
            }
        }
        BudgetCommand::Summary { json } => {
            let state = document.load()?;
            let report = BudgetReport {
                summary: budget::summarize(&state.transactions),
                categories: budget::expenses_by_category(&state.transactions),
                daily: budget::daily_net(&state.transactions),
            };
            if json {
                return print_json(&report);
            }

            let currency = session::preferences(&state).currency;
            let summary = report.summary;
            println!("Income:        {}", currency.format_amount(summary.income));
            println!("Expenses:      {}", currency.format_amount(summary.expense));
            println!("Balance:       {}", currency.format_amount(summary.balance));
            println!("Savings rate:  {:.1}%", summary.savings_rate);
            println!("Health:        {} - {}", summary.health, summary.health.message());
            if !report.categories.is_empty() {
                println!();
                println!("Spending by category:");
                for category in &report.categories {
                    println!(
                        "  {:<20} {}",
                        category.name,
                        currency.format_amount(category.value)
                    );
                }
            }
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct HabitView<'a> {
    #[serde(flatten)]
    habit: &'a Habit,
    streak: u32,
    week: Vec<DayCell>,
}

fn handle_habit(app: &App, cmd: HabitCommand) -> CliResult {
    let document = app.document();
    match cmd {
        HabitCommand::Add { title, color } => {
            let id = document
                .update(|state| habits::add(&mut state.habits, &title, color.as_deref(), Utc::now()))?;
            println!("Tracking \"{}\" ({id})", title.trim());
        }
        HabitCommand::Remove { id } => {
            let removed = document.update(|state| habits::remove(&mut state.habits, &id))?;
            println!("Stopped tracking \"{}\"", removed.title);
        }
        HabitCommand::Toggle { id, date } => {
            let day = date.unwrap_or_else(today);
            let done = document.update(|state| habits::toggle(&mut state.habits, &id, day))?;
            let status = if done { "done" } else { "not done" };
            println!("Marked {status} for {}", short_date(day));
        }
        HabitCommand::List { json } => {
            let state = document.load()?;
            let today = today();
            let views: Vec<HabitView<'_>> = state
                .habits
                .iter()
                .map(|habit| HabitView {
                    habit,
                    streak: habits::streak(habit, today),
                    week: habits::week(habit, today),
                })
                .collect();
            if json {
                return print_json(&views);
            }

            for view in &views {
                let strip: String = view
                    .week
                    .iter()
                    .map(|cell| if cell.done { 'x' } else { '.' })
                    .collect();
                println!(
                    "{:<15} [{strip}] {:>3} day streak  {}",
                    view.habit.id, view.streak, view.habit.title
                );
            }
            let stats = habits::stats(&state.habits, today);
            println!();
            println!(
                "{}/{} done today, {} check-ins total",
                stats.done_today, stats.total, stats.total_completions
            );
        }
    }
    Ok(())
}

fn handle_link(app: &App, cmd: LinkCommand) -> CliResult {
    let document = app.document();
    match cmd {
        LinkCommand::Add {
            title,
            url,
            category,
            tags,
        } => {
            let draft = LinkDraft {
                title,
                url,
                category,
                tags,
            };
            let id = document.update(|state| vault::add(&mut state.links, &draft, Utc::now()))?;
            println!("Saved link {id}");
        }
        LinkCommand::Remove { id } => {
            let removed = document.update(|state| vault::remove(&mut state.links, &id))?;
            println!("Removed \"{}\"", removed.title);
        }
        LinkCommand::Favorite { id } => {
            let favorite = document.update(|state| vault::toggle_favorite(&mut state.links, &id))?;
            println!("{}", if favorite { "Added to favorites" } else { "Removed from favorites" });
        }
        LinkCommand::List {
            search,
            favorites,
            json,
        } => {
            let state = document.load()?;
            let mut links: Vec<&LinkItem> = match &search {
                Some(term) => vault::search(&state.links, term),
                None => state.links.iter().collect(),
            };
            if favorites {
                links.retain(|link| link.is_favorite);
            }
            if json {
                return print_json(&links);
            }
            if links.is_empty() {
                println!("No links found.");
                return Ok(());
            }
            for link in links {
                let star = if link.is_favorite { "*" } else { " " };
                print!("{star} {:<15} {} [{}]  {}", link.id, link.title, link.category, link.url);
                if !link.tags.is_empty() {
                    print!("  #{}", link.tags.join(" #"));
                }
                println!();
            }
        }
    }
    Ok(())
}

fn handle_reminder(app: &App, cmd: ReminderCommand) -> CliResult {
    let document = app.document();
    match cmd {
        ReminderCommand::Add { title } => {
            let id = document.update(|state| reminders::add(&mut state.reminders, &title, Utc::now()))?;
            println!("Added reminder {id}");
        }
        ReminderCommand::Toggle { id } => {
            let completed = document.update(|state| reminders::toggle(&mut state.reminders, &id))?;
            println!("{}", if completed { "Completed" } else { "Reopened" });
        }
        ReminderCommand::Remove { id } => {
            let removed = document.update(|state| reminders::remove(&mut state.reminders, &id))?;
            println!("Removed \"{}\"", removed.title);
        }
        ReminderCommand::List { json } => {
            let state = document.load()?;
            if json {
                return print_json(&state.reminders);
            }
            for reminder in &state.reminders {
                let check = if reminder.completed { "x" } else { " " };
                println!("[{check}] {:<15} {}", reminder.id, reminder.title);
            }
            println!();
            println!("{} pending", reminders::pending(&state.reminders));
        }
    }
    Ok(())
}

fn handle_card(app: &App, cmd: CardCommand) -> CliResult {
    let document = app.document();
    match cmd {
        CardCommand::Add { title, url, color } => {
            let id = document.update(|state| {
                let color = color
                    .clone()
                    .unwrap_or_else(|| cards::theme_color(session::preferences(state).color_theme));
                cards::add(&mut state.cards, &title, &url, &color, Utc::now())
            })?;
            println!("Added card {id}");
        }
        CardCommand::Remove { id } => {
            let removed = document.update(|state| cards::remove(&mut state.cards, &id))?;
            println!("Removed \"{}\"", removed.title);
        }
        CardCommand::List { json } => {
            let state = document.load()?;
            if json {
                return print_json(&state.cards);
            }
            for card in &state.cards {
                println!("{:<15} {:<12} {}", card.id, card.title, card.url);
            }
        }
    }
    Ok(())
}

fn handle_prefs(app: &App, cmd: PrefsCommand) -> CliResult {
    let document = app.document();
    match cmd {
        PrefsCommand::Show { json } => {
            let prefs = session::preferences(&document.load()?);
            if json {
                return print_json(&prefs);
            }
            println!("Theme:        {}", prefs.theme);
            println!("Color theme:  {}", prefs.color_theme);
            println!("Currency:     {} ({})", prefs.currency, prefs.currency.symbol());
            println!("Language:     {}", prefs.language);
            println!("Background:   {}", prefs.background);
        }
        PrefsCommand::Set(args) => {
            let patch = PreferencesPatch::from(&args);
            if patch.is_empty() {
                bail!("nothing to change; pass at least one preference option");
            }
            document.update(|state| session::update_preferences(state, &patch))?;
            println!("Preferences updated.");
        }
        PrefsCommand::ToggleTheme => {
            let theme = document.update(session::toggle_theme)?;
            println!("Theme is now {theme}");
        }
    }
    Ok(())
}

async fn handle_auth(app: &App, cmd: AuthCommand) -> CliResult {
    let document = app.document();
    let accounts = app.accounts();
    match cmd {
        AuthCommand::Login { email, password } => {
            let user = accounts.login(&email, &password)?;
            let name = user.full_name();
            document.update(|state| {
                session::sign_in(state, user);
                Ok(())
            })?;
            println!("Signed in as {name}");
        }
        AuthCommand::Register {
            email,
            first_name,
            last_name,
            password,
        } => {
            let registration = Registration {
                email,
                first_name,
                last_name,
                password,
            };
            let user = accounts
                .register(&registration, app.backup.as_ref(), Utc::now())
                .await?;
            let name = user.full_name();
            document.update(|state| {
                session::sign_in(state, user);
                Ok(())
            })?;
            println!("Welcome, {name}! Your account is ready.");
        }
        AuthCommand::Recover {
            email,
            first_name,
            last_name,
        } => {
            let password = accounts.recover(&email, &first_name, &last_name)?;
            println!("Identity verified. Your password is {password}");
        }
        AuthCommand::Logout => match document.update(|state| Ok(session::sign_out(state)))? {
            Some(user) => println!("Signed out {}", user.email),
            None => println!("Nobody is signed in."),
        },
        AuthCommand::Whoami { json } => {
            let state = document.load()?;
            if json {
                return print_json(&state.current_user);
            }
            match &state.current_user {
                Some(user) => {
                    let role = if user.is_admin { " (admin)" } else { "" };
                    println!("[{}] {} <{}>{role}", user.initials(), user.full_name(), user.email);
                }
                None => println!("Not signed in."),
            }
        }
    }
    Ok(())
}

async fn handle_backup(app: &App, cmd: BackupCommand) -> CliResult {
    let backup = app.backup()?;
    let document = app.document();
    match cmd {
        BackupCommand::Push => {
            let state = document.load()?;
            let user = state.current_user.as_ref().ok_or(Error::NotSignedIn)?;
            let password = app.accounts().find(&user.email)?.map(|account| account.password);
            match backup.push_state(&state, password.as_deref()).await? {
                PushOutcome::Uploaded(info) => {
                    println!("Uploaded {} ({})", info.name, format_bytes(info.size));
                }
                PushOutcome::Unchanged { name } => println!("{name} is already up to date."),
            }
        }
        BackupCommand::Pull { email } => {
            let email = match email {
                Some(email) => email,
                None => document
                    .load()?
                    .current_user
                    .map(|user| user.email)
                    .ok_or(Error::NotSignedIn)?,
            };
            let restored = backup
                .pull_state(&email)
                .await
                .with_context(|| format!("failed to restore the backup of {email}"))?;
            document.save(&restored)?;
            println!(
                "Restored {} transactions, {} links, {} reminders and {} habits.",
                restored.transactions.len(),
                restored.links.len(),
                restored.reminders.len(),
                restored.habits.len()
            );
        }
        BackupCommand::List { bucket, json } => {
            let bucket = Bucket::from(bucket);
            let files = backup.fetch_bucket_files(bucket).await?;
            if json {
                return print_json(&files);
            }
            println!("{} ({} files)", backup.bucket_name(bucket), files.len());
            for file in &files {
                println!(
                    "  {:<40} {:>10}  {}",
                    file.name,
                    format_bytes(file.size),
                    file.updated_at.with_timezone(&Local).format("%b %-d, %Y %H:%M")
                );
            }
        }
        BackupCommand::Show { bucket, name } => {
            let content = backup.get_file_content(bucket.into(), &name).await?;
            print_json(&content)?;
        }
    }
    Ok(())
}

async fn handle_feedback(app: &App, cmd: FeedbackCommand) -> CliResult {
    let state = app.document().load()?;
    let now = Utc::now();
    let feedback = admin::compose_feedback(&state, cmd.kind, &cmd.message, now)?;
    let info = app
        .backup()?
        .upload_feedback(&feedback, &feedback.user_id, now)
        .await?;
    println!("Thanks for the feedback! Saved as {}", info.name);
    Ok(())
}

async fn handle_admin(app: &App, cmd: AdminCommand) -> CliResult {
    admin::require_admin(&app.document().load()?)?;
    let report = admin::load_report(app.backup()?, &app.config.backup, Utc::now()).await?;

    match cmd {
        AdminCommand::Stats { json } => {
            if json {
                return print_json(&report.stats);
            }
            println!("Users:             {}", report.stats.total_users);
            println!("Feedback:          {}", report.stats.total_feedback);
            println!("  Bug reports:     {}", report.stats.bug_count);
            println!("  Other feedback:  {}", report.stats.feature_count);
        }
        AdminCommand::Users { search, json } => {
            let users = report.filter_users(search.as_deref().unwrap_or_default());
            if json {
                return print_json(&users);
            }
            for user in users {
                println!(
                    "[{:<2}] {:<30} {:<25} pin {:<6} updated {}",
                    user.initials(),
                    user.email,
                    user.full_name(),
                    user.password,
                    user.file_modified.with_timezone(&Local).format("%b %-d, %Y")
                );
            }
        }
        AdminCommand::Feedback { search, json } => {
            let feedback = report.filter_feedback(search.as_deref().unwrap_or_default());
            if json {
                return print_json(&feedback);
            }
            for entry in feedback {
                println!(
                    "[{}] {} ({}) {}: {}",
                    entry.initials(),
                    entry.user_name,
                    entry.kind,
                    display_date(&entry.date),
                    entry.message
                );
            }
        }
    }
    Ok(())
}

fn handle_storage(app: &App, cmd: StorageCommand) -> CliResult {
    let document_key = &app.config.storage.document_key;
    match cmd {
        StorageCommand::Inspect { json } => {
            let report = inspect::scan(&app.storage, document_key, app.config.storage.quota_bytes)?;
            if json {
                return print_json(&report);
            }

            let stats = app.storage.stats()?;
            println!("Database:  {} ({})", app.storage.path().display(), format_bytes(stats.db_size_bytes));
            println!(
                "Usage:     {} of {} ({:.1}%) - {}",
                format_bytes(report.total_bytes),
                format_bytes(report.quota_bytes),
                report.usage_percent,
                report.health
            );
            if !report.all_valid() {
                println!("Some values are not valid JSON.");
            }
            println!();
            for item in &report.items {
                println!(
                    "{:<8} {:<32} {:>10}  {:<14} {}",
                    item.safety,
                    item.key,
                    format_bytes(item.size),
                    item.source,
                    item.date.as_deref().unwrap_or("-")
                );
                println!("         {}", item.summary);
            }
        }
        StorageCommand::Show { key } => match app.storage.get_item(&key)? {
            Some(value) => println!("{value}"),
            None => return Err(Error::not_found("storage key", key).into()),
        },
        StorageCommand::Remove { key, force } => {
            if Safety::of(&key, document_key) == Safety::Critical && !force {
                bail!("{key} holds the whole app document; pass --force to remove it");
            }
            if app.storage.remove_item(&key)? {
                println!("Removed {key}");
            } else {
                println!("{key} was not stored.");
            }
        }
        StorageCommand::Clear { yes } => {
            if yes {
                let removed = app.storage.clear()?;
                println!("Removed {removed} items.");
            } else {
                println!("This deletes every local item, including the app document.");
                println!("Use --yes to confirm.");
            }
        }
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> CliResult {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                return print_json(config);
            }
            println!("Current Configuration");
            println!("=====================");
            println!();
            println!("[Storage]");
            println!("  Database path:      {}", config.database_path().display());
            println!("  Document key:       {}", config.storage.document_key);
            println!("  Quota:              {}", format_bytes(config.storage.quota_bytes));
            println!();
            println!("[Backup]");
            println!("  Enabled:            {}", config.backup.enabled);
            println!("  Root:               {}", config.backup_root().display());
            println!("  Users bucket:       {}", config.backup.users_bucket);
            println!("  Feedback bucket:    {}", config.backup.feedback_bucket);
            println!("  List limit:         {}", config.backup.list_limit);
            println!("  Feedback sample:    {}", config.backup.feedback_sample);
            println!();
            println!("[Auth]");
            println!("  Admin email:        {}", config.auth.admin_email);
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)).and_then(|config| config.validate()) {
                Ok(()) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
