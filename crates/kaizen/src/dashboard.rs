//! Home screen summary of the document.

use chrono::NaiveDate;
use serde::Serialize;

use crate::budget;
use crate::format::{short_date, Greeting};
use crate::habits::{self, HabitStats};
use crate::model::{AppState, LinkItem, QuickCard};
use crate::reminders;
use crate::session;
use crate::vault::{self, RECENT_COUNT};

/// What the dashboard shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    /// `Good Morning, Ana` or just the greeting when signed out.
    pub greeting: String,
    /// Today as `Mon d, yyyy`.
    pub date: String,
    /// Ledger balance.
    pub balance: f64,
    /// Balance with the preferred currency symbol.
    pub balance_display: String,
    /// Habit figures for today.
    pub habits: HabitStats,
    /// Reminders not yet completed.
    pub pending_reminders: usize,
    /// Most recently saved links.
    pub recent_links: Vec<LinkItem>,
    /// Quick-launch shortcuts.
    pub cards: Vec<QuickCard>,
}

/// Summarize `state` for `today` at local `hour`.
#[must_use]
pub fn build(state: &AppState, today: NaiveDate, hour: u32) -> Dashboard {
    let greeting = Greeting::for_hour(hour);
    let greeting = match &state.current_user {
        Some(user) if !user.first_name.is_empty() => format!("{greeting}, {}", user.first_name),
        _ => greeting.to_string(),
    };
    let balance = budget::balance(&state.transactions);

    Dashboard {
        greeting,
        date: short_date(today),
        balance,
        balance_display: session::preferences(state).currency.format_amount(balance),
        habits: habits::stats(&state.habits, today),
        pending_reminders: reminders::pending(&state.reminders),
        recent_links: vault::recent(&state.links, RECENT_COUNT).to_vec(),
        cards: state.cards.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Currency, Reminder, Transaction, TransactionKind, User};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()
    }

    #[test]
    fn test_signed_out_defaults() {
        let dashboard = build(&AppState::default(), today(), 9);
        assert_eq!(dashboard.greeting, "Good Morning");
        assert_eq!(dashboard.date, "Mar 5, 2024");
        assert_eq!(dashboard.balance_display, "₱0.00");
        assert_eq!(dashboard.habits.total, 2);
        assert_eq!(dashboard.cards.len(), 3);
        assert!(dashboard.recent_links.is_empty());
    }

    #[test]
    fn test_signed_in_summary() {
        let mut state = AppState::default();
        let mut user = User {
            first_name: "Ana".to_string(),
            ..User::default()
        };
        user.preferences.currency = Currency::Usd;
        state.current_user = Some(user);
        state.transactions = vec![
            Transaction {
                amount: 100.0,
                kind: TransactionKind::Income,
                ..Transaction::default()
            },
            Transaction {
                amount: 40.0,
                kind: TransactionKind::Expense,
                ..Transaction::default()
            },
        ];
        state.reminders = vec![
            Reminder::default(),
            Reminder {
                completed: true,
                ..Reminder::default()
            },
        ];
        state.links = (0..5)
            .map(|i| LinkItem {
                id: i.to_string(),
                ..LinkItem::default()
            })
            .collect();

        let dashboard = build(&state, today(), 19);
        assert_eq!(dashboard.greeting, "Good Evening, Ana");
        assert_eq!(dashboard.balance_display, "$60.00");
        assert_eq!(dashboard.pending_reminders, 1);
        assert_eq!(dashboard.recent_links.len(), RECENT_COUNT);
        assert_eq!(dashboard.recent_links[0].id, "0");
    }
}
