use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::{AdminSettings, Habit, LinkItem, QuickCard, Reminder, Transaction, User};

/// The whole persisted application document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    /// Signed-in user, if any.
    pub current_user: Option<User>,
    /// Dashboard shortcuts.
    pub cards: Vec<QuickCard>,
    /// Vault bookmarks, newest first.
    pub links: Vec<LinkItem>,
    /// Budget entries, newest first.
    pub transactions: Vec<Transaction>,
    /// Dashboard to-dos, newest first.
    pub reminders: Vec<Reminder>,
    /// Tracked habits.
    pub habits: Vec<Habit>,
    /// Admin-managed settings.
    pub admin_settings: AdminSettings,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            current_user: None,
            cards: default_cards(),
            links: Vec::new(),
            transactions: Vec::new(),
            reminders: Vec::new(),
            habits: default_habits(),
            admin_settings: AdminSettings::default(),
        }
    }
}

impl AppState {
    /// Whether a user is signed in.
    #[must_use]
    pub fn is_signed_in(&self) -> bool {
        self.current_user.is_some()
    }
}

/// Shortcuts seeded into a fresh document.
#[must_use]
pub fn default_cards() -> Vec<QuickCard> {
    [
        ("1", "Google", "https://google.com", "bg-blue-500"),
        ("2", "YouTube", "https://youtube.com", "bg-red-600"),
        ("3", "ChatGPT", "https://chat.openai.com", "bg-emerald-600"),
    ]
    .into_iter()
    .map(|(id, title, url, color)| QuickCard {
        id: id.to_string(),
        title: title.to_string(),
        url: url.to_string(),
        color: color.to_string(),
        icon: None,
    })
    .collect()
}

/// Habits seeded into a fresh document, or into one that predates habits.
#[must_use]
pub fn default_habits() -> Vec<Habit> {
    let created_at = Utc::now().timestamp_millis();
    [
        ("1", "Drink Water", "bg-blue-500"),
        ("2", "Read 10 Mins", "bg-purple-500"),
    ]
    .into_iter()
    .map(|(id, title, color)| Habit {
        id: id.to_string(),
        title: title.to_string(),
        color: color.to_string(),
        history: Vec::new(),
        created_at,
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state() {
        let state = AppState::default();

        assert!(!state.is_signed_in());
        assert_eq!(state.cards.len(), 3);
        assert_eq!(state.cards[1].title, "YouTube");
        assert_eq!(state.habits.len(), 2);
        assert_eq!(state.habits[0].title, "Drink Water");
        assert!(state.links.is_empty());
        assert!(state.transactions.is_empty());
        assert!(state.reminders.is_empty());
    }

    #[test]
    fn test_state_layout() {
        let value = serde_json::to_value(AppState::default()).unwrap();
        assert!(value["currentUser"].is_null());
        assert!(value["adminSettings"].is_object());
        assert!(value["habits"].is_array());
    }
}
