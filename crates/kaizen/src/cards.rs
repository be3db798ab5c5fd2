//! Dashboard quick-launch cards.

use chrono::{DateTime, Utc};

use crate::error::{Error, Result};
use crate::model::{next_id, ColorTheme, QuickCard};

/// Colors offered for a new card.
pub const COLORS: [&str; 8] = [
    "bg-blue-500",
    "bg-red-500",
    "bg-green-500",
    "bg-purple-500",
    "bg-orange-500",
    "bg-teal-500",
    "bg-slate-700",
    "bg-indigo-600",
];

/// Card color matching the accent theme.
#[must_use]
pub fn theme_color(theme: ColorTheme) -> String {
    format!("bg-{theme}-500")
}

/// Append a card and return its id.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] if the title or URL is blank.
pub fn add(
    cards: &mut Vec<QuickCard>,
    title: &str,
    url: &str,
    color: &str,
    now: DateTime<Utc>,
) -> Result<String> {
    let (title, url) = (title.trim(), url.trim());
    if title.is_empty() || url.is_empty() {
        return Err(Error::invalid_input("card title and url are required"));
    }

    let id = next_id(now, cards.iter().map(|c| c.id.as_str()));
    cards.push(QuickCard {
        id: id.clone(),
        title: title.to_string(),
        url: url.to_string(),
        color: color.to_string(),
        icon: None,
    });
    Ok(id)
}

/// Remove card `id`.
///
/// # Errors
///
/// Returns [`Error::NotFound`] for an unknown id.
pub fn remove(cards: &mut Vec<QuickCard>, id: &str) -> Result<QuickCard> {
    let index = cards
        .iter()
        .position(|c| c.id == id)
        .ok_or_else(|| Error::not_found("card", id))?;
    Ok(cards.remove(index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::default_cards;

    #[test]
    fn test_add_appends() {
        let mut cards = default_cards();
        let id = add(&mut cards, "Docs", "https://docs.rs", "bg-red-500", Utc::now()).unwrap();

        assert_eq!(cards.len(), 4);
        assert_eq!(cards[3].id, id);
        assert_eq!(cards[3].title, "Docs");
        assert_eq!(cards[3].color, "bg-red-500");
    }

    #[test]
    fn test_add_requires_title_and_url() {
        let mut cards = Vec::new();
        assert!(add(&mut cards, "", "https://x", "bg-red-500", Utc::now()).is_err());
        assert!(add(&mut cards, "X", "  ", "bg-red-500", Utc::now()).is_err());
        assert!(cards.is_empty());
    }

    #[test]
    fn test_remove() {
        let mut cards = default_cards();
        assert_eq!(remove(&mut cards, "2").unwrap().title, "YouTube");
        assert_eq!(cards.len(), 2);
        assert!(remove(&mut cards, "2").unwrap_err().is_not_found());
    }

    #[test]
    fn test_theme_color() {
        assert_eq!(theme_color(ColorTheme::Emerald), "bg-emerald-500");
        assert_eq!(theme_color(ColorTheme::default()), "bg-blue-500");
    }
}
