//! The link vault: saved bookmarks with categories and tags.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::error::{Error, Result};
use crate::model::{next_id, LinkItem};

/// Category used when none is given.
pub const DEFAULT_CATEGORY: &str = "General";

/// Links shown on the dashboard.
pub const RECENT_COUNT: usize = 3;

/// Fields supplied when saving a link.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkDraft {
    /// Display title; required.
    pub title: String,
    /// Target URL; required.
    pub url: String,
    /// Category; blank means [`DEFAULT_CATEGORY`].
    pub category: String,
    /// Comma-separated tags.
    pub tags: String,
}

/// Split a comma-separated tag list, dropping blanks.
#[must_use]
pub fn parse_tags(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Save a link at the front of the vault and return its id.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] if the title or URL is blank.
pub fn add(links: &mut Vec<LinkItem>, draft: &LinkDraft, now: DateTime<Utc>) -> Result<String> {
    let title = draft.title.trim();
    let url = draft.url.trim();
    if title.is_empty() || url.is_empty() {
        return Err(Error::invalid_input("link title and url are required"));
    }

    let category = match draft.category.trim() {
        "" => DEFAULT_CATEGORY,
        other => other,
    };

    let id = next_id(now, links.iter().map(|l| l.id.as_str()));
    links.insert(
        0,
        LinkItem {
            id: id.clone(),
            title: title.to_string(),
            url: url.to_string(),
            category: category.to_string(),
            tags: parse_tags(&draft.tags),
            is_favorite: false,
            created_at: now.timestamp_millis(),
        },
    );
    debug!(id = %id, "Saved link");
    Ok(id)
}

/// Delete link `id`.
///
/// # Errors
///
/// Returns [`Error::NotFound`] for an unknown id.
pub fn remove(links: &mut Vec<LinkItem>, id: &str) -> Result<LinkItem> {
    let index = links
        .iter()
        .position(|l| l.id == id)
        .ok_or_else(|| Error::not_found("link", id))?;
    Ok(links.remove(index))
}

/// Flip the favorite flag. Returns the new value.
///
/// # Errors
///
/// Returns [`Error::NotFound`] for an unknown id.
pub fn toggle_favorite(links: &mut [LinkItem], id: &str) -> Result<bool> {
    let link = links
        .iter_mut()
        .find(|l| l.id == id)
        .ok_or_else(|| Error::not_found("link", id))?;
    link.is_favorite = !link.is_favorite;
    Ok(link.is_favorite)
}

/// Links whose title or category contains `term`, ignoring case.
#[must_use]
pub fn search<'a>(links: &'a [LinkItem], term: &str) -> Vec<&'a LinkItem> {
    let needle = term.to_lowercase();
    links
        .iter()
        .filter(|l| {
            l.title.to_lowercase().contains(&needle) || l.category.to_lowercase().contains(&needle)
        })
        .collect()
}

/// The first `n` links.
#[must_use]
pub fn recent(links: &[LinkItem], n: usize) -> &[LinkItem] {
    &links[..n.min(links.len())]
}

/// Favorite links, in vault order.
#[must_use]
pub fn favorites(links: &[LinkItem]) -> Vec<&LinkItem> {
    links.iter().filter(|l| l.is_favorite).collect()
}
