//! The signed-in user and their preferences.

use tracing::info;

use crate::error::{Error, Result};
use crate::model::{AppState, Background, ColorTheme, Currency, Language, Preferences, Theme, User};

/// Preference changes; `None` leaves a field as it is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PreferencesPatch {
    /// New light/dark theme.
    pub theme: Option<Theme>,
    /// New accent color.
    pub color_theme: Option<ColorTheme>,
    /// New display currency.
    pub currency: Option<Currency>,
    /// New interface language.
    pub language: Option<Language>,
    /// New background.
    pub background: Option<Background>,
}

impl PreferencesPatch {
    /// Whether the patch changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Apply the set fields to `prefs`.
    pub fn apply(&self, prefs: &mut Preferences) {
        if let Some(theme) = self.theme {
            prefs.theme = theme;
        }
        if let Some(color_theme) = self.color_theme {
            prefs.color_theme = color_theme;
        }
        if let Some(currency) = self.currency {
            prefs.currency = currency;
        }
        if let Some(language) = self.language {
            prefs.language = language;
        }
        if let Some(background) = self.background {
            prefs.background = background;
        }
    }
}

fn signed_in(state: &mut AppState) -> Result<&mut User> {
    state.current_user.as_mut().ok_or(Error::NotSignedIn)
}

/// Apply `patch` to the signed-in user's preferences.
///
/// # Errors
///
/// Returns [`Error::NotSignedIn`] when nobody is signed in.
pub fn update_preferences(state: &mut AppState, patch: &PreferencesPatch) -> Result<Preferences> {
    let user = signed_in(state)?;
    patch.apply(&mut user.preferences);
    Ok(user.preferences)
}

/// Switch between light and dark. Returns the new theme.
///
/// # Errors
///
/// Returns [`Error::NotSignedIn`] when nobody is signed in.
pub fn toggle_theme(state: &mut AppState) -> Result<Theme> {
    let user = signed_in(state)?;
    user.preferences.theme = user.preferences.theme.toggled();
    Ok(user.preferences.theme)
}

/// Make `user` the signed-in user.
pub fn sign_in(state: &mut AppState, user: User) {
    info!(email = %user.email, "Signed in");
    state.current_user = Some(user);
}

/// Sign out, returning the user who was signed in.
pub fn sign_out(state: &mut AppState) -> Option<User> {
    let previous = state.current_user.take();
    if let Some(user) = &previous {
        info!(email = %user.email, "Signed out");
    }
    previous
}

/// Preferences in effect: the user's, or the defaults when signed out.
#[must_use]
pub fn preferences(state: &AppState) -> Preferences {
    state
        .current_user
        .as_ref()
        .map(|u| u.preferences)
        .unwrap_or_default()
}
