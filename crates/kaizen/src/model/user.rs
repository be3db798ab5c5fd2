use serde::{Deserialize, Serialize};

use super::string_enum;

/// Light or dark appearance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Light appearance.
    #[default]
    Light,
    /// Dark appearance.
    Dark,
}

string_enum!(Theme, "theme", { Light => "light", Dark => "dark" });

impl Theme {
    /// The other theme.
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

/// Accent color of the interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorTheme {
    /// Blue accent.
    #[default]
    Blue,
    /// Violet accent.
    Violet,
    /// Emerald accent.
    Emerald,
    /// Orange accent.
    Orange,
}

string_enum!(ColorTheme, "color theme", {
    Blue => "blue",
    Violet => "violet",
    Emerald => "emerald",
    Orange => "orange",
});

/// Display currency for budget amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// Philippine peso.
    #[default]
    Php,
    /// US dollar.
    Usd,
    /// Euro.
    Eur,
    /// Japanese yen.
    Jpy,
    /// Pound sterling.
    Gbp,
    /// Australian dollar.
    Aud,
    /// Canadian dollar.
    Cad,
    /// Singapore dollar.
    Sgd,
}

string_enum!(Currency, "currency", {
    Php => "PHP",
    Usd => "USD",
    Eur => "EUR",
    Jpy => "JPY",
    Gbp => "GBP",
    Aud => "AUD",
    Cad => "CAD",
    Sgd => "SGD",
});

impl Currency {
    /// Symbol shown before amounts.
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Php => "₱",
            Self::Usd => "$",
            Self::Eur => "€",
            Self::Jpy => "¥",
            Self::Gbp => "£",
            Self::Aud => "A$",
            Self::Cad => "C$",
            Self::Sgd => "S$",
        }
    }

    /// Format an amount with this currency's symbol and two decimals.
    #[must_use]
    pub fn format_amount(self, amount: f64) -> String {
        // Normalizes -0.0.
        let amount = amount + 0.0;
        if amount < 0.0 {
            format!("-{}{:.2}", self.symbol(), amount.abs())
        } else {
            format!("{}{amount:.2}", self.symbol())
        }
    }
}

/// Interface language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// English.
    #[default]
    En,
    /// Filipino.
    Fil,
    /// Cebuano.
    Ceb,
}

string_enum!(Language, "language", { En => "en", Fil => "fil", Ceb => "ceb" });

/// Background scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Background {
    /// Plain background.
    #[default]
    Default,
    /// Ocean scene.
    Ocean,
    /// Sunset scene.
    Sunset,
    /// Forest scene.
    Forest,
    /// Royal scene.
    Royal,
    /// Midnight scene.
    Midnight,
}

string_enum!(Background, "background", {
    Default => "default",
    Ocean => "ocean",
    Sunset => "sunset",
    Forest => "forest",
    Royal => "royal",
    Midnight => "midnight",
});

/// Per-user display preferences.
///
/// Missing fields take their default on load, so documents saved before a
/// preference existed still deserialize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Preferences {
    /// Light or dark mode.
    pub theme: Theme,
    /// Accent color.
    pub color_theme: ColorTheme,
    /// Budget currency.
    pub currency: Currency,
    /// Interface language.
    pub language: Language,
    /// Background scene.
    pub background: Background,
}

/// The signed-in user profile.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct User {
    /// Record id.
    pub id: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Email, also the account key.
    pub email: String,
    /// Optional phone number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Whether this is the built-in admin.
    pub is_admin: bool,
    /// Display preferences.
    pub preferences: Preferences,
}

impl User {
    /// `"First Last"`.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    /// Upper-cased first letters of the first and last name.
    #[must_use]
    pub fn initials(&self) -> String {
        self.first_name
            .chars()
            .take(1)
            .chain(self.last_name.chars().take(1))
            .flat_map(char::to_uppercase)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_symbols() {
        assert_eq!(Currency::Php.symbol(), "₱");
        assert_eq!(Currency::Usd.symbol(), "$");
        assert_eq!(Currency::Eur.symbol(), "€");
        assert_eq!(Currency::Jpy.symbol(), "¥");
        assert_eq!(Currency::Gbp.symbol(), "£");
        assert_eq!(Currency::Aud.symbol(), "A$");
        assert_eq!(Currency::Cad.symbol(), "C$");
        assert_eq!(Currency::Sgd.symbol(), "S$");
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(Currency::Usd.format_amount(12.5), "$12.50");
        assert_eq!(Currency::Php.format_amount(-3.0), "-₱3.00");
        assert_eq!(Currency::Php.format_amount(-0.0), "₱0.00");
    }

    #[test]
    fn test_currency_serde_uppercase() {
        assert_eq!(serde_json::to_string(&Currency::Sgd).unwrap(), "\"SGD\"");
        let parsed: Currency = serde_json::from_str("\"JPY\"").unwrap();
        assert_eq!(parsed, Currency::Jpy);
    }

    #[test]
    fn test_enum_from_str_is_case_insensitive() {
        assert_eq!("DARK".parse::<Theme>().unwrap(), Theme::Dark);
        assert_eq!("usd".parse::<Currency>().unwrap(), Currency::Usd);
        assert_eq!("Midnight".parse::<Background>().unwrap(), Background::Midnight);
        assert!("klingon".parse::<Language>().is_err());
    }

    #[test]
    fn test_enum_all_lists_every_variant() {
        assert_eq!(Currency::ALL.len(), 8);
        assert_eq!(Background::ALL.len(), 6);
        assert_eq!(ColorTheme::ALL[0], ColorTheme::Blue);
    }

    #[test]
    fn test_theme_toggled() {
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
        assert_eq!(Theme::Dark.toggled(), Theme::Light);
    }

    #[test]
    fn test_preferences_missing_background_defaults() {
        let json = r#"{"theme":"dark","colorTheme":"violet","currency":"USD","language":"fil"}"#;
        let prefs: Preferences = serde_json::from_str(json).unwrap();
        assert_eq!(prefs.theme, Theme::Dark);
        assert_eq!(prefs.color_theme, ColorTheme::Violet);
        assert_eq!(prefs.background, Background::Default);
    }

    #[test]
    fn test_user_camel_case_layout() {
        let user = User {
            id: "1".to_string(),
            first_name: "Juan".to_string(),
            last_name: "Dela Cruz".to_string(),
            email: "juan@example.com".to_string(),
            ..User::default()
        };
        let value = serde_json::to_value(&user).unwrap();
        assert_eq!(value["firstName"], "Juan");
        assert_eq!(value["isAdmin"], false);
        assert_eq!(value["preferences"]["colorTheme"], "blue");
        assert!(value.get("phone").is_none());
    }

    #[test]
    fn test_user_names() {
        let user = User {
            first_name: "juan".to_string(),
            last_name: "dela cruz".to_string(),
            ..User::default()
        };
        assert_eq!(user.full_name(), "juan dela cruz");
        assert_eq!(user.initials(), "JD");
        assert_eq!(User::default().initials(), "");
    }
}
