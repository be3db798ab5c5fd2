//! Persistence of the application document.
//!
//! The whole [`AppState`] is one JSON value stored under a fixed key. Loading
//! overlays whatever was stored on top of the defaults field by field, so
//! documents written by older versions (or partially corrupted ones) still
//! produce a usable state. A value that is not JSON at all falls back to the
//! defaults.

use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, error, warn};

use crate::error::Result;
use crate::model::{AppState, Habit, LinkItem, Preferences, QuickCard, Reminder, Transaction, User};
use crate::storage::Storage;

/// Reads and writes the application document in a [`Storage`].
#[derive(Debug)]
pub struct DocumentStore<'a> {
    storage: &'a Storage,
    key: String,
}

impl<'a> DocumentStore<'a> {
    /// Bind to the document stored under `key`.
    #[must_use]
    pub fn new(storage: &'a Storage, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    /// The storage key of the document.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Whether a document has been saved yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage lookup fails.
    pub fn exists(&self) -> Result<bool> {
        Ok(self.storage.get_item(&self.key)?.is_some())
    }

    /// Load the document, merged over the defaults.
    ///
    /// An absent or unparseable document yields [`AppState::default`].
    ///
    /// # Errors
    ///
    /// Returns an error only if the storage itself fails.
    pub fn load(&self) -> Result<AppState> {
        let Some(serialized) = self.storage.get_item(&self.key)? else {
            debug!(key = %self.key, "No stored document, using defaults");
            return Ok(AppState::default());
        };

        match serde_json::from_str::<Value>(&serialized) {
            Ok(value) => Ok(merge_state(value)),
            Err(e) => {
                error!(key = %self.key, error = %e, "Failed to load state, using defaults");
                Ok(AppState::default())
            }
        }
    }

    /// Serialize and store the document.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the storage write fails.
    pub fn save(&self, state: &AppState) -> Result<()> {
        let serialized = serde_json::to_string(state).inspect_err(|e| {
            error!(error = %e, "Failed to serialize state");
        })?;
        self.storage
            .set_item(&self.key, &serialized)
            .inspect_err(|e| error!(error = %e, "Failed to save state"))
    }

    /// Load, apply `f`, and save if `f` succeeds.
    ///
    /// # Errors
    ///
    /// Returns the error from `f`, or a storage error.
    pub fn update<T>(&self, f: impl FnOnce(&mut AppState) -> Result<T>) -> Result<T> {
        let mut state = self.load()?;
        let out = f(&mut state)?;
        self.save(&state)?;
        Ok(out)
    }
}

/// Overlay a loaded JSON document on the default state.
///
/// - records of an array field that fail to parse are skipped one by one,
///   so the valid records around them survive;
/// - every top-level field that is missing or has the wrong shape keeps its
///   default (so a `null` or missing `habits` yields the default habits);
/// - `currentUser` is merged over a default user, and its `preferences` over
///   the default preferences;
/// - a non-object document yields the defaults.
#[must_use]
pub fn merge_state(value: Value) -> AppState {
    let Value::Object(mut loaded) = value else {
        warn!("Stored document is not an object, using defaults");
        return AppState::default();
    };

    let current_user = match loaded.remove("currentUser") {
        Some(Value::Object(user)) => Some(merge_user(user)),
        Some(Value::Null) | None => None,
        Some(other) => {
            warn!(kind = json_kind(&other), "Ignoring malformed currentUser");
            None
        }
    };

    retain_valid::<QuickCard>(&mut loaded, "cards");
    retain_valid::<LinkItem>(&mut loaded, "links");
    retain_valid::<Transaction>(&mut loaded, "transactions");
    retain_valid::<Reminder>(&mut loaded, "reminders");
    retain_valid::<Habit>(&mut loaded, "habits");

    let mut state: AppState = overlay(&loaded, "document");
    state.current_user = current_user;
    state
}

/// Restore a downloaded backup document. Same rules as [`merge_state`].
#[must_use]
pub fn restore_from(value: Value) -> AppState {
    merge_state(value)
}

fn merge_user(mut loaded: Map<String, Value>) -> User {
    let preferences = match loaded.remove("preferences") {
        Some(Value::Object(prefs)) => overlay::<Preferences>(&prefs, "preferences"),
        _ => Preferences::default(),
    };
    let mut user: User = overlay(&loaded, "user");
    user.preferences = preferences;
    user
}

/// Drop the records of an array field that do not deserialize as `T`,
/// keeping the rest.
fn retain_valid<T: DeserializeOwned>(loaded: &mut Map<String, Value>, field: &str) {
    let Some(Value::Array(records)) = loaded.get_mut(field) else {
        return;
    };
    let before = records.len();
    records.retain(|record| serde_json::from_value::<T>(record.clone()).is_ok());
    let skipped = before - records.len();
    if skipped > 0 {
        warn!(field = %field, skipped, "Skipping invalid records");
    }
}

/// Apply each loaded field over `T::default()`, dropping any field whose
/// value would make the result fail to deserialize.
fn overlay<T>(loaded: &Map<String, Value>, what: &str) -> T
where
    T: Default + Serialize + DeserializeOwned,
{
    let mut merged = match serde_json::to_value(T::default()) {
        Ok(Value::Object(map)) => map,
        _ => return T::default(),
    };

    for (field, value) in loaded {
        let previous = merged.insert(field.clone(), value.clone());
        if serde_json::from_value::<T>(Value::Object(merged.clone())).is_err() {
            warn!(field = %field, "Dropping invalid {} field", what);
            match previous {
                Some(previous) => merged.insert(field.clone(), previous),
                None => merged.remove(field),
            };
        }
    }

    serde_json::from_value(Value::Object(merged)).unwrap_or_default()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
