//! Dashboard to-do reminders.

use chrono::{DateTime, Utc};

use crate::error::{Error, Result};
use crate::model::{iso_timestamp, next_id, Reminder};

/// Add a reminder at the front of the list and return its id.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] if the title is blank.
pub fn add(reminders: &mut Vec<Reminder>, title: &str, now: DateTime<Utc>) -> Result<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(Error::invalid_input("reminder title is required"));
    }

    let id = next_id(now, reminders.iter().map(|r| r.id.as_str()));
    reminders.insert(
        0,
        Reminder {
            id: id.clone(),
            title: title.to_string(),
            date: iso_timestamp(now),
            completed: false,
        },
    );
    Ok(id)
}

/// Flip the completed flag. Returns the new value.
///
/// # Errors
///
/// Returns [`Error::NotFound`] for an unknown id.
pub fn toggle(reminders: &mut [Reminder], id: &str) -> Result<bool> {
    let reminder = reminders
        .iter_mut()
        .find(|r| r.id == id)
        .ok_or_else(|| Error::not_found("reminder", id))?;
    reminder.completed = !reminder.completed;
    Ok(reminder.completed)
}

/// Delete reminder `id`.
///
/// # Errors
///
/// Returns [`Error::NotFound`] for an unknown id.
pub fn remove(reminders: &mut Vec<Reminder>, id: &str) -> Result<Reminder> {
    let index = reminders
        .iter()
        .position(|r| r.id == id)
        .ok_or_else(|| Error::not_found("reminder", id))?;
    Ok(reminders.remove(index))
}

/// Number of reminders not yet completed.
#[must_use]
pub fn pending(reminders: &[Reminder]) -> usize {
    reminders.iter().filter(|r| !r.completed).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_add_prepends_trimmed() {
        let now = Utc.timestamp_millis_opt(1_704_067_200_000).unwrap();
        let mut reminders = Vec::new();
        add(&mut reminders, "Pay rent", now).unwrap();
        let id = add(&mut reminders, "  Call mom ", now).unwrap();

        assert_eq!(reminders[0].id, id);
        assert_eq!(reminders[0].title, "Call mom");
        assert_eq!(reminders[0].date, "2024-01-01T00:00:00.000Z");
        assert!(!reminders[0].completed);
        assert_eq!(reminders[1].title, "Pay rent");
    }

    #[test]
    fn test_add_rejects_blank() {
        let mut reminders = Vec::new();
        assert!(add(&mut reminders, " \t ", Utc::now()).is_err());
    }

    #[test]
    fn test_toggle_and_pending() {
        let mut reminders = Vec::new();
        let id = add(&mut reminders, "Task", Utc::now()).unwrap();
        assert_eq!(pending(&reminders), 1);

        assert!(toggle(&mut reminders, &id).unwrap());
        assert_eq!(pending(&reminders), 0);
        assert!(!toggle(&mut reminders, &id).unwrap());
        assert!(toggle(&mut reminders, "nope").is_err());
    }

    #[test]
    fn test_remove() {
        let mut reminders = Vec::new();
        let id = add(&mut reminders, "Task", Utc::now()).unwrap();
        assert_eq!(remove(&mut reminders, &id).unwrap().title, "Task");
        assert!(reminders.is_empty());
        assert!(remove(&mut reminders, &id).unwrap_err().is_not_found());
    }
}
