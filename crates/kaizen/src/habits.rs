//! Habit tracking: daily check-ins, streaks and the seven-day strip.

use std::collections::HashSet;

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::model::{day_key, next_id, Habit};

/// Color given to a habit when none is chosen.
pub const DEFAULT_COLOR: &str = "bg-blue-500";

/// Colors offered when creating a habit.
pub const COLORS: [&str; 8] = [
    "bg-blue-500",
    "bg-red-500",
    "bg-green-500",
    "bg-purple-500",
    "bg-orange-500",
    "bg-teal-500",
    "bg-indigo-500",
    "bg-rose-500",
];

/// Append a new habit and return its id.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] if the title is blank.
pub fn add(
    habits: &mut Vec<Habit>,
    title: &str,
    color: Option<&str>,
    now: DateTime<Utc>,
) -> Result<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(Error::invalid_input("habit title is required"));
    }

    let id = next_id(now, habits.iter().map(|h| h.id.as_str()));
    habits.push(Habit {
        id: id.clone(),
        title: title.to_string(),
        color: color
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_COLOR)
            .to_string(),
        history: Vec::new(),
        created_at: now.timestamp_millis(),
    });
    debug!(id = %id, "Added habit");
    Ok(id)
}

/// Remove habit `id`.
///
/// # Errors
///
/// Returns [`Error::NotFound`] for an unknown id.
pub fn remove(habits: &mut Vec<Habit>, id: &str) -> Result<Habit> {
    let index = habits
        .iter()
        .position(|h| h.id == id)
        .ok_or_else(|| Error::not_found("habit", id))?;
    Ok(habits.remove(index))
}

/// Flip the check-in for `day`. Returns whether the day is now done.
///
/// History stays sorted ascending.
///
/// # Errors
///
/// Returns [`Error::NotFound`] for an unknown id.
pub fn toggle(habits: &mut [Habit], id: &str, day: NaiveDate) -> Result<bool> {
    let habit = habits
        .iter_mut()
        .find(|h| h.id == id)
        .ok_or_else(|| Error::not_found("habit", id))?;

    let key = day_key(day);
    if habit.history.contains(&key) {
        habit.history.retain(|d| *d != key);
        Ok(false)
    } else {
        habit.history.push(key);
        habit.history.sort();
        Ok(true)
    }
}

/// Whether `habit` was done on `day`.
#[must_use]
pub fn is_done(habit: &Habit, day: NaiveDate) -> bool {
    let key = day_key(day);
    habit.history.iter().any(|d| *d == key)
}

/// Consecutive days done, counting back from today.
///
/// A habit not yet done today keeps its streak from yesterday; one done
/// neither today nor yesterday has no streak.
#[must_use]
pub fn streak(habit: &Habit, today: NaiveDate) -> u32 {
    let done: HashSet<&str> = habit.history.iter().map(String::as_str).collect();
    let is_done = |day: NaiveDate| done.contains(day_key(day).as_str());

    let mut check = today;
    if !is_done(check) {
        match check.checked_sub_days(Days::new(1)) {
            Some(yesterday) if is_done(yesterday) => check = yesterday,
            _ => return 0,
        }
    }

    let mut count = 0;
    while is_done(check) {
        count += 1;
        match check.checked_sub_days(Days::new(1)) {
            Some(previous) => check = previous,
            None => break,
        }
    }
    count
}

/// One day in the seven-day strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DayCell {
    /// The day.
    pub date: NaiveDate,
    /// Whether the habit was done.
    pub done: bool,
    /// Whether this is today.
    pub is_today: bool,
}

/// The last seven days ending today, oldest first.
#[must_use]
pub fn week(habit: &Habit, today: NaiveDate) -> Vec<DayCell> {
    (0..7u64)
        .rev()
        .filter_map(|back| today.checked_sub_days(Days::new(back)))
        .map(|date| DayCell {
            date,
            done: is_done(habit, date),
            is_today: date == today,
        })
        .collect()
}

/// Figures across all habits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct HabitStats {
    /// Number of habits.
    pub total: usize,
    /// Habits done today.
    pub done_today: usize,
    /// Longest current streak.
    pub best_streak: u32,
    /// Check-ins across all history.
    pub total_completions: usize,
}

/// Compute [`HabitStats`] for `today`.
#[must_use]
pub fn stats(habits: &[Habit], today: NaiveDate) -> HabitStats {
    HabitStats {
        total: habits.len(),
        done_today: habits.iter().filter(|h| is_done(h, today)).count(),
        best_streak: habits.iter().map(|h| streak(h, today)).max().unwrap_or(0),
        total_completions: habits.iter().map(|h| h.history.len()).sum(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn habit_with(history: &[&str]) -> Habit {
        Habit {
            id: "h".to_string(),
            title: "Walk".to_string(),
            color: DEFAULT_COLOR.to_string(),
            history: history.iter().map(ToString::to_string).collect(),
            created_at: 0,
        }
    }

    #[test]
    fn test_add_trims_and_defaults_color() {
        let mut habits = Vec::new();
        let now = Utc.timestamp_millis_opt(42).unwrap();
        let id = add(&mut habits, "  Stretch  ", None, now).unwrap();

        assert_eq!(id, "42");
        assert_eq!(habits[0].title, "Stretch");
        assert_eq!(habits[0].color, DEFAULT_COLOR);
        assert_eq!(habits[0].created_at, 42);

        add(&mut habits, "Run", Some("bg-rose-500"), now).unwrap();
        assert_eq!(habits[1].color, "bg-rose-500");
        assert_eq!(habits[1].id, "43");
    }

    #[test]
    fn test_add_rejects_blank_title() {
        let mut habits = Vec::new();
        assert!(add(&mut habits, "   ", None, Utc::now()).is_err());
        assert!(habits.is_empty());
    }

    #[test]
    fn test_remove() {
        let mut habits = vec![habit_with(&[])];
        assert_eq!(remove(&mut habits, "h").unwrap().title, "Walk");
        assert!(remove(&mut habits, "h").unwrap_err().is_not_found());
    }

    #[test]
    fn test_toggle_keeps_history_sorted() {
        let mut habits = vec![habit_with(&["2024-01-03"])];

        assert!(toggle(&mut habits, "h", day(2024, 1, 1)).unwrap());
        assert!(toggle(&mut habits, "h", day(2024, 1, 2)).unwrap());
        assert_eq!(habits[0].history, vec!["2024-01-01", "2024-01-02", "2024-01-03"]);

        assert!(!toggle(&mut habits, "h", day(2024, 1, 2)).unwrap());
        assert_eq!(habits[0].history, vec!["2024-01-01", "2024-01-03"]);

        assert!(toggle(&mut habits, "missing", day(2024, 1, 2)).is_err());
    }

    #[test]
    fn test_streak_counts_from_today() {
        let habit = habit_with(&["2024-01-08", "2024-01-09", "2024-01-10"]);
        assert_eq!(streak(&habit, day(2024, 1, 10)), 3);
    }

    #[test]
    fn test_streak_continues_from_yesterday() {
        let habit = habit_with(&["2024-01-08", "2024-01-09"]);
        assert_eq!(streak(&habit, day(2024, 1, 10)), 2);
    }

    #[test]
    fn test_streak_broken() {
        let habit = habit_with(&["2024-01-07", "2024-01-08"]);
        assert_eq!(streak(&habit, day(2024, 1, 10)), 0);
        assert_eq!(streak(&habit_with(&[]), day(2024, 1, 10)), 0);
    }

    #[test]
    fn test_streak_stops_at_gap() {
        let habit = habit_with(&["2024-01-05", "2024-01-07", "2024-01-08"]);
        assert_eq!(streak(&habit, day(2024, 1, 8)), 2);
    }

    #[test]
    fn test_streak_across_month_boundary() {
        let habit = habit_with(&["2024-02-28", "2024-02-29", "2024-03-01"]);
        assert_eq!(streak(&habit, day(2024, 3, 1)), 3);
    }

    #[test]
    fn test_week_strip() {
        let habit = habit_with(&["2024-01-04", "2024-01-10"]);
        let cells = week(&habit, day(2024, 1, 10));

        assert_eq!(cells.len(), 7);
        assert_eq!(cells[0].date, day(2024, 1, 4));
        assert!(cells[0].done);
        assert!(!cells[0].is_today);
        assert!(!cells[3].done);
        assert_eq!(cells[6].date, day(2024, 1, 10));
        assert!(cells[6].done);
        assert!(cells[6].is_today);
    }

    #[test]
    fn test_stats() {
        let today = day(2024, 1, 10);
        let mut other = habit_with(&["2024-01-09"]);
        other.id = "o".to_string();
        let habits = vec![habit_with(&["2024-01-08", "2024-01-09", "2024-01-10"]), other];

        let stats = stats(&habits, today);
        assert_eq!(stats.total, 2);
        assert_eq!(stats.done_today, 1);
        assert_eq!(stats.best_streak, 3);
        assert_eq!(stats.total_completions, 4);

        assert_eq!(super::stats(&[], today), HabitStats::default());
    }
}
