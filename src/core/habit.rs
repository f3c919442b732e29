//! Habit record and its input types.
//!
//! A [`Habit`] is the only entity in the system. It is created from a
//! validated [`HabitDraft`], and the same draft shape is used as the patch
//! for edits. Streak bookkeeping lives on the record itself so the store
//! only has to find the habit and call into it.

use crate::errors::{Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Accent color handed out when the caller does not pick one.
pub const DEFAULT_COLOR: &str = "#3b82f6";

/// Largest id a habit can carry; ids are stored as signed 64-bit keys.
pub const MAX_HABIT_ID: u64 = i64::MAX.unsigned_abs();

/// Opaque habit identifier. Assigned by the store, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HabitId(pub u64);

impl fmt::Display for HabitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Cycle unit of a habit's goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    /// Once per day
    #[default]
    Daily,
    /// Per calendar week
    Weekly,
    /// Per calendar month
    Monthly,
}

impl Frequency {
    /// Stable lowercase name, used for storage and JSON.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            other => Err(Error::validation(format!("Unknown frequency '{other}'"))),
        }
    }
}

/// Informational time-of-day tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeOfDay {
    /// No preferred time
    #[default]
    Any,
    /// Morning
    Morning,
    /// Afternoon
    Afternoon,
    /// Evening
    Evening,
}

impl TimeOfDay {
    /// Stable lowercase name, used for storage and JSON.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Any => "any",
            Self::Morning => "morning",
            Self::Afternoon => "afternoon",
            Self::Evening => "evening",
        }
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeOfDay {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "any" | "any time" | "anytime" => Ok(Self::Any),
            "morning" => Ok(Self::Morning),
            "afternoon" => Ok(Self::Afternoon),
            "evening" => Ok(Self::Evening),
            other => Err(Error::validation(format!("Unknown time of day '{other}'"))),
        }
    }
}

/// The user-editable fields of a habit.
///
/// Used both for `add` and as the full-replacement patch for `edit`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitDraft {
    /// Display name, required
    pub name: String,
    /// Repetitions per cycle, at least 1
    pub goal: u32,
    /// Cycle unit of the goal
    pub frequency: Frequency,
    /// Preferred time of day
    pub time_of_day: TimeOfDay,
    /// Day the habit becomes active
    pub start_date: NaiveDate,
    /// Display accent, e.g. a hex code
    pub color: String,
}

/// Patch applied by `edit`. Same shape as a draft: every mutable field is replaced.
pub type HabitPatch = HabitDraft;

impl HabitDraft {
    /// Creates a draft with the form defaults: once daily, any time, starting `today`.
    pub fn new(name: impl Into<String>, today: NaiveDate) -> Self {
        Self {
            name: name.into(),
            goal: 1,
            frequency: Frequency::Daily,
            time_of_day: TimeOfDay::Any,
            start_date: today,
            color: DEFAULT_COLOR.to_string(),
        }
    }

    /// Sets the goal count and its cycle unit.
    #[must_use]
    pub fn with_goal(mut self, goal: u32, frequency: Frequency) -> Self {
        self.goal = goal;
        self.frequency = frequency;
        self
    }

    /// Sets the time-of-day tag.
    #[must_use]
    pub fn with_time_of_day(mut self, time_of_day: TimeOfDay) -> Self {
        self.time_of_day = time_of_day;
        self
    }

    /// Sets the accent color.
    #[must_use]
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    /// Checks the draft and returns it with the name and color trimmed.
    ///
    /// Rejects an empty (or whitespace-only) name, a zero goal and an empty color.
    pub fn validate(self) -> Result<Self> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(Error::validation("Habit name cannot be empty"));
        }
        if self.goal == 0 {
            return Err(Error::validation("Habit goal must be a positive integer"));
        }
        let color = self.color.trim();
        if color.is_empty() {
            return Err(Error::validation("Habit color cannot be empty"));
        }

        Ok(Self {
            name: name.to_string(),
            color: color.to_string(),
            ..self
        })
    }
}

/// A tracked habit.
///
/// Serialized field names are the persisted layout: a flat record that
/// round-trips through JSON unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    /// Unique id, assigned on creation
    pub id: HabitId,
    /// Display name, trimmed and non-empty
    pub name: String,
    /// Repetitions per cycle, at least 1
    pub goal: u32,
    /// Cycle unit of the goal
    pub frequency: Frequency,
    /// Preferred time of day
    pub time_of_day: TimeOfDay,
    /// Day the habit becomes active
    pub start_date: NaiveDate,
    /// Display accent
    pub color: String,
    /// Number of counted completions
    pub streak: u32,
    /// Last day `complete` was called, if ever
    pub last_completed_date: Option<NaiveDate>,
    /// Hidden from the active list and frozen until restored
    pub archived: bool,
}

/// What a call to [`Habit::complete_on`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// First completion for that date; the streak went up by one.
    Counted,
    /// The habit was already completed that day.
    AlreadyDone,
}

impl Habit {
    /// Builds a fresh habit from an already validated draft.
    pub(crate) fn from_draft(id: HabitId, draft: HabitDraft) -> Self {
        Self {
            id,
            name: draft.name,
            goal: draft.goal,
            frequency: draft.frequency,
            time_of_day: draft.time_of_day,
            start_date: draft.start_date,
            color: draft.color,
            streak: 0,
            last_completed_date: None,
            archived: false,
        }
    }

    /// Replaces the user-editable fields, keeping id, streak, completion date and archive flag.
    pub(crate) fn apply_patch(&mut self, patch: HabitPatch) {
        self.name = patch.name;
        self.goal = patch.goal;
        self.frequency = patch.frequency;
        self.time_of_day = patch.time_of_day;
        self.start_date = patch.start_date;
        self.color = patch.color;
    }

    /// Records a completion on `today`, at most once per calendar day.
    ///
    /// A date earlier than the last completion is rejected so that
    /// `last_completed_date` never moves backwards.
    pub(crate) fn complete_on(&mut self, today: NaiveDate) -> Result<Completion> {
        match self.last_completed_date {
            Some(last) if last == today => Ok(Completion::AlreadyDone),
            Some(last) if today < last => Err(Error::validation(format!(
                "Completion date {today} precedes last completion {last} for habit {}",
                self.id
            ))),
            _ => {
                self.streak = self.streak.saturating_add(1);
                self.last_completed_date = Some(today);
                Ok(Completion::Counted)
            }
        }
    }

    /// The user-editable fields as a draft, e.g. to prefill an edit form.
    #[must_use]
    pub fn to_draft(&self) -> HabitDraft {
        HabitDraft {
            name: self.name.clone(),
            goal: self.goal,
            frequency: self.frequency,
            time_of_day: self.time_of_day,
            start_date: self.start_date,
            color: self.color.clone(),
        }
    }

    /// True unless the habit is archived.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        !self.archived
    }

    /// True when the habit was marked complete on `date`.
    #[must_use]
    pub fn is_completed_on(&self, date: NaiveDate) -> bool {
        self.last_completed_date == Some(date)
    }

    /// Streak measured against the goal, as a percentage capped at 100.
    #[must_use]
    pub fn goal_progress(&self) -> u8 {
        let percent = (u64::from(self.streak) * 100) / u64::from(self.goal.max(1));
        u8::try_from(percent.min(100)).unwrap_or(100)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::date;

    #[test]
    fn test_draft_defaults() {
        let draft = HabitDraft::new("Read", date("2024-01-01"));
        assert_eq!(draft.goal, 1);
        assert_eq!(draft.frequency, Frequency::Daily);
        assert_eq!(draft.time_of_day, TimeOfDay::Any);
        assert_eq!(draft.color, DEFAULT_COLOR);
        assert_eq!(draft.start_date, date("2024-01-01"));
    }

    #[test]
    fn test_validate_trims_and_rejects() {
        let draft = HabitDraft::new("  Read  ", date("2024-01-01")).with_color(" #fff ");
        let validated = draft.validate().unwrap();
        assert_eq!(validated.name, "Read");
        assert_eq!(validated.color, "#fff");

        let empty = HabitDraft::new("   ", date("2024-01-01")).validate();
        assert!(matches!(empty, Err(Error::Validation { .. })));

        let zero_goal = HabitDraft::new("Read", date("2024-01-01"))
            .with_goal(0, Frequency::Weekly)
            .validate();
        assert!(matches!(zero_goal, Err(Error::Validation { .. })));

        let no_color = HabitDraft::new("Read", date("2024-01-01"))
            .with_color("")
            .validate();
        assert!(matches!(no_color, Err(Error::Validation { .. })));
    }

    #[test]
    fn test_complete_on_rules() {
        let mut habit = Habit::from_draft(HabitId(1), HabitDraft::new("Run", date("2024-01-01")));

        assert_eq!(habit.complete_on(date("2024-01-01")).unwrap(), Completion::Counted);
        assert_eq!(habit.complete_on(date("2024-01-01")).unwrap(), Completion::AlreadyDone);
        assert_eq!(habit.streak, 1);

        assert_eq!(habit.complete_on(date("2024-01-03")).unwrap(), Completion::Counted);
        assert_eq!(habit.streak, 2);

        let backwards = habit.complete_on(date("2024-01-02"));
        assert!(matches!(backwards, Err(Error::Validation { .. })));
        assert_eq!(habit.streak, 2);
        assert_eq!(habit.last_completed_date, Some(date("2024-01-03")));
    }

    #[test]
    fn test_goal_progress_caps_at_100() {
        let draft = HabitDraft::new("Stretch", date("2024-01-01")).with_goal(3, Frequency::Weekly);
        let mut habit = Habit::from_draft(HabitId(7), draft);
        assert_eq!(habit.goal_progress(), 0);

        habit.streak = 1;
        assert_eq!(habit.goal_progress(), 33);

        habit.streak = 9;
        assert_eq!(habit.goal_progress(), 100);
    }

    #[test]
    fn test_enum_parsing() {
        assert_eq!("Weekly".parse::<Frequency>().unwrap(), Frequency::Weekly);
        assert_eq!("Any Time".parse::<TimeOfDay>().unwrap(), TimeOfDay::Any);
        assert!("hourly".parse::<Frequency>().is_err());
        assert!("night".parse::<TimeOfDay>().is_err());
    }

    #[test]
    fn test_serialized_field_names() {
        let habit = Habit::from_draft(HabitId(3), HabitDraft::new("Read", date("2024-01-01")));
        let value = serde_json::to_value(&habit).unwrap();
        assert_eq!(value["id"], 3);
        assert_eq!(value["timeOfDay"], "any");
        assert_eq!(value["startDate"], "2024-01-01");
        assert_eq!(value["frequency"], "daily");
        assert!(value["lastCompletedDate"].is_null());
        assert_eq!(value["archived"], false);
    }
}
