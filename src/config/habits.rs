//! Habit configuration loading from config.toml
//!
//! The file carries two things: the defaults used to prefill a new habit
//! draft, and an optional list of habits to seed an empty store with on
//! first run. A missing file is not an error; everything falls back to the
//! built-in defaults.

use crate::core::habit::{DEFAULT_COLOR, Frequency, HabitDraft, TimeOfDay};
use crate::errors::{Error, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::Path;

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Default, Deserialize)]
pub struct HabitsConfig {
    /// Values used for any draft field the caller leaves out
    #[serde(default)]
    pub defaults: DraftDefaults,
    /// Habits created when the store is empty
    #[serde(default)]
    pub habits: Vec<SeedHabit>,
}

/// Default field values for new habit drafts
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DraftDefaults {
    /// Goal count for new drafts
    pub goal: u32,
    /// Goal cycle for new drafts
    pub frequency: Frequency,
    /// Time-of-day tag for new drafts
    pub time_of_day: TimeOfDay,
    /// Accent color for new drafts
    pub color: String,
}

impl Default for DraftDefaults {
    fn default() -> Self {
        Self {
            goal: 1,
            frequency: Frequency::Daily,
            time_of_day: TimeOfDay::Any,
            color: DEFAULT_COLOR.to_string(),
        }
    }
}

/// A habit declared in config.toml. Unset fields take the configured defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedHabit {
    /// Habit name
    pub name: String,
    /// Overrides the default goal count
    pub goal: Option<u32>,
    /// Overrides the default goal cycle
    pub frequency: Option<Frequency>,
    /// Overrides the default time-of-day tag
    pub time_of_day: Option<TimeOfDay>,
    /// Overrides the default color
    pub color: Option<String>,
    /// Defaults to the day of seeding
    pub start_date: Option<NaiveDate>,
}

impl HabitsConfig {
    /// A draft named `name` prefilled with the configured defaults, starting `today`.
    pub fn draft(&self, name: impl Into<String>, today: NaiveDate) -> HabitDraft {
        HabitDraft::new(name, today)
            .with_goal(self.defaults.goal, self.defaults.frequency)
            .with_time_of_day(self.defaults.time_of_day)
            .with_color(self.defaults.color.clone())
    }

    /// The draft for one seed entry.
    pub fn seed_draft(&self, seed: &SeedHabit, today: NaiveDate) -> HabitDraft {
        let mut draft = self.draft(seed.name.clone(), seed.start_date.unwrap_or(today));
        if let Some(goal) = seed.goal {
            draft.goal = goal;
        }
        if let Some(frequency) = seed.frequency {
            draft.frequency = frequency;
        }
        if let Some(time_of_day) = seed.time_of_day {
            draft.time_of_day = time_of_day;
        }
        if let Some(color) = &seed.color {
            draft.color.clone_from(color);
        }
        draft
    }
}

/// Loads habit configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file exists but cannot be read
/// - The TOML syntax is invalid
/// - A field has the wrong type or an unknown enum value
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<HabitsConfig> {
    let path = path.as_ref();
    if !path.exists() {
        tracing::info!("No config file at {:?}, using built-in defaults", path);
        return Ok(HabitsConfig::default());
    }

    tracing::debug!("Loading habit configuration from: {:?}", path);
    let contents = std::fs::read_to_string(path).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path.display()),
    })?;

    parse_config(&contents)
}

/// Parses config.toml contents.
pub fn parse_config(contents: &str) -> Result<HabitsConfig> {
    toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}
