//! First-run seeding of habits declared in config.toml.

use crate::{config::habits::HabitsConfig, core::store::HabitStore, errors::Result};
use chrono::NaiveDate;

/// Adds every configured seed habit to an empty store and returns how many were added.
///
/// A store that already holds habits, active or archived, is left alone so
/// seeds never come back after the user deletes them. Seeds go through the
/// normal `add` path and are validated like any draft.
pub fn seed_habits(store: &mut HabitStore, config: &HabitsConfig, today: NaiveDate) -> Result<usize> {
    if !store.is_empty() {
        return Ok(0);
    }

    for seed in &config.habits {
        store.add(config.seed_draft(seed, today))?;
    }
    Ok(config.habits.len())
}
