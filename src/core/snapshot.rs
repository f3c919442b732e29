//! Flat JSON snapshot of the habit collection.
//!
//! The snapshot is a plain array of habit records in insertion order, the same
//! shape a browser client keeps under its `habits` storage key.

use crate::{
    core::{habit::Habit, store::HabitStore},
    errors::Result,
};

/// Serializes every habit, active and archived, as a pretty-printed JSON array.
pub fn to_json(store: &HabitStore) -> Result<String> {
    serde_json::to_string_pretty(store.habits()).map_err(Into::into)
}

/// Rebuilds a store from a JSON array produced by [`to_json`].
///
/// Ids continue after the highest id in the snapshot.
pub fn from_json(json: &str) -> Result<HabitStore> {
    let habits: Vec<Habit> = serde_json::from_str(json)?;
    HabitStore::from_habits(habits, 0)
}
