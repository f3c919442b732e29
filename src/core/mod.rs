//! Core habit logic - framework-agnostic records, the store and its helpers.

pub mod habit;
pub mod seed;
pub mod snapshot;
pub mod store;

pub use habit::{Frequency, Habit, HabitDraft, HabitId, HabitPatch, TimeOfDay};
pub use store::{HabitStore, StoreEvent};
