//! In-memory habit store - owns the habit collection and every state transition.
//!
//! The store is synchronous and performs no I/O. Callers that want durability
//! or re-rendering subscribe a listener; it is invoked with a [`StoreEvent`]
//! after each successful mutation. Failed calls and no-op calls (archiving an
//! archived habit, completing twice on the same day) emit nothing.

use crate::{
    core::habit::{Completion, Habit, HabitDraft, HabitId, HabitPatch, MAX_HABIT_ID},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;

/// A mutation that has been applied to the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum StoreEvent {
    /// A new habit was created
    Added {
        /// The created habit
        habit: Habit,
    },
    /// A habit's editable fields were replaced
    Edited {
        /// The habit after the edit
        habit: Habit,
    },
    /// A completion was counted
    Completed {
        /// The habit with its raised streak
        habit: Habit,
    },
    /// A habit moved to the archive
    Archived {
        /// The archived habit
        habit: Habit,
    },
    /// An archived habit was restored
    Unarchived {
        /// The restored habit
        habit: Habit,
    },
    /// A habit was removed for good
    Deleted {
        /// Id of the removed habit
        id: HabitId,
    },
}

impl StoreEvent {
    /// The habit's state after the mutation, or `None` for deletions.
    #[must_use]
    pub const fn habit(&self) -> Option<&Habit> {
        match self {
            Self::Added { habit }
            | Self::Edited { habit }
            | Self::Completed { habit }
            | Self::Archived { habit }
            | Self::Unarchived { habit } => Some(habit),
            Self::Deleted { .. } => None,
        }
    }

    /// Id of the habit the event concerns.
    #[must_use]
    pub const fn id(&self) -> HabitId {
        match self {
            Self::Deleted { id } => *id,
            Self::Added { habit }
            | Self::Edited { habit }
            | Self::Completed { habit }
            | Self::Archived { habit }
            | Self::Unarchived { habit } => habit.id,
        }
    }
}

/// Rejects a loaded record that `add` would not have produced.
fn check_record(habit: &Habit) -> Result<()> {
    if habit.id.0 == 0 || habit.id.0 > MAX_HABIT_ID {
        return Err(Error::validation(format!("Habit id {} is out of range", habit.id)));
    }
    let draft = habit.to_draft().validate().map_err(|e| {
        Error::validation(format!("Invalid habit record {}: {e}", habit.id))
    })?;
    if draft.name != habit.name || draft.color != habit.color {
        return Err(Error::validation(format!(
            "Habit record {} has untrimmed name or color",
            habit.id
        )));
    }
    Ok(())
}

/// Callback notified after every applied mutation.
pub type Listener = Box<dyn FnMut(&StoreEvent) + Send>;

/// Ordered collection of habits; insertion order is display order.
pub struct HabitStore {
    habits: Vec<Habit>,
    next_id: u64,
    listeners: Vec<Listener>,
}

impl fmt::Debug for HabitStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HabitStore")
            .field("habits", &self.habits)
            .field("next_id", &self.next_id)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Default for HabitStore {
    fn default() -> Self {
        Self::new()
    }
}

impl HabitStore {
    /// An empty store whose first id is 1.
    #[must_use]
    pub fn new() -> Self {
        Self {
            habits: Vec::new(),
            next_id: 1,
            listeners: Vec::new(),
        }
    }

    /// Rebuilds a store from previously persisted habits.
    ///
    /// `next_id` is the last known id counter; it is raised past every loaded
    /// id so deleted ids are never handed out again. Every record must pass the
    /// same checks as a new draft, carry an id in `1..=MAX_HABIT_ID` and be unique.
    pub fn from_habits(habits: Vec<Habit>, next_id: u64) -> Result<Self> {
        let mut seen = std::collections::HashSet::with_capacity(habits.len());
        for habit in &habits {
            check_record(habit)?;
            if !seen.insert(habit.id) {
                return Err(Error::validation(format!("Duplicate habit id {}", habit.id)));
            }
        }
        if next_id > MAX_HABIT_ID + 1 {
            return Err(Error::validation(format!("Habit id counter {next_id} is out of range")));
        }

        // ids are at most MAX_HABIT_ID here, so the increment cannot overflow
        let after_max = habits.iter().map(|h| h.id.0 + 1).max().unwrap_or(1);
        Ok(Self {
            habits,
            next_id: next_id.max(after_max).max(1),
            listeners: Vec::new(),
        })
    }

    /// Registers a listener for subsequent mutations.
    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: FnMut(&StoreEvent) + Send + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    /// The id the next `add` will assign.
    #[must_use]
    pub const fn next_id(&self) -> u64 {
        self.next_id
    }

    /// Number of habits, archived included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.habits.len()
    }

    /// True when the store holds no habits at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.habits.is_empty()
    }

    /// All habits, active and archived, in insertion order.
    #[must_use]
    pub fn habits(&self) -> &[Habit] {
        &self.habits
    }

    /// Looks up a habit by id.
    #[must_use]
    pub fn get(&self, id: HabitId) -> Option<&Habit> {
        self.habits.iter().find(|h| h.id == id)
    }

    /// Creates a habit from `draft` with a fresh id, zero streak and no completion.
    pub fn add(&mut self, draft: HabitDraft) -> Result<HabitId> {
        let draft = draft.validate()?;
        if self.next_id > MAX_HABIT_ID {
            return Err(Error::validation("No habit ids left to assign"));
        }
        let id = HabitId(self.next_id);
        self.next_id = self
            .next_id
            .checked_add(1)
            .ok_or_else(|| Error::validation("No habit ids left to assign"))?;

        let habit = Habit::from_draft(id, draft);
        self.habits.push(habit.clone());
        self.notify(&StoreEvent::Added { habit });
        Ok(id)
    }

    /// Replaces the editable fields of an active habit.
    pub fn edit(&mut self, id: HabitId, patch: HabitPatch) -> Result<()> {
        let patch = patch.validate()?;
        let habit = self.active_mut(id)?;
        habit.apply_patch(patch);

        let habit = habit.clone();
        self.notify(&StoreEvent::Edited { habit });
        Ok(())
    }

    /// Removes a habit permanently. Deleting an unknown id is an error.
    pub fn delete(&mut self, id: HabitId) -> Result<()> {
        let index = self.position(id)?;
        self.habits.remove(index);
        self.notify(&StoreEvent::Deleted { id });
        Ok(())
    }

    /// Hides a habit from the active list. Archiving twice is a no-op.
    pub fn archive(&mut self, id: HabitId) -> Result<()> {
        self.set_archived(id, true)
    }

    /// Restores an archived habit. Restoring an active habit is a no-op.
    pub fn unarchive(&mut self, id: HabitId) -> Result<()> {
        self.set_archived(id, false)
    }

    /// Marks an active habit complete for `today` and returns its streak.
    ///
    /// Completing again on the same date leaves the streak unchanged.
    pub fn complete(&mut self, id: HabitId, today: NaiveDate) -> Result<u32> {
        let habit = self.active_mut(id)?;
        let outcome = habit.complete_on(today)?;
        let streak = habit.streak;

        if outcome == Completion::Counted {
            let habit = habit.clone();
            self.notify(&StoreEvent::Completed { habit });
        }
        Ok(streak)
    }

    /// Habits that are not archived, in insertion order.
    #[must_use]
    pub fn list_active(&self) -> Vec<&Habit> {
        self.habits.iter().filter(|h| h.is_active()).collect()
    }

    /// Archived habits, in insertion order.
    #[must_use]
    pub fn list_archived(&self) -> Vec<&Habit> {
        self.habits.iter().filter(|h| h.archived).collect()
    }

    fn position(&self, id: HabitId) -> Result<usize> {
        self.habits
            .iter()
            .position(|h| h.id == id)
            .ok_or(Error::HabitNotFound { id: id.0 })
    }

    fn active_mut(&mut self, id: HabitId) -> Result<&mut Habit> {
        let index = self.position(id)?;
        let habit = &mut self.habits[index];
        if habit.archived {
            return Err(Error::HabitArchived { id: id.0 });
        }
        Ok(habit)
    }

    fn set_archived(&mut self, id: HabitId, archived: bool) -> Result<()> {
        let index = self.position(id)?;
        let habit = &mut self.habits[index];
        if habit.archived == archived {
            return Ok(());
        }
        habit.archived = archived;

        let habit = habit.clone();
        let event = if archived {
            StoreEvent::Archived { habit }
        } else {
            StoreEvent::Unarchived { habit }
        };
        self.notify(&event);
        Ok(())
    }

    fn notify(&mut self, event: &StoreEvent) {
        for listener in &mut self.listeners {
            listener(event);
        }
    }
}
