//! Habit entity - One row per tracked habit.
//!
//! Rows are keyed by the id the in-memory store assigned, so the primary key
//! is not auto-incremented. Enum fields are stored as their lowercase names.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Habit database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "habits")]
pub struct Model {
    /// Store-assigned habit id
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i64,
    /// Display name (e.g., "Read", "Drink water")
    pub name: String,
    /// Target repetitions per cycle
    pub goal: i64,
    /// Cycle unit: "daily", "weekly" or "monthly"
    pub frequency: String,
    /// "any", "morning", "afternoon" or "evening"
    pub time_of_day: String,
    /// Day the habit becomes active
    pub start_date: Date,
    /// Display accent, usually a hex code
    pub color: String,
    /// Completions counted so far
    pub streak: i64,
    /// Last calendar day the habit was completed
    pub last_completed_date: Option<Date>,
    /// Archive flag - archived habits are kept but hidden from the active list
    pub archived: bool,
}

/// Habits have no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
