//! System state entity - Key/value bookkeeping that must outlive the habit rows,
//! such as the next habit id to hand out.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One named value, e.g. `next_habit_id = "42"`
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "system_state")]
pub struct Model {
    /// Name of the value
    #[sea_orm(primary_key, auto_increment = false)]
    pub key: String,
    /// Value stored as string; callers parse it
    pub value: String,
    /// When the value was last written
    pub updated_at: DateTime,
}

/// No relations
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
