//! Entity module - Contains all SeaORM entity definitions for the database.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod habit;
pub mod system_state;

pub use habit::{Column as HabitColumn, Entity as HabitEntity, Model as HabitModel};
pub use system_state::{
    Column as SystemStateColumn, Entity as SystemState, Model as SystemStateModel,
};
