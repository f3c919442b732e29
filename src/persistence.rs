//! Durable storage for the habit store.
//!
//! Loading is an explicit async call made once at startup. Saving is driven
//! by store events: [`spawn_writer`] starts a background task and hands back a
//! [`Writer`] whose observer only enqueues events, so store operations never
//! wait on the database. Write failures are logged by the task and do not
//! reach the caller of the store operation.

use crate::{
    core::{
        habit::{Habit, HabitId},
        store::{HabitStore, StoreEvent},
    },
    entities::{HabitColumn, HabitEntity, SystemState, habit, system_state},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{DbErr, QueryOrder, Set, TransactionTrait, prelude::*, sea_query::OnConflict};
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, error, info, instrument, warn};

const NEXT_HABIT_ID_KEY: &str = "next_habit_id";

impl TryFrom<habit::Model> for Habit {
    type Error = Error;

    fn try_from(model: habit::Model) -> Result<Self> {
        let corrupt = |field: &str| {
            Error::Database(DbErr::Custom(format!(
                "Stored habit {} has an invalid {field}",
                model.id
            )))
        };

        Ok(Self {
            id: HabitId(u64::try_from(model.id).map_err(|_| corrupt("id"))?),
            goal: u32::try_from(model.goal).map_err(|_| corrupt("goal"))?,
            frequency: model.frequency.parse().map_err(|_| corrupt("frequency"))?,
            time_of_day: model.time_of_day.parse().map_err(|_| corrupt("time_of_day"))?,
            streak: u32::try_from(model.streak).map_err(|_| corrupt("streak"))?,
            name: model.name,
            start_date: model.start_date,
            color: model.color,
            last_completed_date: model.last_completed_date,
            archived: model.archived,
        })
    }
}

impl TryFrom<&Habit> for habit::ActiveModel {
    type Error = Error;

    fn try_from(habit: &Habit) -> Result<Self> {
        Ok(Self {
            id: Set(to_db_id(habit.id)?),
            name: Set(habit.name.clone()),
            goal: Set(i64::from(habit.goal)),
            frequency: Set(habit.frequency.as_str().to_string()),
            time_of_day: Set(habit.time_of_day.as_str().to_string()),
            start_date: Set(habit.start_date),
            color: Set(habit.color.clone()),
            streak: Set(i64::from(habit.streak)),
            last_completed_date: Set(habit.last_completed_date),
            archived: Set(habit.archived),
        })
    }
}

fn to_db_id(id: HabitId) -> Result<i64> {
    i64::try_from(id.0)
        .map_err(|_| Error::validation(format!("Habit id {id} does not fit the habits table")))
}

/// Loads every stored habit, in insertion order, into a new store.
#[instrument(skip(db))]
pub async fn load_store(db: &DatabaseConnection) -> Result<HabitStore> {
    let models = HabitEntity::find()
        .order_by_asc(HabitColumn::Id)
        .all(db)
        .await?;
    let habits = models
        .into_iter()
        .map(Habit::try_from)
        .collect::<Result<Vec<_>>>()?;
    let next_id = get_next_habit_id(db).await?.unwrap_or(1);

    let store = HabitStore::from_habits(habits, next_id)?;
    info!(
        "Loaded {} habits ({} active, {} archived)",
        store.len(),
        store.list_active().len(),
        store.list_archived().len()
    );
    Ok(store)
}

/// Persists a single store event.
///
/// Added and changed habits are upserted; deletions remove the row. Adding a
/// habit also advances the stored id counter so the id is never reused.
pub async fn apply_event(db: &DatabaseConnection, event: &StoreEvent) -> Result<()> {
    let txn = db.begin().await?;

    match event {
        StoreEvent::Deleted { id } => {
            HabitEntity::delete_by_id(to_db_id(*id)?).exec(&txn).await?;
        }
        StoreEvent::Added { habit } => {
            upsert_habit(&txn, habit).await?;
            let next = habit
                .id
                .0
                .checked_add(1)
                .ok_or_else(|| Error::validation(format!("Habit id {} is out of range", habit.id)))?;
            raise_next_habit_id(&txn, next).await?;
        }
        StoreEvent::Edited { habit }
        | StoreEvent::Completed { habit }
        | StoreEvent::Archived { habit }
        | StoreEvent::Unarchived { habit } => {
            upsert_habit(&txn, habit).await?;
        }
    }

    txn.commit().await?;
    Ok(())
}

async fn upsert_habit<C>(db: &C, habit: &Habit) -> Result<()>
where
    C: ConnectionTrait,
{
    let model = habit::ActiveModel::try_from(habit)?;
    HabitEntity::insert(model)
        .on_conflict(
            OnConflict::column(HabitColumn::Id)
                .update_columns([
                    HabitColumn::Name,
                    HabitColumn::Goal,
                    HabitColumn::Frequency,
                    HabitColumn::TimeOfDay,
                    HabitColumn::StartDate,
                    HabitColumn::Color,
                    HabitColumn::Streak,
                    HabitColumn::LastCompletedDate,
                    HabitColumn::Archived,
                ])
                .to_owned(),
        )
        .exec(db)
        .await?;
    Ok(())
}

/// Reads the stored id counter, if one has been written.
pub async fn get_next_habit_id<C>(db: &C) -> Result<Option<u64>>
where
    C: ConnectionTrait,
{
    let Some(state) = SystemState::find_by_id(NEXT_HABIT_ID_KEY.to_string())
        .one(db)
        .await?
    else {
        return Ok(None);
    };

    state.value.parse().map(Some).map_err(|e| {
        Error::Database(DbErr::Custom(format!(
            "Failed to parse {NEXT_HABIT_ID_KEY} '{}': {e}",
            state.value
        )))
    })
}

/// Stores `candidate` as the id counter unless a higher value is already stored.
async fn raise_next_habit_id<C>(db: &C, candidate: u64) -> Result<()>
where
    C: ConnectionTrait,
{
    let current = get_next_habit_id(db).await?;
    if current.is_some_and(|stored| stored >= candidate) {
        return Ok(());
    }

    let model = system_state::ActiveModel {
        key: Set(NEXT_HABIT_ID_KEY.to_string()),
        value: Set(candidate.to_string()),
        updated_at: Set(Utc::now().naive_utc()),
    };
    if current.is_some() {
        model.update(db).await?;
    } else {
        model.insert(db).await?;
    }
    Ok(())
}

/// Handle to the background writer. Subscribe its observer to a store.
#[derive(Debug, Clone)]
pub struct Writer {
    sender: mpsc::UnboundedSender<StoreEvent>,
}

impl Writer {
    /// A store listener that queues each event for the writer task.
    pub fn observer(&self) -> impl FnMut(&StoreEvent) + Send + use<> {
        let sender = self.sender.clone();
        move |event| {
            if sender.send(event.clone()).is_err() {
                warn!("Habit writer has stopped; dropping {:?} for habit {}", event, event.id());
            }
        }
    }
}

/// Starts the background task that persists store events in order.
///
/// The task ends once every [`Writer`] and every subscribed observer has
/// been dropped; awaiting the returned handle then waits for pending writes.
pub fn spawn_writer(db: DatabaseConnection) -> (Writer, JoinHandle<()>) {
    let (sender, mut receiver) = mpsc::unbounded_channel::<StoreEvent>();

    let handle = tokio::spawn(async move {
        while let Some(event) = receiver.recv().await {
            debug!("Persisting habit event for habit {}", event.id());
            if let Err(e) = apply_event(&db, &event).await {
                error!("Failed to persist event for habit {}: {}", event.id(), e);
            }
        }
        debug!("Habit writer finished");
    });

    (Writer { sender }, handle)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::habit::MAX_HABIT_ID;
    use crate::test_utils::{date, init_test_tracing, sample_draft, setup_test_db};

    #[tokio::test]
    async fn test_apply_event_and_reload() -> Result<()> {
        let db = setup_test_db().await?;
        let mut store = HabitStore::new();

        let id = store.add(sample_draft("Read"))?;
        apply_event(&db, &StoreEvent::Added { habit: store.get(id).unwrap().clone() }).await?;

        store.complete(id, date("2024-01-01"))?;
        store.archive(id)?;
        let habit = store.get(id).unwrap().clone();
        apply_event(&db, &StoreEvent::Archived { habit }).await?;

        let reloaded = load_store(&db).await?;
        assert_eq!(reloaded.habits(), store.habits());
        assert_eq!(reloaded.next_id(), store.next_id());
        Ok(())
    }

    #[tokio::test]
    async fn test_writer_persists_store_mutations() -> Result<()> {
        init_test_tracing();
        let db = setup_test_db().await?;
        let (writer, handle) = spawn_writer(db.clone());

        let mut store = HabitStore::new();
        store.subscribe(writer.observer());

        let read = store.add(sample_draft("Read"))?;
        let gym = store.add(sample_draft("Gym"))?;
        let walk = store.add(sample_draft("Walk"))?;
        store.complete(read, date("2024-01-01"))?;
        store.complete(read, date("2024-01-02"))?;
        store.edit(gym, sample_draft("Gym session"))?;
        store.archive(gym)?;
        store.delete(walk)?;
        let expected = store.habits().to_vec();

        drop(store);
        drop(writer);
        handle.await.unwrap();

        let reloaded = load_store(&db).await?;
        assert_eq!(reloaded.habits(), expected.as_slice());
        assert_eq!(reloaded.list_archived().len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_deleted_newest_id_is_not_reused_after_reload() -> Result<()> {
        let db = setup_test_db().await?;
        let mut store = HabitStore::new();

        let first = store.add(sample_draft("First"))?;
        let second = store.add(sample_draft("Second"))?;
        for id in [first, second] {
            apply_event(&db, &StoreEvent::Added { habit: store.get(id).unwrap().clone() }).await?;
        }
        store.delete(second)?;
        apply_event(&db, &StoreEvent::Deleted { id: second }).await?;

        let mut reloaded = load_store(&db).await?;
        assert_eq!(reloaded.len(), 1);
        let third = reloaded.add(sample_draft("Third"))?;
        assert!(third > second);
        Ok(())
    }

    #[tokio::test]
    async fn test_load_rejects_corrupt_rows() -> Result<()> {
        let db = setup_test_db().await?;
        let mut store = HabitStore::new();
        let id = store.add(sample_draft("Broken"))?;
        let mut model = habit::ActiveModel::try_from(store.get(id).unwrap())?;
        model.frequency = Set("hourly".to_string());
        model.insert(&db).await?;

        let result = load_store(&db).await;
        assert!(matches!(result, Err(Error::Database(_))));
        Ok(())
    }

    #[tokio::test]
    async fn test_load_rejects_rows_that_fail_validation() -> Result<()> {
        let db = setup_test_db().await?;
        let mut store = HabitStore::new();
        let id = store.add(sample_draft("Blank"))?;
        let mut model = habit::ActiveModel::try_from(store.get(id).unwrap())?;
        model.name = Set("   ".to_string());
        model.insert(&db).await?;

        let result = load_store(&db).await;
        assert!(matches!(result, Err(Error::Validation { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_apply_event_rejects_ids_beyond_table_range() -> Result<()> {
        let db = setup_test_db().await?;
        let mut store = HabitStore::new();
        let id = store.add(sample_draft("Huge"))?;
        let mut habit = store.get(id).unwrap().clone();
        habit.id = HabitId(MAX_HABIT_ID + 1);

        let added = apply_event(&db, &StoreEvent::Added { habit: habit.clone() }).await;
        assert!(matches!(added, Err(Error::Validation { .. })));
        let deleted = apply_event(&db, &StoreEvent::Deleted { id: habit.id }).await;
        assert!(matches!(deleted, Err(Error::Validation { .. })));

        assert!(HabitEntity::find().all(&db).await?.is_empty());
        assert_eq!(get_next_habit_id(&db).await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_apply_event_accepts_last_storable_id() -> Result<()> {
        let db = setup_test_db().await?;
        let mut store = HabitStore::new();
        let id = store.add(sample_draft("Last"))?;
        let mut habit = store.get(id).unwrap().clone();
        habit.id = HabitId(MAX_HABIT_ID);

        apply_event(&db, &StoreEvent::Added { habit }).await?;
        assert_eq!(get_next_habit_id(&db).await?, Some(MAX_HABIT_ID + 1));

        let reloaded = load_store(&db).await?;
        assert_eq!(reloaded.next_id(), MAX_HABIT_ID + 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_empty_database_loads_empty_store() -> Result<()> {
        let db = setup_test_db().await?;
        let store = load_store(&db).await?;
        assert!(store.is_empty());
        assert_eq!(store.next_id(), 1);
        assert_eq!(get_next_habit_id(&db).await?, None);
        Ok(())
    }
}
