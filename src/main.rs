use chrono::Local;
use dotenvy::dotenv;
use habit_buddy::{
    config::{database, habits},
    core::{seed::seed_habits, snapshot},
    errors::Result,
    persistence,
};
use std::env;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; variables may also be set externally
    dotenv().ok();

    // 3. Load config.toml (draft defaults and seed habits)
    let config_path = env::var("HABIT_BUDDY_CONFIG").unwrap_or_else(|_| "config.toml".to_string());
    let config = habits::load_config(&config_path)
        .inspect_err(|e| error!("Failed to load configuration: {}", e))?;

    // 4. Open the database
    let database_url = database::get_database_url();
    if database_url == database::DEFAULT_DATABASE_URL {
        std::fs::create_dir_all("data")?;
    }
    let db = database::connect(&database_url)
        .await
        .inspect_err(|e| error!("Failed to initialize database: {}", e))?;

    // 5. Load habits and start persisting changes
    let mut store = persistence::load_store(&db).await?;
    let (writer, writer_task) = persistence::spawn_writer(db.clone());
    store.subscribe(writer.observer());

    // 6. Seed on first run
    let today = Local::now().date_naive();
    let seeded = seed_habits(&mut store, &config, today)?;
    if seeded > 0 {
        info!("Seeded {} habits from {}", seeded, config_path);
    }

    for habit in store.list_active() {
        info!(
            "{} [{} x{} {}] streak {} ({}% of goal){}",
            habit.name,
            habit.time_of_day,
            habit.goal,
            habit.frequency,
            habit.streak,
            habit.goal_progress(),
            if habit.is_completed_on(today) { ", done today" } else { "" }
        );
    }
    info!("{} archived habits", store.list_archived().len());

    // 7. Optional flat JSON export
    if let Ok(path) = env::var("HABIT_BUDDY_EXPORT") {
        std::fs::write(&path, snapshot::to_json(&store)?)?;
        info!("Exported {} habits to {}", store.len(), path);
    }

    // 8. Flush pending writes
    drop(store);
    drop(writer);
    writer_task.await?;

    Ok(())
}
