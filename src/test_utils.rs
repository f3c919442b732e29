//! Shared test utilities.
//!
//! Helpers for setting up test databases, tracing and habit drafts with
//! sensible defaults.

use crate::{core::habit::HabitDraft, errors::Result};
use chrono::NaiveDate;
use sea_orm::DatabaseConnection;
use tracing_subscriber::EnvFilter;

/// Routes tracing output through the test harness. Safe to call from every test.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("trace")),
        )
        .with_test_writer()
        .try_init();
}

/// Creates an in-memory `SQLite` database with all tables initialized.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Parses a `YYYY-MM-DD` literal.
///
/// # Panics
/// Panics on a malformed literal; only meant for test fixtures.
#[allow(clippy::expect_used)]
pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("test date literal")
}

/// A draft with the form defaults, starting 2024-01-01.
pub fn sample_draft(name: &str) -> HabitDraft {
    HabitDraft::new(name, date("2024-01-01"))
}
