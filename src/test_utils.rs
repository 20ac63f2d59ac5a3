//! Shared test utilities for the scheduling and ledger engine.
//!
//! Provides helpers for setting up in-memory test databases and creating
//! test entities with sensible defaults.

use crate::{config, core::lesson, entities, errors::Result};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sea_orm::{ConnectOptions, DatabaseConnection};

/// Creates an in-memory `SQLite` database with all tables initialized.
///
/// The pool is pinned to a single connection: each `SQLite` in-memory
/// connection is its own database, so concurrent test tasks must share one.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let mut options = ConnectOptions::new("sqlite::memory:".to_string());
    options.max_connections(1);
    let db = sea_orm::Database::connect(options).await?;
    config::database::create_tables(&db).await?;
    Ok(db)
}

/// A UTC timestamp from date and time parts.
#[must_use]
#[allow(clippy::unwrap_used)]
pub fn dt(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
        .and_utc()
}

/// A calendar date.
#[must_use]
#[allow(clippy::unwrap_used)]
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// A time of day.
#[must_use]
#[allow(clippy::unwrap_used)]
pub fn time(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
}

/// Creates an individual test lesson with a default cost of 1000.
pub async fn create_test_lesson(
    db: &DatabaseConnection,
    owner_id: i64,
    student_id: i64,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<entities::lesson::Model> {
    lesson::create_lesson(db, owner_id, student_id, start, end, 1000.0, None).await
}

/// Creates an individual test lesson with a custom cost.
pub async fn create_custom_lesson(
    db: &DatabaseConnection,
    owner_id: i64,
    student_id: i64,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    cost: f64,
) -> Result<entities::lesson::Model> {
    lesson::create_lesson(db, owner_id, student_id, start, end, cost, None).await
}
