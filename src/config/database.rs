//! Database configuration module for the scheduling and ledger engine.
//!
//! Handles `SQLite` connection and table creation using `SeaORM`. Tables are
//! generated from the entity definitions via `Schema::create_table_from_entity`
//! so the schema always matches the Rust structs; the unique indexes that the
//! engine's concurrency and upsert semantics rely on are created alongside.

use crate::entities::{Lesson, LessonMember, Payment, PaymentLesson, ReservedBreak};
use crate::entities::reserved_break;
use crate::errors::Result;
use sea_orm::sea_query::Index;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};

/// Establishes a connection to the database at the configured URL.
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    Database::connect(database_url).await.map_err(Into::into)
}

/// Creates all tables and indexes.
///
/// The unique index on `(owner_id, start)` over lessons is the second line
/// of defense against a concurrent double-booking race: a losing insert
/// fails the constraint and the booking path translates that failure into a
/// schedule conflict. The unique index on `(owner_id, date)` over reserved
/// breaks backs the one-break-per-day upsert semantics.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let lesson_table = schema.create_table_from_entity(Lesson);
    let lesson_member_table = schema.create_table_from_entity(LessonMember);
    let reserved_break_table = schema.create_table_from_entity(ReservedBreak);
    let payment_table = schema.create_table_from_entity(Payment);
    let payment_lesson_table = schema.create_table_from_entity(PaymentLesson);

    db.execute(builder.build(&lesson_table)).await?;
    db.execute(builder.build(&lesson_member_table)).await?;
    db.execute(builder.build(&reserved_break_table)).await?;
    db.execute(builder.build(&payment_table)).await?;
    db.execute(builder.build(&payment_lesson_table)).await?;

    // Partial index: cancelled lessons release their slot, so they must not
    // participate in the uniqueness constraint. sea-query's index builder
    // has no WHERE clause, hence raw SQL.
    db.execute_unprepared(
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_lessons_owner_start \
         ON lessons (owner_id, start) WHERE is_cancelled = 0",
    )
    .await?;

    let break_date_index = Index::create()
        .if_not_exists()
        .name("idx_reserved_breaks_owner_date")
        .table(ReservedBreak)
        .col(reserved_break::Column::OwnerId)
        .col(reserved_break::Column::Date)
        .unique()
        .to_owned();
    db.execute(builder.build(&break_date_index)).await?;

    Ok(())
}
