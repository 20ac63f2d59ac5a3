//! Reserved break business logic - Upsert-by-date blocked time on a
//! teacher's calendar.
//!
//! One active break per owner per calendar date: creating a break for a date
//! that already has one replaces it in place. A break's own creation is
//! rejected if it would overlap an existing non-cancelled lesson; other
//! breaks are irrelevant since the old one is being replaced anyway.

use crate::{
    core::conflict::ConflictEntry,
    entities::{Lesson, ReservedBreak, lesson, reserved_break},
    errors::{Error, Result},
};
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{DatabaseConnection, Set, TransactionTrait, prelude::*};
use tracing::info;

/// Creates or replaces the reserved break for `(owner_id, date)`.
///
/// Rejects with [`Error::ScheduleConflict`] if the interval overlaps any of
/// the owner's non-cancelled lessons; the check, the replacement, and the
/// insert share one transaction.
pub async fn upsert_break(
    db: &DatabaseConnection,
    owner_id: i64,
    date: NaiveDate,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<reserved_break::Model> {
    if end <= start {
        return Err(Error::InvalidInterval { start, end });
    }
    if start.date_naive() != date {
        return Err(Error::Config {
            message: format!(
                "Break start {} does not fall on {date}",
                start.format("%Y-%m-%d %H:%M")
            ),
        });
    }
    // An end of exactly midnight closes out the date and is still "on" it.
    let ends_at_next_midnight =
        end.time() == chrono::NaiveTime::MIN && Some(end.date_naive()) == date.succ_opt();
    if end.date_naive() != date && !ends_at_next_midnight {
        return Err(Error::Config {
            message: format!(
                "Break end {} does not fall on {date}",
                end.format("%Y-%m-%d %H:%M")
            ),
        });
    }

    let txn = db.begin().await?;

    // Only lessons block a break; the date's previous break is replaced.
    let lessons = Lesson::find()
        .filter(lesson::Column::OwnerId.eq(owner_id))
        .filter(lesson::Column::IsCancelled.eq(false))
        .filter(lesson::Column::Start.lt(end))
        .filter(lesson::Column::End.gt(start))
        .all(&txn)
        .await?;
    if !lessons.is_empty() {
        let conflicts: Vec<ConflictEntry> = lessons
            .iter()
            .map(|l| ConflictEntry {
                start: l.start,
                end: l.end,
                description: format!(
                    "lesson for student {} occupies {}-{}",
                    l.student_id,
                    l.start.format("%Y-%m-%d %H:%M"),
                    l.end.format("%H:%M"),
                ),
            })
            .collect();
        txn.rollback().await?;
        return Err(Error::ScheduleConflict { conflicts });
    }

    let existing = ReservedBreak::find()
        .filter(reserved_break::Column::OwnerId.eq(owner_id))
        .filter(reserved_break::Column::Date.eq(date))
        .one(&txn)
        .await?;

    let saved = if let Some(current) = existing {
        let mut active: reserved_break::ActiveModel = current.into();
        active.start = Set(start);
        active.end = Set(end);
        active.update(&txn).await?
    } else {
        let model = reserved_break::ActiveModel {
            owner_id: Set(owner_id),
            date: Set(date),
            start: Set(start),
            end: Set(end),
            ..Default::default()
        };
        model.insert(&txn).await?
    };

    txn.commit().await?;
    info!(owner_id, %date, "reserved break saved");
    Ok(saved)
}

/// The break for `(owner_id, date)`, if one exists.
pub async fn get_break(
    db: &DatabaseConnection,
    owner_id: i64,
    date: NaiveDate,
) -> Result<Option<reserved_break::Model>> {
    ReservedBreak::find()
        .filter(reserved_break::Column::OwnerId.eq(owner_id))
        .filter(reserved_break::Column::Date.eq(date))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Removes the break for `(owner_id, date)`.
pub async fn delete_break(db: &DatabaseConnection, owner_id: i64, date: NaiveDate) -> Result<()> {
    let existing = get_break(db, owner_id, date)
        .await?
        .ok_or(Error::BreakNotFound { owner_id, date })?;
    existing.delete(db).await?;
    Ok(())
}
