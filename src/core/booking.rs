//! Booking transaction - Atomic all-or-nothing creation of lesson batches.
//!
//! This is the concurrency-critical path. Every instance in the batch is
//! checked against persisted state *and* against the other instances of the
//! same batch, then all rows insert inside a single database transaction.
//! Any conflict rolls the whole batch back and returns the full conflict
//! list; partial subscription creation is never an acceptable outcome.
//!
//! Two concurrent bookings for the same owner cannot both succeed: the
//! check-then-insert sequence runs in one transaction, and a unique index on
//! `(owner_id, start)` makes the losing side of a race fail at insert, which
//! is translated into the same conflict error the check produces.

use crate::{
    core::{
        conflict::{self, ConflictEntry},
        recurrence::LessonInstance,
    },
    entities::{lesson, lesson_member},
    errors::{Error, Result},
};
use sea_orm::{DatabaseConnection, DbErr, Set, SqlErr, TransactionTrait, prelude::*};
use tracing::{debug, info};

/// Who the batch is for and what kind of lessons it creates.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BookingRequest {
    /// Teacher whose calendar is being booked
    pub owner_id: i64,
    /// Students attending; the first is the lesson's primary student
    pub student_ids: Vec<i64>,
    /// `"individual"` or `"group"`; group lessons also record member rows
    pub kind: String,
}

/// Books a batch of candidate instances atomically.
///
/// Returns the created lesson ids in instance order, or
/// [`Error::ScheduleConflict`] carrying every conflicting interval found
/// across the whole batch. An empty batch succeeds with an empty id list.
pub async fn book(
    db: &DatabaseConnection,
    request: &BookingRequest,
    instances: &[LessonInstance],
) -> Result<Vec<i64>> {
    let primary_student = *request.student_ids.first().ok_or(Error::EmptyStudentList)?;
    for instance in instances {
        if instance.end <= instance.start {
            return Err(Error::InvalidInterval {
                start: instance.start,
                end: instance.end,
            });
        }
    }
    if instances.is_empty() {
        return Ok(Vec::new());
    }

    let txn = db.begin().await?;

    let mut conflicts = intra_batch_conflicts(instances);
    for instance in instances {
        conflicts.extend(
            conflict::find_conflicts(&txn, request.owner_id, instance.start, instance.end, None)
                .await?,
        );
    }
    if !conflicts.is_empty() {
        txn.rollback().await?;
        debug!(
            owner_id = request.owner_id,
            conflicts = conflicts.len(),
            "booking rejected"
        );
        return Err(Error::ScheduleConflict { conflicts });
    }

    let is_group = request.kind == lesson::KIND_GROUP;
    let mut created_ids = Vec::with_capacity(instances.len());
    for instance in instances {
        let model = lesson::ActiveModel {
            owner_id: Set(request.owner_id),
            student_id: Set(primary_student),
            start: Set(instance.start),
            end: Set(instance.end),
            cost: Set(instance.cost),
            is_completed: Set(false),
            is_paid: Set(false),
            is_cancelled: Set(false),
            kind: Set(request.kind.clone()),
            location: Set(instance.location.clone()),
            ..Default::default()
        };
        let inserted = match model.insert(&txn).await {
            Ok(inserted) => inserted,
            Err(err) => {
                txn.rollback().await?;
                return Err(translate_insert_error(err, instance));
            }
        };

        if is_group {
            for &student_id in &request.student_ids {
                let member = lesson_member::ActiveModel {
                    lesson_id: Set(inserted.id),
                    student_id: Set(student_id),
                    ..Default::default()
                };
                member.insert(&txn).await?;
            }
        }
        created_ids.push(inserted.id);
    }

    txn.commit().await?;
    info!(
        owner_id = request.owner_id,
        lessons = created_ids.len(),
        "booked lesson batch"
    );
    Ok(created_ids)
}

/// Expands a recurrence spec and books the resulting instances atomically.
///
/// `max_instances` caps the expansion; callers pass
/// [`AppConfig::max_batch_instances`](crate::config::settings::AppConfig). One student
/// makes the lessons individual; several make them a group.
pub async fn book_recurrence(
    db: &DatabaseConnection,
    spec: &crate::core::recurrence::RecurrenceSpec,
    max_instances: usize,
) -> Result<Vec<i64>> {
    let instances = crate::core::recurrence::expand_with_limit(spec, max_instances)?;
    let kind = if spec.student_ids().len() > 1 {
        lesson::KIND_GROUP
    } else {
        lesson::KIND_INDIVIDUAL
    };
    let request = BookingRequest {
        owner_id: spec.owner_id(),
        student_ids: spec.student_ids().to_vec(),
        kind: kind.to_string(),
    };
    book(db, &request, &instances).await
}

/// Pairwise overlap check within the batch itself; a malformed spec can
/// produce instances that collide with each other.
fn intra_batch_conflicts(instances: &[LessonInstance]) -> Vec<ConflictEntry> {
    let mut conflicts = Vec::new();
    for (i, a) in instances.iter().enumerate() {
        for b in &instances[i + 1..] {
            if conflict::intervals_overlap(a.start, a.end, b.start, b.end) {
                conflicts.push(ConflictEntry {
                    start: b.start,
                    end: b.end,
                    description: format!(
                        "another lesson in the same batch occupies {}-{}",
                        a.start.format("%Y-%m-%d %H:%M"),
                        a.end.format("%H:%M"),
                    ),
                });
            }
        }
    }
    conflicts
}

/// A unique-constraint violation here means a concurrent booking won the
/// race between our conflict check and our insert; a busy/serialization
/// failure means another writer held the slot long enough for SQLite to give
/// up. Callers see both as an ordinary conflict, not a database error, and
/// may re-run the check.
fn translate_insert_error(err: DbErr, instance: &LessonInstance) -> Error {
    let lost_race = matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
        || is_lock_contention(&err);
    if lost_race {
        return Error::ScheduleConflict {
            conflicts: vec![ConflictEntry {
                start: instance.start,
                end: instance.end,
                description: format!(
                    "slot {}-{} was taken by a concurrent booking",
                    instance.start.format("%Y-%m-%d %H:%M"),
                    instance.end.format("%H:%M"),
                ),
            }],
        };
    }
    Error::Database(err)
}

/// `SqlErr` has no variant for SQLITE_BUSY or a serialization failure, so
/// these are recognized by message.
fn is_lock_contention(err: &DbErr) -> bool {
    let message = err.to_string();
    message.contains("database is locked")
        || message.contains("database table is locked")
        || message.contains("could not serialize access")
}
