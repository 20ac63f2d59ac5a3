//! Lesson business logic - Ad-hoc booking, lookups, status-flag updates, and
//! deletion.
//!
//! Ad-hoc single bookings run the same transactional conflict check as batch
//! booking. Flag updates and deletes return the student's recomputed balance
//! from the same transaction, so callers never see a snapshot that lags the
//! change.

use crate::{
    core::{conflict, ledger, ledger::StudentBalance},
    entities::{Lesson, LessonMember, PaymentLesson, lesson, lesson_member, payment_lesson},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{DatabaseConnection, QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::info;

/// Creates a single individual lesson, rejecting it if the interval overlaps
/// the owner's existing lessons or reserved breaks.
pub async fn create_lesson(
    db: &DatabaseConnection,
    owner_id: i64,
    student_id: i64,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    cost: f64,
    location: Option<String>,
) -> Result<lesson::Model> {
    if end <= start {
        return Err(Error::InvalidInterval { start, end });
    }
    if !cost.is_finite() || cost < 0.0 {
        return Err(Error::InvalidAmount { amount: cost });
    }

    let txn = db.begin().await?;

    let conflicts = conflict::find_conflicts(&txn, owner_id, start, end, None).await?;
    if !conflicts.is_empty() {
        txn.rollback().await?;
        return Err(Error::ScheduleConflict { conflicts });
    }

    let model = lesson::ActiveModel {
        owner_id: Set(owner_id),
        student_id: Set(student_id),
        start: Set(start),
        end: Set(end),
        cost: Set(cost),
        is_completed: Set(false),
        is_paid: Set(false),
        is_cancelled: Set(false),
        kind: Set(lesson::KIND_INDIVIDUAL.to_string()),
        location: Set(location),
        ..Default::default()
    };
    let inserted = model.insert(&txn).await?;
    txn.commit().await?;

    info!(owner_id, student_id, lesson_id = inserted.id, "created lesson");
    Ok(inserted)
}

/// Finds a lesson by its unique ID, returning None if it does not exist.
pub async fn get_lesson_by_id(
    db: &DatabaseConnection,
    lesson_id: i64,
) -> Result<Option<lesson::Model>> {
    Lesson::find_by_id(lesson_id).one(db).await.map_err(Into::into)
}

/// All lessons on one teacher's calendar, chronological.
pub async fn get_lessons_for_owner(
    db: &DatabaseConnection,
    owner_id: i64,
) -> Result<Vec<lesson::Model>> {
    Lesson::find()
        .filter(lesson::Column::OwnerId.eq(owner_id))
        .order_by_asc(lesson::Column::Start)
        .all(db)
        .await
        .map_err(Into::into)
}

/// All lessons where the student is the primary student, chronological.
pub async fn get_lessons_for_student(
    db: &DatabaseConnection,
    student_id: i64,
) -> Result<Vec<lesson::Model>> {
    Lesson::find()
        .filter(lesson::Column::StudentId.eq(student_id))
        .order_by_asc(lesson::Column::Start)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Updates a subset of a lesson's status flags and returns the refreshed
/// lesson together with the student's recomputed balance.
///
/// `None` leaves a flag untouched. The update and the balance snapshot share
/// one transaction.
pub async fn update_lesson_flags(
    db: &DatabaseConnection,
    lesson_id: i64,
    is_completed: Option<bool>,
    is_paid: Option<bool>,
    is_cancelled: Option<bool>,
) -> Result<(lesson::Model, StudentBalance)> {
    let txn = db.begin().await?;

    let lesson = Lesson::find_by_id(lesson_id)
        .one(&txn)
        .await?
        .ok_or(Error::LessonNotFound { id: lesson_id })?;
    let student_id = lesson.student_id;

    let mut active: lesson::ActiveModel = lesson.into();
    if let Some(completed) = is_completed {
        active.is_completed = Set(completed);
    }
    if let Some(paid) = is_paid {
        active.is_paid = Set(paid);
    }
    if let Some(cancelled) = is_cancelled {
        active.is_cancelled = Set(cancelled);
    }
    let updated = active.update(&txn).await?;

    let snapshot = ledger::compute_balance(&txn, student_id).await?;
    txn.commit().await?;
    Ok((updated, snapshot))
}

/// Deletes a lesson along with its membership and payment-link rows,
/// returning the student's recomputed balance.
pub async fn delete_lesson(db: &DatabaseConnection, lesson_id: i64) -> Result<StudentBalance> {
    let txn = db.begin().await?;

    let lesson = Lesson::find_by_id(lesson_id)
        .one(&txn)
        .await?
        .ok_or(Error::LessonNotFound { id: lesson_id })?;
    let student_id = lesson.student_id;

    LessonMember::delete_many()
        .filter(lesson_member::Column::LessonId.eq(lesson_id))
        .exec(&txn)
        .await?;
    PaymentLesson::delete_many()
        .filter(payment_lesson::Column::LessonId.eq(lesson_id))
        .exec(&txn)
        .await?;
    lesson.delete(&txn).await?;

    let snapshot = ledger::compute_balance(&txn, student_id).await?;
    txn.commit().await?;
    info!(lesson_id, student_id, "deleted lesson");
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::status::LessonStatus;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_create_lesson_validation() -> crate::errors::Result<()> {
        let db = setup_test_db().await?;

        let inverted = create_lesson(
            &db,
            1,
            10,
            dt(2025, 1, 6, 11, 0),
            dt(2025, 1, 6, 10, 0),
            1000.0,
            None,
        )
        .await;
        assert!(matches!(
            inverted.unwrap_err(),
            Error::InvalidInterval { start: _, end: _ }
        ));

        let bad_cost = create_lesson(
            &db,
            1,
            10,
            dt(2025, 1, 6, 10, 0),
            dt(2025, 1, 6, 11, 0),
            f64::NAN,
            None,
        )
        .await;
        assert!(matches!(
            bad_cost.unwrap_err(),
            Error::InvalidAmount { amount: _ }
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_create_lesson_rejects_overlap() -> crate::errors::Result<()> {
        let db = setup_test_db().await?;
        create_test_lesson(&db, 1, 10, dt(2025, 1, 6, 10, 0), dt(2025, 1, 6, 11, 0)).await?;

        let result = create_lesson(
            &db,
            1,
            11,
            dt(2025, 1, 6, 10, 30),
            dt(2025, 1, 6, 11, 30),
            1000.0,
            None,
        )
        .await;
        let Err(Error::ScheduleConflict { conflicts }) = result else {
            panic!("expected a schedule conflict");
        };
        assert_eq!(conflicts.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_lesson_flags_partial() -> crate::errors::Result<()> {
        let db = setup_test_db().await?;
        let lesson =
            create_test_lesson(&db, 1, 10, dt(2025, 1, 6, 10, 0), dt(2025, 1, 6, 11, 0)).await?;
        assert_eq!(lesson.status(), LessonStatus::Scheduled);

        let (updated, snapshot) =
            update_lesson_flags(&db, lesson.id, Some(true), None, None).await?;
        assert!(updated.is_completed);
        assert!(!updated.is_paid);
        assert_eq!(updated.status(), LessonStatus::Debt);
        assert_eq!(snapshot.debt_amount, updated.cost);
        assert_eq!(snapshot.debt_lessons_count, 1);

        let (settled, snapshot) =
            update_lesson_flags(&db, lesson.id, None, Some(true), None).await?;
        assert_eq!(settled.status(), LessonStatus::Settled);
        assert_eq!(snapshot.debt_amount, 0.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_lesson_flags_not_found() -> crate::errors::Result<()> {
        let db = setup_test_db().await?;
        let result = update_lesson_flags(&db, 999, Some(true), None, None).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::LessonNotFound { id: 999 }
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_cancelling_frees_the_slot() -> crate::errors::Result<()> {
        let db = setup_test_db().await?;
        let lesson =
            create_test_lesson(&db, 1, 10, dt(2025, 1, 6, 10, 0), dt(2025, 1, 6, 11, 0)).await?;
        update_lesson_flags(&db, lesson.id, None, None, Some(true)).await?;

        // The slot can be rebooked once the lesson is cancelled.
        let rebooked = create_lesson(
            &db,
            1,
            11,
            dt(2025, 1, 6, 10, 0),
            dt(2025, 1, 6, 11, 0),
            1000.0,
            None,
        )
        .await?;
        assert_eq!(rebooked.student_id, 11);
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_lesson_recomputes_balance() -> crate::errors::Result<()> {
        let db = setup_test_db().await?;
        let lesson =
            create_test_lesson(&db, 1, 10, dt(2025, 1, 6, 10, 0), dt(2025, 1, 6, 11, 0)).await?;
        update_lesson_flags(&db, lesson.id, Some(true), None, None).await?;

        let snapshot = delete_lesson(&db, lesson.id).await?;
        assert_eq!(snapshot.debt_amount, 0.0);
        assert!(get_lesson_by_id(&db, lesson.id).await?.is_none());

        let missing = delete_lesson(&db, lesson.id).await;
        assert!(matches!(
            missing.unwrap_err(),
            Error::LessonNotFound { id: _ }
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_lessons_for_owner_chronological() -> crate::errors::Result<()> {
        let db = setup_test_db().await?;
        let later =
            create_test_lesson(&db, 1, 10, dt(2025, 1, 8, 10, 0), dt(2025, 1, 8, 11, 0)).await?;
        let earlier =
            create_test_lesson(&db, 1, 10, dt(2025, 1, 6, 10, 0), dt(2025, 1, 6, 11, 0)).await?;

        let lessons = get_lessons_for_owner(&db, 1).await?;
        assert_eq!(lessons.len(), 2);
        assert_eq!(lessons[0].id, earlier.id);
        assert_eq!(lessons[1].id, later.id);
        Ok(())
    }
}
