//! Payment ledger - Applies payments and derives per-student balances.
//!
//! The balance snapshot is always recomputed from the current lesson and
//! payment rows; nothing stores it as ground truth, so there is no counter
//! that can silently drift. A payment tied to specific lessons settles them
//! outright (every referenced lesson is marked paid regardless of amount
//! sufficiency); a payment with no lesson references is a bare credit
//! counted toward the prepaid amount until later consumed.

use crate::{
    core::status::LessonStatus,
    entities::{Lesson, Payment, PaymentLesson, lesson, payment, payment_lesson},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{DatabaseConnection, QueryOrder, Set, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::info;

/// Derived financial view of one student. Never stored; always recomputable
/// from the lesson and payment rows.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Default)]
pub struct StudentBalance {
    /// Money received for lessons not yet delivered, plus unassigned credit
    pub prepaid_amount: f64,
    /// Cost of delivered lessons not yet paid for
    pub debt_amount: f64,
    /// Number of paid, not-yet-delivered lessons
    pub prepaid_lessons_count: usize,
    /// Number of delivered, unpaid lessons
    pub debt_lessons_count: usize,
    /// `prepaid_amount - debt_amount`
    pub balance: f64,
}

/// Recomputes a student's balance from the current rows.
///
/// Never raises a domain error: a student with no rows gets zero balances.
/// Generic over the connection so mutating operations can read a snapshot
/// inside their own transaction.
pub async fn compute_balance<C>(db: &C, student_id: i64) -> Result<StudentBalance>
where
    C: ConnectionTrait,
{
    let lessons = Lesson::find()
        .filter(lesson::Column::StudentId.eq(student_id))
        .filter(lesson::Column::IsCancelled.eq(false))
        .all(db)
        .await?;

    let mut snapshot = StudentBalance::default();
    for l in &lessons {
        match l.status() {
            LessonStatus::Debt => {
                snapshot.debt_amount += l.cost;
                snapshot.debt_lessons_count += 1;
            }
            LessonStatus::Prepaid => {
                snapshot.prepaid_amount += l.cost;
                snapshot.prepaid_lessons_count += 1;
            }
            LessonStatus::Settled | LessonStatus::Scheduled | LessonStatus::Cancelled => {}
        }
    }

    // Payments not tied to any lesson are credit the student still holds.
    let payments = Payment::find()
        .filter(payment::Column::StudentId.eq(student_id))
        .all(db)
        .await?;
    if !payments.is_empty() {
        let payment_ids: Vec<i64> = payments.iter().map(|p| p.id).collect();
        let linked: HashSet<i64> = PaymentLesson::find()
            .filter(payment_lesson::Column::PaymentId.is_in(payment_ids))
            .all(db)
            .await?
            .iter()
            .map(|link| link.payment_id)
            .collect();
        for p in &payments {
            if !linked.contains(&p.id) {
                snapshot.prepaid_amount += p.amount;
            }
        }
    }

    snapshot.balance = snapshot.prepaid_amount - snapshot.debt_amount;
    Ok(snapshot)
}

/// Applies a payment from a student, optionally settling specific lessons.
///
/// With `lesson_ids`, every referenced lesson must exist and belong to the
/// student, and is marked paid as a result of this call. Without, the
/// payment is a lump prepayment and touches no lesson. The payment insert,
/// flag updates, and the returned balance snapshot share one transaction so
/// the snapshot is consistent with the write.
pub async fn apply_payment(
    db: &DatabaseConnection,
    student_id: i64,
    amount: f64,
    date: NaiveDate,
    description: Option<String>,
    lesson_ids: Option<Vec<i64>>,
) -> Result<(i64, StudentBalance)> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(Error::InvalidAmount { amount });
    }

    let txn = db.begin().await?;

    let payment_model = payment::ActiveModel {
        student_id: Set(student_id),
        amount: Set(amount),
        date: Set(date),
        description: Set(description),
        ..Default::default()
    };
    let inserted = payment_model.insert(&txn).await?;

    if let Some(lesson_ids) = lesson_ids {
        for lesson_id in lesson_ids {
            let lesson = Lesson::find_by_id(lesson_id)
                .one(&txn)
                .await?
                .ok_or(Error::LessonNotFound { id: lesson_id })?;
            if lesson.student_id != student_id {
                return Err(Error::LessonNotFound { id: lesson_id });
            }

            // Settlement instrument: the lesson is paid in full regardless
            // of whether the amount covers it.
            let mut active: lesson::ActiveModel = lesson.into();
            active.is_paid = Set(true);
            active.update(&txn).await?;

            let link = payment_lesson::ActiveModel {
                payment_id: Set(inserted.id),
                lesson_id: Set(lesson_id),
                ..Default::default()
            };
            link.insert(&txn).await?;
        }
    }

    let snapshot = compute_balance(&txn, student_id).await?;
    txn.commit().await?;
    info!(student_id, amount, payment_id = inserted.id, "applied payment");
    Ok((inserted.id, snapshot))
}

/// Administratively deletes a payment and its lesson links, returning the
/// recomputed balance. Lessons the payment settled keep their paid flag;
/// unwinding a settlement is a separate flag update.
pub async fn delete_payment(db: &DatabaseConnection, payment_id: i64) -> Result<StudentBalance> {
    let txn = db.begin().await?;

    let payment = Payment::find_by_id(payment_id)
        .one(&txn)
        .await?
        .ok_or(Error::PaymentNotFound { id: payment_id })?;
    let student_id = payment.student_id;

    PaymentLesson::delete_many()
        .filter(payment_lesson::Column::PaymentId.eq(payment_id))
        .exec(&txn)
        .await?;
    payment.delete(&txn).await?;

    let snapshot = compute_balance(&txn, student_id).await?;
    txn.commit().await?;
    info!(student_id, payment_id, "deleted payment");
    Ok(snapshot)
}

/// All payments from one student, newest first.
pub async fn get_payments_for_student(
    db: &DatabaseConnection,
    student_id: i64,
) -> Result<Vec<payment::Model>> {
    Payment::find()
        .filter(payment::Column::StudentId.eq(student_id))
        .order_by_desc(payment::Column::Date)
        .all(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::lesson::update_lesson_flags;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_apply_payment_validation() -> crate::errors::Result<()> {
        let db = setup_test_db().await?;

        for bad in [0.0, -100.0, f64::NAN, f64::INFINITY] {
            let result = apply_payment(&db, 10, bad, date(2025, 1, 6), None, None).await;
            assert!(matches!(
                result.unwrap_err(),
                Error::InvalidAmount { amount: _ }
            ));
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_balance_zero_for_unknown_student() -> crate::errors::Result<()> {
        let db = setup_test_db().await?;
        let snapshot = compute_balance(&db, 404).await?;
        assert_eq!(snapshot, StudentBalance::default());
        Ok(())
    }

    #[tokio::test]
    async fn test_ledger_round_trip_settles_lesson() -> crate::errors::Result<()> {
        let db = setup_test_db().await?;
        let lesson = create_custom_lesson(
            &db,
            1,
            10,
            dt(2025, 1, 6, 10, 0),
            dt(2025, 1, 6, 11, 0),
            1500.0,
        )
        .await?;
        update_lesson_flags(&db, lesson.id, Some(true), None, None).await?;

        let before = compute_balance(&db, 10).await?;
        assert_eq!(before.debt_amount, 1500.0);
        assert_eq!(before.debt_lessons_count, 1);

        let (_, after) =
            apply_payment(&db, 10, 1500.0, date(2025, 1, 7), None, Some(vec![lesson.id])).await?;
        assert_eq!(after.debt_amount, 0.0);
        assert_eq!(after.debt_lessons_count, 0);

        let settled = Lesson::find_by_id(lesson.id).one(&db).await?.unwrap();
        assert_eq!(settled.status(), LessonStatus::Settled);
        Ok(())
    }

    #[tokio::test]
    async fn test_balance_additivity() -> crate::errors::Result<()> {
        let db = setup_test_db().await?;
        let debt_lesson = create_custom_lesson(
            &db,
            1,
            10,
            dt(2025, 1, 6, 10, 0),
            dt(2025, 1, 6, 11, 0),
            1000.0,
        )
        .await?;
        update_lesson_flags(&db, debt_lesson.id, Some(true), None, None).await?;

        let prepaid_lesson = create_custom_lesson(
            &db,
            1,
            10,
            dt(2025, 1, 8, 10, 0),
            dt(2025, 1, 8, 11, 0),
            2000.0,
        )
        .await?;
        update_lesson_flags(&db, prepaid_lesson.id, None, Some(true), None).await?;

        let snapshot = compute_balance(&db, 10).await?;
        assert_eq!(snapshot.debt_amount, 1000.0);
        assert_eq!(snapshot.prepaid_amount, 2000.0);
        assert_eq!(snapshot.debt_lessons_count, 1);
        assert_eq!(snapshot.prepaid_lessons_count, 1);
        assert_eq!(snapshot.balance, 1000.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_unattached_payment_counts_as_credit() -> crate::errors::Result<()> {
        let db = setup_test_db().await?;
        let (_, snapshot) = apply_payment(
            &db,
            10,
            3000.0,
            date(2025, 1, 6),
            Some("lump prepayment".to_string()),
            None,
        )
        .await?;
        assert_eq!(snapshot.prepaid_amount, 3000.0);
        assert_eq!(snapshot.prepaid_lessons_count, 0);
        assert_eq!(snapshot.balance, 3000.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_payment_marks_all_lessons_even_if_short() -> crate::errors::Result<()> {
        let db = setup_test_db().await?;
        let a = create_custom_lesson(
            &db,
            1,
            10,
            dt(2025, 1, 6, 10, 0),
            dt(2025, 1, 6, 11, 0),
            1000.0,
        )
        .await?;
        let b = create_custom_lesson(
            &db,
            1,
            10,
            dt(2025, 1, 8, 10, 0),
            dt(2025, 1, 8, 11, 0),
            1000.0,
        )
        .await?;

        // 500 does not cover 2000, but both referenced lessons are settled.
        apply_payment(&db, 10, 500.0, date(2025, 1, 6), None, Some(vec![a.id, b.id])).await?;

        for id in [a.id, b.id] {
            let lesson = Lesson::find_by_id(id).one(&db).await?.unwrap();
            assert!(lesson.is_paid);
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_payment_rejects_foreign_lesson() -> crate::errors::Result<()> {
        let db = setup_test_db().await?;
        let other =
            create_test_lesson(&db, 1, 99, dt(2025, 1, 6, 10, 0), dt(2025, 1, 6, 11, 0)).await?;

        let result =
            apply_payment(&db, 10, 1000.0, date(2025, 1, 6), None, Some(vec![other.id])).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::LessonNotFound { id: _ }
        ));

        // Rolled back: no payment row survives.
        assert!(get_payments_for_student(&db, 10).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_cancelled_lessons_excluded_from_balance() -> crate::errors::Result<()> {
        let db = setup_test_db().await?;
        let lesson = create_custom_lesson(
            &db,
            1,
            10,
            dt(2025, 1, 6, 10, 0),
            dt(2025, 1, 6, 11, 0),
            1000.0,
        )
        .await?;
        update_lesson_flags(&db, lesson.id, Some(true), None, None).await?;
        update_lesson_flags(&db, lesson.id, None, None, Some(true)).await?;

        let snapshot = compute_balance(&db, 10).await?;
        assert_eq!(snapshot.debt_amount, 0.0);
        assert_eq!(snapshot.balance, 0.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_payment_recomputes_balance() -> crate::errors::Result<()> {
        let db = setup_test_db().await?;
        let (payment_id, snapshot) =
            apply_payment(&db, 10, 3000.0, date(2025, 1, 6), None, None).await?;
        assert_eq!(snapshot.prepaid_amount, 3000.0);

        let after = delete_payment(&db, payment_id).await?;
        assert_eq!(after.prepaid_amount, 0.0);
        assert_eq!(after.balance, 0.0);

        let missing = delete_payment(&db, payment_id).await;
        assert!(matches!(
            missing.unwrap_err(),
            Error::PaymentNotFound { id: _ }
        ));
        Ok(())
    }
}
