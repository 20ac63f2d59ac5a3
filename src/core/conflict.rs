//! Conflict detection - Decides whether a proposed interval overlaps an
//! owner's existing lessons or reserved breaks.
//!
//! Intervals are half-open: `[s1, e1)` and `[s2, e2)` conflict iff
//! `s1 < e2 && s2 < e1`, so a lesson ending exactly when another starts does
//! not conflict. Conflicts are a normal outcome the caller branches on, not
//! an error; only malformed input (`end <= start`) is rejected. The detector
//! returns the full list of conflicting intervals so callers can report
//! "occupied 10:00-11:00" rather than a bare rejection.

use crate::{
    entities::{Lesson, ReservedBreak, lesson, reserved_break},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::prelude::*;
use serde::{Deserialize, Serialize};

/// One interval that overlaps a proposed booking, with enough detail to
/// render an actionable error message.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConflictEntry {
    /// Start of the occupying interval
    pub start: DateTime<Utc>,
    /// End of the occupying interval
    pub end: DateTime<Utc>,
    /// Human-readable description of what occupies the slot
    pub description: String,
}

impl ConflictEntry {
    fn for_lesson(model: &lesson::Model) -> Self {
        Self {
            start: model.start,
            end: model.end,
            description: format!(
                "lesson for student {} occupies {}-{}",
                model.student_id,
                model.start.format("%Y-%m-%d %H:%M"),
                model.end.format("%H:%M"),
            ),
        }
    }

    fn for_break(model: &reserved_break::Model) -> Self {
        Self {
            start: model.start,
            end: model.end,
            description: format!(
                "reserved break occupies {}-{}",
                model.start.format("%Y-%m-%d %H:%M"),
                model.end.format("%H:%M"),
            ),
        }
    }
}

/// Returns true if the half-open intervals `[s1, e1)` and `[s2, e2)` overlap.
/// Touching endpoints do not overlap; identical intervals always do.
#[must_use]
pub fn intervals_overlap(
    s1: DateTime<Utc>,
    e1: DateTime<Utc>,
    s2: DateTime<Utc>,
    e2: DateTime<Utc>,
) -> bool {
    s1 < e2 && s2 < e1
}

/// Finds every non-cancelled lesson and every reserved break of `owner_id`
/// that overlaps `[start, end)`, ordered by interval start.
///
/// `exclude_lesson_id` lets an update check against all *other* lessons
/// without self-conflicting. Generic over the connection so the booking
/// transaction can run it inside its own txn.
pub async fn find_conflicts<C>(
    db: &C,
    owner_id: i64,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    exclude_lesson_id: Option<i64>,
) -> Result<Vec<ConflictEntry>>
where
    C: ConnectionTrait,
{
    if end <= start {
        return Err(Error::InvalidInterval { start, end });
    }

    let mut lesson_query = Lesson::find()
        .filter(lesson::Column::OwnerId.eq(owner_id))
        .filter(lesson::Column::IsCancelled.eq(false))
        .filter(lesson::Column::Start.lt(end))
        .filter(lesson::Column::End.gt(start));
    if let Some(id) = exclude_lesson_id {
        lesson_query = lesson_query.filter(lesson::Column::Id.ne(id));
    }
    let lessons = lesson_query.all(db).await?;

    let breaks = ReservedBreak::find()
        .filter(reserved_break::Column::OwnerId.eq(owner_id))
        .filter(reserved_break::Column::Start.lt(end))
        .filter(reserved_break::Column::End.gt(start))
        .all(db)
        .await?;

    let mut conflicts: Vec<ConflictEntry> = lessons
        .iter()
        .map(ConflictEntry::for_lesson)
        .chain(breaks.iter().map(ConflictEntry::for_break))
        .collect();
    conflicts.sort_by_key(|c| c.start);
    Ok(conflicts)
}

/// Boolean wrapper over [`find_conflicts`].
pub async fn has_conflict<C>(
    db: &C,
    owner_id: i64,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    exclude_lesson_id: Option<i64>,
) -> Result<bool>
where
    C: ConnectionTrait,
{
    Ok(!find_conflicts(db, owner_id, start, end, exclude_lesson_id)
        .await?
        .is_empty())
}
