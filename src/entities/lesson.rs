//! Lesson entity - A time-boxed booking on a teacher's calendar.
//!
//! Each lesson belongs to one owner (the teacher) and one primary student,
//! spans a half-open interval `[start, end)`, and carries three status flags
//! that the engine resolves into a display status. Cancelled lessons are
//! excluded from conflict checks and balance computation.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Lesson kind value for one-on-one lessons
pub const KIND_INDIVIDUAL: &str = "individual";
/// Lesson kind value for group lessons
pub const KIND_GROUP: &str = "group";

/// Lesson database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "lessons")]
pub struct Model {
    /// Unique identifier for the lesson
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Teacher whose calendar this lesson occupies
    pub owner_id: i64,
    /// Primary student (for group lessons, see `lesson_member` rows)
    pub student_id: i64,
    /// Start of the lesson interval (inclusive)
    pub start: DateTimeUtc,
    /// End of the lesson interval (exclusive)
    pub end: DateTimeUtc,
    /// Price of this lesson
    pub cost: f64,
    /// Whether the lesson has been delivered
    pub is_completed: bool,
    /// Whether the lesson has been paid for
    pub is_paid: bool,
    /// Whether the lesson was cancelled (terminal, excludes it from
    /// conflicts and balances)
    pub is_cancelled: bool,
    /// `"individual"` or `"group"`
    pub kind: String,
    /// Optional location note
    pub location: Option<String>,
}

/// Defines relationships between Lesson and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One lesson has many group-membership rows
    #[sea_orm(has_many = "super::lesson_member::Entity")]
    Members,
    /// One lesson can be referenced by many payment links
    #[sea_orm(has_many = "super::payment_lesson::Entity")]
    PaymentLinks,
}

impl Related<super::lesson_member::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Members.def()
    }
}

impl Related<super::payment_lesson::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PaymentLinks.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
