//! Payment entity - Money received from a student.
//!
//! A payment optionally settles specific lessons (via `payment_lesson` rows);
//! a payment with no links is a bare credit counted toward the student's
//! prepaid amount until consumed. Immutable once applied except for
//! administrative delete, which re-runs balance recomputation.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Payment database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    /// Unique identifier for the payment
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Student the money came from
    pub student_id: i64,
    /// Amount received
    pub amount: f64,
    /// Date the payment was made
    pub date: Date,
    /// Optional free-form note
    pub description: Option<String>,
}

/// Defines relationships between Payment and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One payment may settle many lessons
    #[sea_orm(has_many = "super::payment_lesson::Entity")]
    LessonLinks,
}

impl Related<super::payment_lesson::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LessonLinks.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
