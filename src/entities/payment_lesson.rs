//! Payment-lesson link entity - Records which lessons a payment settled.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Payment-to-lesson link database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payment_lessons")]
pub struct Model {
    /// Unique identifier for the link row
    #[sea_orm(primary_key)]
    pub id: i64,
    /// The settling payment
    pub payment_id: i64,
    /// The lesson it settled
    pub lesson_id: i64,
}

/// Defines relationships between `PaymentLesson` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each link belongs to one payment
    #[sea_orm(
        belongs_to = "super::payment::Entity",
        from = "Column::PaymentId",
        to = "super::payment::Column::Id"
    )]
    Payment,
    /// Each link references one lesson
    #[sea_orm(
        belongs_to = "super::lesson::Entity",
        from = "Column::LessonId",
        to = "super::lesson::Column::Id"
    )]
    Lesson,
}

impl Related<super::payment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payment.def()
    }
}

impl Related<super::lesson::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Lesson.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
