//! Lesson member entity - Group-lesson membership join table.
//!
//! Records which students attend a group lesson. Individual lessons carry
//! their student directly on the lesson row and have no member rows.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Group membership database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "lesson_members")]
pub struct Model {
    /// Unique identifier for the membership row
    #[sea_orm(primary_key)]
    pub id: i64,
    /// The group lesson
    pub lesson_id: i64,
    /// A student attending it
    pub student_id: i64,
}

/// Defines relationships between `LessonMember` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each membership row belongs to one lesson
    #[sea_orm(
        belongs_to = "super::lesson::Entity",
        from = "Column::LessonId",
        to = "super::lesson::Column::Id"
    )]
    Lesson,
}

impl Related<super::lesson::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Lesson.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
