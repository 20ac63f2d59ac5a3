//! Reserved break entity - A teacher's blocked-off time (e.g. lunch).
//!
//! At most one active break exists per owner per calendar date; creating a
//! new break for a date that already has one replaces it. Breaks participate
//! in conflict detection exactly like lessons.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Reserved break database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "reserved_breaks")]
pub struct Model {
    /// Unique identifier for the break
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Teacher whose calendar this break blocks
    pub owner_id: i64,
    /// Calendar date of the break; unique per owner
    pub date: Date,
    /// Start of the blocked interval (inclusive)
    pub start: DateTimeUtc,
    /// End of the blocked interval (exclusive)
    pub end: DateTimeUtc,
}

/// Defines relationships between `ReservedBreak` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
