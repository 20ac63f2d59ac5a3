//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod lesson;
pub mod lesson_member;
pub mod payment;
pub mod payment_lesson;
pub mod reserved_break;

// Re-export specific types to avoid conflicts
pub use lesson::{Column as LessonColumn, Entity as Lesson, Model as LessonModel};
pub use lesson_member::{
    Column as LessonMemberColumn, Entity as LessonMember, Model as LessonMemberModel,
};
pub use payment::{Column as PaymentColumn, Entity as Payment, Model as PaymentModel};
pub use payment_lesson::{
    Column as PaymentLessonColumn, Entity as PaymentLesson, Model as PaymentLessonModel,
};
pub use reserved_break::{
    Column as ReservedBreakColumn, Entity as ReservedBreak, Model as ReservedBreakModel,
};
