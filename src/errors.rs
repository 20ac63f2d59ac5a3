//! Unified error types and result handling for the scheduling and ledger engine.
//!
//! Validation and not-found errors fail fast with no state change. Schedule
//! conflicts are an expected, recoverable outcome of booking and always carry
//! the full list of conflicting intervals so callers can render an actionable
//! message instead of a bare rejection.

use crate::core::conflict::ConflictEntry;
use thiserror::Error;

/// All error conditions produced by the engine.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration load/parse failure, or malformed input with no
    /// dedicated variant.
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable description of the problem
        message: String,
    },

    /// A time interval where `end <= start`.
    #[error("Invalid interval: end ({end}) must be after start ({start})")]
    InvalidInterval {
        /// Requested interval start
        start: chrono::DateTime<chrono::Utc>,
        /// Requested interval end
        end: chrono::DateTime<chrono::Utc>,
    },

    /// A non-finite or non-positive monetary amount.
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The rejected amount
        amount: f64,
    },

    /// A weekday value outside `0..=6` (0 = Sunday .. 6 = Saturday).
    #[error("Invalid weekday: {weekday} (expected 0-6, 0 = Sunday)")]
    InvalidWeekday {
        /// The rejected weekday value
        weekday: u32,
    },

    /// A booking request with no students attached.
    #[error("Booking requires at least one student")]
    EmptyStudentList,

    /// A recurrence expansion that exceeds the configured instance bound.
    #[error("Recurrence expands to {count} instances, exceeding the maximum of {max}")]
    TooManyInstances {
        /// Number of instances the spec would produce
        count: usize,
        /// Configured maximum
        max: usize,
    },

    /// The requested time overlaps existing lessons or reserved breaks.
    /// Carries every conflicting interval, not just the first.
    #[error("Schedule conflict: {} overlapping interval(s)", .conflicts.len())]
    ScheduleConflict {
        /// All intervals that overlap the request
        conflicts: Vec<ConflictEntry>,
    },

    /// A lesson id that does not exist.
    #[error("Lesson not found: {id}")]
    LessonNotFound {
        /// The missing lesson id
        id: i64,
    },

    /// A payment id that does not exist.
    #[error("Payment not found: {id}")]
    PaymentNotFound {
        /// The missing payment id
        id: i64,
    },

    /// No reserved break exists for the given owner and date.
    #[error("No reserved break for owner {owner_id} on {date}")]
    BreakNotFound {
        /// Calendar owner (teacher)
        owner_id: i64,
        /// Calendar date queried
        date: chrono::NaiveDate,
    },

    /// Database error from `SeaORM`.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Environment variable error.
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),
}

/// Convenience `Result` type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
