//! Core business logic - The scheduling and ledger engine, free of any
//! transport or UI concerns. Status resolution and recurrence expansion are
//! pure; everything else speaks to the database through SeaORM connections
//! and transactions.

/// Atomic all-or-nothing booking of lesson batches
pub mod booking;
/// Reserved-break upsert and lookup
pub mod breaks;
/// Interval overlap detection against lessons and breaks
pub mod conflict;
/// Payment application and derived balance computation
pub mod ledger;
/// Lesson CRUD and status-flag updates
pub mod lesson;
/// Recurrence specs and their expansion into lesson instances
pub mod recurrence;
/// Lesson flag to business-status resolution
pub mod status;
