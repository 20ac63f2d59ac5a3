//! Lesson status resolution - Maps the three lesson flags to a display status.
//!
//! The resolver is a pure, total function over all eight flag combinations.
//! Cancellation is terminal and wins over everything else; the remaining four
//! combinations map one-to-one onto the business states.

use serde::{Deserialize, Serialize};

/// The closed set of business states a lesson can be in.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LessonStatus {
    /// The lesson was cancelled; excluded from conflicts and balances
    Cancelled,
    /// Delivered and paid for; revenue recognized
    Settled,
    /// Delivered but not yet paid for
    Debt,
    /// Paid for but not yet delivered
    Prepaid,
    /// Neither delivered nor paid for
    Scheduled,
}

impl std::fmt::Display for LessonStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Cancelled => "cancelled",
            Self::Settled => "settled",
            Self::Debt => "debt",
            Self::Prepaid => "prepaid",
            Self::Scheduled => "scheduled",
        };
        write!(f, "{label}")
    }
}

/// Resolves a lesson's status flags to its business state.
///
/// Priority order, first match wins:
/// 1. cancelled -> `Cancelled` (overrides the other flags)
/// 2. completed and paid -> `Settled`
/// 3. completed only -> `Debt`
/// 4. paid only -> `Prepaid`
/// 5. neither -> `Scheduled`
#[must_use]
pub const fn resolve(is_completed: bool, is_paid: bool, is_cancelled: bool) -> LessonStatus {
    if is_cancelled {
        LessonStatus::Cancelled
    } else if is_completed && is_paid {
        LessonStatus::Settled
    } else if is_completed {
        LessonStatus::Debt
    } else if is_paid {
        LessonStatus::Prepaid
    } else {
        LessonStatus::Scheduled
    }
}

impl crate::entities::lesson::Model {
    /// Resolves this lesson's current business state from its flags.
    #[must_use]
    pub const fn status(&self) -> LessonStatus {
        resolve(self.is_completed, self.is_paid, self.is_cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancelled_wins_over_all_combinations() {
        for completed in [false, true] {
            for paid in [false, true] {
                assert_eq!(resolve(completed, paid, true), LessonStatus::Cancelled);
            }
        }
    }

    #[test]
    fn test_non_cancelled_combinations() {
        assert_eq!(resolve(true, true, false), LessonStatus::Settled);
        assert_eq!(resolve(true, false, false), LessonStatus::Debt);
        assert_eq!(resolve(false, true, false), LessonStatus::Prepaid);
        assert_eq!(resolve(false, false, false), LessonStatus::Scheduled);
    }

    #[test]
    fn test_totality_over_all_eight_combinations() {
        // Every flag combination resolves to exactly one of the five states.
        let mut seen = Vec::new();
        for cancelled in [false, true] {
            for completed in [false, true] {
                for paid in [false, true] {
                    seen.push(resolve(completed, paid, cancelled));
                }
            }
        }
        assert_eq!(seen.len(), 8);
        for status in seen {
            assert!(matches!(
                status,
                LessonStatus::Cancelled
                    | LessonStatus::Settled
                    | LessonStatus::Debt
                    | LessonStatus::Prepaid
                    | LessonStatus::Scheduled
            ));
        }
    }

    #[test]
    fn test_display_labels() {
        assert_eq!(LessonStatus::Settled.to_string(), "settled");
        assert_eq!(LessonStatus::Cancelled.to_string(), "cancelled");
    }
}
