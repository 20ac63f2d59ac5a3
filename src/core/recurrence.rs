//! Recurrence expansion - Turns a recurrence specification into concrete
//! lesson instances.
//!
//! Expansion is pure and deterministic: the same spec always yields the same
//! chronologically ordered output, with no I/O and no conflict awareness.
//! Conflict checking happens later, when the instances are candidate-booked.
//!
//! Weekday numbering follows the calendar convention 0 = Sunday .. 6 =
//! Saturday. Empty weekday sets, empty week day lists, and inverted date
//! ranges all yield zero instances rather than an error; only genuinely
//! malformed input (weekday out of range, non-positive duration, inverted
//! times) is rejected. Expansions beyond the instance bound are rejected
//! outright, never silently truncated.

use crate::errors::{Error, Result};
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Default upper bound on instances a single expansion may produce.
/// A multi-year weekly pattern should fail loudly, not melt the calendar.
pub const DEFAULT_MAX_INSTANCES: usize = 500;

/// Longest lesson a regular pattern may describe, in minutes (24 hours).
pub const MAX_DURATION_MINUTES: i64 = 24 * 60;

/// A fixed weekly pattern: the same weekdays, time, duration, and price over
/// a date range.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegularSpec {
    /// Teacher whose calendar the lessons will occupy
    pub owner_id: i64,
    /// Students attending every generated lesson
    pub student_ids: Vec<i64>,
    /// First date considered (inclusive)
    pub start_date: NaiveDate,
    /// Last date considered (inclusive)
    pub end_date: NaiveDate,
    /// Weekdays to generate on, 0 = Sunday .. 6 = Saturday
    pub weekdays: BTreeSet<u32>,
    /// Lesson start time on each matching date
    pub start_time: NaiveTime,
    /// Lesson length in minutes
    pub duration_minutes: i64,
    /// Price of each generated lesson
    pub cost_per_lesson: f64,
}

/// One day entry of a flexible week: its own time, price, and location.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DayPlan {
    /// Weekday this entry applies to, 0 = Sunday .. 6 = Saturday
    pub weekday: u32,
    /// Lesson start time
    pub start_time: NaiveTime,
    /// Lesson end time
    pub end_time: NaiveTime,
    /// Price of the lesson
    pub cost: f64,
    /// Optional location note
    pub location: Option<String>,
}

/// One week of a flexible pattern. Weeks are independent: different weeks
/// may use entirely different weekday sets, times, and prices.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeekPlan {
    /// First date of the week window (inclusive)
    pub week_start: NaiveDate,
    /// Last date of the week window (inclusive)
    pub week_end: NaiveDate,
    /// Day entries generating lessons within the window
    pub days: Vec<DayPlan>,
}

/// A per-week pattern where every week is described explicitly.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FlexibleSpec {
    /// Teacher whose calendar the lessons will occupy
    pub owner_id: i64,
    /// Students attending every generated lesson
    pub student_ids: Vec<i64>,
    /// Ordered list of week entries
    pub weeks: Vec<WeekPlan>,
}

/// A declarative description of a pattern of lessons to generate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum RecurrenceSpec {
    /// Fixed weekly pattern
    Regular(RegularSpec),
    /// Explicit per-week pattern
    Flexible(FlexibleSpec),
}

impl RecurrenceSpec {
    /// Teacher whose calendar the generated lessons will occupy.
    #[must_use]
    pub const fn owner_id(&self) -> i64 {
        match self {
            Self::Regular(spec) => spec.owner_id,
            Self::Flexible(spec) => spec.owner_id,
        }
    }

    /// Students attending the generated lessons.
    #[must_use]
    pub fn student_ids(&self) -> &[i64] {
        match self {
            Self::Regular(spec) => &spec.student_ids,
            Self::Flexible(spec) => &spec.student_ids,
        }
    }
}

/// A concrete lesson candidate produced by expansion; not yet persisted and
/// not yet conflict-checked.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LessonInstance {
    /// Calendar date of the lesson
    pub date: NaiveDate,
    /// Start of the lesson interval
    pub start: DateTime<Utc>,
    /// End of the lesson interval
    pub end: DateTime<Utc>,
    /// Price of the lesson
    pub cost: f64,
    /// Optional location note
    pub location: Option<String>,
}

/// Expands a recurrence spec into chronologically ordered lesson instances,
/// bounded by [`DEFAULT_MAX_INSTANCES`].
pub fn expand(spec: &RecurrenceSpec) -> Result<Vec<LessonInstance>> {
    expand_with_limit(spec, DEFAULT_MAX_INSTANCES)
}

/// Expands a recurrence spec with an explicit instance bound.
pub fn expand_with_limit(spec: &RecurrenceSpec, max: usize) -> Result<Vec<LessonInstance>> {
    let instances = match spec {
        RecurrenceSpec::Regular(regular) => expand_regular(regular, max)?,
        RecurrenceSpec::Flexible(flexible) => expand_flexible(flexible, max)?,
    };
    Ok(instances)
}

/// Total price of a regular subscription: instance count times the
/// per-lesson cost. Callers use this to size the paired prepayment.
#[allow(clippy::cast_precision_loss)]
pub fn total_price(spec: &RegularSpec) -> Result<f64> {
    let instances = expand_regular(spec, DEFAULT_MAX_INSTANCES)?;
    Ok(instances.len() as f64 * spec.cost_per_lesson)
}

fn validate_weekday(weekday: u32) -> Result<()> {
    if weekday > 6 {
        return Err(Error::InvalidWeekday { weekday });
    }
    Ok(())
}

fn push_bounded(
    instances: &mut Vec<LessonInstance>,
    instance: LessonInstance,
    max: usize,
) -> Result<()> {
    if instances.len() >= max {
        return Err(Error::TooManyInstances {
            count: instances.len() + 1,
            max,
        });
    }
    instances.push(instance);
    Ok(())
}

fn expand_regular(spec: &RegularSpec, max: usize) -> Result<Vec<LessonInstance>> {
    for &weekday in &spec.weekdays {
        validate_weekday(weekday)?;
    }
    if spec.duration_minutes <= 0 || spec.duration_minutes > MAX_DURATION_MINUTES {
        return Err(Error::Config {
            message: format!(
                "Lesson duration must be between 1 and {MAX_DURATION_MINUTES} minutes, got {}",
                spec.duration_minutes
            ),
        });
    }

    let mut instances = Vec::new();
    let mut current = spec.start_date;
    while current <= spec.end_date {
        if spec.weekdays.contains(&current.weekday().num_days_from_sunday()) {
            let start = current.and_time(spec.start_time);
            let end = start + Duration::minutes(spec.duration_minutes);
            push_bounded(
                &mut instances,
                LessonInstance {
                    date: current,
                    start: start.and_utc(),
                    end: end.and_utc(),
                    cost: spec.cost_per_lesson,
                    location: None,
                },
                max,
            )?;
        }
        let Some(next) = current.succ_opt() else {
            break;
        };
        current = next;
    }
    Ok(instances)
}

fn expand_flexible(spec: &FlexibleSpec, max: usize) -> Result<Vec<LessonInstance>> {
    for week in &spec.weeks {
        for day in &week.days {
            validate_weekday(day.weekday)?;
            if day.end_time <= day.start_time {
                let anchor = week.week_start;
                return Err(Error::InvalidInterval {
                    start: anchor.and_time(day.start_time).and_utc(),
                    end: anchor.and_time(day.end_time).and_utc(),
                });
            }
        }
    }

    let mut instances = Vec::new();
    for week in &spec.weeks {
        let mut current = week.week_start;
        while current <= week.week_end {
            let weekday = current.weekday().num_days_from_sunday();
            for day in &week.days {
                if day.weekday == weekday {
                    push_bounded(
                        &mut instances,
                        LessonInstance {
                            date: current,
                            start: current.and_time(day.start_time).and_utc(),
                            end: current.and_time(day.end_time).and_utc(),
                            cost: day.cost,
                            location: day.location.clone(),
                        },
                        max,
                    )?;
                }
            }
            let Some(next) = current.succ_opt() else {
                break;
            };
            current = next;
        }
    }
    // Weeks may be listed out of order; output stays chronological.
    instances.sort_by_key(|i| i.start);
    Ok(instances)
}
