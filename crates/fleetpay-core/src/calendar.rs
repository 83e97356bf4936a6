//! Pure period-boundary arithmetic. No I/O, no clock access: callers supply
//! the reference date and the company's cycle anchor.
//!
//! `previous_period` and `next_period` are date-shifted re-applications of
//! `current_period` (the day before the start, the day after the end), so a
//! gap or overlap between adjacent periods is structurally impossible.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::types::PayFrequency;

// ---------------------------------------------------------------------------
// PeriodBounds / CycleAnchor
// ---------------------------------------------------------------------------

/// Inclusive date range of a single pay period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodBounds {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl PeriodBounds {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Cadence anchor taken from company config. `start_day` is a weekday
/// (1 = Monday .. 7 = Sunday) for weekly/biweekly and a day-of-month for
/// monthly; `origin` pins the biweekly 14-day grid to a fixed date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleAnchor {
    pub start_day: u32,
    pub origin: NaiveDate,
}

// ---------------------------------------------------------------------------
// Boundary computation
// ---------------------------------------------------------------------------

/// The period containing `reference` for the given cadence.
pub fn current_period(
    reference: NaiveDate,
    frequency: PayFrequency,
    anchor: &CycleAnchor,
) -> PeriodBounds {
    match frequency {
        PayFrequency::Weekly => weekly_period(reference, anchor.start_day),
        PayFrequency::Biweekly => biweekly_period(reference, anchor.origin),
        PayFrequency::Monthly => monthly_period(reference, anchor.start_day),
    }
}

/// The period immediately before the one containing `reference`.
pub fn previous_period(
    reference: NaiveDate,
    frequency: PayFrequency,
    anchor: &CycleAnchor,
) -> PeriodBounds {
    let current = current_period(reference, frequency, anchor);
    current_period(current.start - Duration::days(1), frequency, anchor)
}

/// The period immediately after the one containing `reference`.
pub fn next_period(
    reference: NaiveDate,
    frequency: PayFrequency,
    anchor: &CycleAnchor,
) -> PeriodBounds {
    let current = current_period(reference, frequency, anchor);
    current_period(current.end + Duration::days(1), frequency, anchor)
}

fn weekly_period(reference: NaiveDate, start_day: u32) -> PeriodBounds {
    let have = reference.weekday().number_from_monday();
    let back = (have + 7 - start_day) % 7;
    let start = reference - Duration::days(i64::from(back));
    PeriodBounds {
        start,
        end: start + Duration::days(6),
    }
}

fn biweekly_period(reference: NaiveDate, origin: NaiveDate) -> PeriodBounds {
    // div_euclid keeps the grid stable for references before the origin.
    let days = (reference - origin).num_days();
    let index = days.div_euclid(14);
    let start = origin + Duration::days(index * 14);
    PeriodBounds {
        start,
        end: start + Duration::days(13),
    }
}

fn monthly_period(reference: NaiveDate, anchor_day: u32) -> PeriodBounds {
    let candidate = month_anchor(reference.year(), reference.month(), anchor_day);
    let start = if reference >= candidate {
        candidate
    } else {
        let (py, pm) = prev_month(reference.year(), reference.month());
        month_anchor(py, pm, anchor_day)
    };
    let (ny, nm) = next_month(start.year(), start.month());
    PeriodBounds {
        start,
        end: month_anchor(ny, nm, anchor_day) - Duration::days(1),
    }
}

// ---------------------------------------------------------------------------
// Month helpers
// ---------------------------------------------------------------------------

/// The anchor day within (year, month), clamped to the month's length.
fn month_anchor(year: i32, month: u32, day: u32) -> NaiveDate {
    let clamped = day.clamp(1, days_in_month(year, month));
    NaiveDate::from_ymd_opt(year, month, clamped).expect("clamped day is valid for the month")
}

fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        4 | 6 | 9 | 11 => 30,
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        _ => 31,
    }
}

fn is_leap_year(year: i32) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

fn next_month(year: i32, month: u32) -> (i32, u32) {
    if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    }
}

fn prev_month(year: i32, month: u32) -> (i32, u32) {
    if month == 1 {
        (year - 1, 12)
    } else {
        (year, month - 1)
    }
}

// ---------------------------------------------------------------------------
// Display label
// ---------------------------------------------------------------------------

/// Card label for a period: "WK24 - 2024" for weekly spans (ISO week of the
/// start date), "FEB - 2024" for month-length spans, "FEB15 - 2024" for
/// anything in between (biweekly).
pub fn period_label(bounds: &PeriodBounds) -> String {
    let days = (bounds.end - bounds.start).num_days() + 1;
    let start = bounds.start;
    if days <= 10 {
        let iso = start.iso_week();
        return format!("WK{:02} - {}", iso.week(), iso.year());
    }
    let month = start.format("%b").to_string().to_uppercase();
    if (25..=35).contains(&days) {
        format!("{month} - {}", start.year())
    } else {
        format!("{month}{:02} - {}", start.day(), start.year())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
