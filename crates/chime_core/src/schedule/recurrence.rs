//! Next-occurrence computation for recurring alarms.
//!
//! # Responsibility
//! - Advance a due time past `now` by whole recurrence periods.
//!
//! # Invariants
//! - For recurring kinds the result is strictly after `now`.
//! - Daily/weekly advance by fixed durations; monthly/yearly advance the
//!   calendar and clamp the day to the target month's length.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};

use crate::model::alarm::Recurrence;

/// Computes the next occurrence of `due_at` strictly after `now`.
///
/// The period is applied repeatedly, so an alarm that missed several
/// occurrences (process down, long sleep) skips them all and lands on the
/// next upcoming slot; missed firings are never replayed.
/// `Recurrence::None` returns `due_at` unchanged.
///
/// Day-of-month overflow clamps to the end of the target month: a monthly
/// alarm anchored on Jan 31 fires on Feb 28 (29 in leap years), a yearly
/// alarm anchored on Feb 29 fires on Feb 28 in non-leap years. Advancement
/// is iterative, so a clamped occurrence becomes the anchor for the next
/// one.
pub fn next_occurrence(
    due_at: NaiveDateTime,
    recurrence: Recurrence,
    now: NaiveDateTime,
) -> NaiveDateTime {
    if !recurrence.is_recurring() {
        return due_at;
    }

    let mut next = due_at;
    while next <= now {
        next = advance_one_period(next, recurrence);
    }
    next
}

fn advance_one_period(value: NaiveDateTime, recurrence: Recurrence) -> NaiveDateTime {
    match recurrence {
        Recurrence::None => value,
        Recurrence::Daily => value + Duration::days(1),
        Recurrence::Weekly => value + Duration::weeks(1),
        Recurrence::Monthly => add_months(value, 1),
        Recurrence::Yearly => add_years(value, 1),
    }
}

fn add_months(value: NaiveDateTime, months: u32) -> NaiveDateTime {
    let mut year = value.year();
    let mut month = value.month() + months;
    while month > 12 {
        month -= 12;
        year += 1;
    }

    let day = value.day().min(days_in_month(year, month));
    NaiveDate::from_ymd_opt(year, month, day)
        .map(|date| date.and_time(value.time()))
        .unwrap_or_else(|| value + Duration::days(30))
}

fn add_years(value: NaiveDateTime, years: i32) -> NaiveDateTime {
    let year = value.year() + years;
    let day = value.day().min(days_in_month(year, value.month()));
    NaiveDate::from_ymd_opt(year, value.month(), day)
        .map(|date| date.and_time(value.time()))
        .unwrap_or_else(|| value + Duration::days(365))
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .map_or(28, |last| last.day())
}
