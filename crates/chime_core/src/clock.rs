//! Wall-clock time source and the fixed datetime wire format.
//!
//! # Responsibility
//! - Parse and format alarm times in the single supported format.
//! - Provide the `Clock` capability the scheduling code reads time through.
//! - Convert a wall-clock gap into a bounded monotonic sleep duration.
//!
//! # Invariants
//! - All alarm times are naive local time at minute precision; no timezone
//!   offsets anywhere in the system.
//! - `duration_until` never returns a negative-equivalent value; past due
//!   times map to a zero wait.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

use chrono::{Local, NaiveDateTime};

/// The only accepted time format: `YYYY-MM-DD HH:MM`, local time.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Rejection of a malformed datetime string at the submit boundary.
#[derive(Debug)]
pub struct DateTimeParseError {
    input: String,
    source: chrono::ParseError,
}

impl DateTimeParseError {
    /// The rejected input, for caller-side diagnostics.
    pub fn input(&self) -> &str {
        &self.input
    }
}

impl Display for DateTimeParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid datetime `{}`; expected `YYYY-MM-DD HH:MM`",
            self.input
        )
    }
}

impl Error for DateTimeParseError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.source)
    }
}

/// Parses a `YYYY-MM-DD HH:MM` string into a naive local time.
pub fn parse_datetime(input: &str) -> Result<NaiveDateTime, DateTimeParseError> {
    NaiveDateTime::parse_from_str(input.trim(), DATETIME_FORMAT).map_err(|source| {
        DateTimeParseError {
            input: input.to_string(),
            source,
        }
    })
}

/// Formats a naive local time back into the wire/storage format.
pub fn format_datetime(value: NaiveDateTime) -> String {
    value.format(DATETIME_FORMAT).to_string()
}

/// Monotonic sleep budget from `now` until `due_at`; zero when already due.
pub fn duration_until(now: NaiveDateTime, due_at: NaiveDateTime) -> Duration {
    due_at
        .signed_duration_since(now)
        .to_std()
        .unwrap_or(Duration::ZERO)
}

/// Wall-clock capability consumed by scheduling code.
///
/// Keeping the clock behind a trait lets tests substitute a fixed instant
/// and drive recurrence/bootstrap decisions deterministically.
pub trait Clock: Send + Sync {
    /// Current local time without offset information.
    fn now(&self) -> NaiveDateTime;
}

/// Production clock backed by the system's local time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Deterministic clock that always reports the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::{duration_until, format_datetime, parse_datetime, Clock, FixedClock};
    use std::time::Duration;

    #[test]
    fn parse_and_format_roundtrip() {
        let parsed = parse_datetime("2024-12-31 23:59").unwrap();
        assert_eq!(format_datetime(parsed), "2024-12-31 23:59");
    }

    #[test]
    fn parse_trims_surrounding_whitespace() {
        let parsed = parse_datetime("  2024-01-02 03:04 ").unwrap();
        assert_eq!(format_datetime(parsed), "2024-01-02 03:04");
    }

    #[test]
    fn parse_rejects_malformed_input() {
        for input in ["", "tomorrow", "2024-13-01 10:00", "2024-01-01T10:00"] {
            let err = parse_datetime(input).unwrap_err();
            assert_eq!(err.input(), input);
        }
    }

    #[test]
    fn duration_until_is_zero_for_past_due_times() {
        let now = parse_datetime("2024-06-01 12:00").unwrap();
        let past = parse_datetime("2024-06-01 11:00").unwrap();
        assert_eq!(duration_until(now, past), Duration::ZERO);
    }

    #[test]
    fn duration_until_measures_forward_gap() {
        let now = parse_datetime("2024-06-01 12:00").unwrap();
        let due = parse_datetime("2024-06-01 12:05").unwrap();
        assert_eq!(duration_until(now, due), Duration::from_secs(300));
    }

    #[test]
    fn fixed_clock_reports_its_instant() {
        let instant = parse_datetime("2030-01-01 00:00").unwrap();
        assert_eq!(FixedClock(instant).now(), instant);
    }
}
