//! Alarm domain model.
//!
//! # Responsibility
//! - Define the canonical record shared by scheduling and persistence.
//! - Map recurrence kinds to their display annotations.
//!
//! # Invariants
//! - `id` is assigned by the persistence layer at creation and never
//!   changes afterwards.
//! - `due_at` is the only mutable field; the scheduler replaces it each
//!   time a recurring alarm fires.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Stable identifier assigned by the persistence layer (SQLite rowid).
pub type AlarmId = i64;

/// How often an alarm repeats after firing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recurrence {
    /// Fires once, then leaves the schedule permanently.
    None,
    /// Every 24 hours, as a fixed duration.
    Daily,
    /// Every 7 days, as a fixed duration.
    Weekly,
    /// Same day-of-month one calendar month later, clamped to month length.
    Monthly,
    /// Same month and day one calendar year later, clamped for leap days.
    Yearly,
}

impl Recurrence {
    /// Returns whether alarms of this kind are re-enqueued after firing.
    pub fn is_recurring(self) -> bool {
        self != Self::None
    }

    /// Human-facing label used in listing annotations.
    pub fn label(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Daily => "Daily",
            Self::Weekly => "Weekly",
            Self::Monthly => "Monthly",
            Self::Yearly => "Yearly",
        }
    }
}

/// Canonical record for one scheduled alarm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alarm {
    /// Persistence-assigned stable id.
    pub id: AlarmId,
    /// Free-form text emitted with the firing notification.
    pub description: String,
    /// Next due time, naive local time at minute precision.
    pub due_at: NaiveDateTime,
    /// Repeat kind; `Recurrence::None` for one-shot alarms.
    pub recurrence: Recurrence,
}

impl Alarm {
    /// Creates an alarm record from its already-persisted parts.
    pub fn new(
        id: AlarmId,
        description: impl Into<String>,
        due_at: NaiveDateTime,
        recurrence: Recurrence,
    ) -> Self {
        Self {
            id,
            description: description.into(),
            due_at,
            recurrence,
        }
    }

    /// Description annotated with the recurrence kind, e.g. `"Standup (Daily)"`.
    ///
    /// One-shot alarms are returned verbatim.
    pub fn display_description(&self) -> String {
        if self.recurrence.is_recurring() {
            format!("{} ({})", self.description, self.recurrence.label())
        } else {
            self.description.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Alarm, Recurrence};
    use chrono::NaiveDate;

    fn due() -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    #[test]
    fn one_shot_description_is_unannotated() {
        let alarm = Alarm::new(1, "Dentist", due(), Recurrence::None);
        assert_eq!(alarm.display_description(), "Dentist");
    }

    #[test]
    fn recurring_description_carries_kind_label() {
        let alarm = Alarm::new(2, "Standup", due(), Recurrence::Daily);
        assert_eq!(alarm.display_description(), "Standup (Daily)");

        let alarm = Alarm::new(3, "Rent", due(), Recurrence::Monthly);
        assert_eq!(alarm.display_description(), "Rent (Monthly)");
    }

    #[test]
    fn only_none_is_non_recurring() {
        assert!(!Recurrence::None.is_recurring());
        for kind in [
            Recurrence::Daily,
            Recurrence::Weekly,
            Recurrence::Monthly,
            Recurrence::Yearly,
        ] {
            assert!(kind.is_recurring());
        }
    }
}
