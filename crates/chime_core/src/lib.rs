//! Core scheduling engine for Chime alarms.
//! This crate is the single source of truth for scheduling invariants.

pub mod clock;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod schedule;
pub mod service;

pub use clock::{
    format_datetime, parse_datetime, Clock, DateTimeParseError, FixedClock, SystemClock,
    DATETIME_FORMAT,
};
pub use logging::{default_log_level, init_logging};
pub use model::alarm::{Alarm, AlarmId, Recurrence};
pub use repo::alarm_repo::{AlarmRepository, RepoError, RepoResult, SqliteAlarmRepository};
pub use schedule::bootstrap::{load_alarms, LoadStats};
pub use schedule::queue::AlarmQueue;
pub use schedule::worker::{
    start as start_scheduler, AlarmNotifier, LogNotifier, SchedulerHandle,
};
pub use service::alarm_service::{AlarmListEntry, AlarmService, SubmitError, SubmitResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
