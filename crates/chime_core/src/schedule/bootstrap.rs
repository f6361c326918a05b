//! Startup reconciliation of persisted alarms into the queue.
//!
//! # Responsibility
//! - Rebuild the in-memory schedule from durable records at process start.
//!
//! # Invariants
//! - Expired one-shot alarms never enter the queue; their rows are left in
//!   storage for history.
//! - Recurring alarms always enter the queue with a future due time.

use log::{info, warn};

use crate::clock::Clock;
use crate::repo::alarm_repo::{AlarmRepository, RepoResult};
use crate::schedule::queue::AlarmQueue;
use crate::schedule::recurrence::next_occurrence;

/// Counters describing one bootstrap pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadStats {
    /// Alarms inserted into the queue.
    pub loaded: usize,
    /// Expired one-shot alarms left in storage but not scheduled.
    pub expired: usize,
}

/// Loads persisted alarms into the queue.
///
/// One-shot alarms whose due time has passed are dropped. Recurring alarms
/// are fast-forwarded to their next future occurrence in memory only; the
/// durable due time catches up when they next fire.
///
/// # Errors
/// A persistence read failure is returned unchanged; callers treat it as
/// fatal at startup.
pub fn load_alarms<R: AlarmRepository>(
    repo: &R,
    queue: &AlarmQueue,
    clock: &dyn Clock,
) -> RepoResult<LoadStats> {
    let now = clock.now();
    let mut stats = LoadStats::default();

    for mut alarm in repo.load_alarms()? {
        if alarm.recurrence.is_recurring() {
            alarm.due_at = next_occurrence(alarm.due_at, alarm.recurrence, now);
        } else if alarm.due_at <= now {
            warn!(
                "event=alarms_loaded module=schedule status=skip id={} reason=expired",
                alarm.id
            );
            stats.expired += 1;
            continue;
        }

        queue.insert(alarm);
        stats.loaded += 1;
    }

    info!(
        "event=alarms_loaded module=schedule status=ok loaded={} expired={}",
        stats.loaded, stats.expired
    );
    Ok(stats)
}
