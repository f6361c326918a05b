//! Background scheduler worker.
//!
//! # Responsibility
//! - Run the single firing loop: wait for the earliest deadline, emit the
//!   notification, advance and re-persist recurring alarms.
//! - Expose an explicit start/stop lifecycle with a blocking join.
//!
//! # Invariants
//! - Exactly one worker thread per handle; constructing a queue or service
//!   never launches one implicitly.
//! - The loop exits only on a stop request; firing failures and panics are
//!   logged per iteration and the loop keeps running.
//! - A failed re-persist drops that occurrence instead of crashing.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use log::{error, info, warn};

use crate::clock::{self, Clock};
use crate::model::alarm::Alarm;
use crate::repo::alarm_repo::AlarmRepository;
use crate::schedule::queue::{AlarmQueue, QueueWait};
use crate::schedule::recurrence::next_occurrence;

/// Notification sink invoked from the scheduler thread when an alarm fires.
///
/// Implementations must not block: a slow sink delays every alarm behind
/// the one being delivered.
pub trait AlarmNotifier: Send {
    fn on_fire(&self, alarm: &Alarm);
}

/// Default notifier: one structured log line per firing.
pub struct LogNotifier;

impl AlarmNotifier for LogNotifier {
    fn on_fire(&self, alarm: &Alarm) {
        info!(
            "event=alarm_fired module=schedule status=ok id={} description={}",
            alarm.id, alarm.description
        );
    }
}

/// Running scheduler worker.
///
/// Stop with [`SchedulerHandle::stop`]; dropping an un-stopped handle also
/// requests shutdown and joins, so a worker never outlives its owner.
pub struct SchedulerHandle {
    queue: Arc<AlarmQueue>,
    thread: Option<JoinHandle<()>>,
}

impl SchedulerHandle {
    /// Requests shutdown and blocks until the worker thread exits.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if let Some(thread) = self.thread.take() {
            self.queue.request_stop();
            if thread.join().is_err() {
                error!(
                    "event=scheduler_stop module=schedule status=error error_code=worker_panicked"
                );
            }
        }
    }
}

impl Drop for SchedulerHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Starts the scheduler worker thread over the given collaborators.
///
/// # Errors
/// Returns the OS error when the thread cannot be spawned.
pub fn start<R, N, C>(
    queue: Arc<AlarmQueue>,
    repo: R,
    notifier: N,
    clock: C,
) -> std::io::Result<SchedulerHandle>
where
    R: AlarmRepository + Send + 'static,
    N: AlarmNotifier + 'static,
    C: Clock + 'static,
{
    let worker_queue = Arc::clone(&queue);
    let thread = thread::Builder::new()
        .name("chime-scheduler".to_string())
        .spawn(move || run_loop(&worker_queue, &repo, &notifier, &clock))?;

    Ok(SchedulerHandle {
        queue,
        thread: Some(thread),
    })
}

fn run_loop<R: AlarmRepository>(
    queue: &AlarmQueue,
    repo: &R,
    notifier: &dyn AlarmNotifier,
    clock: &dyn Clock,
) {
    info!("event=scheduler_start module=schedule status=ok");

    loop {
        match queue.wait_for_due(clock) {
            QueueWait::Stopped => break,
            QueueWait::Due(alarm) => {
                let id = alarm.id;
                let fired = panic::catch_unwind(AssertUnwindSafe(|| {
                    fire_alarm(queue, repo, notifier, clock, alarm);
                }));
                if fired.is_err() {
                    error!(
                        "event=alarm_fired module=schedule status=error id={id} error_code=notifier_panicked"
                    );
                }
            }
        }
    }

    info!("event=scheduler_stop module=schedule status=ok");
}

fn fire_alarm<R: AlarmRepository>(
    queue: &AlarmQueue,
    repo: &R,
    notifier: &dyn AlarmNotifier,
    clock: &dyn Clock,
    mut alarm: Alarm,
) {
    notifier.on_fire(&alarm);

    if !alarm.recurrence.is_recurring() {
        return;
    }

    let next = next_occurrence(alarm.due_at, alarm.recurrence, clock.now());
    match repo.update_due_at(alarm.id, next) {
        Ok(()) => {
            info!(
                "event=alarm_rescheduled module=schedule status=ok id={} next_due_at={}",
                alarm.id,
                clock::format_datetime(next)
            );
            alarm.due_at = next;
            queue.insert(alarm);
        }
        Err(err) => {
            // The durable row keeps its previous due time and is reconciled
            // at the next load; this occurrence is lost for the cycle.
            warn!(
                "event=alarm_rescheduled module=schedule status=error id={} error_code=persist_failed error={}",
                alarm.id, err
            );
        }
    }
}
