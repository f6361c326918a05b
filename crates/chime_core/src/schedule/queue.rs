//! Time-ordered pending-alarm queue with a condvar wake channel.
//!
//! # Responsibility
//! - Hold pending alarms ordered by due time with deterministic ties.
//! - Provide the blocking wait primitive the scheduler worker parks on.
//!
//! # Invariants
//! - The internal mutex is held only for O(log n) heap operations; it is
//!   never held across persistence I/O or the notification callback.
//! - Every insert and every stop request signals the condvar.
//! - `snapshot` copies; it never drains or reorders the live queue.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use parking_lot::{Condvar, Mutex};

use crate::clock::{self, Clock};
use crate::model::alarm::Alarm;

/// Heap entry ordered earliest-first.
///
/// `BinaryHeap` is a max-heap, so comparisons are reversed; equal due times
/// fall back to the alarm id to keep ordering deterministic.
#[derive(Debug, Clone)]
struct QueuedAlarm(Alarm);

impl PartialEq for QueuedAlarm {
    fn eq(&self, other: &Self) -> bool {
        self.0.due_at == other.0.due_at && self.0.id == other.0.id
    }
}

impl Eq for QueuedAlarm {}

impl PartialOrd for QueuedAlarm {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueuedAlarm {
    fn cmp(&self, other: &Self) -> Ordering {
        match other.0.due_at.cmp(&self.0.due_at) {
            Ordering::Equal => other.0.id.cmp(&self.0.id),
            ordering => ordering,
        }
    }
}

struct QueueState {
    heap: BinaryHeap<QueuedAlarm>,
    stopping: bool,
}

/// Outcome of a blocking wait on the queue.
pub(crate) enum QueueWait {
    /// The earliest alarm became due and was popped for processing.
    Due(Alarm),
    /// A stop request was observed.
    Stopped,
}

/// Concurrent pending-alarm store shared by submitters and the scheduler.
pub struct AlarmQueue {
    state: Mutex<QueueState>,
    wake: Condvar,
}

impl AlarmQueue {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(QueueState {
                heap: BinaryHeap::new(),
                stopping: false,
            }),
            wake: Condvar::new(),
        }
    }

    /// Inserts a pending alarm and wakes the scheduler to re-evaluate its
    /// earliest deadline.
    pub fn insert(&self, alarm: Alarm) {
        let mut state = self.state.lock();
        state.heap.push(QueuedAlarm(alarm));
        drop(state);
        self.wake.notify_all();
    }

    /// Copy of the earliest pending alarm, without removing it.
    pub fn peek_earliest(&self) -> Option<Alarm> {
        self.state.lock().heap.peek().map(|entry| entry.0.clone())
    }

    /// Removes and returns the earliest pending alarm.
    pub fn pop_earliest(&self) -> Option<Alarm> {
        self.state.lock().heap.pop().map(|entry| entry.0)
    }

    /// Copy of all pending alarms in ascending `(due_at, id)` order.
    pub fn snapshot(&self) -> Vec<Alarm> {
        let state = self.state.lock();
        let mut alarms: Vec<Alarm> = state.heap.iter().map(|entry| entry.0.clone()).collect();
        drop(state);

        alarms.sort_by(|a, b| a.due_at.cmp(&b.due_at).then(a.id.cmp(&b.id)));
        alarms
    }

    pub fn len(&self) -> usize {
        self.state.lock().heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Blocks until the earliest alarm is due or a stop request arrives.
    ///
    /// With an empty queue the wait is indefinite; otherwise it sleeps
    /// until the earliest deadline. Every wake re-evaluates from scratch,
    /// so an insert of an earlier alarm shortens the current wait and a
    /// deadline that passed while waking is picked up immediately.
    pub(crate) fn wait_for_due(&self, clock: &dyn Clock) -> QueueWait {
        let mut state = self.state.lock();
        loop {
            if state.stopping {
                return QueueWait::Stopped;
            }

            let Some(due_at) = state.heap.peek().map(|entry| entry.0.due_at) else {
                self.wake.wait(&mut state);
                continue;
            };

            let now = clock.now();
            if due_at <= now {
                if let Some(entry) = state.heap.pop() {
                    return QueueWait::Due(entry.0);
                }
                continue;
            }

            self.wake
                .wait_for(&mut state, clock::duration_until(now, due_at));
        }
    }

    /// Requests cooperative shutdown and wakes any waiter immediately.
    pub(crate) fn request_stop(&self) {
        let mut state = self.state.lock();
        state.stopping = true;
        drop(state);
        self.wake.notify_all();
    }
}

impl Default for AlarmQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::AlarmQueue;
    use crate::clock::parse_datetime;
    use crate::model::alarm::{Alarm, Recurrence};

    fn alarm(id: i64, due: &str) -> Alarm {
        Alarm::new(id, format!("alarm-{id}"), parse_datetime(due).unwrap(), Recurrence::None)
    }

    #[test]
    fn pop_returns_alarms_in_due_order_regardless_of_insert_order() {
        let queue = AlarmQueue::new();
        queue.insert(alarm(1, "2024-06-03 09:00"));
        queue.insert(alarm(2, "2024-06-01 09:00"));
        queue.insert(alarm(3, "2024-06-02 09:00"));

        let order: Vec<i64> = std::iter::from_fn(|| queue.pop_earliest())
            .map(|alarm| alarm.id)
            .collect();
        assert_eq!(order, vec![2, 3, 1]);
    }

    #[test]
    fn equal_due_times_break_ties_by_id() {
        let queue = AlarmQueue::new();
        queue.insert(alarm(7, "2024-06-01 09:00"));
        queue.insert(alarm(3, "2024-06-01 09:00"));
        queue.insert(alarm(5, "2024-06-01 09:00"));

        let order: Vec<i64> = std::iter::from_fn(|| queue.pop_earliest())
            .map(|alarm| alarm.id)
            .collect();
        assert_eq!(order, vec![3, 5, 7]);
    }

    #[test]
    fn snapshot_is_sorted_and_leaves_the_queue_intact() {
        let queue = AlarmQueue::new();
        queue.insert(alarm(2, "2024-06-02 09:00"));
        queue.insert(alarm(1, "2024-06-01 09:00"));

        let snapshot = queue.snapshot();
        assert_eq!(
            snapshot.iter().map(|alarm| alarm.id).collect::<Vec<_>>(),
            vec![1, 2]
        );
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.snapshot(), snapshot);
    }

    #[test]
    fn peek_does_not_remove() {
        let queue = AlarmQueue::new();
        assert!(queue.peek_earliest().is_none());

        queue.insert(alarm(1, "2024-06-01 09:00"));
        assert_eq!(queue.peek_earliest().map(|alarm| alarm.id), Some(1));
        assert_eq!(queue.len(), 1);
    }
}
