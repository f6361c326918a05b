//! Scheduling engine: pending-alarm queue, recurrence math, the background
//! worker, and startup reconciliation.
//!
//! # Responsibility
//! - Own every in-memory scheduling concern between persistence and the
//!   notification sink.
//!
//! # Invariants
//! - The queue is the single shared-mutable-state point; persistence and
//!   notification always happen outside its lock.
//! - Exactly one worker consumes due alarms; callers only insert and read.

pub mod bootstrap;
pub mod queue;
pub mod recurrence;
pub mod worker;
