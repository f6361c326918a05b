//! Alarm submit/list use-case service.
//!
//! # Responsibility
//! - Validate and persist new alarms, then hand them to the scheduler queue.
//! - Produce display-ready listings of pending alarms.
//!
//! # Invariants
//! - A failed persistence write inserts nothing into the queue; the queue
//!   and the durable records never diverge on a failed submit.
//! - `list` is read-only and idempotent between mutations.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

use log::info;
use serde::Serialize;

use crate::clock::{self, DateTimeParseError};
use crate::model::alarm::{Alarm, AlarmId, Recurrence};
use crate::repo::alarm_repo::{AlarmRepository, RepoError};
use crate::schedule::queue::AlarmQueue;

pub type SubmitResult<T> = Result<T, SubmitError>;

/// Submit failure taxonomy: invalid caller input versus storage trouble.
#[derive(Debug)]
pub enum SubmitError {
    InvalidDueAt(DateTimeParseError),
    Persistence(RepoError),
}

impl Display for SubmitError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidDueAt(err) => write!(f, "{err}"),
            Self::Persistence(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SubmitError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidDueAt(err) => Some(err),
            Self::Persistence(err) => Some(err),
        }
    }
}

impl From<DateTimeParseError> for SubmitError {
    fn from(value: DateTimeParseError) -> Self {
        Self::InvalidDueAt(value)
    }
}

impl From<RepoError> for SubmitError {
    fn from(value: RepoError) -> Self {
        Self::Persistence(value)
    }
}

/// One row of a pending-alarm listing, ready for display or JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlarmListEntry {
    /// Description, annotated with the recurrence kind when recurring.
    pub description: String,
    /// Due time in `YYYY-MM-DD HH:MM` form.
    pub due_at: String,
}

/// Use-case service combining the persistence collaborator and the queue.
pub struct AlarmService<R: AlarmRepository> {
    repo: R,
    queue: Arc<AlarmQueue>,
}

impl<R: AlarmRepository> AlarmService<R> {
    pub fn new(repo: R, queue: Arc<AlarmQueue>) -> Self {
        Self { repo, queue }
    }

    /// Parses, persists, and enqueues a new alarm, waking the scheduler.
    ///
    /// # Contract
    /// - `due_at_str` must match `YYYY-MM-DD HH:MM` (local time).
    /// - Returns the persistence-assigned alarm id.
    ///
    /// # Errors
    /// - [`SubmitError::InvalidDueAt`] when the time string does not parse;
    ///   nothing is persisted or enqueued.
    /// - [`SubmitError::Persistence`] when the durable write fails; nothing
    ///   is enqueued.
    pub fn submit(
        &self,
        description: &str,
        due_at_str: &str,
        recurrence: Recurrence,
    ) -> SubmitResult<AlarmId> {
        let due_at = clock::parse_datetime(due_at_str)?;
        let id = self.repo.create_alarm(description, due_at, recurrence)?;
        self.queue
            .insert(Alarm::new(id, description, due_at, recurrence));

        info!(
            "event=alarm_submitted module=service status=ok id={} due_at={}",
            id,
            clock::format_datetime(due_at)
        );
        Ok(id)
    }

    /// Lists pending alarms ascending by due time.
    pub fn list(&self) -> Vec<AlarmListEntry> {
        self.queue
            .snapshot()
            .into_iter()
            .map(|alarm| AlarmListEntry {
                description: alarm.display_description(),
                due_at: clock::format_datetime(alarm.due_at),
            })
            .collect()
    }
}
