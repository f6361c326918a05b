//! Repository layer contracts and SQLite implementation.
//!
//! # Responsibility
//! - Define the persistence capability the scheduling core depends on.
//! - Isolate SQL and row decoding from scheduling orchestration.
//!
//! # Invariants
//! - Repository APIs return semantic errors (`NotFound`) in addition to DB
//!   transport errors.
//! - Connections are schema-checked at construction, not per call.

pub mod alarm_repo;
