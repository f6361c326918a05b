//! Domain model for scheduled alarms.
//!
//! # Responsibility
//! - Define the canonical alarm record and the recurrence taxonomy.
//!
//! # Invariants
//! - Every alarm is identified by a persistence-assigned integer id.
//! - Recurrence kinds are a closed set; storage mappings are total.

pub mod alarm;
