//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate persistence and the scheduling queue into the two
//!   caller-facing operations: submit and list.
//! - Keep request-facing layers decoupled from storage details.

pub mod alarm_service;
