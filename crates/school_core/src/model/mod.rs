//! Domain model for school records.
//!
//! # Responsibility
//! - Define the canonical `Student` and `Faculty` records used by the service.
//! - Own the write-time validation rules the record store enforces.
//!
//! # Invariants
//! - Identifiers are assigned by the store and never reassigned.
//! - A student references at most one faculty and never owns it.

pub mod faculty;
pub mod student;
