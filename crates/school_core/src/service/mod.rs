//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate record store calls into use-case level APIs.
//! - Keep the CLI decoupled from storage details.

pub mod group_print;
pub mod student_service;
