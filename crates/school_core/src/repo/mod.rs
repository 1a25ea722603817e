//! Record store contracts and SQLite implementations.
//!
//! # Responsibility
//! - Define the data access contracts the student service depends on.
//! - Keep SQL details out of the service layer.
//!
//! # Invariants
//! - Writes validate records before touching SQLite.
//! - Repository APIs surface semantic `NotFound` errors alongside transport
//!   errors.

pub mod faculty_repo;
pub mod schema;
pub mod student_repo;
