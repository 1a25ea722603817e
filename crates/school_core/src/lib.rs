//! Core domain logic for school records.
//! This crate is the single source of truth for student invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::faculty::{Faculty, FacultyId, FacultyValidationError};
pub use model::student::{Student, StudentId, StudentValidationError};
pub use repo::faculty_repo::{FacultyRepository, SqliteFacultyRepository};
pub use repo::student_repo::{
    PageRequest, RepoError, RepoResult, SqliteStudentRepository, StudentRepository,
};
pub use service::group_print::{
    GroupPrintHandle, GroupPrintStatus, LineSink, StdoutSink, WorkerGroup,
    GROUP_PRINT_MIN_STUDENTS,
};
pub use service::student_service::{
    StudentService, StudentServiceError, LAST_STUDENTS_PAGE_SIZE, NAME_FILTER_LETTER,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
