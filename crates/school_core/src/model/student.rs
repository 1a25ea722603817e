//! Student domain model.
//!
//! # Responsibility
//! - Define the record managed by the student service.
//! - Validate write-time invariants before the store persists a student.
//!
//! # Invariants
//! - `id` is `None` until the store assigns one on first save.
//! - `id` is never changed once assigned.
//! - `name` is never blank.

use crate::model::faculty::Faculty;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Store-assigned student identifier.
pub type StudentId = i64;

/// A student record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    /// Absent until the record has been persisted.
    pub id: Option<StudentId>,
    pub name: String,
    pub age: u32,
    /// Resolved by the store on read; only `faculty.id` is written back.
    pub faculty: Option<Faculty>,
}

/// Validation failures for student writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StudentValidationError {
    BlankName,
    NonPositiveId(StudentId),
}

impl Display for StudentValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankName => write!(f, "student name must not be blank"),
            Self::NonPositiveId(id) => write!(f, "student id must be positive, got {id}"),
        }
    }
}

impl Error for StudentValidationError {}

impl Student {
    /// Creates an unsaved student without a faculty.
    pub fn new(name: impl Into<String>, age: u32) -> Self {
        Self {
            id: None,
            name: name.into(),
            age,
            faculty: None,
        }
    }

    /// Returns the same student attached to `faculty`.
    pub fn with_faculty(mut self, faculty: Faculty) -> Self {
        self.faculty = Some(faculty);
        self
    }

    /// Returns whether the store has assigned an identifier yet.
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// Validates store-enforced invariants.
    pub fn validate(&self) -> Result<(), StudentValidationError> {
        if self.name.trim().is_empty() {
            return Err(StudentValidationError::BlankName);
        }
        if let Some(id) = self.id {
            if id <= 0 {
                return Err(StudentValidationError::NonPositiveId(id));
            }
        }
        Ok(())
    }
}
