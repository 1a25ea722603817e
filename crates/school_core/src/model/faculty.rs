//! Faculty domain model.
//!
//! Faculties are owned by the record store. The student service only reads
//! them through a student's relation.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Store-assigned faculty identifier.
pub type FacultyId = i64;

/// A faculty a student may belong to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Faculty {
    pub id: FacultyId,
    pub name: String,
    pub color: String,
}

/// Validation failures for faculty writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FacultyValidationError {
    BlankName,
}

impl Display for FacultyValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankName => write!(f, "faculty name must not be blank"),
        }
    }
}

impl Error for FacultyValidationError {}

/// Checks a faculty name before it is written.
pub fn validate_faculty_name(name: &str) -> Result<(), FacultyValidationError> {
    if name.trim().is_empty() {
        return Err(FacultyValidationError::BlankName);
    }
    Ok(())
}
