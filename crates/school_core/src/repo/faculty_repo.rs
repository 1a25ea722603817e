//! Faculty repository contracts and SQLite implementation.
//!
//! Faculties only exist here so students have something to reference. The
//! student service never writes them.

use crate::model::faculty::{validate_faculty_name, Faculty, FacultyId};
use crate::repo::schema::ensure_table_ready;
use crate::repo::student_repo::{RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row};

const FACULTY_REQUIRED_COLUMNS: &[&str] = &["id", "name", "color"];

/// Record store contract for faculties.
pub trait FacultyRepository {
    fn create_faculty(&self, name: &str, color: &str) -> RepoResult<Faculty>;
    fn get_faculty(&self, id: FacultyId) -> RepoResult<Option<Faculty>>;
    /// All faculties ordered by id.
    fn list_faculties(&self) -> RepoResult<Vec<Faculty>>;
}

/// SQLite-backed faculty repository.
pub struct SqliteFacultyRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteFacultyRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_table_ready(conn, "faculties", FACULTY_REQUIRED_COLUMNS)?;
        Ok(Self { conn })
    }
}

impl FacultyRepository for SqliteFacultyRepository<'_> {
    fn create_faculty(&self, name: &str, color: &str) -> RepoResult<Faculty> {
        validate_faculty_name(name)?;

        self.conn.execute(
            "INSERT INTO faculties (name, color) VALUES (?1, ?2);",
            params![name, color],
        )?;
        let id = self.conn.last_insert_rowid();

        self.get_faculty(id)?.ok_or_else(|| {
            RepoError::InvalidData(format!("faculty {id} missing right after insert"))
        })
    }

    fn get_faculty(&self, id: FacultyId) -> RepoResult<Option<Faculty>> {
        let faculty = self
            .conn
            .query_row(
                "SELECT id, name, color FROM faculties WHERE id = ?1;",
                [id],
                parse_faculty_row,
            )
            .optional()?;
        Ok(faculty)
    }

    fn list_faculties(&self) -> RepoResult<Vec<Faculty>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, color FROM faculties ORDER BY id ASC;")?;
        let faculties = stmt
            .query_map([], parse_faculty_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(faculties)
    }
}

fn parse_faculty_row(row: &Row<'_>) -> rusqlite::Result<Faculty> {
    Ok(Faculty {
        id: row.get("id")?,
        name: row.get("name")?,
        color: row.get("color")?,
    })
}
