//! Student repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide the record store operations the student service delegates to.
//! - Resolve the faculty relation on every read.
//!
//! # Invariants
//! - Write paths call `Student::validate()` before SQL mutations.
//! - Read paths reject invalid persisted state instead of masking it.
//! - `delete_by_id` is idempotent.
//! - Store order is ascending id; recency order is descending id.

use crate::db::DbError;
use crate::model::faculty::{Faculty, FacultyValidationError};
use crate::model::student::{Student, StudentId, StudentValidationError};
use crate::repo::schema::ensure_table_ready;
use rusqlite::{params, Connection, OptionalExtension, Params, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const STUDENT_SELECT_SQL: &str = "SELECT
    s.id AS id,
    s.name AS name,
    s.age AS age,
    f.id AS faculty_id,
    f.name AS faculty_name,
    f.color AS faculty_color
FROM students s
LEFT JOIN faculties f ON f.id = s.faculty_id";

const STUDENT_REQUIRED_COLUMNS: &[&str] = &["id", "name", "age", "faculty_id"];

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for record store operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(String),
    Db(DbError),
    NotFound(i64),
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(message) => write!(f, "{message}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "record not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}; open it through db::open_db"
            ),
            Self::MissingRequiredTable(table) => write!(f, "required table `{table}` is missing"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column `{table}.{column}` is missing")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StudentValidationError> for RepoError {
    fn from(value: StudentValidationError) -> Self {
        Self::Validation(value.to_string())
    }
}

impl From<FacultyValidationError> for RepoError {
    fn from(value: FacultyValidationError) -> Self {
        Self::Validation(value.to_string())
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Zero-based page selector for recency queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
}

impl PageRequest {
    pub fn of(page: u32, size: u32) -> Self {
        Self { page, size }
    }

    /// Number of rows skipped before this page starts.
    pub fn offset(&self) -> i64 {
        i64::from(self.page) * i64::from(self.size)
    }
}

/// Record store contract for students.
pub trait StudentRepository {
    /// Inserts when `student.id` is `None`, otherwise overwrites that row.
    ///
    /// Returns the stored record as read back, with its faculty resolved.
    fn save(&self, student: &Student) -> RepoResult<Student>;
    fn find_by_id(&self, id: StudentId) -> RepoResult<Option<Student>>;
    fn find_all(&self) -> RepoResult<Vec<Student>>;
    fn exists_by_id(&self, id: StudentId) -> RepoResult<bool>;
    /// Removes the row if present. Missing ids are not an error.
    fn delete_by_id(&self, id: StudentId) -> RepoResult<()>;
    /// Inclusive range. `min > max` yields an empty list.
    fn find_by_age_between(&self, min: u32, max: u32) -> RepoResult<Vec<Student>>;
    fn count_all_students(&self) -> RepoResult<u64>;
    /// Mean age computed by the store, `0.0` when there are no students.
    fn average_student_age(&self) -> RepoResult<f64>;
    /// Newest students first.
    fn find_last_students(&self, page: PageRequest) -> RepoResult<Vec<Student>>;
}

/// SQLite-backed student repository.
pub struct SqliteStudentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteStudentRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_table_ready(conn, "students", STUDENT_REQUIRED_COLUMNS)?;
        Ok(Self { conn })
    }

    fn insert(&self, student: &Student) -> RepoResult<StudentId> {
        self.conn.execute(
            "INSERT INTO students (name, age, faculty_id) VALUES (?1, ?2, ?3);",
            params![
                student.name.as_str(),
                i64::from(student.age),
                faculty_id_of(student),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn update(&self, id: StudentId, student: &Student) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE students
             SET
                name = ?1,
                age = ?2,
                faculty_id = ?3,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?4;",
            params![
                student.name.as_str(),
                i64::from(student.age),
                faculty_id_of(student),
                id,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    fn query_students<P: Params>(&self, clause: &str, params: P) -> RepoResult<Vec<Student>> {
        let mut stmt = self.conn.prepare(&format!("{STUDENT_SELECT_SQL} {clause}"))?;
        let mut rows = stmt.query(params)?;
        let mut students = Vec::new();

        while let Some(row) = rows.next()? {
            students.push(parse_student_row(row)?);
        }

        Ok(students)
    }
}

impl StudentRepository for SqliteStudentRepository<'_> {
    fn save(&self, student: &Student) -> RepoResult<Student> {
        student.validate()?;

        let id = match student.id {
            Some(id) => {
                self.update(id, student)?;
                id
            }
            None => self.insert(student)?,
        };

        self.find_by_id(id)?.ok_or_else(|| {
            RepoError::InvalidData(format!("student {id} missing right after save"))
        })
    }

    fn find_by_id(&self, id: StudentId) -> RepoResult<Option<Student>> {
        let mut found = self.query_students("WHERE s.id = ?1;", [id])?;
        Ok(found.pop())
    }

    fn find_all(&self) -> RepoResult<Vec<Student>> {
        self.query_students("ORDER BY s.id ASC;", [])
    }

    fn exists_by_id(&self, id: StudentId) -> RepoResult<bool> {
        let exists = self
            .conn
            .query_row("SELECT 1 FROM students WHERE id = ?1;", [id], |row| {
                row.get::<_, i64>(0)
            })
            .optional()?;
        Ok(exists.is_some())
    }

    fn delete_by_id(&self, id: StudentId) -> RepoResult<()> {
        self.conn
            .execute("DELETE FROM students WHERE id = ?1;", [id])?;
        Ok(())
    }

    fn find_by_age_between(&self, min: u32, max: u32) -> RepoResult<Vec<Student>> {
        self.query_students(
            "WHERE s.age BETWEEN ?1 AND ?2 ORDER BY s.id ASC;",
            params![i64::from(min), i64::from(max)],
        )
    }

    fn count_all_students(&self) -> RepoResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM students;", [], |row| row.get(0))?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative student count `{count}`")))
    }

    fn average_student_age(&self) -> RepoResult<f64> {
        let average: f64 = self.conn.query_row(
            "SELECT COALESCE(AVG(age), 0.0) FROM students;",
            [],
            |row| row.get(0),
        )?;
        Ok(average)
    }

    fn find_last_students(&self, page: PageRequest) -> RepoResult<Vec<Student>> {
        self.query_students(
            "ORDER BY s.id DESC LIMIT ?1 OFFSET ?2;",
            params![i64::from(page.size), page.offset()],
        )
    }
}

fn faculty_id_of(student: &Student) -> Option<i64> {
    student.faculty.as_ref().map(|faculty| faculty.id)
}

fn parse_student_row(row: &Row<'_>) -> RepoResult<Student> {
    let id: StudentId = row.get("id")?;

    let raw_age: i64 = row.get("age")?;
    let age = u32::try_from(raw_age).map_err(|_| {
        RepoError::InvalidData(format!("invalid age `{raw_age}` in students.age for id {id}"))
    })?;

    let faculty = match row.get::<_, Option<i64>>("faculty_id")? {
        Some(faculty_id) => Some(Faculty {
            id: faculty_id,
            name: row.get("faculty_name")?,
            color: row.get("faculty_color")?,
        }),
        None => None,
    };

    let student = Student {
        id: Some(id),
        name: row.get("name")?,
        age,
        faculty,
    };
    student.validate()?;
    Ok(student)
}
