//! Student use-case service.
//!
//! # Responsibility
//! - Provide CRUD, aggregate and group-print entry points over students.
//! - Translate a missing student into a typed not-found error.
//! - Delegate persistence to a `StudentRepository` implementation.
//!
//! # Invariants
//! - `find_student` and `find_faculty_of_student` fail with `StudentNotFound`
//!   for unknown ids.
//! - `edit_student` on an unknown id is a logged no-op returning `None`.
//! - `delete_student` never fails for unknown ids.
//! - Group-print workers never touch the repository.

use crate::model::faculty::Faculty;
use crate::model::student::{Student, StudentId};
use crate::repo::student_repo::{PageRequest, RepoError, RepoResult, StudentRepository};
use crate::service::group_print::{
    GroupPrintHandle, GroupPrintStatus, GroupPrinter, LineSink, StdoutSink,
};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// First letter used by `student_names_starting_with_a` (Cyrillic `А`).
pub const NAME_FILTER_LETTER: char = '\u{0410}';
/// Page size for `last_five_students`.
pub const LAST_STUDENTS_PAGE_SIZE: u32 = 5;

const OPTIMIZED_SUM_UPPER_BOUND: u64 = 1_000_000;

/// Service error for student use-cases.
#[derive(Debug)]
pub enum StudentServiceError {
    /// No student with this id exists.
    StudentNotFound(StudentId),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for StudentServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StudentNotFound(id) => write!(f, "student not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StudentServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::StudentNotFound(_) => None,
        }
    }
}

impl From<RepoError> for StudentServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::StudentNotFound(id),
            other => Self::Repo(other),
        }
    }
}

/// Student service facade over a record store.
pub struct StudentService<R: StudentRepository> {
    repo: R,
    printer: GroupPrinter,
}

impl<R: StudentRepository> StudentService<R> {
    /// Creates a service that prints to stdout.
    pub fn new(repo: R) -> Self {
        Self::with_sink(repo, Arc::new(StdoutSink))
    }

    /// Creates a service that prints to `sink`.
    pub fn with_sink(repo: R, sink: Arc<dyn LineSink>) -> Self {
        Self {
            repo,
            printer: GroupPrinter::new(sink),
        }
    }

    /// Persists a new student and returns it with its assigned id.
    ///
    /// An id already present on `student` is ignored; the store assigns one.
    pub fn add_student(&self, mut student: Student) -> RepoResult<Student> {
        info!("event=student_add module=student_service status=start");
        student.id = None;
        self.repo.save(&student)
    }

    pub fn find_student(&self, id: StudentId) -> Result<Student, StudentServiceError> {
        info!("event=student_find module=student_service status=start id={id}");
        self.repo.find_by_id(id)?.ok_or_else(|| {
            error!("event=student_find module=student_service status=not_found id={id}");
            StudentServiceError::StudentNotFound(id)
        })
    }

    /// Overwrites an existing student with `student`, keeping `id`.
    ///
    /// # Contract
    /// - The id embedded in `student` is replaced by `id`.
    /// - Unknown `id` returns `Ok(None)` and leaves the store untouched.
    pub fn edit_student(
        &self,
        id: StudentId,
        mut student: Student,
    ) -> Result<Option<Student>, StudentServiceError> {
        info!("event=student_edit module=student_service status=start id={id}");
        if !self.repo.exists_by_id(id)? {
            warn!("event=student_edit module=student_service status=skipped reason=missing id={id}");
            return Ok(None);
        }

        student.id = Some(id);
        Ok(Some(self.repo.save(&student)?))
    }

    pub fn delete_student(&self, id: StudentId) -> RepoResult<()> {
        info!("event=student_delete module=student_service status=start id={id}");
        self.repo.delete_by_id(id)
    }

    pub fn find_all_students(&self) -> RepoResult<Vec<Student>> {
        info!("event=student_list module=student_service status=start");
        self.repo.find_all()
    }

    /// Upper-cased, sorted names that start with the Cyrillic letter `А`.
    pub fn student_names_starting_with_a(&self) -> RepoResult<Vec<String>> {
        self.student_names_starting_with(NAME_FILTER_LETTER)
    }

    /// Upper-cased, sorted names whose original first character is `letter`.
    pub fn student_names_starting_with(&self, letter: char) -> RepoResult<Vec<String>> {
        info!("event=student_names module=student_service status=start letter={letter}");
        let students = self.repo.find_all()?;
        Ok(names_starting_with(&students, letter))
    }

    /// Mean age computed in memory over every student, `0.0` when empty.
    pub fn average_age_of_students(&self) -> RepoResult<f64> {
        info!("event=student_average_age module=student_service status=start source=memory");
        let students = self.repo.find_all()?;
        Ok(mean_age(&students))
    }

    /// Mean age as computed by the store.
    pub fn average_age(&self) -> RepoResult<f64> {
        info!("event=student_average_age module=student_service status=start source=store");
        self.repo.average_student_age()
    }

    pub fn total_students(&self) -> RepoResult<u64> {
        info!("event=student_count module=student_service status=start");
        self.repo.count_all_students()
    }

    /// Students with `min <= age <= max`.
    pub fn find_students_by_age_range(&self, min: u32, max: u32) -> RepoResult<Vec<Student>> {
        info!("event=student_age_range module=student_service status=start min={min} max={max}");
        self.repo.find_by_age_between(min, max)
    }

    /// The five most recently created students, newest first.
    pub fn last_five_students(&self) -> RepoResult<Vec<Student>> {
        info!("event=student_last_five module=student_service status=start");
        self.repo
            .find_last_students(PageRequest::of(0, LAST_STUDENTS_PAGE_SIZE))
    }

    /// Resolves the faculty of an existing student.
    ///
    /// Returns `Ok(None)` when the student has no faculty.
    pub fn find_faculty_of_student(
        &self,
        student_id: StudentId,
    ) -> Result<Option<Faculty>, StudentServiceError> {
        info!("event=student_faculty module=student_service status=start id={student_id}");
        Ok(self.find_student(student_id)?.faculty)
    }

    /// Sum of `1..=1_000_000` by closed form.
    pub fn optimized_sum(&self) -> u64 {
        triangular_number(OPTIMIZED_SUM_UPPER_BOUND)
    }

    /// Prints one student's name; `None` is logged and skipped.
    pub fn print_student_name(&self, student: Option<&Student>) {
        match student {
            Some(student) => self.printer.print_line(&student.name),
            None => warn!("event=student_print module=student_service status=skipped reason=missing_student"),
        }
    }

    /// Prints the first six students in three pairs, two of them on worker
    /// threads, and waits for both workers.
    pub fn print_students_in_parallel(&self) -> RepoResult<GroupPrintStatus> {
        let names = self.load_names()?;
        Ok(self.printer.print_in_parallel(&names))
    }

    /// Prints the first six students in three pairs through the shared print
    /// gate without waiting for the workers.
    ///
    /// Drop the returned handle to detach, or join it to wait.
    pub fn print_students_synchronized(&self) -> RepoResult<Option<GroupPrintHandle>> {
        let names = self.load_names()?;
        Ok(self.printer.print_synchronized(&names))
    }

    fn load_names(&self) -> RepoResult<Vec<String>> {
        Ok(self
            .repo
            .find_all()?
            .into_iter()
            .map(|student| student.name)
            .collect())
    }
}

fn names_starting_with(students: &[Student], letter: char) -> Vec<String> {
    let mut names: Vec<String> = students
        .iter()
        .map(|student| student.name.as_str())
        .filter(|name| name.starts_with(letter))
        .map(str::to_uppercase)
        .collect();
    names.sort();
    names
}

fn mean_age(students: &[Student]) -> f64 {
    if students.is_empty() {
        return 0.0;
    }
    let total: u64 = students.iter().map(|student| u64::from(student.age)).sum();
    total as f64 / students.len() as f64
}

fn triangular_number(n: u64) -> u64 {
    n * (n + 1) / 2
}
