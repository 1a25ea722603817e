//! Command-line entry point for the school records core.
//!
//! # Responsibility
//! - Resolve runtime settings from flags and `SCHOOL_*` environment variables.
//! - Open the store, build the student service and run one operation.
//! - Print records as JSON on stdout.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use school_core::db::open_db;
use school_core::{
    default_log_level, init_logging, Faculty, FacultyId, FacultyRepository, GroupPrintStatus,
    SqliteFacultyRepository, SqliteStudentRepository, Student, StudentId, StudentService,
};
use serde::Serialize;
use std::path::PathBuf;

const DEFAULT_DB_PATH: &str = "school.sqlite3";

#[derive(Parser)]
#[command(name = "school")]
#[command(about = "School records service", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// SQLite database file
    #[arg(long, env = "SCHOOL_DB_PATH", default_value = DEFAULT_DB_PATH)]
    db: PathBuf,

    /// Log level (trace|debug|info|warn|error)
    #[arg(long, env = "SCHOOL_LOG_LEVEL")]
    log_level: Option<String>,

    /// Absolute directory for rolling log files; logging is off when unset
    #[arg(long, env = "SCHOOL_LOG_DIR")]
    log_dir: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a new student
    Add {
        name: String,
        age: u32,
        /// Faculty id to attach
        #[arg(long)]
        faculty: Option<FacultyId>,
    },

    /// Show one student
    Find { id: StudentId },

    /// Overwrite an existing student
    Edit {
        id: StudentId,
        name: String,
        age: u32,
        /// Faculty id to attach
        #[arg(long)]
        faculty: Option<FacultyId>,
    },

    /// Delete a student (no error when missing)
    Delete { id: StudentId },

    /// List every student
    List,

    /// Upper-cased names starting with the Cyrillic letter А
    NamesA,

    /// Average student age
    AvgAge {
        /// Let the store compute the aggregate
        #[arg(long)]
        store: bool,
    },

    /// Number of students
    Count,

    /// Students with min <= age <= max
    Range { min: u32, max: u32 },

    /// Five most recently added students
    LastFive,

    /// Faculty of a student
    Faculty { student_id: StudentId },

    /// Add a new faculty
    AddFaculty { name: String, color: String },

    /// Sum of 1..=1_000_000
    Sum,

    /// Print six students, two pairs on joined worker threads
    PrintParallel,

    /// Print six students through a shared lock, waiting for the workers
    PrintSync,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        init_logging(level, log_dir).map_err(anyhow::Error::msg)?;
    }

    let conn = open_db(&cli.db)
        .with_context(|| format!("failed to open database `{}`", cli.db.display()))?;
    let faculties = SqliteFacultyRepository::try_new(&conn)?;
    let service = StudentService::new(SqliteStudentRepository::try_new(&conn)?);

    info!(
        "event=cli_command module=school_cli status=start db={}",
        cli.db.display()
    );

    match cli.command {
        Commands::Add { name, age, faculty } => {
            let student = build_student(&faculties, name, age, faculty)?;
            print_json(&service.add_student(student)?)?;
        }
        Commands::Find { id } => print_json(&service.find_student(id)?)?,
        Commands::Edit {
            id,
            name,
            age,
            faculty,
        } => {
            let student = build_student(&faculties, name, age, faculty)?;
            match service.edit_student(id, student)? {
                Some(updated) => print_json(&updated)?,
                None => println!("null"),
            }
        }
        Commands::Delete { id } => service.delete_student(id)?,
        Commands::List => print_json(&service.find_all_students()?)?,
        Commands::NamesA => print_json(&service.student_names_starting_with_a()?)?,
        Commands::AvgAge { store } => {
            let average = if store {
                service.average_age()?
            } else {
                service.average_age_of_students()?
            };
            println!("{average}");
        }
        Commands::Count => println!("{}", service.total_students()?),
        Commands::Range { min, max } => {
            print_json(&service.find_students_by_age_range(min, max)?)?
        }
        Commands::LastFive => print_json(&service.last_five_students()?)?,
        Commands::Faculty { student_id } => {
            print_json(&service.find_faculty_of_student(student_id)?)?
        }
        Commands::AddFaculty { name, color } => {
            print_json(&faculties.create_faculty(&name, &color)?)?
        }
        Commands::Sum => println!("{}", service.optimized_sum()),
        Commands::PrintParallel => {
            if let GroupPrintStatus::Skipped { available } = service.print_students_in_parallel()? {
                eprintln!("need at least 6 students, found {available}");
            }
        }
        Commands::PrintSync => match service.print_students_synchronized()? {
            // The process would exit before detached workers print.
            Some(handle) => {
                handle.join();
            }
            None => eprintln!("need at least 6 students"),
        },
    }

    Ok(())
}

fn build_student(
    faculties: &SqliteFacultyRepository<'_>,
    name: String,
    age: u32,
    faculty_id: Option<FacultyId>,
) -> Result<Student> {
    let student = Student::new(name, age);
    let Some(faculty_id) = faculty_id else {
        return Ok(student);
    };
    let faculty: Faculty = match faculties.get_faculty(faculty_id)? {
        Some(faculty) => faculty,
        None => bail!("faculty not found: {faculty_id}"),
    };
    Ok(student.with_faculty(faculty))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
