use rusqlite::Connection;
use school_core::db::migrations::latest_version;
use school_core::db::open_db_in_memory;
use school_core::{
    FacultyRepository, PageRequest, RepoError, SqliteFacultyRepository, SqliteStudentRepository,
    Student, StudentRepository,
};

#[test]
fn save_assigns_increasing_ids_and_reads_back() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStudentRepository::try_new(&conn).unwrap();

    let first = repo.save(&Student::new("Анна", 19)).unwrap();
    let second = repo.save(&Student::new("Борис", 21)).unwrap();

    let first_id = first.id.unwrap();
    assert!(second.id.unwrap() > first_id);
    assert_eq!(repo.find_by_id(first_id).unwrap(), Some(first));
}

#[test]
fn save_with_id_overwrites_existing_row() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStudentRepository::try_new(&conn).unwrap();

    let mut student = repo.save(&Student::new("draft", 18)).unwrap();
    student.name = "Вера".to_string();
    student.age = 20;
    let updated = repo.save(&student).unwrap();

    assert_eq!(updated, student);
    assert_eq!(repo.count_all_students().unwrap(), 1);
}

#[test]
fn save_with_unknown_id_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStudentRepository::try_new(&conn).unwrap();

    let mut ghost = Student::new("ghost", 30);
    ghost.id = Some(42);
    let err = repo.save(&ghost).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(42)));
}

#[test]
fn save_rejects_blank_name() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStudentRepository::try_new(&conn).unwrap();

    let err = repo.save(&Student::new("   ", 20)).unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
    assert_eq!(repo.count_all_students().unwrap(), 0);
}

#[test]
fn faculty_relation_is_resolved_on_read() {
    let conn = open_db_in_memory().unwrap();
    let faculties = SqliteFacultyRepository::try_new(&conn).unwrap();
    let repo = SqliteStudentRepository::try_new(&conn).unwrap();

    let faculty = faculties.create_faculty("Gryffindor", "red").unwrap();
    let saved = repo
        .save(&Student::new("Harry", 17).with_faculty(faculty.clone()))
        .unwrap();

    let loaded = repo.find_by_id(saved.id.unwrap()).unwrap().unwrap();
    assert_eq!(loaded.faculty, Some(faculty));
}

#[test]
fn save_with_unknown_faculty_is_rejected_by_store() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStudentRepository::try_new(&conn).unwrap();

    let orphan = Student::new("Orphan", 17).with_faculty(school_core::Faculty {
        id: 999,
        name: "Nowhere".to_string(),
        color: String::new(),
    });
    let err = repo.save(&orphan).unwrap_err();
    assert!(matches!(err, RepoError::Db(_)));
}

#[test]
fn delete_is_idempotent() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStudentRepository::try_new(&conn).unwrap();

    let id = repo.save(&Student::new("Галина", 22)).unwrap().id.unwrap();
    repo.delete_by_id(id).unwrap();
    repo.delete_by_id(id).unwrap();
    repo.delete_by_id(12345).unwrap();

    assert!(!repo.exists_by_id(id).unwrap());
    assert_eq!(repo.find_by_id(id).unwrap(), None);
}

#[test]
fn find_all_is_ordered_by_id() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStudentRepository::try_new(&conn).unwrap();
    for (name, age) in [("c", 20), ("a", 18), ("b", 19)] {
        repo.save(&Student::new(name, age)).unwrap();
    }

    let names: Vec<_> = repo
        .find_all()
        .unwrap()
        .into_iter()
        .map(|student| student.name)
        .collect();
    assert_eq!(names, vec!["c", "a", "b"]);
}

#[test]
fn age_range_is_inclusive_and_empty_when_reversed() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStudentRepository::try_new(&conn).unwrap();
    for age in [16, 17, 18, 19, 20] {
        repo.save(&Student::new(format!("s{age}"), age)).unwrap();
    }

    let ages: Vec<_> = repo
        .find_by_age_between(17, 19)
        .unwrap()
        .into_iter()
        .map(|student| student.age)
        .collect();
    assert_eq!(ages, vec![17, 18, 19]);
    assert!(repo.find_by_age_between(19, 17).unwrap().is_empty());
}

#[test]
fn aggregates_handle_empty_and_filled_store() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStudentRepository::try_new(&conn).unwrap();

    assert_eq!(repo.count_all_students().unwrap(), 0);
    assert_eq!(repo.average_student_age().unwrap(), 0.0);

    for age in [18, 19, 23] {
        repo.save(&Student::new("x", age)).unwrap();
    }
    assert_eq!(repo.count_all_students().unwrap(), 3);
    assert!((repo.average_student_age().unwrap() - 20.0).abs() < 1e-9);
}

#[test]
fn last_students_are_newest_first_and_paged() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStudentRepository::try_new(&conn).unwrap();
    for index in 1..=7 {
        repo.save(&Student::new(format!("s{index}"), 18)).unwrap();
    }

    let names = |page| -> Vec<String> {
        repo.find_last_students(page)
            .unwrap()
            .into_iter()
            .map(|student| student.name)
            .collect()
    };
    assert_eq!(
        names(PageRequest::of(0, 5)),
        vec!["s7", "s6", "s5", "s4", "s3"]
    );
    assert_eq!(names(PageRequest::of(1, 5)), vec!["s2", "s1"]);
}

#[test]
fn deleted_ids_are_not_reused() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStudentRepository::try_new(&conn).unwrap();

    let first = repo.save(&Student::new("first", 18)).unwrap().id.unwrap();
    repo.delete_by_id(first).unwrap();
    let second = repo.save(&Student::new("second", 18)).unwrap().id.unwrap();
    assert!(second > first);
}

#[test]
fn repository_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    match SqliteStudentRepository::try_new(&conn) {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert_eq!(expected_version, latest_version()),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn repository_rejects_connection_without_students_table() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    assert!(matches!(
        SqliteStudentRepository::try_new(&conn),
        Err(RepoError::MissingRequiredTable("students"))
    ));
}

#[test]
fn repository_rejects_students_table_missing_faculty_column() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE students (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            age INTEGER NOT NULL
        );",
    )
    .unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    assert!(matches!(
        SqliteStudentRepository::try_new(&conn),
        Err(RepoError::MissingRequiredColumn {
            table: "students",
            column: "faculty_id"
        })
    ));
}

#[test]
fn faculty_repository_lists_in_creation_order() {
    let conn = open_db_in_memory().unwrap();
    let faculties = SqliteFacultyRepository::try_new(&conn).unwrap();

    let red = faculties.create_faculty("Gryffindor", "red").unwrap();
    let green = faculties.create_faculty("Slytherin", "green").unwrap();
    assert!(faculties.create_faculty(" ", "grey").is_err());

    assert_eq!(faculties.list_faculties().unwrap(), vec![red.clone(), green]);
    assert_eq!(faculties.get_faculty(red.id).unwrap(), Some(red));
    assert_eq!(faculties.get_faculty(-1).unwrap(), None);
}
