//! Gradebook curving integration tests.
//!
//! Export a class, curve it through the core pipeline, and check that the
//! roster picks up the new grades and GPAs.

use gradecurve_core::CurveError;
use gradecurve_roster::{Course, Roster, Student};

fn school() -> Roster {
    let mut roster = Roster::new();
    roster
        .add_student(Student::regular("S001", "Alice Smith", 10).unwrap())
        .unwrap();
    roster
        .add_student(Student::advanced_placement("S002", "Bob Johnson", 11).unwrap())
        .unwrap();
    roster
        .add_student(Student::regular("S003", "Charlie Brown", 10).unwrap())
        .unwrap();
    roster
        .add_course(Course::new("MATH101", "Geometry", "Ms. Davis", 3).unwrap())
        .unwrap();
    roster
        .add_course(Course::new("CALC-AP", "AP Calculus BC", "Mr. Newton", 2).unwrap())
        .unwrap();

    for (student, class) in [
        ("S001", "MATH101"),
        ("S002", "MATH101"),
        ("S002", "CALC-AP"),
        ("S003", "MATH101"),
    ] {
        roster.enroll(student, class).unwrap();
    }

    roster.assign_grade("S001", "MATH101", 81.0).unwrap();
    roster.assign_grade("S002", "MATH101", 64.0).unwrap();
    roster.assign_grade("S002", "CALC-AP", 95.0).unwrap();
    roster.assign_grade("S003", "MATH101", 49.0).unwrap();
    roster
}

#[test]
fn export_writes_student_class_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("math101.csv");

    let written = school().export_class_scores("MATH101", &path).unwrap();
    assert_eq!(written, 3);
    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "S001,MATH101,81.00\nS002,MATH101,64.00\nS003,MATH101,49.00\n"
    );
}

#[test]
fn sqrt_curve_updates_grades_and_gpa() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("math101.csv");
    let mut roster = school();
    roster.export_class_scores("MATH101", &path).unwrap();

    let before_gpa = roster.gpa("S003").unwrap();
    let result = roster.curve_class(&path, &path, "sqrt", None).unwrap();

    assert_eq!(result.outcome.modified(), Some(3));
    assert_eq!(result.reconciled, 3);

    let math: Vec<f64> = roster
        .grades()
        .iter()
        .filter(|g| g.class_code == "MATH101")
        .map(|g| g.grade)
        .collect();
    assert_eq!(math, vec![90.0, 80.0, 70.0]);

    // CALC-AP was not in the curved file
    let calc = roster
        .grades_for("S002")
        .find(|g| g.class_code == "CALC-AP")
        .unwrap();
    assert_eq!(calc.grade, 95.0);

    assert!(roster.gpa("S003").unwrap() > before_gpa);
    // AP student: mean of 80 and 95 on a 5.0 scale
    assert!((roster.gpa("S002").unwrap() - 4.375).abs() < 1e-9);

    let report = roster.report();
    assert!(report.contains("Student ID: S003, Class: MATH101, Grade: 70.00, Passing: Yes"));
    assert!(report.contains("Total Enrollments: 4"));
}

#[test]
fn failed_curve_leaves_grades_alone() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("same.csv");
    let mut roster = school();
    roster.assign_grade("S001", "MATH101", 70.0).unwrap();
    roster.assign_grade("S002", "MATH101", 70.0).unwrap();
    roster.assign_grade("S003", "MATH101", 70.0).unwrap();
    roster.export_class_scores("MATH101", &path).unwrap();

    let result = roster.curve_class(&path, &path, "zscore", None).unwrap();
    assert_eq!(result.reconciled, 0);
    assert!(matches!(
        result.outcome.into_result(),
        Err(CurveError::DegenerateDistribution { .. })
    ));
    assert!(roster
        .grades()
        .iter()
        .filter(|g| g.class_code == "MATH101")
        .all(|g| g.grade == 70.0));
}

#[test]
fn export_unknown_class_fails() {
    let dir = tempfile::tempdir().unwrap();
    assert!(school()
        .export_class_scores("ART", &dir.path().join("art.csv"))
        .is_err());
}
