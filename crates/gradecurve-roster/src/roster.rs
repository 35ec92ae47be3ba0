//! The roster: students, courses, enrollment, grades, and GPA.
//!
//! Curving a class goes through the core pipeline on disk. The roster exports
//! the class gradebook, the core curves it, and the roster re-reads the
//! curved file and updates its grades by (student, class).

use std::fmt::Write as _;
use std::path::Path;

use gradecurve_core::model::{validate_score, ScoreRecord, ScoreSet, SubjectKey};
use gradecurve_core::tabular::{load_scores, save_scores, OutputMode, Schema};
use gradecurve_core::{CurveOrchestrator, CurveOutcome, CurveRequest};

use crate::error::RosterError;
use crate::model::{Course, GradeEntry, Student};

/// Result of curving one class through the roster.
#[derive(Debug)]
pub struct ClassCurve {
    pub outcome: CurveOutcome,
    /// Grade entries updated from the curved file.
    pub reconciled: usize,
}

/// In-memory student and course bookkeeping.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    students: Vec<Student>,
    courses: Vec<Course>,
    grades: Vec<GradeEntry>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a student. Classes already listed on the student must exist on
    /// the roster; repeated codes are dropped.
    pub fn add_student(&mut self, mut student: Student) -> Result<(), RosterError> {
        if self.student(&student.id).is_some() {
            return Err(RosterError::DuplicateStudent(student.id));
        }
        let mut classes: Vec<String> = Vec::with_capacity(student.classes.len());
        for code in student.classes.drain(..) {
            self.require_course(&code)?;
            if !classes.contains(&code) {
                classes.push(code);
            }
        }
        student.classes = classes;
        self.students.push(student);
        Ok(())
    }

    pub fn add_course(&mut self, course: Course) -> Result<(), RosterError> {
        if self.course(&course.code).is_some() {
            return Err(RosterError::DuplicateCourse(course.code));
        }
        self.courses.push(course);
        Ok(())
    }

    pub fn student(&self, id: &str) -> Option<&Student> {
        self.students.iter().find(|s| s.id == id)
    }

    pub fn student_mut(&mut self, id: &str) -> Option<&mut Student> {
        self.students.iter_mut().find(|s| s.id == id)
    }

    pub fn course(&self, code: &str) -> Option<&Course> {
        self.courses.iter().find(|c| c.code == code)
    }

    pub fn students(&self) -> &[Student] {
        &self.students
    }

    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    pub fn grades(&self) -> &[GradeEntry] {
        &self.grades
    }

    /// Enrollments across all students.
    pub fn total_enrollments(&self) -> usize {
        self.students.iter().map(|s| s.classes.len()).sum()
    }

    /// Enroll a student in a course. Returns `false` if already enrolled.
    pub fn enroll(&mut self, student_id: &str, class_code: &str) -> Result<bool, RosterError> {
        self.require_course(class_code)?;
        let student = self
            .student_mut(student_id)
            .ok_or_else(|| RosterError::UnknownStudent(student_id.to_string()))?;
        if student.is_enrolled(class_code) {
            return Ok(false);
        }
        student.classes.push(class_code.to_string());
        Ok(true)
    }

    /// Drop a student from a course. Returns `false` if they were not enrolled.
    pub fn unenroll(&mut self, student_id: &str, class_code: &str) -> Result<bool, RosterError> {
        let student = self
            .student_mut(student_id)
            .ok_or_else(|| RosterError::UnknownStudent(student_id.to_string()))?;
        let before = student.classes.len();
        student.classes.retain(|c| c != class_code);
        Ok(student.classes.len() < before)
    }

    /// Students enrolled in a course, in roster order.
    pub fn course_students(&self, class_code: &str) -> Vec<&Student> {
        self.students
            .iter()
            .filter(|s| s.is_enrolled(class_code))
            .collect()
    }

    /// Printable class schedule for one student.
    pub fn schedule(&self, student_id: &str) -> Result<String, RosterError> {
        let student = self.require_student(student_id)?;
        let mut out = format!("Schedule for {}:\n", student.name);
        for code in student.classes() {
            if let Some(course) = self.course(code) {
                let _ = writeln!(out, "{course}");
            }
        }
        Ok(out)
    }

    /// Record a grade, replacing any earlier grade for the same class.
    pub fn assign_grade(
        &mut self,
        student_id: &str,
        class_code: &str,
        grade: f64,
    ) -> Result<(), RosterError> {
        self.require_student(student_id)?;
        self.require_course(class_code)?;
        validate_score(grade).map_err(|_| RosterError::InvalidGrade {
            student_id: student_id.to_string(),
            class_code: class_code.to_string(),
            grade,
        })?;

        match self
            .grades
            .iter_mut()
            .find(|g| g.matches(student_id, class_code))
        {
            Some(entry) => entry.grade = grade,
            None => self.grades.push(GradeEntry {
                student_id: student_id.to_string(),
                class_code: class_code.to_string(),
                grade,
            }),
        }
        Ok(())
    }

    pub fn grades_for(&self, student_id: &str) -> impl Iterator<Item = &GradeEntry> + '_ {
        let id = student_id.to_string();
        self.grades.iter().filter(move |g| g.student_id == id)
    }

    /// Mean grade scaled to the student's GPA scale. 0.0 with no grades.
    pub fn gpa(&self, student_id: &str) -> Result<f64, RosterError> {
        let student = self.require_student(student_id)?;
        let grades: Vec<f64> = self.grades_for(student_id).map(|g| g.grade).collect();
        if grades.is_empty() {
            return Ok(0.0);
        }
        let mean = grades.iter().sum::<f64>() / grades.len() as f64;
        Ok(mean * student.category.gpa_scale() / 100.0)
    }

    /// The gradebook for one class as `student,class` keyed score records.
    pub fn class_scores(&self, class_code: &str) -> Result<ScoreSet, RosterError> {
        self.require_course(class_code)?;
        self.grades
            .iter()
            .filter(|g| g.class_code == class_code)
            .map(|g| {
                ScoreRecord::new(SubjectKey::student_class(&g.student_id, &g.class_code), g.grade)
                    .map_err(|_| RosterError::InvalidGrade {
                        student_id: g.student_id.clone(),
                        class_code: g.class_code.clone(),
                        grade: g.grade,
                    })
            })
            .collect()
    }

    /// Write a class gradebook as `student,class,grade` lines.
    pub fn export_class_scores(&self, class_code: &str, path: &Path) -> Result<usize, RosterError> {
        let set = self.class_scores(class_code)?;
        save_scores(&set, path, OutputMode::Overwrite)?;
        Ok(set.len())
    }

    /// Curve a `student,class,grade` file and pull the new grades back in.
    ///
    /// Grades are only touched when the curve succeeded. Curved rows that do
    /// not match an existing grade entry are ignored.
    pub fn curve_class(
        &mut self,
        source: &Path,
        destination: &Path,
        kind: &str,
        parameter: Option<f64>,
    ) -> Result<ClassCurve, RosterError> {
        let request = CurveRequest::new(source, destination, kind, parameter)
            .with_schema(Schema::student_class())
            .with_output_mode(OutputMode::Overwrite);
        let outcome = CurveOrchestrator::new().run(&request);
        if !outcome.is_success() {
            return Ok(ClassCurve {
                outcome,
                reconciled: 0,
            });
        }

        let curved = load_scores(destination, &Schema::student_class())?;
        let reconciled = self.reconcile(&curved.records);
        tracing::info!("reconciled {reconciled} grades from {}", destination.display());
        Ok(ClassCurve {
            outcome,
            reconciled,
        })
    }

    /// Overwrite grades from curved records keyed by student and class.
    ///
    /// When a `(student, class)` pair appears more than once, the last row
    /// wins. Returns the number of distinct grade entries updated.
    pub fn reconcile(&mut self, curved: &ScoreSet) -> usize {
        let mut touched = vec![false; self.grades.len()];
        for record in curved {
            let key = record.key();
            let Some(class_code) = key.class.as_deref() else {
                continue;
            };
            for (idx, entry) in self.grades.iter_mut().enumerate() {
                if entry.matches(&key.student, class_code) {
                    entry.grade = record.current();
                    touched[idx] = true;
                }
            }
        }
        touched.into_iter().filter(|t| *t).count()
    }

    /// Full text report: students with GPA, then every grade.
    pub fn report(&self) -> String {
        let mut out = String::from("Student Management System Report\n");
        out.push_str("====================================\n");
        let _ = writeln!(out, "Total Enrollments: {}\n", self.total_enrollments());
        out.push_str("Students:\n---------\n");
        for student in &self.students {
            let gpa = self.gpa(&student.id).unwrap_or(0.0);
            let _ = writeln!(out, "{student}, GPA: {gpa:.2}");
        }
        out.push_str("\nGrades:\n-------\n");
        for g in &self.grades {
            let _ = writeln!(
                out,
                "Student ID: {}, Class: {}, Grade: {:.2}, Passing: {}",
                g.student_id,
                g.class_code,
                g.grade,
                if g.is_passing() { "Yes" } else { "No" }
            );
        }
        out.push_str("====================================\n");
        out
    }

    /// Short counts summary.
    pub fn status(&self) -> String {
        format!(
            "Students: {}\nClasses: {}\nGrade Records: {}\nTotal Enrollments: {}\n",
            self.students.len(),
            self.courses.len(),
            self.grades.len(),
            self.total_enrollments()
        )
    }

    fn require_student(&self, id: &str) -> Result<&Student, RosterError> {
        self.student(id)
            .ok_or_else(|| RosterError::UnknownStudent(id.to_string()))
    }

    fn require_course(&self, code: &str) -> Result<&Course, RosterError> {
        self.course(code)
            .ok_or_else(|| RosterError::UnknownCourse(code.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster() -> Roster {
        let mut r = Roster::new();
        r.add_student(Student::regular("S001", "Alice Smith", 10).unwrap())
            .unwrap();
        r.add_student(Student::advanced_placement("S002", "Bob Johnson", 11).unwrap())
            .unwrap();
        r.add_course(Course::new("MATH101", "Geometry", "Ms. Davis", 3).unwrap())
            .unwrap();
        r.add_course(Course::new("CALC-AP", "AP Calculus BC", "Mr. Newton", 2).unwrap())
            .unwrap();
        r
    }

    #[test]
    fn duplicates_are_rejected() {
        let mut r = roster();
        assert!(matches!(
            r.add_student(Student::regular("S001", "Other", 9).unwrap()),
            Err(RosterError::DuplicateStudent(_))
        ));
        assert!(matches!(
            r.add_course(Course::new("MATH101", "Algebra", "Mr. X", 1).unwrap()),
            Err(RosterError::DuplicateCourse(_))
        ));
    }

    #[test]
    fn enrollment_counts_once() {
        let mut r = roster();
        assert!(r.enroll("S001", "MATH101").unwrap());
        assert!(!r.enroll("S001", "MATH101").unwrap());
        assert!(r.enroll("S002", "MATH101").unwrap());
        assert_eq!(r.total_enrollments(), 2);
        assert_eq!(r.course_students("MATH101").len(), 2);

        assert!(r.unenroll("S001", "MATH101").unwrap());
        assert!(!r.unenroll("S001", "MATH101").unwrap());
        assert_eq!(r.total_enrollments(), 1);
    }

    #[test]
    fn enroll_unknown_entities_fails() {
        let mut r = roster();
        assert!(matches!(
            r.enroll("S999", "MATH101"),
            Err(RosterError::UnknownStudent(_))
        ));
        assert!(matches!(
            r.enroll("S001", "ART"),
            Err(RosterError::UnknownCourse(_))
        ));
    }

    #[test]
    fn gpa_uses_category_scale() {
        let mut r = roster();
        r.assign_grade("S001", "MATH101", 85.0).unwrap();
        r.assign_grade("S002", "MATH101", 92.0).unwrap();
        r.assign_grade("S002", "CALC-AP", 96.0).unwrap();

        assert!((r.gpa("S001").unwrap() - 3.4).abs() < 1e-9);
        assert!((r.gpa("S002").unwrap() - 4.7).abs() < 1e-9);
    }

    #[test]
    fn gpa_without_grades_is_zero() {
        assert_eq!(roster().gpa("S001").unwrap(), 0.0);
    }

    #[test]
    fn assign_grade_replaces_and_validates() {
        let mut r = roster();
        r.assign_grade("S001", "MATH101", 60.0).unwrap();
        r.assign_grade("S001", "MATH101", 75.0).unwrap();
        assert_eq!(r.grades().len(), 1);
        assert_eq!(r.grades()[0].grade, 75.0);
        assert!(matches!(
            r.assign_grade("S001", "MATH101", 101.0),
            Err(RosterError::InvalidGrade { .. })
        ));
    }

    #[test]
    fn reconcile_matches_student_and_class() {
        let mut r = roster();
        r.assign_grade("S001", "MATH101", 64.0).unwrap();
        r.assign_grade("S001", "CALC-AP", 64.0).unwrap();

        let curved: ScoreSet = vec![
            ScoreRecord::new(SubjectKey::student_class("S001", "MATH101"), 80.0).unwrap(),
            ScoreRecord::new(SubjectKey::student_class("S404", "MATH101"), 99.0).unwrap(),
            ScoreRecord::new(SubjectKey::student("S001"), 10.0).unwrap(),
        ]
        .into();

        assert_eq!(r.reconcile(&curved), 1);
        let math = r.grades_for("S001").find(|g| g.class_code == "MATH101").unwrap();
        assert_eq!(math.grade, 80.0);
        let calc = r.grades_for("S001").find(|g| g.class_code == "CALC-AP").unwrap();
        assert_eq!(calc.grade, 64.0);
    }

    #[test]
    fn reconcile_counts_duplicate_rows_once() {
        let mut r = roster();
        r.assign_grade("S001", "MATH101", 64.0).unwrap();

        let curved: ScoreSet = vec![
            ScoreRecord::new(SubjectKey::student_class("S001", "MATH101"), 80.0).unwrap(),
            ScoreRecord::new(SubjectKey::student_class("S001", "MATH101"), 85.0).unwrap(),
        ]
        .into();

        assert_eq!(r.reconcile(&curved), 1);
        assert_eq!(r.grades()[0].grade, 85.0);
    }

    fn student_from_json(classes: &str) -> Student {
        serde_json::from_str(&format!(
            r#"{{"id":"S003","name":"Charlie Brown","grade_level":10,
                "category":{{"type":"regular"}},"active":true,"classes":{classes}}}"#
        ))
        .unwrap()
    }

    #[test]
    fn preloaded_classes_count_as_enrollments() {
        let mut r = roster();
        r.add_student(student_from_json(r#"["MATH101","CALC-AP","MATH101"]"#))
            .unwrap();
        assert_eq!(r.student("S003").unwrap().classes(), ["MATH101", "CALC-AP"]);
        assert_eq!(r.total_enrollments(), 2);

        assert!(r.unenroll("S003", "MATH101").unwrap());
        assert!(r.unenroll("S003", "CALC-AP").unwrap());
        assert!(!r.unenroll("S003", "CALC-AP").unwrap());
        assert_eq!(r.total_enrollments(), 0);
    }

    #[test]
    fn preloaded_unknown_class_is_rejected() {
        let mut r = roster();
        assert!(matches!(
            r.add_student(student_from_json(r#"["ART"]"#)),
            Err(RosterError::UnknownCourse(_))
        ));
        assert!(r.student("S003").is_none());
    }

    #[test]
    fn schedule_lists_courses() {
        let mut r = roster();
        r.enroll("S002", "MATH101").unwrap();
        r.enroll("S002", "CALC-AP").unwrap();
        let schedule = r.schedule("S002").unwrap();
        assert!(schedule.starts_with("Schedule for Bob Johnson:"));
        assert!(schedule.contains("AP Calculus BC (CALC-AP)"));
    }

    #[test]
    fn status_counts() {
        let mut r = roster();
        r.enroll("S001", "MATH101").unwrap();
        r.assign_grade("S001", "MATH101", 88.0).unwrap();
        let status = r.status();
        assert!(status.contains("Students: 2"));
        assert!(status.contains("Classes: 2"));
        assert!(status.contains("Grade Records: 1"));
        assert!(status.contains("Total Enrollments: 1"));
    }
}
