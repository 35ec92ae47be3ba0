//! Roster error types.

use thiserror::Error;

use gradecurve_core::CurveError;

/// Errors from roster bookkeeping.
#[derive(Debug, Error)]
pub enum RosterError {
    #[error("student already exists: {0}")]
    DuplicateStudent(String),

    #[error("course already exists: {0}")]
    DuplicateCourse(String),

    /// A student or course was constructed with missing fields.
    #[error("invalid entity: {0}")]
    InvalidEntity(String),

    #[error("unknown student: {0}")]
    UnknownStudent(String),

    #[error("unknown course: {0}")]
    UnknownCourse(String),

    /// A grade outside 0-100.
    #[error("invalid grade {grade} for {student_id} in {class_code}")]
    InvalidGrade {
        student_id: String,
        class_code: String,
        grade: f64,
    },

    /// Exporting or curving a class failed in the core pipeline.
    #[error(transparent)]
    Curve(#[from] CurveError),
}
