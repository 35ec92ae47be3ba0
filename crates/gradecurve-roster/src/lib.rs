//! gradecurve-roster: student, course and gradebook bookkeeping.
//!
//! Keeps the roster of students and courses, records grades, computes GPAs,
//! and reconciles grades after a class has been curved by `gradecurve-core`.

pub mod error;
pub mod model;
pub mod roster;

pub use error::RosterError;
pub use model::{Course, GradeEntry, Student, StudentCategory};
pub use roster::{ClassCurve, Roster};
