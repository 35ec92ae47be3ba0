//! Roster entities: students, courses, and grade entries.

use std::fmt;

use serde::{Deserialize, Serialize};

use gradecurve_core::model::PASSING_SCORE;

use crate::error::RosterError;

/// How a student's GPA is weighted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum StudentCategory {
    /// Unweighted, 4.0 scale.
    Regular,
    /// Weighted, 5.0 scale. Tracks points earned from completed AP courses.
    AdvancedPlacement { ap_points: u32 },
}

impl StudentCategory {
    /// Top of the GPA scale for this category.
    pub fn gpa_scale(&self) -> f64 {
        match self {
            StudentCategory::Regular => 4.0,
            StudentCategory::AdvancedPlacement { .. } => 5.0,
        }
    }
}

/// A student on the roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: String,
    pub name: String,
    pub grade_level: u8,
    pub category: StudentCategory,
    pub active: bool,
    /// Class codes in enrollment order.
    #[serde(default)]
    pub(crate) classes: Vec<String>,
}

impl Student {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        grade_level: u8,
        category: StudentCategory,
    ) -> Result<Self, RosterError> {
        let id = id.into();
        let name = name.into();
        if id.trim().is_empty() || name.trim().is_empty() {
            return Err(RosterError::InvalidEntity(
                "student id and name cannot be empty".into(),
            ));
        }
        Ok(Self {
            id,
            name,
            grade_level,
            category,
            active: true,
            classes: Vec::new(),
        })
    }

    pub fn regular(
        id: impl Into<String>,
        name: impl Into<String>,
        grade_level: u8,
    ) -> Result<Self, RosterError> {
        Self::new(id, name, grade_level, StudentCategory::Regular)
    }

    pub fn advanced_placement(
        id: impl Into<String>,
        name: impl Into<String>,
        grade_level: u8,
    ) -> Result<Self, RosterError> {
        Self::new(
            id,
            name,
            grade_level,
            StudentCategory::AdvancedPlacement { ap_points: 0 },
        )
    }

    /// Add AP points. Returns `false` for regular students, who have none.
    pub fn add_ap_points(&mut self, points: u32) -> bool {
        match &mut self.category {
            StudentCategory::AdvancedPlacement { ap_points } => {
                *ap_points += points;
                true
            }
            StudentCategory::Regular => false,
        }
    }

    pub fn ap_points(&self) -> u32 {
        match self.category {
            StudentCategory::AdvancedPlacement { ap_points } => ap_points,
            StudentCategory::Regular => 0,
        }
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn is_enrolled(&self, class_code: &str) -> bool {
        self.classes.iter().any(|c| c == class_code)
    }
}

impl fmt::Display for Student {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ID: {}, Name: {}", self.id, self.name)
    }
}

/// A course students enroll in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub code: String,
    pub title: String,
    pub teacher: String,
    pub period: u8,
}

impl Course {
    pub fn new(
        code: impl Into<String>,
        title: impl Into<String>,
        teacher: impl Into<String>,
        period: u8,
    ) -> Result<Self, RosterError> {
        let course = Self {
            code: code.into(),
            title: title.into(),
            teacher: teacher.into(),
            period,
        };
        if [&course.code, &course.title, &course.teacher]
            .iter()
            .any(|s| s.trim().is_empty())
            || period < 1
        {
            return Err(RosterError::InvalidEntity(format!(
                "invalid course parameters for '{}'",
                course.code
            )));
        }
        Ok(course)
    }
}

impl fmt::Display for Course {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}), Teacher: {}, Period: {}",
            self.title, self.code, self.teacher, self.period
        )
    }
}

/// One student's grade in one class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeEntry {
    pub student_id: String,
    pub class_code: String,
    pub grade: f64,
}

impl GradeEntry {
    pub fn is_passing(&self) -> bool {
        self.grade >= PASSING_SCORE
    }

    pub fn matches(&self, student_id: &str, class_code: &str) -> bool {
        self.student_id == student_id && self.class_code == class_code
    }
}
