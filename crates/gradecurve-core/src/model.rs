//! Core data model types for gradecurve.
//!
//! A [`ScoreRecord`] is one subject's score; a [`ScoreSet`] is the ordered
//! batch that a curve is applied to.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lowest score a record may hold.
pub const MIN_SCORE: f64 = 0.0;
/// Highest score a record may hold.
pub const MAX_SCORE: f64 = 100.0;
/// Scores at or above this value are passing.
pub const PASSING_SCORE: f64 = 70.0;

/// Identifies whose score a record is.
///
/// Either a bare student id or a student/class composite. The display form
/// (`S001` or `S001,MATH101`) is exactly what is written to disk.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SubjectKey {
    /// Student identifier.
    pub student: String,
    /// Class code, when the score belongs to a specific class.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
}

impl SubjectKey {
    /// A key made of a student id alone.
    pub fn student(id: impl Into<String>) -> Self {
        Self {
            student: id.into(),
            class: None,
        }
    }

    /// A key made of a student id and a class code.
    pub fn student_class(id: impl Into<String>, class: impl Into<String>) -> Self {
        Self {
            student: id.into(),
            class: Some(class.into()),
        }
    }
}

impl fmt::Display for SubjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.class {
            Some(class) => write!(f, "{},{}", self.student, class),
            None => write!(f, "{}", self.student),
        }
    }
}

impl From<&str> for SubjectKey {
    fn from(id: &str) -> Self {
        SubjectKey::student(id)
    }
}

/// Check that a value read or constructed from outside lies in [0, 100].
pub fn validate_score(value: f64) -> Result<f64, String> {
    if !value.is_finite() {
        return Err(format!("score {value} is not a finite number"));
    }
    if !(MIN_SCORE..=MAX_SCORE).contains(&value) {
        return Err(format!(
            "score {value} is outside the range {MIN_SCORE}-{MAX_SCORE}"
        ));
    }
    Ok(value)
}

/// A single subject's score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    key: SubjectKey,
    original: f64,
    current: f64,
}

impl ScoreRecord {
    /// Create a record whose current value equals its original value.
    pub fn new(key: impl Into<SubjectKey>, value: f64) -> Result<Self, String> {
        let value = validate_score(value)?;
        Ok(Self {
            key: key.into(),
            original: value,
            current: value,
        })
    }

    /// Create a record that has already been curved once.
    pub fn with_curved(key: impl Into<SubjectKey>, original: f64, curved: f64) -> Result<Self, String> {
        Ok(Self {
            key: key.into(),
            original: validate_score(original)?,
            current: validate_score(curved)?,
        })
    }

    pub fn key(&self) -> &SubjectKey {
        &self.key
    }

    /// The score as it was loaded. Every curve reads this value.
    pub fn original(&self) -> f64 {
        self.original
    }

    /// The score after the most recent curve.
    pub fn current(&self) -> f64 {
        self.current
    }

    /// Whether the current score is passing (70 or higher).
    pub fn is_passing(&self) -> bool {
        self.current >= PASSING_SCORE
    }

    /// Whether a curve moved this record away from its original score.
    pub fn is_changed(&self) -> bool {
        (self.current - self.original).abs() > f64::EPSILON
    }

    /// Drop any curve and go back to the original score.
    pub fn reset(&mut self) {
        self.current = self.original;
    }

    /// Write a curved value, clamped to [0, 100].
    pub(crate) fn assign(&mut self, value: f64) {
        self.current = if value.is_nan() {
            MIN_SCORE
        } else {
            value.clamp(MIN_SCORE, MAX_SCORE)
        };
    }
}

/// An ordered batch of score records.
///
/// Input order is preserved. Duplicate keys are allowed and every record is
/// curved independently.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScoreSet {
    records: Vec<ScoreRecord>,
}

impl ScoreSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: ScoreRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[ScoreRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ScoreRecord> {
        self.records.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> std::slice::IterMut<'_, ScoreRecord> {
        self.records.iter_mut()
    }

    /// Original scores in record order.
    pub fn originals(&self) -> Vec<f64> {
        self.records.iter().map(ScoreRecord::original).collect()
    }

    /// Current scores in record order.
    pub fn values(&self) -> Vec<f64> {
        self.records.iter().map(ScoreRecord::current).collect()
    }

    /// All records with the given key, in order.
    pub fn find<'a>(&'a self, key: &'a SubjectKey) -> impl Iterator<Item = &'a ScoreRecord> + 'a {
        self.records.iter().filter(move |r| r.key() == key)
    }

    /// Number of records whose current score differs from the original.
    pub fn changed_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_changed()).count()
    }

    pub fn into_records(self) -> Vec<ScoreRecord> {
        self.records
    }
}

impl FromIterator<ScoreRecord> for ScoreSet {
    fn from_iter<I: IntoIterator<Item = ScoreRecord>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

impl From<Vec<ScoreRecord>> for ScoreSet {
    fn from(records: Vec<ScoreRecord>) -> Self {
        Self { records }
    }
}

impl IntoIterator for ScoreSet {
    type Item = ScoreRecord;
    type IntoIter = std::vec::IntoIter<ScoreRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a> IntoIterator for &'a ScoreSet {
    type Item = &'a ScoreRecord;
    type IntoIter = std::slice::Iter<'a, ScoreRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subject_key_display() {
        assert_eq!(SubjectKey::student("S1").to_string(), "S1");
        assert_eq!(
            SubjectKey::student_class("S001", "MATH101").to_string(),
            "S001,MATH101"
        );
    }

    #[test]
    fn record_rejects_out_of_range() {
        assert!(ScoreRecord::new("S1", 100.0).is_ok());
        assert!(ScoreRecord::new("S1", 0.0).is_ok());
        assert!(ScoreRecord::new("S1", 100.01).is_err());
        assert!(ScoreRecord::new("S1", -1.0).is_err());
        assert!(ScoreRecord::new("S1", f64::NAN).is_err());
        assert!(ScoreRecord::new("S1", f64::INFINITY).is_err());
    }

    #[test]
    fn assign_clamps_to_range() {
        let mut r = ScoreRecord::new("S1", 50.0).unwrap();
        r.assign(120.0);
        assert_eq!(r.current(), 100.0);
        r.assign(-3.0);
        assert_eq!(r.current(), 0.0);
        assert_eq!(r.original(), 50.0);
        r.reset();
        assert_eq!(r.current(), 50.0);
    }

    #[test]
    fn passing_threshold() {
        assert!(ScoreRecord::new("S1", 70.0).unwrap().is_passing());
        assert!(!ScoreRecord::new("S1", 69.99).unwrap().is_passing());
    }

    #[test]
    fn set_keeps_duplicates_in_order() {
        let set: ScoreSet = vec![
            ScoreRecord::new("S1", 90.0).unwrap(),
            ScoreRecord::new("S2", 80.0).unwrap(),
            ScoreRecord::new("S1", 70.0).unwrap(),
        ]
        .into();
        assert_eq!(set.len(), 3);
        assert_eq!(set.originals(), vec![90.0, 80.0, 70.0]);
        let key = SubjectKey::student("S1");
        assert_eq!(set.find(&key).count(), 2);
    }

    #[test]
    fn score_set_serde_roundtrip() {
        let set: ScoreSet = vec![
            ScoreRecord::new(SubjectKey::student_class("S1", "MATH101"), 88.5).unwrap(),
        ]
        .into();
        let json = serde_json::to_string(&set).unwrap();
        let back: ScoreSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, set);
    }
}
