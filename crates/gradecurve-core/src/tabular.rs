//! Comma-delimited score files.
//!
//! Loads score records from `key,value` style text and writes them back.
//! Bad lines are skipped and reported, never fatal.

use std::fmt::Write as _;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CurveError, IoAction};
use crate::model::{validate_score, ScoreRecord, ScoreSet, SubjectKey};

/// How the subject key is spread over the leading columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum KeyLayout {
    /// `student,...`
    #[default]
    Student,
    /// `student,class,...`
    StudentClass,
}

impl KeyLayout {
    fn field_count(self) -> usize {
        match self {
            KeyLayout::Student => 1,
            KeyLayout::StudentClass => 2,
        }
    }
}

/// Which score columns follow the key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValueColumns {
    /// A single score.
    #[default]
    Value,
    /// Original score, then curved score.
    OriginalAndCurved,
}

impl ValueColumns {
    fn field_count(self) -> usize {
        match self {
            ValueColumns::Value => 1,
            ValueColumns::OriginalAndCurved => 2,
        }
    }
}

/// The column layout a caller expects a scores file to have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Schema {
    pub key: KeyLayout,
    pub columns: ValueColumns,
    /// Skip the first line. Headers are never auto-detected.
    pub has_header: bool,
}

impl Schema {
    /// `student,value`, no header.
    pub fn student() -> Self {
        Self::default()
    }

    /// `student,class,value`, no header.
    pub fn student_class() -> Self {
        Self {
            key: KeyLayout::StudentClass,
            ..Self::default()
        }
    }

    pub fn with_header(mut self, has_header: bool) -> Self {
        self.has_header = has_header;
        self
    }

    pub fn with_columns(mut self, columns: ValueColumns) -> Self {
        self.columns = columns;
        self
    }

    /// Number of comma-separated fields a valid line has.
    pub fn expected_fields(&self) -> usize {
        self.key.field_count() + self.columns.field_count()
    }

    /// The schema that reads back a file written with `mode`.
    pub fn for_output(&self, mode: OutputMode) -> Self {
        let columns = match mode {
            OutputMode::Overwrite => ValueColumns::Value,
            OutputMode::PreserveOriginal => ValueColumns::OriginalAndCurved,
        };
        Self {
            key: self.key,
            columns,
            has_header: false,
        }
    }
}

/// How curved results are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputMode {
    /// `key,value` with the curved value.
    #[default]
    Overwrite,
    /// `key,original,curved`.
    PreserveOriginal,
}

impl FromStr for OutputMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "overwrite" => Ok(OutputMode::Overwrite),
            "preserve-original" | "preserve" => Ok(OutputMode::PreserveOriginal),
            other => Err(format!("unknown output mode: {other}")),
        }
    }
}

/// A line that was dropped during load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedLine {
    /// 1-based line number in the source.
    pub line: usize,
    /// The raw line text.
    pub text: String,
    /// Why the line was rejected.
    pub reason: String,
}

impl SkippedLine {
    pub fn to_error(&self) -> CurveError {
        CurveError::MalformedRecord {
            line: self.line,
            reason: self.reason.clone(),
        }
    }
}

/// Records read from a scores file plus the lines that were skipped.
#[derive(Debug, Clone, Default)]
pub struct LoadedScores {
    pub records: ScoreSet,
    pub skipped: Vec<SkippedLine>,
}

/// Parse scores file content.
pub fn parse_scores(content: &str, schema: &Schema) -> LoadedScores {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut loaded = LoadedScores::default();

    for (idx, line) in content.lines().enumerate() {
        if idx == 0 && schema.has_header {
            continue;
        }
        if line.trim().is_empty() {
            continue;
        }
        match parse_line(line, schema) {
            Ok(record) => loaded.records.push(record),
            Err(reason) => {
                let skipped = SkippedLine {
                    line: idx + 1,
                    text: line.to_string(),
                    reason,
                };
                tracing::warn!("skipping {} ({:?})", skipped.to_error(), line);
                loaded.skipped.push(skipped);
            }
        }
    }

    loaded
}

fn parse_line(line: &str, schema: &Schema) -> Result<ScoreRecord, String> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    let expected = schema.expected_fields();
    if fields.len() != expected {
        return Err(format!(
            "expected {expected} fields, found {}",
            fields.len()
        ));
    }
    if let Some(pos) = fields.iter().position(|f| f.is_empty()) {
        return Err(format!("field {} is empty", pos + 1));
    }

    let (key_fields, value_fields) = fields.split_at(schema.key.field_count());
    let key = match schema.key {
        KeyLayout::Student => SubjectKey::student(key_fields[0]),
        KeyLayout::StudentClass => SubjectKey::student_class(key_fields[0], key_fields[1]),
    };

    let values = value_fields
        .iter()
        .map(|f| parse_score(f))
        .collect::<Result<Vec<_>, _>>()?;

    match *values.as_slice() {
        [value] => ScoreRecord::new(key, value),
        [original, curved] => ScoreRecord::with_curved(key, original, curved),
        _ => Err(format!("expected 1 or 2 score fields, found {}", values.len())),
    }
}

fn parse_score(field: &str) -> Result<f64, String> {
    let value: f64 = field
        .parse()
        .map_err(|_| format!("'{field}' is not a number"))?;
    validate_score(value)
}

/// Load a scores file from disk.
pub fn load_scores(path: &Path, schema: &Schema) -> Result<LoadedScores, CurveError> {
    let content = std::fs::read_to_string(path).map_err(|source| {
        tracing::error!("failed to read scores from {}: {}", path.display(), source);
        CurveError::IoFailure {
            action: IoAction::Read,
            path: path.to_path_buf(),
            source,
        }
    })?;

    let loaded = parse_scores(&content, schema);
    tracing::info!(
        "loaded {} records from {} ({} skipped)",
        loaded.records.len(),
        path.display(),
        loaded.skipped.len()
    );
    Ok(loaded)
}

/// Render records as scores file content, two decimals per value.
pub fn format_scores(set: &ScoreSet, mode: OutputMode) -> String {
    let mut out = String::new();
    for record in set {
        // Writing into a String cannot fail.
        let _ = match mode {
            OutputMode::Overwrite => writeln!(out, "{},{:.2}", record.key(), record.current()),
            OutputMode::PreserveOriginal => writeln!(
                out,
                "{},{:.2},{:.2}",
                record.key(),
                record.original(),
                record.current()
            ),
        };
    }
    out
}

/// Write records to `path`, replacing whatever was there.
pub fn save_scores(set: &ScoreSet, path: &Path, mode: OutputMode) -> Result<(), CurveError> {
    std::fs::write(path, format_scores(set, mode)).map_err(|source| {
        tracing::error!("failed to write scores to {}: {}", path.display(), source);
        CurveError::IoFailure {
            action: IoAction::Write,
            path: path.to_path_buf(),
            source,
        }
    })?;
    tracing::info!("wrote {} records to {}", set.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_two_column_scores() {
        let loaded = parse_scores("S1,90\nS2, 80.5 \n", &Schema::student());
        assert_eq!(loaded.records.len(), 2);
        assert!(loaded.skipped.is_empty());
        assert_eq!(loaded.records.values(), vec![90.0, 80.5]);
        assert_eq!(loaded.records.records()[1].key(), &SubjectKey::student("S2"));
    }

    #[test]
    fn skipped_line_converts_to_malformed_record() {
        let loaded = parse_scores("S1,90\nS2,abc\n", &Schema::student());
        let err = loaded.skipped[0].to_error();
        assert!(matches!(err, CurveError::MalformedRecord { line: 2, .. }));
        assert_eq!(
            err.to_string(),
            "malformed record at line 2: 'abc' is not a number"
        );
    }

    #[test]
    fn non_numeric_line_is_skipped() {
        let content = "S1,90\nS2,80\nS3,abc\nS4,60\nS5,50\n";
        let loaded = parse_scores(content, &Schema::student());
        assert_eq!(loaded.records.len(), 4);
        assert_eq!(loaded.skipped.len(), 1);
        assert_eq!(loaded.skipped[0].line, 3);
        assert!(loaded.skipped[0].reason.contains("not a number"));
    }

    #[test]
    fn out_of_range_values_are_rejected_not_clamped() {
        let loaded = parse_scores("S1,101\nS2,-0.5\nS3,100\n", &Schema::student());
        assert_eq!(loaded.records.len(), 1);
        assert_eq!(loaded.skipped.len(), 2);
    }

    #[test]
    fn wrong_field_count_and_empty_fields() {
        let content = "S1,90,extra\nS2\n,80\nS3,\n";
        let loaded = parse_scores(content, &Schema::student());
        assert!(loaded.records.is_empty());
        assert_eq!(loaded.skipped.len(), 4);
    }

    #[test]
    fn header_is_skipped_only_when_declared() {
        let content = "student,score\nS1,90\n";
        let with = parse_scores(content, &Schema::student().with_header(true));
        assert_eq!(with.records.len(), 1);
        assert!(with.skipped.is_empty());

        let without = parse_scores(content, &Schema::student());
        assert_eq!(without.records.len(), 1);
        assert_eq!(without.skipped.len(), 1);
    }

    #[test]
    fn blank_lines_are_ignored() {
        let loaded = parse_scores("S1,90\n\n   \nS2,80\r\n", &Schema::student());
        assert_eq!(loaded.records.len(), 2);
        assert!(loaded.skipped.is_empty());
    }

    #[test]
    fn student_class_layout() {
        let loaded = parse_scores("S001,MATH101,85.0\nS002,MATH101\n", &Schema::student_class());
        assert_eq!(loaded.records.len(), 1);
        assert_eq!(
            loaded.records.records()[0].key(),
            &SubjectKey::student_class("S001", "MATH101")
        );
    }

    #[test]
    fn format_both_modes() {
        let mut set = ScoreSet::new();
        let mut record = ScoreRecord::new("S1", 81.0).unwrap();
        record.assign(90.0 + 1.0 / 3.0);
        set.push(record);

        assert_eq!(format_scores(&set, OutputMode::Overwrite), "S1,90.33\n");
        assert_eq!(
            format_scores(&set, OutputMode::PreserveOriginal),
            "S1,81.00,90.33\n"
        );
    }

    #[test]
    fn save_then_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scores.csv");
        let set: ScoreSet = vec![
            ScoreRecord::new("S1", 88.456).unwrap(),
            ScoreRecord::new("S2", 0.0).unwrap(),
            ScoreRecord::new("S1", 100.0).unwrap(),
        ]
        .into();

        save_scores(&set, &path, OutputMode::Overwrite).unwrap();
        let loaded = load_scores(&path, &Schema::student()).unwrap();

        assert!(loaded.skipped.is_empty());
        assert_eq!(loaded.records.len(), 3);
        for (a, b) in set.iter().zip(loaded.records.iter()) {
            assert_eq!(a.key(), b.key());
            assert!((a.current() - b.current()).abs() <= 0.005);
        }
    }

    #[test]
    fn preserve_original_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("curved.csv");
        let mut record = ScoreRecord::new(SubjectKey::student_class("S1", "BIO"), 64.0).unwrap();
        record.assign(80.0);
        let set: ScoreSet = vec![record].into();

        save_scores(&set, &path, OutputMode::PreserveOriginal).unwrap();
        let schema = Schema::student_class().for_output(OutputMode::PreserveOriginal);
        let loaded = load_scores(&path, &schema).unwrap();

        let back = &loaded.records.records()[0];
        assert_eq!(back.original(), 64.0);
        assert_eq!(back.current(), 80.0);
    }

    #[test]
    fn missing_file_is_io_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.csv");
        assert!(matches!(
            load_scores(&path, &Schema::student()),
            Err(CurveError::IoFailure {
                action: IoAction::Read,
                ..
            })
        ));
    }

    #[test]
    fn unwritable_destination_is_io_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no-such-dir").join("out.csv");
        let set: ScoreSet = vec![ScoreRecord::new("S1", 50.0).unwrap()].into();
        assert!(matches!(
            save_scores(&set, &path, OutputMode::Overwrite),
            Err(CurveError::IoFailure {
                action: IoAction::Write,
                ..
            })
        ));
    }

    #[test]
    fn output_mode_parse() {
        assert_eq!("overwrite".parse::<OutputMode>().unwrap(), OutputMode::Overwrite);
        assert_eq!(
            "Preserve-Original".parse::<OutputMode>().unwrap(),
            OutputMode::PreserveOriginal
        );
        assert!("append".parse::<OutputMode>().is_err());
    }
}
