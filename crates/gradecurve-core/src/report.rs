//! Curve run reports with JSON persistence.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::curve::Curve;
use crate::orchestrator::CurveSummary;
use crate::statistics::ScoreStats;
use crate::tabular::{OutputMode, SkippedLine};

/// A persisted record of one successful curve run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurveReport {
    /// Run identifier.
    pub id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    pub curve: Curve,
    pub source: PathBuf,
    pub destination: PathBuf,
    pub output_mode: OutputMode,
    pub curved: usize,
    pub changed: usize,
    pub skipped: Vec<SkippedLine>,
    pub before: ScoreStats,
    pub after: ScoreStats,
    /// Per-record scores, in file order.
    pub rows: Vec<ReportRow>,
}

/// One record's before/after scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    pub key: String,
    pub original: f64,
    pub curved: f64,
    pub passing: bool,
}

impl CurveReport {
    pub fn from_summary(summary: &CurveSummary) -> Self {
        let rows = summary
            .results
            .iter()
            .map(|r| ReportRow {
                key: r.key().to_string(),
                original: r.original(),
                curved: r.current(),
                passing: r.is_passing(),
            })
            .collect();

        Self {
            id: summary.run_id,
            created_at: Utc::now(),
            curve: summary.curve,
            source: summary.source.clone(),
            destination: summary.destination.clone(),
            output_mode: summary.output_mode,
            curved: summary.curved,
            changed: summary.changed,
            skipped: summary.skipped.clone(),
            before: summary.before,
            after: summary.after,
            rows,
        }
    }

    /// Number of rows passing after the curve.
    pub fn passing_count(&self) -> usize {
        self.rows.iter().filter(|r| r.passing).count()
    }

    /// Write the report as pretty JSON, creating parent directories.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("cannot encode curve report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("cannot write curve report {}", path.display()))?;
        Ok(())
    }

    /// Read a report written by [`CurveReport::save_json`].
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read curve report {}", path.display()))?;
        let report: CurveReport =
            serde_json::from_str(&content).context("curve report is not valid JSON")?;
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::curve;

    #[test]
    fn report_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("in.csv");
        std::fs::write(&src, "S1,60\nS2,80\nS3,x\n").unwrap();
        let dst = dir.path().join("out.csv");

        let summary = curve(&src, &dst, "zscore", None).into_result().unwrap();
        let report = CurveReport::from_summary(&summary);
        assert_eq!(report.rows.len(), 2);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.passing_count(), 1);

        let path = dir.path().join("reports").join("run.json");
        report.save_json(&path).unwrap();
        let loaded = CurveReport::load_json(&path).unwrap();

        assert_eq!(loaded.id, report.id);
        assert_eq!(loaded.curve, Curve::ZScore);
        assert_eq!(loaded.rows, report.rows);
    }

    #[test]
    fn report_json_tags_curve_kind() {
        let json = serde_json::to_value(Curve::Flat { points: 5.0 }).unwrap();
        assert_eq!(json["kind"], "flat");
        assert_eq!(json["points"], 5.0);
    }

    #[test]
    fn load_missing_report_fails() {
        assert!(CurveReport::load_json(Path::new("no_such_report.json")).is_err());
    }
}
