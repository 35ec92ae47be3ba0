//! Load → curve → save orchestration.
//!
//! One call to [`CurveOrchestrator::run`] processes one scores file end to
//! end. Every failure is folded into a [`CurveOutcome`]; nothing is returned
//! as an unhandled error. The destination is only written after the curve
//! succeeded.

use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::curve::{Curve, CurveEngine};
use crate::error::CurveError;
use crate::model::ScoreSet;
use crate::statistics::ScoreStats;
use crate::tabular::{load_scores, save_scores, OutputMode, Schema, SkippedLine};

/// Everything one curve run needs.
#[derive(Debug, Clone)]
pub struct CurveRequest {
    /// Scores file to read.
    pub source: PathBuf,
    /// File the curved scores are written to. May equal `source`.
    pub destination: PathBuf,
    /// Curve kind name, e.g. "zscore".
    pub kind: String,
    /// Parameter for power, flat, and stddev.
    pub parameter: Option<f64>,
    /// Column layout of the source.
    pub schema: Schema,
    /// Column layout of the destination.
    pub output_mode: OutputMode,
}

impl CurveRequest {
    pub fn new(
        source: impl Into<PathBuf>,
        destination: impl Into<PathBuf>,
        kind: impl Into<String>,
        parameter: Option<f64>,
    ) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            kind: kind.into(),
            parameter,
            schema: Schema::default(),
            output_mode: OutputMode::default(),
        }
    }

    pub fn with_schema(mut self, schema: Schema) -> Self {
        self.schema = schema;
        self
    }

    pub fn with_output_mode(mut self, mode: OutputMode) -> Self {
        self.output_mode = mode;
        self
    }
}

/// A run that curved and saved its scores.
#[derive(Debug, Clone)]
pub struct CurveSummary {
    pub run_id: Uuid,
    pub curve: Curve,
    pub source: PathBuf,
    pub destination: PathBuf,
    pub output_mode: OutputMode,
    /// Records written by the engine.
    pub curved: usize,
    /// Records whose score actually moved.
    pub changed: usize,
    pub skipped: Vec<SkippedLine>,
    pub before: ScoreStats,
    pub after: ScoreStats,
    /// The curved set, distinct from anything the caller holds.
    pub results: ScoreSet,
}

/// A run that stopped before writing its destination.
#[derive(Debug)]
pub struct CurveFailure {
    pub reason: CurveError,
    /// Lines skipped before the run stopped, if it got as far as loading.
    pub skipped: Vec<SkippedLine>,
}

impl From<CurveError> for CurveFailure {
    fn from(reason: CurveError) -> Self {
        Self {
            reason,
            skipped: Vec::new(),
        }
    }
}

/// Result of one curve run.
#[derive(Debug)]
pub enum CurveOutcome {
    Curved(CurveSummary),
    Failed(CurveFailure),
}

impl CurveOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, CurveOutcome::Curved(_))
    }

    /// Number of records curved, if the run succeeded.
    pub fn modified(&self) -> Option<usize> {
        match self {
            CurveOutcome::Curved(summary) => Some(summary.curved),
            CurveOutcome::Failed(_) => None,
        }
    }

    pub fn skipped(&self) -> &[SkippedLine] {
        match self {
            CurveOutcome::Curved(summary) => &summary.skipped,
            CurveOutcome::Failed(failure) => &failure.skipped,
        }
    }

    pub fn into_result(self) -> Result<CurveSummary, CurveError> {
        match self {
            CurveOutcome::Curved(summary) => Ok(summary),
            CurveOutcome::Failed(failure) => Err(failure.reason),
        }
    }
}

/// Runs curve requests against the file system.
#[derive(Debug, Clone, Default)]
pub struct CurveOrchestrator {
    engine: CurveEngine,
}

impl CurveOrchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_engine(engine: CurveEngine) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &CurveEngine {
        &self.engine
    }

    /// Load, curve, and save. Never panics on bad input.
    pub fn run(&self, request: &CurveRequest) -> CurveOutcome {
        tracing::info!(
            "curving {} -> {} with {}",
            request.source.display(),
            request.destination.display(),
            request.kind
        );
        match self.execute(request) {
            Ok(summary) => {
                tracing::info!(
                    "curved {} records ({} changed, {} lines skipped)",
                    summary.curved,
                    summary.changed,
                    summary.skipped.len()
                );
                CurveOutcome::Curved(summary)
            }
            Err(failure) => {
                tracing::warn!("curve run aborted: {}", failure.reason);
                CurveOutcome::Failed(failure)
            }
        }
    }

    fn execute(&self, request: &CurveRequest) -> Result<CurveSummary, CurveFailure> {
        let curve = Curve::parse(&request.kind, request.parameter)?;

        let loaded = load_scores(&request.source, &request.schema)?;
        let skipped = loaded.skipped;
        let fail = |reason: CurveError, skipped: &[SkippedLine]| CurveFailure {
            reason,
            skipped: skipped.to_vec(),
        };

        let mut results = loaded.records;
        let Some(before) = ScoreStats::compute(&results.originals()) else {
            return Err(fail(CurveError::EmptyInput, &skipped));
        };

        let curved = self
            .engine
            .apply(&mut results, &curve)
            .map_err(|e| fail(e, &skipped))?;
        let after = ScoreStats::compute(&results.values()).unwrap_or(before);

        save_scores(&results, &request.destination, request.output_mode)
            .map_err(|e| fail(e, &skipped))?;

        Ok(CurveSummary {
            run_id: Uuid::new_v4(),
            curve,
            source: request.source.clone(),
            destination: request.destination.clone(),
            output_mode: request.output_mode,
            curved,
            changed: results.changed_count(),
            skipped,
            before,
            after,
            results,
        })
    }
}

/// Curve a `student,value` file into `destination`.
///
/// This is the entry point for bookkeeping code: it uses the default schema
/// and overwrite mode. Callers re-read `destination` to pick up new scores.
pub fn curve(
    source: impl AsRef<Path>,
    destination: impl AsRef<Path>,
    kind: &str,
    parameter: Option<f64>,
) -> CurveOutcome {
    let request = CurveRequest::new(
        source.as_ref(),
        destination.as_ref(),
        kind,
        parameter,
    );
    CurveOrchestrator::new().run(&request)
}
