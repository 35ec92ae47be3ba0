//! Curve error types.
//!
//! Every failure the load → curve → save pipeline can hit is one of these
//! variants. The orchestrator turns them into a reported outcome instead of
//! letting them escape to the caller.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::curve::CurveKind;

/// Errors produced while loading, curving, or saving scores.
#[derive(Debug, Error)]
pub enum CurveError {
    /// A line or value could not be turned into a score record.
    #[error("malformed record at line {line}: {reason}")]
    MalformedRecord { line: usize, reason: String },

    /// No valid records were available to curve.
    #[error("nothing to curve: no valid score records")]
    EmptyInput,

    /// The requested curve kind is not one of the nine supported kinds.
    #[error("unknown curve kind: '{0}'")]
    UnknownCurveKind(String),

    /// The curve parameter is missing or out of range.
    #[error("invalid parameter for {kind} curve: {reason}")]
    InvalidParameter { kind: CurveKind, reason: String },

    /// Every score is identical, so standard deviation is zero.
    #[error("cannot apply {kind} curve: standard deviation is zero (all scores equal {mean:.2})")]
    DegenerateDistribution { kind: CurveKind, mean: f64 },

    /// Reading or writing a scores file failed.
    #[error("I/O error {action} {}: {source}", path.display())]
    IoFailure {
        action: IoAction,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The ratio band table is not usable.
    #[error("invalid band table: {0}")]
    InvalidBands(String),
}

/// Which side of the pipeline an I/O failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoAction {
    Read,
    Write,
}

impl fmt::Display for IoAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            IoAction::Read => "reading",
            IoAction::Write => "writing",
        })
    }
}

impl CurveError {
    /// Returns `true` if the destination file was not touched.
    ///
    /// Only a failed write can leave a destination partially written.
    pub fn is_pre_mutation(&self) -> bool {
        !matches!(
            self,
            CurveError::IoFailure {
                action: IoAction::Write,
                ..
            }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degenerate_message_names_kind_and_mean() {
        let err = CurveError::DegenerateDistribution {
            kind: CurveKind::ZScore,
            mean: 75.0,
        };
        let msg = err.to_string();
        assert!(msg.contains("zscore"), "got {msg}");
        assert!(msg.contains("75.00"), "got {msg}");
    }

    fn io_failure(action: IoAction, path: &str) -> CurveError {
        CurveError::IoFailure {
            action,
            path: PathBuf::from(path),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        }
    }

    #[test]
    fn only_write_failures_touch_the_destination() {
        let write = io_failure(IoAction::Write, "out.csv");
        assert!(!write.is_pre_mutation());
        assert_eq!(write.to_string(), "I/O error writing out.csv: denied");

        let read = io_failure(IoAction::Read, "in.csv");
        assert!(read.is_pre_mutation());
        assert_eq!(read.to_string(), "I/O error reading in.csv: denied");

        assert!(CurveError::EmptyInput.is_pre_mutation());
    }
}
