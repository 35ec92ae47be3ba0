//! gradecurve-core: score model, curve engine and CSV pipeline.
//!
//! This crate defines the score data model, the nine curve transforms, the
//! delimited-text reader/writer, and the orchestrator that ties them together.

pub mod config;
pub mod curve;
pub mod error;
pub mod model;
pub mod orchestrator;
pub mod report;
pub mod statistics;
pub mod tabular;

pub use curve::{BandTable, Curve, CurveEngine, CurveKind};
pub use error::{CurveError, IoAction};
pub use model::{ScoreRecord, ScoreSet, SubjectKey};
pub use orchestrator::{curve, CurveOrchestrator, CurveOutcome, CurveRequest};
pub use tabular::{KeyLayout, OutputMode, Schema, ValueColumns};
