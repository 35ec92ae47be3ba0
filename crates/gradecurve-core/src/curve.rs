//! The curve engine.
//!
//! Nine transforms over a batch of scores. Every transform reads each
//! record's original score and writes a new current score clamped to
//! [0, 100]. The engine never touches the file system.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CurveError;
use crate::model::{ScoreSet, MAX_SCORE, MIN_SCORE};
use crate::statistics::{band_sizes, is_degenerate, mean, population_std_dev};

/// Target mean used by the z-score curve.
pub const ZSCORE_TARGET_MEAN: f64 = 75.0;
/// Target spread used by the z-score curve.
pub const ZSCORE_TARGET_STD_DEV: f64 = 10.0;

/// The nine supported curve kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurveKind {
    Sqrt,
    Log,
    Exp,
    Power,
    Sigmoid,
    Flat,
    StdDev,
    ZScore,
    Ratio,
}

impl CurveKind {
    pub const ALL: [CurveKind; 9] = [
        CurveKind::Flat,
        CurveKind::Sqrt,
        CurveKind::Log,
        CurveKind::Exp,
        CurveKind::Power,
        CurveKind::Sigmoid,
        CurveKind::ZScore,
        CurveKind::StdDev,
        CurveKind::Ratio,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CurveKind::Sqrt => "sqrt",
            CurveKind::Log => "log",
            CurveKind::Exp => "exp",
            CurveKind::Power => "power",
            CurveKind::Sigmoid => "sigmoid",
            CurveKind::Flat => "flat",
            CurveKind::StdDev => "stddev",
            CurveKind::ZScore => "zscore",
            CurveKind::Ratio => "ratio",
        }
    }

    /// Whether this kind cannot run without a numeric parameter.
    pub fn requires_parameter(self) -> bool {
        matches!(self, CurveKind::Power | CurveKind::Flat | CurveKind::StdDev)
    }

    /// One-line description of what the curve does.
    pub fn description(self) -> &'static str {
        match self {
            CurveKind::Flat => "Adds a fixed number of points to every score.",
            CurveKind::Sqrt => "Takes the square root of the score and multiplies by 10.",
            CurveKind::Log => "Logarithmic curve that compresses higher scores.",
            CurveKind::Exp => "Exponential curve that spreads out higher scores.",
            CurveKind::Power => "Raises the normalized score (0-1) to a given power.",
            CurveKind::Sigmoid => "S-shaped curve centered on 50.",
            CurveKind::ZScore => "Standardizes scores and rescales them to mean 75, spread 10.",
            CurveKind::StdDev => "Shifts every score so the class average hits a target mean.",
            CurveKind::Ratio => "Letter bands by rank: top 10% A, 20% B, 40% C, 20% D, rest F.",
        }
    }

    /// What the parameter means, if the kind takes one.
    pub fn parameter_hint(self) -> Option<&'static str> {
        match self {
            CurveKind::Flat => Some("points to add (e.g. 5)"),
            CurveKind::Power => Some("exponent (e.g. 0.5 to boost scores)"),
            CurveKind::StdDev => Some("target class average, 0-100 (e.g. 85)"),
            _ => None,
        }
    }
}

impl fmt::Display for CurveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CurveKind {
    type Err = CurveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_lowercase();
        CurveKind::ALL
            .into_iter()
            .find(|k| k.name() == name)
            .ok_or_else(|| CurveError::UnknownCurveKind(s.trim().to_string()))
    }
}

/// A curve kind together with its validated parameter.
///
/// Deserialized curves go through [`Curve::new`], so a saved report cannot
/// carry a parameter the constructor would reject.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase", try_from = "UncheckedCurve")]
pub enum Curve {
    Sqrt,
    Log,
    Exp,
    Power { exponent: f64 },
    Sigmoid,
    Flat { points: f64 },
    StdDev { target_mean: f64 },
    ZScore,
    Ratio,
}

#[derive(Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
enum UncheckedCurve {
    Sqrt,
    Log,
    Exp,
    Power { exponent: f64 },
    Sigmoid,
    Flat { points: f64 },
    StdDev { target_mean: f64 },
    ZScore,
    Ratio,
}

impl TryFrom<UncheckedCurve> for Curve {
    type Error = CurveError;

    fn try_from(raw: UncheckedCurve) -> Result<Self, Self::Error> {
        let (kind, parameter) = match raw {
            UncheckedCurve::Sqrt => (CurveKind::Sqrt, None),
            UncheckedCurve::Log => (CurveKind::Log, None),
            UncheckedCurve::Exp => (CurveKind::Exp, None),
            UncheckedCurve::Power { exponent } => (CurveKind::Power, Some(exponent)),
            UncheckedCurve::Sigmoid => (CurveKind::Sigmoid, None),
            UncheckedCurve::Flat { points } => (CurveKind::Flat, Some(points)),
            UncheckedCurve::StdDev { target_mean } => (CurveKind::StdDev, Some(target_mean)),
            UncheckedCurve::ZScore => (CurveKind::ZScore, None),
            UncheckedCurve::Ratio => (CurveKind::Ratio, None),
        };
        Curve::new(kind, parameter)
    }
}

impl Curve {
    /// Build a curve from a kind and an optional parameter.
    ///
    /// Kinds that take no parameter ignore one if given.
    pub fn new(kind: CurveKind, parameter: Option<f64>) -> Result<Self, CurveError> {
        let required = || -> Result<f64, CurveError> {
            let value = parameter.ok_or_else(|| CurveError::InvalidParameter {
                kind,
                reason: "a numeric parameter is required".into(),
            })?;
            if !value.is_finite() {
                return Err(CurveError::InvalidParameter {
                    kind,
                    reason: format!("{value} is not a finite number"),
                });
            }
            Ok(value)
        };

        Ok(match kind {
            CurveKind::Sqrt => Curve::Sqrt,
            CurveKind::Log => Curve::Log,
            CurveKind::Exp => Curve::Exp,
            CurveKind::Sigmoid => Curve::Sigmoid,
            CurveKind::ZScore => Curve::ZScore,
            CurveKind::Ratio => Curve::Ratio,
            CurveKind::Power => {
                let exponent = required()?;
                if exponent < 0.0 {
                    return Err(CurveError::InvalidParameter {
                        kind,
                        reason: format!("exponent {exponent} must not be negative"),
                    });
                }
                Curve::Power { exponent }
            }
            CurveKind::Flat => Curve::Flat {
                points: required()?,
            },
            CurveKind::StdDev => {
                let target_mean = required()?;
                if !(MIN_SCORE..=MAX_SCORE).contains(&target_mean) {
                    return Err(CurveError::InvalidParameter {
                        kind,
                        reason: format!("target mean {target_mean} must be between 0 and 100"),
                    });
                }
                Curve::StdDev { target_mean }
            }
        })
    }

    /// Parse a kind name and build the curve in one step.
    pub fn parse(name: &str, parameter: Option<f64>) -> Result<Self, CurveError> {
        Curve::new(name.parse()?, parameter)
    }

    pub fn kind(&self) -> CurveKind {
        match self {
            Curve::Sqrt => CurveKind::Sqrt,
            Curve::Log => CurveKind::Log,
            Curve::Exp => CurveKind::Exp,
            Curve::Power { .. } => CurveKind::Power,
            Curve::Sigmoid => CurveKind::Sigmoid,
            Curve::Flat { .. } => CurveKind::Flat,
            Curve::StdDev { .. } => CurveKind::StdDev,
            Curve::ZScore => CurveKind::ZScore,
            Curve::Ratio => CurveKind::Ratio,
        }
    }

    pub fn parameter(&self) -> Option<f64> {
        match *self {
            Curve::Power { exponent } => Some(exponent),
            Curve::Flat { points } => Some(points),
            Curve::StdDev { target_mean } => Some(target_mean),
            _ => None,
        }
    }

    /// Curved value for a single score, for kinds that do not depend on the
    /// rest of the batch. Returns `None` for stddev, zscore, and ratio.
    pub fn point_value(&self, x: f64) -> Option<f64> {
        let x = x.max(MIN_SCORE);
        let y = match *self {
            Curve::Sqrt => x.sqrt() * 10.0,
            Curve::Log => 25.0 * (x + 1.0).ln(),
            Curve::Exp => ((x / 25.0).exp() - 1.0) * 20.0,
            Curve::Power { exponent } => (x / 100.0).powf(exponent) * 100.0,
            Curve::Sigmoid => 100.0 / (1.0 + (-0.1 * (x - 50.0)).exp()),
            Curve::Flat { points } => x + points,
            Curve::StdDev { .. } | Curve::ZScore | Curve::Ratio => return None,
        };
        Some(clamp_score(y))
    }
}

impl fmt::Display for Curve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.parameter() {
            Some(p) => write!(f, "{} ({p})", self.kind()),
            None => write!(f, "{}", self.kind()),
        }
    }
}

fn clamp_score(value: f64) -> f64 {
    if value.is_nan() {
        MIN_SCORE
    } else {
        value.clamp(MIN_SCORE, MAX_SCORE)
    }
}

/// A letter band assigned by the ratio curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Band {
    A,
    B,
    C,
    D,
    F,
}

impl Band {
    pub const ALL: [Band; 5] = [Band::A, Band::B, Band::C, Band::D, Band::F];

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self {
            Band::A => "A",
            Band::B => "B",
            Band::C => "C",
            Band::D => "D",
            Band::F => "F",
        };
        f.write_str(letter)
    }
}

/// Score written for each band by the ratio curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BandTable([f64; 5]);

impl BandTable {
    /// A=95, B=85, C=75, D=65, F=50.
    pub const STANDARD: BandTable = BandTable([95.0, 85.0, 75.0, 65.0, 50.0]);
    /// A=90, B=80, C=70, D=60, F=50.
    pub const TENS: BandTable = BandTable([90.0, 80.0, 70.0, 60.0, 50.0]);

    /// Build a table from scores for A, B, C, D, F in that order.
    ///
    /// Every score must lie in [0, 100] and no band may outscore the one above it.
    pub fn new(scores: [f64; 5]) -> Result<Self, CurveError> {
        if let Some(bad) = scores.iter().find(|s| crate::model::validate_score(**s).is_err()) {
            return Err(CurveError::InvalidBands(format!(
                "band score {bad} is outside 0-100"
            )));
        }
        if scores.windows(2).any(|w| w[1] > w[0]) {
            return Err(CurveError::InvalidBands(
                "band scores must not increase from A to F".into(),
            ));
        }
        Ok(Self(scores))
    }

    pub fn score(&self, band: Band) -> f64 {
        self.0[band.index()]
    }

    pub fn scores(&self) -> [f64; 5] {
        self.0
    }
}

impl Default for BandTable {
    fn default() -> Self {
        Self::STANDARD
    }
}

impl TryFrom<Vec<f64>> for BandTable {
    type Error = CurveError;

    fn try_from(scores: Vec<f64>) -> Result<Self, Self::Error> {
        let scores: [f64; 5] = scores.try_into().map_err(|v: Vec<f64>| {
            CurveError::InvalidBands(format!("expected 5 band scores, got {}", v.len()))
        })?;
        BandTable::new(scores)
    }
}

/// Rank scores descending and assign a band to each position.
///
/// Ties keep their input order. The returned vector is indexed like `values`.
pub fn rank_bands(values: &[f64]) -> Vec<Band> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[b].total_cmp(&values[a]));

    let sizes = band_sizes(values.len());
    let mut bands = vec![Band::F; values.len()];
    let mut ranked = order.into_iter();
    for (band, size) in Band::ALL.into_iter().zip(sizes) {
        for idx in ranked.by_ref().take(size) {
            bands[idx] = band;
        }
    }
    bands
}

/// Applies curves to score sets.
#[derive(Debug, Clone, Default)]
pub struct CurveEngine {
    bands: BandTable,
}

impl CurveEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different band table for the ratio curve.
    pub fn with_bands(mut self, bands: BandTable) -> Self {
        self.bands = bands;
        self
    }

    pub fn bands(&self) -> &BandTable {
        &self.bands
    }

    /// Curve every record in `set`. Returns the number of records written.
    ///
    /// On error no record is modified.
    pub fn apply(&self, set: &mut ScoreSet, curve: &Curve) -> Result<usize, CurveError> {
        if set.is_empty() {
            return Err(CurveError::EmptyInput);
        }

        match *curve {
            Curve::StdDev { target_mean } => {
                let (mean, _) = spread(set, curve.kind())?;
                for record in set.iter_mut() {
                    let curved = record.original() - mean + target_mean;
                    record.assign(curved);
                }
            }
            Curve::ZScore => {
                let (mean, std_dev) = spread(set, curve.kind())?;
                for record in set.iter_mut() {
                    let z = (record.original() - mean) / std_dev;
                    record.assign(z * ZSCORE_TARGET_STD_DEV + ZSCORE_TARGET_MEAN);
                }
            }
            Curve::Ratio => {
                let bands = rank_bands(&set.originals());
                for (record, band) in set.iter_mut().zip(bands) {
                    record.assign(self.bands.score(band));
                }
            }
            _ => {
                for record in set.iter_mut() {
                    if let Some(curved) = curve.point_value(record.original()) {
                        record.assign(curved);
                    }
                }
            }
        }

        tracing::debug!("applied {} curve to {} records", curve, set.len());
        Ok(set.len())
    }
}

/// Mean and population standard deviation, refusing a degenerate batch.
fn spread(set: &ScoreSet, kind: CurveKind) -> Result<(f64, f64), CurveError> {
    let values = set.originals();
    let mean = mean(&values).ok_or(CurveError::EmptyInput)?;
    let std_dev = population_std_dev(&values, mean);
    if is_degenerate(&values, std_dev) {
        tracing::warn!("refusing {kind} curve: standard deviation is zero");
        return Err(CurveError::DegenerateDistribution { kind, mean });
    }
    tracing::debug!("batch mean {mean:.4}, population std dev {std_dev:.4}");
    Ok((mean, std_dev))
}

/// Curve a set with the standard band table.
pub fn apply_curve(set: &mut ScoreSet, curve: &Curve) -> Result<usize, CurveError> {
    CurveEngine::new().apply(set, curve)
}
