//! `gradecurve.toml` configuration.
//!
//! The core itself only takes explicit arguments; this file supplies
//! defaults for the command-line front-end.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::curve::{BandTable, CurveEngine};
use crate::tabular::{KeyLayout, OutputMode, Schema};

/// File name searched for in the current directory.
pub const CONFIG_FILE_NAME: &str = "gradecurve.toml";

/// Top-level gradecurve configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GradecurveConfig {
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub ratio: RatioConfig,
}

/// How scores files are read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputConfig {
    /// First line is a header and is skipped.
    #[serde(default)]
    pub has_header: bool,
    /// Rows are `student,class,score` instead of `student,score`.
    #[serde(default)]
    pub class_column: bool,
}

/// How curved results are written.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub mode: OutputMode,
}

/// Ratio curve settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatioConfig {
    /// Scores for bands A, B, C, D, F.
    #[serde(default = "default_bands")]
    pub bands: Vec<f64>,
}

fn default_bands() -> Vec<f64> {
    BandTable::STANDARD.scores().to_vec()
}

impl Default for RatioConfig {
    fn default() -> Self {
        Self {
            bands: default_bands(),
        }
    }
}

impl GradecurveConfig {
    /// Parse and validate a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: GradecurveConfig = toml::from_str(content).context("failed to parse config TOML")?;
        config.band_table()?;
        Ok(config)
    }

    /// Input schema described by the `[input]` section.
    pub fn schema(&self) -> Schema {
        let key = if self.input.class_column {
            KeyLayout::StudentClass
        } else {
            KeyLayout::Student
        };
        Schema {
            key,
            has_header: self.input.has_header,
            ..Schema::default()
        }
    }

    pub fn band_table(&self) -> Result<BandTable> {
        BandTable::try_from(self.ratio.bands.clone()).context("invalid [ratio] bands")
    }

    /// A curve engine using the configured band table.
    pub fn engine(&self) -> Result<CurveEngine> {
        Ok(CurveEngine::new().with_bands(self.band_table()?))
    }
}

/// Load configuration from `./gradecurve.toml`, or defaults if absent.
pub fn load_config() -> Result<GradecurveConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the current directory.
///
/// An explicit path that does not exist is an error.
pub fn load_config_from(path: Option<&Path>) -> Result<GradecurveConfig> {
    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => anyhow::bail!("config file not found: {}", p.display()),
        None => {
            let local = PathBuf::from(CONFIG_FILE_NAME);
            local.exists().then_some(local)
        }
    };

    let Some(config_path) = config_path else {
        tracing::debug!("no config file found, using defaults");
        return Ok(GradecurveConfig::default());
    };

    let content = std::fs::read_to_string(&config_path)
        .with_context(|| format!("failed to read config: {}", config_path.display()))?;
    let config = GradecurveConfig::from_toml_str(&content)
        .with_context(|| format!("invalid config: {}", config_path.display()))?;
    tracing::debug!("loaded config from {}", config_path.display());
    Ok(config)
}
