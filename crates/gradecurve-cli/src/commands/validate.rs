//! The `gradecurve validate` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use gradecurve_core::config::load_config_from;
use gradecurve_core::tabular::load_scores;

use crate::InputArgs;

pub fn execute(input: PathBuf, input_args: InputArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let schema = super::resolve_schema(input_args, &config);

    let loaded = load_scores(&input, &schema)
        .with_context(|| format!("cannot validate {}", input.display()))?;

    println!(
        "{}: {} valid records, {} skipped",
        input.display(),
        loaded.records.len(),
        loaded.skipped.len()
    );
    for skipped in &loaded.skipped {
        println!("  {} ({:?})", skipped.to_error(), skipped.text);
    }

    if loaded.records.is_empty() {
        println!("No valid records; a curve run on this file would fail.");
    } else if loaded.skipped.is_empty() {
        println!("All lines valid.");
    }

    Ok(())
}
