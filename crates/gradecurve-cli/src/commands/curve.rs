//! The `gradecurve curve` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use gradecurve_core::config::load_config_from;
use gradecurve_core::orchestrator::CurveSummary;
use gradecurve_core::report::CurveReport;
use gradecurve_core::tabular::{OutputMode, SkippedLine};
use gradecurve_core::{CurveOrchestrator, CurveOutcome, CurveRequest};

use crate::InputArgs;

#[allow(clippy::too_many_arguments)]
pub fn execute(
    input: PathBuf,
    output: PathBuf,
    kind: String,
    value: Option<f64>,
    input_args: InputArgs,
    preserve_original: bool,
    report_path: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let schema = super::resolve_schema(input_args, &config);
    let output_mode = if preserve_original {
        OutputMode::PreserveOriginal
    } else {
        config.output.mode
    };

    let request = CurveRequest::new(input, output, kind, value)
        .with_schema(schema)
        .with_output_mode(output_mode);
    let orchestrator = CurveOrchestrator::with_engine(config.engine()?);

    match orchestrator.run(&request) {
        CurveOutcome::Curved(summary) => {
            print_skipped(&summary.skipped);
            print_summary(&summary);

            if let Some(path) = &report_path {
                CurveReport::from_summary(&summary).save_json(path)?;
                eprintln!("Report saved to: {}", path.display());
            }
            Ok(())
        }
        CurveOutcome::Failed(failure) => {
            print_skipped(&failure.skipped);
            if failure.reason.is_pre_mutation() {
                eprintln!("{} left unchanged.", request.destination.display());
            } else {
                eprintln!("{} may be partially written.", request.destination.display());
            }
            Err(anyhow::Error::new(failure.reason).context("curve run failed"))
        }
    }
}

fn print_skipped(skipped: &[SkippedLine]) {
    for s in skipped {
        eprintln!("  Skipped {}", s.to_error());
    }
}

fn print_summary(summary: &CurveSummary) {
    let mut table = Table::new();
    table.set_header(vec!["", "Before", "After"]);

    let passing_before = summary
        .results
        .iter()
        .filter(|r| r.original() >= gradecurve_core::model::PASSING_SCORE)
        .count();
    let passing_after = summary.results.iter().filter(|r| r.is_passing()).count();

    let rows = [
        ("Mean", summary.before.mean, summary.after.mean),
        ("Std dev", summary.before.std_dev, summary.after.std_dev),
        ("Min", summary.before.min, summary.after.min),
        ("Max", summary.before.max, summary.after.max),
    ];
    for (label, before, after) in rows {
        table.add_row(vec![
            Cell::new(label),
            Cell::new(format!("{before:.2}")),
            Cell::new(format!("{after:.2}")),
        ]);
    }
    table.add_row(vec![
        Cell::new("Passing"),
        Cell::new(passing_before),
        Cell::new(passing_after),
    ]);

    println!("{table}");
    println!(
        "Applied {} curve to {} records ({} changed, {} lines skipped).",
        summary.curve,
        summary.curved,
        summary.changed,
        summary.skipped.len()
    );
    println!("Curved scores saved to: {}", summary.destination.display());
}
