//! The `gradecurve stats` command.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use comfy_table::{Cell, Table};
use serde_json::json;

use gradecurve_core::config::load_config_from;
use gradecurve_core::curve::{rank_bands, Band};
use gradecurve_core::statistics::ScoreStats;
use gradecurve_core::tabular::load_scores;

use crate::InputArgs;

pub fn execute(
    input: PathBuf,
    input_args: InputArgs,
    format: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let schema = super::resolve_schema(input_args, &config);
    let bands_table = config.band_table()?;

    let loaded = load_scores(&input, &schema)
        .with_context(|| format!("cannot read {}", input.display()))?;
    let values = loaded.records.originals();
    let stats = ScoreStats::compute(&values)
        .with_context(|| format!("no valid scores in {}", input.display()))?;

    let mut band_counts: BTreeMap<Band, usize> = Band::ALL.iter().map(|b| (*b, 0)).collect();
    for band in rank_bands(&values) {
        *band_counts.entry(band).or_default() += 1;
    }

    match format.as_str() {
        "json" => {
            let bands: Vec<_> = band_counts
                .iter()
                .map(|(band, count)| {
                    json!({
                        "band": band.to_string(),
                        "count": count,
                        "score": bands_table.score(*band),
                    })
                })
                .collect();
            let doc = json!({
                "stats": stats,
                "skipped": loaded.skipped.len(),
                "bands": bands,
            });
            println!("{}", serde_json::to_string_pretty(&doc)?);
        }
        _ => {
            println!(
                "{}: {} scores ({} lines skipped)",
                input.display(),
                stats.count,
                loaded.skipped.len()
            );
            println!(
                "  mean {:.2}, std dev {:.2}, min {:.2}, max {:.2}",
                stats.mean, stats.std_dev, stats.min, stats.max
            );

            let mut table = Table::new();
            table.set_header(vec!["Band", "Count", "Ratio score"]);
            for (band, count) in &band_counts {
                table.add_row(vec![
                    Cell::new(band),
                    Cell::new(count),
                    Cell::new(format!("{:.2}", bands_table.score(*band))),
                ]);
            }
            println!("{table}");
        }
    }

    Ok(())
}
