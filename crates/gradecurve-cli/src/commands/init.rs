//! The `gradecurve init` command.

use std::path::Path;

use anyhow::Result;

use gradecurve_core::config::CONFIG_FILE_NAME;

const SAMPLE_SCORES_FILE: &str = "sample-scores.csv";

pub fn execute() -> Result<()> {
    write_if_missing(CONFIG_FILE_NAME, SAMPLE_CONFIG)?;
    write_if_missing(SAMPLE_SCORES_FILE, SAMPLE_SCORES)?;

    println!("\nNext steps:");
    println!("  1. Edit {CONFIG_FILE_NAME} to match your gradebook layout");
    println!("  2. Run: gradecurve validate --input {SAMPLE_SCORES_FILE} --header");
    println!(
        "  3. Run: gradecurve curve --input {SAMPLE_SCORES_FILE} --header --output curved.csv --kind flat --value 5"
    );

    Ok(())
}

fn write_if_missing(path: &str, content: &str) -> Result<()> {
    if Path::new(path).exists() {
        println!("{path} already exists, skipping.");
    } else {
        std::fs::write(path, content)?;
        println!("Created {path}");
    }
    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# gradecurve configuration

[input]
# Skip the first line of every scores file.
has_header = false
# Rows are student,class,score instead of student,score.
class_column = false

[output]
# "overwrite" writes student,curved
# "preserve-original" writes student,original,curved
mode = "overwrite"

[ratio]
# Scores written for bands A, B, C, D, F.
bands = [95.0, 85.0, 75.0, 65.0, 50.0]
"#;

const SAMPLE_SCORES: &str = "student,score
S001,92
S002,85.5
S003,78
S004,71
S005,64
S006,88
S007,59
S008,73
S009,81
S010,67
";
