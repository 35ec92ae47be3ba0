//! `gradecurve`: curve, validate and inspect score files from the shell.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "gradecurve", version, about = "Batch score curving for class gradebooks")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Column layout flags shared by commands that read a scores file.
#[derive(clap::Args, Clone, Copy)]
pub struct InputArgs {
    /// Skip the first line of the input
    #[arg(long)]
    header: bool,

    /// Rows are student,class,score instead of student,score
    #[arg(long)]
    class_column: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Curve a scores file
    Curve {
        /// Scores file to read
        #[arg(long)]
        input: PathBuf,

        /// File to write curved scores to (may equal --input)
        #[arg(long)]
        output: PathBuf,

        /// Curve kind: flat, sqrt, log, exp, power, sigmoid, zscore, stddev, ratio
        #[arg(long)]
        kind: String,

        /// Parameter for flat (points), power (exponent), stddev (target mean)
        #[arg(long, allow_negative_numbers = true)]
        value: Option<f64>,

        #[command(flatten)]
        input_args: InputArgs,

        /// Write student,original,curved instead of student,curved
        #[arg(long)]
        preserve_original: bool,

        /// Save a JSON run report to this path
        #[arg(long)]
        report: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Check a scores file and list lines that would be skipped
    Validate {
        /// Scores file to read
        #[arg(long)]
        input: PathBuf,

        #[command(flatten)]
        input_args: InputArgs,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Show summary statistics and the ratio band split for a scores file
    Stats {
        /// Scores file to read
        #[arg(long)]
        input: PathBuf,

        #[command(flatten)]
        input_args: InputArgs,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Describe the available curve kinds
    Kinds,

    /// Create a starter config and sample scores file
    Init,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("gradecurve_core=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Curve {
            input,
            output,
            kind,
            value,
            input_args,
            preserve_original,
            report,
            config,
        } => commands::curve::execute(
            input,
            output,
            kind,
            value,
            input_args,
            preserve_original,
            report,
            config,
        ),
        Commands::Validate {
            input,
            input_args,
            config,
        } => commands::validate::execute(input, input_args, config),
        Commands::Stats {
            input,
            input_args,
            format,
            config,
        } => commands::stats::execute(input, input_args, format, config),
        Commands::Kinds => commands::kinds::execute(),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
