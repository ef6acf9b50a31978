//! # sheet-flattener
//!
//! Command-line front end: flattens one workbook and writes the export next
//! to it or into `--output-dir`.
use anyhow::{Context, Result};
use clap::Parser;
use sheet_flattener::{convert, write_to_dir, Criteria, ExportFormat, Options};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Flatten market tables of a workbook into one table
#[derive(Parser)]
#[command(name = "sheet-flattener")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Workbook to convert (.xlsx, .xlsm, .ods)
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "csv")]
    format: ExportFormat,

    /// Directory receiving the output file
    #[arg(short = 'o', long = "output-dir", default_value = ".")]
    output_dir: PathBuf,

    /// Only read sheets matching this glob pattern (repeatable)
    #[arg(short = 's', long = "sheet", value_name = "GLOB")]
    sheets: Vec<String>,

    /// Maximum number of rows read per sheet
    #[arg(long = "rows-limit")]
    rows_limit: Option<usize>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
            .with_writer(std::io::stderr)
            .init();
    }

    let patterns = cli
        .sheets
        .iter()
        .map(|pattern| glob::Pattern::new(pattern).with_context(|| format!("Invalid sheet pattern: '{pattern}'")))
        .collect::<Result<Vec<_>>>()?;
    let options = Options {
        criteria: Criteria {
            sheet_name_patterns: (!patterns.is_empty()).then_some(patterns),
            sheet_limit: None,
            rows_limit: cli.rows_limit,
        },
        ..Options::default()
    };

    let bytes = std::fs::read(&cli.file).with_context(|| format!("Failed to read file: {}", cli.file.display()))?;
    let file_name = cli.file.file_name().and_then(|name| name.to_str()).unwrap_or("workbook");
    let result = convert(&bytes, file_name, bytes.len() as u64, &options)?;

    for event in &result.log {
        eprintln!("{event}");
    }
    let path = write_to_dir(&result, cli.format, &cli.output_dir, file_name)?;
    println!("{}", path.display());
    Ok(())
}
