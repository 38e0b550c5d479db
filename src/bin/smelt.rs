//! smelt: Split a JSON document into relational CSV tables
//!
//! Usage:
//!   # Read from stdin, write tables to the current directory
//!   echo '{"name": "Alice", "tags": ["a", "b"]}' | smelt
//!
//!   # Read from a file, write tables to ./tables
//!   smelt data.json --out-dir tables
//!
//!   # Show the parsed tree before converting
//!   smelt --print-ast < data.json
//!
//!   # Print a JSON summary of the written and skipped tables
//!   smelt data.json --report

// Use MiMalloc allocator for better performance (recommended by simd-json)
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use anyhow::{Context, Result};
use clap::Parser;
use smelt::{ConvertConfig, Node};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "smelt")]
#[command(about = "Split a JSON document into relational CSV tables", long_about = None)]
struct Args {
    /// Input file (use stdin if omitted)
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Print the parsed tree before converting
    #[arg(long)]
    print_ast: bool,

    /// Directory for the CSV files (created if missing, one level only)
    #[arg(long, visible_alias = "output-dir", value_name = "DIR", default_value = ".")]
    out_dir: PathBuf,

    /// Significant digits for numeric cells
    #[arg(long, default_value_t = smelt::naming::DEFAULT_PRECISION)]
    precision: usize,

    /// Print a JSON report of written and skipped tables to stdout
    #[arg(long)]
    report: bool,

    /// Log each table as it is discovered and written
    #[arg(long, short = 'v')]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let root = read_input(args.input.as_ref())?;

    if args.print_ast {
        println!("{}", root);
    }

    let config = ConvertConfig::default()
        .with_output_dir(args.out_dir)
        .with_number_precision(args.precision);

    let report = smelt::convert(&root, &config)?;

    if args.report {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    if !report.is_complete() {
        eprintln!(
            "⚠ Warning: {} of {} tables could not be written",
            report.skipped.len(),
            report.skipped.len() + report.written.len()
        );
        for skipped in &report.skipped {
            eprintln!("  {}: {}", skipped.path.display(), skipped.error);
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Parse the document from a file or stdin
fn read_input(input: Option<&PathBuf>) -> Result<Node> {
    let mut reader = match input {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("Failed to open {}", path.display()))?,
        )) as Box<dyn Read>,
        None => Box::new(std::io::stdin()) as Box<dyn Read>,
    };

    smelt::read_document(&mut reader).context("Parsing failed")
}
