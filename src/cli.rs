use crate::combiner::LineEncoding;
use crate::config::{CliOverrides, Config};
use crate::error::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "csv-combine")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Concatenate CSV-like files, writing their shared header once")]
#[command(
    long_about = "csv-combine appends the data lines of several delimited text files into one \
                  output file. The header is detected by comparing the first line of the first \
                  two files (or fixed with --header-lines) and written only once; files with a \
                  different header are still included and reported."
)]
#[command(after_help = "EXAMPLES:\n  \
    csv-combine all.csv 'exports/*.csv'\n  \
    csv-combine all.csv jan.csv feb.csv mar.csv --header-lines 2\n  \
    csv-combine all.csv 'data/**/*.csv' --encoding latin1 -v\n  \
    csv-combine all.csv 'exports/*.csv' --output-format json --report report.json")]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Path to combination file
    #[arg(required_unless_present = "generate_config")]
    pub target_file: Option<PathBuf>,

    /// Source files - unix globbing supported (* and ? allowed)
    pub sources: Vec<String>,

    /// Number of leading lines that form the header
    #[arg(long, value_name = "N", help = "Fixed header length instead of auto-detection")]
    pub header_lines: Option<usize>,

    /// Line encoding
    #[arg(
        short,
        long,
        value_parser = validate_encoding,
        help = "'bytes' to copy lines verbatim, or a text encoding (e.g. utf-8, latin1)"
    )]
    pub encoding: Option<String>,

    /// Configuration file path
    #[arg(short, long, help = "Path to TOML configuration file")]
    pub config: Option<PathBuf>,

    /// Output format for results
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub output_format: OutputFormat,

    /// Write a JSON report of the run to this file
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,

    /// Verbose output level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-essential output)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Hide the progress bar
    #[arg(long)]
    pub no_progress: bool,

    /// Dry run (show what would be done without executing)
    #[arg(long, help = "Resolve sources and detect the header without writing")]
    pub dry_run: bool,

    /// Generate sample configuration file
    #[arg(long, help = "Generate a sample configuration file")]
    pub generate_config: bool,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable colored output
    Human,
    /// JSON formatted output
    Json,
    /// Plain text output
    Plain,
}

impl Cli {
    pub fn load_config(&self) -> Result<Config> {
        let mut config = Config::load_with_defaults(self.config.as_ref())?;

        let overrides = self.create_cli_overrides();
        config.merge_with_cli_args(&overrides);
        config.validate()?;

        Ok(config)
    }

    pub fn create_cli_overrides(&self) -> CliOverrides {
        CliOverrides::new()
            .with_encoding(self.encoding.clone())
            .with_header_lines(self.header_lines)
            .with_show_progress(if self.no_progress || self.quiet {
                Some(false)
            } else {
                None
            })
            .with_report_file(self.report.clone())
    }

    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }
}

pub fn validate_encoding(s: &str) -> std::result::Result<String, String> {
    LineEncoding::from_label(s)
        .map(|_| s.trim().to_string())
        .map_err(|e| e.to_string())
}
