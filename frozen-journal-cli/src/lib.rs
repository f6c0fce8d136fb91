pub mod sink;
pub mod storage;

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use crate::sink::{CsvSink, JsonArraySink, JsonlSink, Sink, TextSink};

/// Output encoding for decoded events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One human-readable line per event (default).
    Text,
    /// Newline-delimited JSON, one object per line.
    Jsonl,
    /// A single pretty-printed JSON array.
    Json,
    /// RFC 4180 CSV.
    Csv,
}

/// Decode a frozen bucket's journal to text, JSON, or CSV.
#[derive(Debug, Parser)]
#[command(name = "frozen-journal", version, about)]
pub struct Args {
    /// Path to a frozen bucket directory, a directory tree containing several, or a
    /// `gs://bucket/prefix` URI.
    pub input: String,

    /// Output file; defaults to stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format.
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Overwrite the output file if it already exists.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub force: bool,

    /// Print a per-bucket decode summary (event count, elapsed time) to stderr.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub report: bool,

    /// Increase log verbosity; repeat for more detail (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Initializes `env_logger` at a level derived from `-v` repeat count.
pub fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    let _ = env_logger::Builder::new()
        .filter_level(level)
        .format_timestamp_millis()
        .try_init();
}

/// Opens the output destination named by `args`, honoring `--force`.
pub fn output_writer(args: &Args) -> Result<Box<dyn Write>> {
    match &args.output {
        Some(path) => {
            let file = File::options()
                .write(true)
                .create(true)
                .create_new(!args.force)
                .truncate(args.force)
                .open(path)
                .with_context(|| format!("failed to open output file {}", path.display()))?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(BufWriter::new(io::stdout()))),
    }
}

/// Builds the sink matching `format`, writing to `writer`.
pub fn make_sink(format: OutputFormat, writer: Box<dyn Write>) -> Box<dyn Sink> {
    match format {
        OutputFormat::Text => Box::new(TextSink::new(writer)),
        OutputFormat::Jsonl => Box::new(JsonlSink::new(writer)),
        OutputFormat::Json => Box::new(JsonArraySink::new(writer)),
        OutputFormat::Csv => Box::new(CsvSink::new(writer)),
    }
}
