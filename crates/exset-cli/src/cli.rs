//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "exset",
    version,
    about = "Convert and inspect example set files",
    long_about = "Convert example sets between the encoded text pair \
                  (.csv-encoded + .pmd-encoded) and the binary .rmhdf5table format."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format.
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Encode a text pair into a table file.
    Encode(EncodeArgs),

    /// Decode a table file into a text pair.
    Decode(DecodeArgs),

    /// Convert a CSV file with a header row into a table file or text pair.
    Convert(ConvertArgs),

    /// Show the column layout of a table file.
    Inspect(InspectArgs),
}

#[derive(Args)]
pub struct EncodeArgs {
    /// Base path of the text pair (`<BASE>.csv-encoded`, `<BASE>.pmd-encoded`).
    #[arg(value_name = "BASE")]
    pub input: PathBuf,

    /// Table file to write (`.rmhdf5table` is added when missing).
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,
}

#[derive(Args)]
pub struct DecodeArgs {
    /// Table file to read.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Base path of the text pair to write.
    #[arg(value_name = "BASE")]
    pub output: PathBuf,

    /// Truncate time values to one day and dates to whole days.
    #[arg(long = "date-time-compat")]
    pub date_time_compat: bool,
}

#[derive(Args)]
pub struct ConvertArgs {
    /// CSV file with a header row.
    #[arg(value_name = "CSV")]
    pub input: PathBuf,

    /// Output path: a table file, or a text pair base with `--to text`.
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,

    /// Output format.
    #[arg(long = "to", value_enum, default_value = "table")]
    pub to: TargetArg,

    /// JSON file mapping column names to `[type, role]` pairs.
    #[arg(long = "annotations", value_name = "JSON")]
    pub annotations: Option<PathBuf>,

    /// Truncate time values to one day and dates to whole days (text output).
    #[arg(long = "date-time-compat")]
    pub date_time_compat: bool,
}

#[derive(Args)]
pub struct InspectArgs {
    /// Table file to inspect.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum TargetArg {
    Table,
    Text,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
