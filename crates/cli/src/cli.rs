//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use contracts::{MotionStage, Subject};
use std::path::PathBuf;

/// kinetrace - skeletal motion capture and processing
#[derive(Parser, Debug)]
#[command(
    name = "kinetrace",
    author,
    version,
    about = "Skeletal motion capture and processing pipeline",
    long_about = "Records takes from a body-tracking pose source, resamples, smooths and \n\
                  limb-normalizes them, and writes the results to the configured sinks \n\
                  (binary store, TRC marker files, sequence logs)."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "KINETRACE_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "KINETRACE_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Record one take from the live pose source and process it
    Capture(CaptureArgs),

    /// Generate takes offline at full speed and process them
    Process(ProcessArgs),

    /// Export a stored archive to TRC and text reports
    Export(ExportArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display body model and configuration information
    Info(InfoArgs),
}

/// Arguments for the `capture` command
#[derive(Parser, Debug, Clone)]
pub struct CaptureArgs {
    /// Path to configuration file (TOML or JSON); built-in defaults when omitted
    #[arg(short, long, env = "KINETRACE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the recorded subject
    #[arg(long, value_enum)]
    pub subject: Option<SubjectArg>,

    /// Override the idle time before recording starts (seconds)
    #[arg(long, env = "KINETRACE_LEAD_IN")]
    pub lead_in: Option<f64>,

    /// Override the recording length (seconds)
    #[arg(long, env = "KINETRACE_RECORD")]
    pub record: Option<f64>,

    /// Also write the whole archive to this store file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Give up when the source stays silent this long (seconds)
    #[arg(long, default_value = "5", env = "KINETRACE_SOURCE_TIMEOUT")]
    pub source_timeout: u64,

    /// Validate configuration and exit without capturing
    #[arg(long)]
    pub dry_run: bool,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "KINETRACE_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `process` command
#[derive(Parser, Debug, Clone)]
pub struct ProcessArgs {
    /// Path to configuration file (TOML or JSON); built-in defaults when omitted
    #[arg(short, long, env = "KINETRACE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Subjects to record, in order
    #[arg(long, value_enum, num_args = 1.., default_values_t = [SubjectArg::Athlete])]
    pub subjects: Vec<SubjectArg>,

    /// Seed of the synthetic pose generator
    #[arg(long, default_value = "7")]
    pub seed: u64,

    /// Override the smoothing half-window
    #[arg(long)]
    pub delay_depth: Option<usize>,

    /// Also write the whole archive to this store file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Print limb length tables before and after adjustment
    #[arg(long)]
    pub limbs: bool,
}

/// Arguments for the `export` command
#[derive(Parser, Debug, Clone)]
pub struct ExportArgs {
    /// Store file written by `capture` or `process`
    #[arg(short, long)]
    pub input: PathBuf,

    /// Subject to export
    #[arg(long, value_enum, default_value = "athlete")]
    pub subject: SubjectArg,

    /// Stage to export
    #[arg(long, value_enum, default_value = "adjusted")]
    pub stage: StageArg,

    /// Write a TRC marker file
    #[arg(long)]
    pub trc: Option<PathBuf>,

    /// TRC frame rate; derived from the frame timestamps when omitted
    #[arg(long)]
    pub rate: Option<f64>,

    /// Write the per-stage sequence log
    #[arg(long)]
    pub sequence_log: Option<PathBuf>,

    /// Print the limb length table of the exported stage
    #[arg(long)]
    pub limbs: bool,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "kinetrace.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file; built-in defaults when omitted
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Show the joint hierarchy
    #[arg(long)]
    pub joints: bool,

    /// Show the limb table
    #[arg(long)]
    pub limbs: bool,

    /// Show sink configuration
    #[arg(long)]
    pub sinks: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => observability::LogFormat::Json,
            LogFormat::Pretty => observability::LogFormat::Pretty,
            LogFormat::Compact => observability::LogFormat::Compact,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubjectArg {
    Athlete,
    Trainer,
}

impl From<SubjectArg> for Subject {
    fn from(arg: SubjectArg) -> Self {
        match arg {
            SubjectArg::Athlete => Subject::Athlete,
            SubjectArg::Trainer => Subject::Trainer,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum StageArg {
    Raw,
    Interpolated,
    Filtered,
    Adjusted,
}

impl From<StageArg> for MotionStage {
    fn from(arg: StageArg) -> Self {
        match arg {
            StageArg::Raw => MotionStage::Raw,
            StageArg::Interpolated => MotionStage::Interpolated,
            StageArg::Filtered => MotionStage::Filtered,
            StageArg::Adjusted => MotionStage::Adjusted,
        }
    }
}
