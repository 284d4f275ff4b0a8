use std::path::PathBuf;

use clap::Parser;

use crate::closure::build_tool::DEFAULT_TIMEOUT_SECS;

#[derive(Parser, Debug)]
#[command(
    name = "license-report",
    about = "Create a license report for the source files of a build",
    version
)]
pub struct Cli {
    /// Build directory containing "build.ninja" [default: current directory]
    pub build_directory: Option<PathBuf>,

    /// Config file [default: <root>/.license-report/config.yaml, fallback ~/.config/license-report/config.yaml]
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Scan every file below DIR instead of asking the build tool
    #[arg(long, value_name = "DIR", conflicts_with_all = ["build_directory", "deps_file", "targets_file"])]
    pub walk: Option<PathBuf>,

    /// File type mode used with --walk
    #[arg(long, default_value = "global")]
    pub mode: String,

    /// Pre-generated dependency records (output of `ninja -t deps`)
    #[arg(long, value_name = "FILE")]
    pub deps_file: Option<PathBuf>,

    /// Pre-generated source list (output of `ninja -t targets rule`)
    #[arg(long, value_name = "FILE")]
    pub targets_file: Option<PathBuf>,

    /// Build tool executable
    #[arg(long, default_value = "ninja", value_name = "PROGRAM")]
    pub ninja: String,

    /// Build tool timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS, value_name = "SECS")]
    pub timeout: u64,

    /// Report format
    #[arg(long, default_value = "terminal", value_name = "FORMAT")]
    pub report: ReportFormat,

    /// Also list buckets that hold no files
    #[arg(short, long)]
    pub verbose: bool,

    /// Only print summary line
    #[arg(short, long)]
    pub quiet: bool,

    /// Show details in case of error (for debugging purpose)
    #[arg(long)]
    pub debug: bool,

    /// Log filter, e.g. `info` or `license_report=debug`
    #[arg(long, default_value = "warn", value_name = "FILTER")]
    pub log_level: String,
}

#[derive(Debug, Clone, clap::ValueEnum)]
pub enum ReportFormat {
    Terminal,
    Json,
}
