use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use log::LevelFilter;
use scholar_logging::LogDestination;

/// Submit a scholar search job and follow its progress.
///
/// Without --query the form is read from stdin: a query line followed by a
/// page-count line, repeatedly. Enter `download` as the query to fetch the
/// result file of the last completed job.
#[derive(Debug, Clone, Parser)]
#[command(name = "scholar", version)]
pub struct Cli {
    /// Server root URL.
    #[arg(long, value_name = "URL")]
    pub server: Option<String>,

    /// Search query; runs a single job and exits.
    #[arg(long, short)]
    pub query: Option<String>,

    /// Number of result pages to scrape.
    #[arg(long, short, value_name = "N")]
    pub pages: Option<String>,

    /// Directory the result file is saved into.
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// File name for the saved result.
    #[arg(long, value_name = "NAME")]
    pub filename: Option<String>,

    /// Download the result file once the job completes.
    #[arg(long)]
    pub download: bool,

    /// Timeout for job submission and download, in seconds.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// RON config file (defaults to ./scholar.ron when present).
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Where log output goes.
    #[arg(long, value_enum, default_value_t = LogTarget::File)]
    pub log: LogTarget,

    /// Minimum log level.
    #[arg(long, default_value = "info")]
    pub log_level: LevelFilter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogTarget {
    File,
    Terminal,
    Both,
    Off,
}

impl From<LogTarget> for LogDestination {
    fn from(target: LogTarget) -> Self {
        match target {
            LogTarget::File => LogDestination::File,
            LogTarget::Terminal => LogDestination::Terminal,
            LogTarget::Both => LogDestination::Both,
            LogTarget::Off => LogDestination::Off,
        }
    }
}

impl Cli {
    /// A query or page count on the command line means a single scripted run.
    pub fn is_one_shot(&self) -> bool {
        self.query.is_some() || self.pages.is_some()
    }
}
