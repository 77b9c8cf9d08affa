//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;

/// tp - guided trip planner
#[derive(Parser)]
#[command(
    name = "tp",
    about = "Plan a trip against the recommendation service: destinations, activities, itinerary",
    version,
    after_help = "Logs are written to: ~/.local/share/tripplanner/logs/tripplanner.log"
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check that the recommendation service is reachable
    Health,

    /// List the questionnaire steps in order
    Steps,

    /// Check a traveler profile against every questionnaire rule
    Validate {
        /// Traveler profile (YAML)
        profile: PathBuf,

        /// Itinerary preferences (YAML)
        #[arg(short, long)]
        itinerary: Option<PathBuf>,
    },

    /// Run the whole flow: recommend, suggest, generate
    Plan {
        /// Traveler profile (YAML)
        profile: PathBuf,

        /// Itinerary preferences (YAML)
        #[arg(short, long)]
        itinerary: Option<PathBuf>,

        /// Which recommended destination to pick (1-based)
        #[arg(short, long, default_value = "1")]
        destination: usize,

        /// How many suggested activities to select (default: all)
        #[arg(short, long)]
        activities: Option<usize>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Show results saved by the last session
    Status {
        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Discard saved results and start over
    Reset,
}

/// Output format for commands that print results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        debug!(%s, "OutputFormat::from_str: called");
        match s.to_lowercase().as_str() {
            "text" | "plain" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => {
                debug!(%s, "OutputFormat::from_str: unknown format");
                Err(format!("Unknown format: {}. Use 'text' or 'json'", s))
            }
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// Log file location
pub fn get_log_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tripplanner")
        .join("logs")
        .join("tripplanner.log")
}
