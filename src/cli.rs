//! CLI - Command Line Interface for CineGraph
//!
//! Every screen of the TUI is also scriptable. All output is JSON-parseable.
//!
//! # Examples
//!
//! ```bash
//! # Search and inspect
//! cinegraph search "the batman" --json
//! cinegraph info 414906 --region GB
//!
//! # Region preference
//! cinegraph region set IN
//! cinegraph region list
//! ```

use clap::{Args, Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::io::IsTerminal;
use std::path::PathBuf;

// =============================================================================
// Exit Codes
// =============================================================================

/// Exit codes for CLI operations (semantic for scripting)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Success
    Success = 0,
    /// General error
    Error = 1,
    /// Invalid arguments
    InvalidArgs = 2,
    /// Network error
    NetworkError = 3,
    /// Title not found
    NotFound = 4,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> i32 {
        code as i32
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> std::process::ExitCode {
        std::process::ExitCode::from(code as u8)
    }
}

// =============================================================================
// Main CLI Structure
// =============================================================================

/// CineGraph - find a movie, see where to watch it, get similar picks
///
/// Run without arguments to launch interactive TUI.
/// Use subcommands for scriptable automation.
#[derive(Parser, Debug)]
#[command(
    name = "cinegraph",
    version,
    about = "Movie discovery: search, trending, where to watch, similar titles",
    long_about = "Search movies, browse what's trending, see where a title \
                  streams in your country and discover similar titles.\n\n\
                  Run without arguments to launch the interactive TUI.\n\
                  Use subcommands for automation and scripting.",
    after_help = "EXAMPLES:\n\
                  cinegraph                          Launch interactive TUI\n\
                  cinegraph search \"blade runner\"    Search for movies\n\
                  cinegraph info 414906 -r GB        Title + UK availability\n\
                  cinegraph region set IN            Remember India as region"
)]
pub struct Cli {
    /// Output format as JSON (default for non-TTY)
    #[arg(long, short = 'j', global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Path to config file
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    /// Region for availability lookups (overrides the saved one for this run)
    #[arg(long, short = 'r', global = true)]
    pub region: Option<String>,

    /// Subcommand to run (omit for TUI mode)
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    /// Check if running in CLI mode (has subcommand)
    pub fn is_cli_mode(&self) -> bool {
        self.command.is_some()
    }

    /// Check if JSON output should be used
    pub fn should_json(&self) -> bool {
        self.json || !std::io::stdout().is_terminal()
    }
}

// =============================================================================
// Subcommands
// =============================================================================

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Search for movies by title
    #[command(visible_alias = "s")]
    Search(SearchCmd),

    /// List trending movies this week
    #[command(visible_alias = "tr")]
    Trending(TrendingCmd),

    /// Title details plus where to watch it
    #[command(visible_alias = "i")]
    Info(InfoCmd),

    /// Where to watch a title in a region
    #[command(visible_alias = "w")]
    Streaming(StreamingCmd),

    /// Titles similar to a given one
    #[command(visible_alias = "rec")]
    Recommend(RecommendCmd),

    /// Show or change the saved region
    Region(RegionCmd),
}

/// Search for movies by title
#[derive(Args, Debug)]
pub struct SearchCmd {
    /// Search query (at least two characters)
    #[arg(required = true)]
    pub query: String,

    /// Maximum number of results
    #[arg(long, short = 'l', default_value = "10")]
    pub limit: usize,
}

/// List trending movies
#[derive(Args, Debug)]
pub struct TrendingCmd {
    /// Maximum number of results
    #[arg(long, short = 'l', default_value = "12")]
    pub limit: usize,
}

/// Title details plus availability
#[derive(Args, Debug)]
pub struct InfoCmd {
    /// TMDB movie ID
    #[arg(required = true)]
    pub id: u64,
}

/// Availability only
#[derive(Args, Debug)]
pub struct StreamingCmd {
    /// TMDB movie ID
    #[arg(required = true)]
    pub id: u64,
}

/// Similar titles
#[derive(Args, Debug)]
pub struct RecommendCmd {
    /// TMDB movie ID
    #[arg(required = true)]
    pub id: u64,

    /// Maximum number of results
    #[arg(long, short = 'l', default_value = "10")]
    pub limit: usize,
}

/// Region preference
#[derive(Args, Debug)]
pub struct RegionCmd {
    #[command(subcommand)]
    pub action: RegionAction,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum RegionAction {
    /// Print the current region
    Get,
    /// Save a region (two-letter code)
    Set {
        /// Country code, e.g. GB
        code: String,
    },
    /// List supported regions
    List,
    /// Detect the region from your IP address (unless one is saved)
    Detect,
}

// =============================================================================
// JSON Output Types
// =============================================================================

/// Generic JSON output wrapper with status
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonOutput<T: Serialize> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "is_zero")]
    pub exit_code: i32,
}

fn is_zero(n: &i32) -> bool {
    *n == 0
}

impl<T: Serialize> JsonOutput<T> {
    /// Create success output with data
    pub fn success(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
            exit_code: 0,
        }
    }

    /// Create error output (no data)
    pub fn error_msg(msg: impl Into<String>, code: ExitCode) -> JsonOutput<()> {
        JsonOutput::<()> {
            data: None,
            error: Some(msg.into()),
            exit_code: code.into(),
        }
    }
}

/// One supported region, for `region list`
#[derive(Debug, Serialize, Deserialize)]
pub struct RegionEntry {
    pub code: String,
    pub name: String,
}

// =============================================================================
// Output Helpers
// =============================================================================

/// Output handler for consistent formatting
pub struct Output {
    pub json: bool,
    pub quiet: bool,
}

impl Output {
    pub fn new(cli: &Cli) -> Self {
        Self {
            json: cli.should_json(),
            quiet: cli.quiet,
        }
    }

    /// Print success data. `human` renders the text form.
    pub fn print<T: Serialize>(&self, data: T, human: impl FnOnce(&T) -> String) -> anyhow::Result<()> {
        if self.json {
            let output = JsonOutput::success(data);
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!("{}", human(&data));
        }
        Ok(())
    }

    /// Print error and return exit code
    pub fn error(&self, msg: impl Into<String>, code: ExitCode) -> ExitCode {
        let msg = msg.into();
        if self.json {
            let output = JsonOutput::<()>::error_msg(&msg, code);
            if let Ok(json) = serde_json::to_string_pretty(&output) {
                eprintln!("{}", json);
            }
        } else if !self.quiet {
            eprintln!("Error: {}", msg);
        }
        code
    }

    /// Print info message (suppressed in quiet mode)
    pub fn info(&self, msg: impl std::fmt::Display) {
        if !self.quiet && !self.json {
            eprintln!("{}", msg);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
