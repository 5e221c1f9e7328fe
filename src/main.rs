//! CineGraph - movie discovery in the terminal
//!
//! # Usage
//!
//! ```bash
//! # Launch interactive TUI
//! cinegraph
//!
//! # CLI mode (for automation)
//! cinegraph search "blade runner"
//! cinegraph info 78 --region GB --json
//! cinegraph region detect
//! ```

use std::io::{stdout, Stdout};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing_subscriber::EnvFilter;

use cinegraph::app::App;
use cinegraph::cli::{Cli, Command, ExitCode, Output};
use cinegraph::commands;
use cinegraph::config::Config;
use cinegraph::models::Region;
use cinegraph::session::SessionController;

/// Terminal type alias for convenience
type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Environment variable holding the tracing filter
const LOG_ENV: &str = "CINEGRAPH_LOG";

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.is_cli_mode() {
        init_cli_logging();
        let exit_code = run_cli(cli).await;
        std::process::exit(exit_code.into());
    } else {
        let log_path = init_tui_logging()?;
        tracing::info!(log = %log_path.display(), "starting TUI");
        run_tui(&cli).await
    }
}

// =============================================================================
// Logging
// =============================================================================

fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default))
}

/// CLI logs go to stderr so stdout stays parseable
fn init_cli_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter("warn"))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// TUI logs go to a file; anything on stderr would tear the screen
fn init_tui_logging() -> Result<PathBuf> {
    let dir = dirs::data_dir()
        .or_else(dirs::cache_dir)
        .map(|d| d.join("cinegraph"))
        .unwrap_or_else(std::env::temp_dir);
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("creating log directory {}", dir.display()))?;
    let path = dir.join("cinegraph.log");
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("opening log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter("info"))
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(path)
}

// =============================================================================
// CLI Mode
// =============================================================================

fn load_config(cli: &Cli) -> Config {
    match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .with_env()
}

/// Run CLI command and return exit code
async fn run_cli(cli: Cli) -> ExitCode {
    let output = Output::new(&cli);
    let config = load_config(&cli);

    // Region commands always work on the saved preference
    let region_override = match (&cli.command, cli.region.as_deref()) {
        (Some(Command::Region(_)), _) | (_, None) => None,
        (_, Some(code)) => match Region::parse(code) {
            Ok(region) => Some(region),
            Err(e) => return output.error(e.to_string(), ExitCode::InvalidArgs),
        },
    };

    let mut session = match commands::open_session(&config, commands::region_store(region_override)) {
        Ok(session) => session,
        Err(e) => return output.error(e.to_string(), ExitCode::Error),
    };

    match cli.command {
        Some(Command::Search(cmd)) => commands::search_cmd(cmd, &mut session, &output).await,

        Some(Command::Trending(cmd)) => commands::trending_cmd(cmd, &mut session, &output).await,

        Some(Command::Info(cmd)) => commands::info_cmd(cmd, &mut session, &output).await,

        Some(Command::Streaming(cmd)) => commands::streaming_cmd(cmd, &mut session, &output).await,

        Some(Command::Recommend(cmd)) => commands::recommend_cmd(cmd, &mut session, &output).await,

        Some(Command::Region(cmd)) => commands::region_cmd(cmd, &mut session, &output).await,

        None => {
            // This shouldn't happen (handled by is_cli_mode check)
            ExitCode::Success
        }
    }
}

// =============================================================================
// TUI Mode
// =============================================================================

/// Initialize the terminal for TUI mode
fn init_terminal() -> Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore terminal to normal state
fn restore_terminal(terminal: &mut Tui) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Run interactive TUI
async fn run_tui(cli: &Cli) -> Result<()> {
    // Fail before touching the terminal if nothing is configured
    let config = load_config(cli);
    let catalog = config.catalog()?;
    let region = cli.region.as_deref().map(Region::parse).transpose()?;
    let session = SessionController::new(catalog, commands::region_store(region))
        .with_debounce_window(config.debounce_window());

    let mut terminal = init_terminal()?;

    let mut app = App::new(session);
    app.start();

    let result = run_event_loop(&mut terminal, &mut app).await;

    // Always restore terminal, even on error
    restore_terminal(&mut terminal)?;

    result
}

/// Main event loop - handles input, applies finished requests, renders UI
async fn run_event_loop(terminal: &mut Tui, app: &mut App) -> Result<()> {
    const TICK_RATE: Duration = Duration::from_millis(50);

    while app.running {
        terminal.draw(|frame| cinegraph::ui::render(frame, app))?;

        // Poll on a blocking thread so spawned requests keep running
        let key = tokio::task::spawn_blocking(|| -> std::io::Result<Option<Event>> {
            if event::poll(TICK_RATE)? {
                event::read().map(Some)
            } else {
                Ok(None)
            }
        })
        .await??;

        if let Some(Event::Key(key)) = key {
            // Only handle key press events (ignore releases on Windows)
            if key.kind == KeyEventKind::Press {
                app.handle_key(key);
            }
        }

        app.tick();
    }

    Ok(())
}
