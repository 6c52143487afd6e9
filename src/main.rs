//! userdesk binary entry point.
//!
//! Parses the command line, opens the operator log, initializes the terminal
//! in raw mode, runs the TUI event loop, and restores the terminal on exit.
//!
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use clap::Parser;
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use userdesk::api::{DEFAULT_BASE_URL, HttpUserApi};
use userdesk::app::keymap::Keymap;
use userdesk::app::{self, AppState, Theme};
use userdesk::error::{Context, Result};

/// Command line options.
#[derive(Parser, Debug)]
#[command(name = "userdesk", version, about = "TUI for managing user records over HTTP")]
struct Cli {
    /// Base URL of the user resource.
    #[arg(long, env = "USERDESK_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Operator log file (the terminal is taken over by the UI).
    #[arg(long, env = "USERDESK_LOG_FILE", default_value = "userdesk.log")]
    log_file: PathBuf,

    /// Log filter, e.g. "debug" or "userdesk=trace". Overrides RUST_LOG.
    #[arg(long)]
    log_level: Option<String>,

    /// Optional theme file (key = #RRGGBB lines).
    #[arg(long, env = "USERDESK_THEME")]
    theme: Option<String>,

    /// Optional keybindings file (Action = Key lines).
    #[arg(long, env = "USERDESK_KEYBINDS")]
    keybinds: Option<String>,
}

fn init_tracing(cli: &Cli) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&cli.log_file)
        .with_ctx(|| format!("open log file {}", cli.log_file.display()))?;

    let filter = match cli.log_level.as_deref() {
        Some(level) => EnvFilter::try_new(level).ok(),
        None => EnvFilter::try_from_default_env().ok(),
    }
    .unwrap_or_else(|| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

/// Initialize a Crossterm-backed `ratatui` terminal in raw mode.
fn init_terminal() -> std::io::Result<Terminal<CrosstermBackend<std::io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Program entry point: run the TUI and report any top-level error to stderr.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli)?;
    info!(base_url = %cli.base_url, "starting userdesk");

    let api = HttpUserApi::new(cli.base_url.clone());
    let state = AppState::new(
        Theme::load(cli.theme.as_deref()),
        Keymap::load(cli.keybinds.as_deref()),
        api.base_url().to_string(),
    );

    let mut terminal = init_terminal().with_ctx(|| "init terminal".to_string())?;

    let res = app::run(&mut terminal, api, state).await;

    disable_raw_mode().ok();
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )
    .ok();
    terminal.show_cursor().ok();

    if let Err(err) = res {
        error!(error = %err, "application error");
        eprintln!("application error: {err}");
    }
    Ok(())
}
