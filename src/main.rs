//! main.rs
//! Entry point for ncview

use ncview_tui::app::AppState;
use ncview_tui::config::Config;
use ncview_tui::core::{CapabilityRegistry, terminal};
use ncview_tui::session::SessionStore;
use ncview_tui::utils::cli::{CliAction, handle_args};
use ncview_tui::utils::{config_dir, resolve_start_dir};

use tracing_subscriber::EnvFilter;

use std::fs::OpenOptions;

const LOG_FILE: &str = "ncview.log";

fn main() -> std::io::Result<()> {
    std::panic::set_hook(Box::new(|info| {
        let _ = crossterm::terminal::disable_raw_mode();
        let mut stdout = std::io::stdout();
        let _ = crossterm::execute!(
            stdout,
            crossterm::terminal::LeaveAlternateScreen,
            crossterm::cursor::Show
        );

        eprintln!("\n[ncview] Error occurred: {}", info);

        #[cfg(debug_assertions)]
        {
            let bt = std::backtrace::Backtrace::force_capture();
            eprintln!("\nStack Backtrace:\n{}", bt);
        }
    }));

    let path_arg = match handle_args() {
        CliAction::Exit => return Ok(()),
        CliAction::ExitFailure => std::process::exit(1),
        CliAction::RunApp => None,
        CliAction::RunAppAtPath(path) => Some(path),
    };

    init_logging();

    let config = Config::load();
    if CapabilityRegistry::install(CapabilityRegistry::builtin(config.preview().peek_bytes()))
        .is_err()
    {
        tracing::warn!("capability registry was already installed");
    }

    let start_dir = match resolve_start_dir(path_arg.as_deref()) {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("\n[ncview] Error: {e}");
            std::process::exit(1);
        }
    };
    tracing::info!(dir = %start_dir.display(), "starting ncview");

    let mut app = AppState::from_dir(&config, &start_dir, Some(SessionStore::open_default()));
    terminal::run_terminal(&mut app)
}

/// Routes tracing output to a log file in the config directory.
///
/// The terminal is in raw mode while the app runs, so nothing is written to stderr.
/// Logging is skipped entirely when the file cannot be opened.
fn init_logging() {
    let dir = config_dir();
    if std::fs::create_dir_all(&dir).is_err() {
        return;
    }
    let Ok(file) = OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join(LOG_FILE))
    else {
        return;
    };

    let filter = EnvFilter::try_from_env("NCVIEW_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .try_init();
}
