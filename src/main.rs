// Entry point for the mine-clearing terminal game
// Loads preferences, sets up file logging and launches the UI

use std::error::Error;
use std::fs::{self, File};
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

// Module declarations
mod mns_board;   // Grid, mine placement, reveal and flood fill
mod mns_color;   // Terminal colour palette
mod mns_game;    // Preset catalog and configuration
mod mns_lang;    // Multi-language string resources
mod mns_menu;    // Main menu and difficulty selection flow
mod mns_session; // Per-game state machine and input signals
mod mns_ui;      // Terminal UI rendering and event handling

use mns_game::{Config, load_or_create_config, log_path};
use mns_lang::Lang;
use mns_ui::run as run_ui;

fn main() -> Result<(), Box<dyn Error>> {
    // Load or create user configuration (preset, language, icons)
    let mut cfg = load_or_create_config();
    init_logging(&cfg);
    info!(version = env!("CARGO_PKG_VERSION"), "starting");

    let lang = Lang::new(&cfg.language);
    info!(language = %lang.current_lang, "language resources loaded");

    // Launch the main UI loop
    let result = run_ui(&mut cfg, &lang);
    info!("exiting");
    result
}

/// Log to a file so output does not interfere with the terminal UI
fn init_logging(cfg: &Config) {
    let Some(path) = log_path() else {
        return;
    };
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    let file = match File::create(&path) {
        Ok(file) => file,
        Err(_) => return,
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cfg.log_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .try_init();
}
