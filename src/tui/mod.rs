// File: ./src/tui/mod.rs
// Entry point and main loop for the TUI application.
pub mod action;
pub mod form;
pub mod handlers;
pub mod network;
pub mod state;
pub mod view;

use crate::client::{ApiClient, UnauthorizedHook};
use crate::config::{self, Config};
use crate::context::SharedContext;
use crate::logging;
use crate::session::{FileSessionStore, MemorySessionStore};
use crate::tui::action::{Action, AppEvent};
use crate::tui::state::AppState;
use crate::tui::view::draw;

use anyhow::Result;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::{self, Write};
use std::time::Duration;
use tokio::sync::mpsc;

/// Loads the config, or walks the user through creating one.
fn load_or_onboard(ctx: &SharedContext) -> Result<Config> {
    let mut new_config = match Config::load(ctx.as_ref()) {
        Ok(c) if !c.api_url.is_empty() => return Ok(c),
        Ok(c) => c,
        // A broken file is reported, not silently replaced.
        Err(e) if !Config::is_missing_config_error(&e) => return Err(e),
        Err(_) => {
            let mut c = Config::default();
            c.apply_env_overrides();
            if !c.api_url.is_empty() {
                return Ok(c);
            }
            c
        }
    };

    println!("Welcome to Taskboard. No API server configured yet.\n");
    loop {
        print!("API base URL (e.g. http://localhost:5000/api): ");
        io::stdout().flush()?;
        let mut url = String::new();
        io::stdin().read_line(&mut url)?;
        let url = url.trim().to_string();

        // Validate before saving so a typo does not get persisted.
        match ApiClient::new(&url, MemorySessionStore::shared(), UnauthorizedHook::noop()) {
            Ok(_) => {
                new_config.api_url = url;
                break;
            }
            Err(e) => eprintln!("{}. Try again.", e),
        }
    }

    if let Err(e) = new_config.save(ctx.as_ref()) {
        eprintln!("Warning: Could not save config file: {}", e);
    } else if let Ok(path) = Config::get_path_string(ctx.as_ref()) {
        println!("Configuration saved to: {}", path);
    }
    Ok(new_config)
}

/// The 401 hook runs inside the HTTP stack, so it only posts a message.
/// Expiry gets its own unbounded channel and is never dropped.
pub fn expiry_hook(tx: mpsc::UnboundedSender<AppEvent>) -> UnauthorizedHook {
    UnauthorizedHook::new(move || {
        if tx.send(AppEvent::SessionExpired).is_err() {
            log::debug!("Session expiry after the UI loop stopped");
        }
    })
}

pub async fn run(ctx: SharedContext, open: Option<String>) -> Result<()> {
    // --- 1. PREAMBLE & CONFIG ---
    let cfg = load_or_onboard(&ctx)?;
    if let Err(e) = logging::init(ctx.as_ref(), cfg.log_level_filter()) {
        eprintln!("Warning: logging disabled: {}", e);
    }
    log::info!(
        "Starting taskboard {} (api_url={}, page_size={}, env override {})",
        env!("CARGO_PKG_VERSION"),
        cfg.api_url,
        cfg.page_size,
        if std::env::var(config::API_URL_ENV).is_ok() {
            "set"
        } else {
            "unset"
        }
    );

    let session = FileSessionStore::shared(ctx.as_ref())?;

    let (action_tx, action_rx) = mpsc::channel::<Action>(32);
    let (event_tx, mut event_rx) = mpsc::channel::<AppEvent>(64);

    let (expired_tx, mut expired_rx) = mpsc::unbounded_channel::<AppEvent>();
    let api = ApiClient::new(&cfg.api_url, session.clone(), expiry_hook(expired_tx))?;

    // Panic Hook: put the terminal back before printing.
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        log::error!("PANIC: {}", info);
        default_hook(info);
    }));

    // --- 2. TERMINAL SETUP ---
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // --- 3. STATE INIT ---
    let mut app_state = AppState::new(session, cfg.page_size);
    let first = match open.as_deref() {
        Some(path) => app_state.navigate(path),
        None => app_state.start(),
    };

    // --- 4. NETWORK THREAD ---
    tokio::spawn(network::run_network_actor(api, action_rx, event_tx));
    if let Some(action) = first {
        let _ = action_tx.send(action).await;
    }

    // --- 5. UI LOOP ---
    let result = async {
        loop {
            terminal.draw(|f| draw(f, &mut app_state))?;

            // A. Session expiry, then network events
            while let Ok(event) = expired_rx.try_recv() {
                handlers::handle_app_event(&mut app_state, event);
            }
            while let Ok(event) = event_rx.try_recv() {
                if let Some(follow_up) = handlers::handle_app_event(&mut app_state, event) {
                    let _ = action_tx.send(follow_up).await;
                }
            }

            // B. Input Events
            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    // Filter out KeyRelease events to prevent double input on Windows
                    if key.kind == event::KeyEventKind::Release {
                        continue;
                    }
                    if let Some(action) = handlers::handle_key_event(key, &mut app_state) {
                        if matches!(action, Action::Quit) {
                            let _ = action_tx.send(Action::Quit).await;
                            break;
                        }
                        let _ = action_tx.send(action).await;
                    }
                }
            }
        }
        Ok::<(), anyhow::Error>(())
    }
    .await;

    // --- 6. CLEANUP ---
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    log::info!("Exiting");
    result
}
