pub mod input;
pub mod refresh;
pub mod render;
pub mod state;

use crossterm::event::{Event, EventStream};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use futures_util::StreamExt;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::io;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::api::RenderClient;
use crate::cache::{ResponseCache, DEFAULT_TTL};
use crate::config::{paths, settings, AppConfig};
use crate::dashboard::input::{map_key, Command};
use crate::dashboard::refresh::{CycleOutcome, Refresher};
use crate::dashboard::state::DashboardState;
use crate::error::RdashError;
use crate::links;
use crate::models::EnvVar;

/// Messages delivered to the UI task from background work.
pub enum DashboardEvent {
    CycleComplete(CycleOutcome),
    EnvVarsLoaded {
        service_id: String,
        result: Result<Vec<EnvVar>, RdashError>,
    },
}

type Tui = Terminal<CrosstermBackend<io::Stdout>>;

pub async fn run(config_path: Option<&Path>) -> Result<(), RdashError> {
    // config problems surface here, before the terminal is taken over
    let config = settings::load(config_path)?;
    init_file_logging();

    let cache = ResponseCache::new(paths::cache_dir(), DEFAULT_TTL);
    let client = Arc::new(RenderClient::new(
        &config.api_key,
        &config.credential_source,
        cache,
    )?);

    let mut terminal = setup_terminal()?;
    let result = event_loop(&mut terminal, client, &config).await;
    restore_terminal(&mut terminal)?;
    result
}

async fn event_loop(
    terminal: &mut Tui,
    client: Arc<RenderClient>,
    config: &AppConfig,
) -> Result<(), RdashError> {
    let (tx, mut rx) = mpsc::channel::<DashboardEvent>(32);
    let refresher = Refresher::spawn(
        client.clone(),
        config.services.clone(),
        Duration::from_secs(config.refresh_interval.max(1)),
        tx.clone(),
    );

    let mut state = DashboardState::new();
    let mut events = EventStream::new();

    let result = loop {
        if let Err(e) = terminal.draw(|frame| render::draw(frame, &state)) {
            break Err(e.into());
        }

        tokio::select! {
            Some(event) = rx.recv() => match event {
                DashboardEvent::CycleComplete(outcome) => state.apply_cycle(outcome),
                DashboardEvent::EnvVarsLoaded { service_id, result } => {
                    state.resolve_env_modal(&service_id, result);
                }
            },
            maybe_event = events.next() => {
                let Some(Ok(Event::Key(key))) = maybe_event else {
                    continue;
                };
                let Some(command) = map_key(state.input_mode, state.modal.is_some(), key) else {
                    continue;
                };
                if handle_command(command, &mut state, &client, config, &tx) {
                    break Ok(());
                }
            }
        }
    };

    // dropping the receiver closes the channel; anything still in flight
    // lands on a closed channel and is discarded
    drop(rx);
    refresher.stop().await;
    result
}

/// Apply one user command. Returns true when the dashboard should exit.
fn handle_command(
    command: Command,
    state: &mut DashboardState,
    client: &Arc<RenderClient>,
    config: &AppConfig,
    tx: &mpsc::Sender<DashboardEvent>,
) -> bool {
    match command {
        Command::Quit => return true,
        Command::Refresh => {
            refresh::spawn_manual(client.clone(), config.services.clone(), tx.clone());
        }
        Command::MoveUp => state.move_selection(-1),
        Command::MoveDown => state.move_selection(1),
        Command::Open(action) => {
            if let Some(entry) = state.selected_entry() {
                let url = links::service_url(&entry.config.id, action);
                if !links::open_in_browser(&url) {
                    tracing::warn!("could not open browser for {}", url);
                }
            }
        }
        Command::ShowEnvVars => {
            if let Some(service_id) = state.open_env_modal() {
                let client = client.clone();
                let tx = tx.clone();
                tokio::spawn(async move {
                    let result = client.get_env_vars(&service_id).await;
                    let _ = tx
                        .send(DashboardEvent::EnvVarsLoaded { service_id, result })
                        .await;
                });
            }
        }
        Command::StartSearch => state.start_search(),
        Command::SearchChar(c) => state.push_filter_char(c),
        Command::SearchBackspace => state.pop_filter_char(),
        Command::SearchAccept => state.accept_search(),
        Command::SearchCancel => state.cancel_search(),
        Command::Dismiss => {
            if state.modal.is_some() {
                state.close_modal();
            } else {
                state.clear_filter();
            }
        }
    }
    false
}

fn setup_terminal() -> Result<Tui, RdashError> {
    // restore the terminal even when rendering panics
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Tui) -> Result<(), RdashError> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// The dashboard owns the terminal, so logs go to a file under the state
/// dir instead of stdout. Logging setup failures are not fatal.
fn init_file_logging() {
    let dir = paths::state_dir();
    if std::fs::create_dir_all(&dir).is_err() {
        return;
    }
    let Ok(file) = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(paths::log_path())
    else {
        return;
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_writer(file)
        .with_ansi(false)
        .try_init();
}
