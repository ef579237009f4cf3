mod app;
mod compare;
mod draw;
mod keys;
mod state;
mod ui;

use crate::app::App;
use crate::state::app_settings::AppSettings;
use crate::state::messages::{NetworkRequest, NetworkResponse, UiEvent};
use crate::state::network::{LoadingState, NetworkWorker};
use anyhow::{Context, bail};
use crossterm::event::{self as crossterm_event, Event};
use crossterm::{cursor, execute, terminal};
use dugout_api::ViewMode;
use dugout_api::client::{DeclineAll, StatsApi};
use log::{error, info};
use std::io::Stdout;
use std::sync::Arc;
use std::{io, panic};
use tokio::sync::{Mutex, mpsc};
use tui::{Terminal, backend::CrosstermBackend};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if handle_cli_args().await? {
        return Ok(());
    }

    better_panic::install();

    let backend = CrosstermBackend::new(io::stdout());
    let terminal = Terminal::new(backend)?;

    setup_panic_hook();
    setup_terminal();

    tui_logger::init_logger(log::LevelFilter::Debug)?;
    tui_logger::set_default_level(log::LevelFilter::Info);

    let app = App::new();
    let client = StatsApi::new(app.settings.api_url.clone()).with_timeout(app.settings.timeout);
    info!("stats backend at {}", client.base_url());
    let app = Arc::new(Mutex::new(app));

    let (ui_event_tx, ui_event_rx) = mpsc::channel::<UiEvent>(100);
    let (network_req_tx, network_req_rx) = mpsc::channel::<NetworkRequest>(100);
    let (network_resp_tx, network_resp_rx) = mpsc::channel::<NetworkResponse>(100);

    // Input handler thread
    let input_handler = tokio::spawn(input_handler_task(ui_event_tx.clone()));

    // Network thread
    let network_worker = NetworkWorker::new(client, network_req_rx, network_resp_tx);
    let network_task = tokio::spawn(network_worker.run());

    // Compare the configured players on startup
    let _ = ui_event_tx.send(UiEvent::AppStarted).await;

    main_ui_loop(terminal, app, ui_event_rx, network_req_tx, network_resp_rx).await;

    input_handler.abort();
    network_task.abort();

    Ok(())
}

/// Returns true when the command line was fully handled and the TUI should
/// not start.
async fn handle_cli_args() -> anyhow::Result<bool> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(arg) = args.first() else {
        return Ok(false);
    };

    match arg.as_str() {
        "-h" | "--help" => {
            println!("{}", usage_text());
            Ok(true)
        }
        "-V" | "--version" => {
            println!("dugout {}", env!("CARGO_PKG_VERSION"));
            Ok(true)
        }
        "--export" => {
            export(&args[1..]).await?;
            Ok(true)
        }
        _ => {
            eprintln!("Unknown argument: {arg}\n\n{}", usage_text());
            std::process::exit(2);
        }
    }
}

/// `--export <html|json> <player A> <player B> [view]`
///
/// Runs one comparison without the TUI and prints it. Selection dialogs
/// cannot be shown here, so ambiguous names end up as an error row.
async fn export(args: &[String]) -> anyhow::Result<()> {
    let [format, a, b, rest @ ..] = args else {
        bail!("--export needs a format and two player names\n\n{}", usage_text());
    };
    if format != "html" && format != "json" {
        bail!("unknown export format {format:?} (expected html or json)");
    }
    let view = match rest.first() {
        Some(v) => ViewMode::parse(v).with_context(|| format!("unknown view {v:?}"))?,
        None => ViewMode::default(),
    };

    let settings = AppSettings::load();
    let client = StatsApi::new(settings.api_url).with_timeout(settings.timeout);
    let (left, right) = tokio::join!(
        client.fetch_stats(a, view, &DeclineAll),
        client.fetch_stats(b, view, &DeclineAll),
    );

    let mut comparison =
        compare::build_player_comparison(Some(&left), Some(&right), [a.as_str(), b.as_str()], view);
    compare::highlight(&mut comparison);

    let rendered = match format.as_str() {
        "html" => compare::export::to_html(&comparison),
        _ => compare::export::to_json(&comparison).context("serializing comparison")?,
    };
    println!("{rendered}");
    Ok(())
}

fn usage_text() -> &'static str {
    "dugout - compare baseball players and teams in the terminal

Usage:
  dugout
  dugout --export <html|json> <player A> <player B> [view]
  dugout --help
  dugout --version

Views:
  career, combined, live, season, newest, oldest

Environment:
  DUGOUT_API_URL        Stats backend base URL (default http://127.0.0.1:5000)
  DUGOUT_LOG_LEVEL      error, warn, info, debug or trace (default info)
  DUGOUT_DEBOUNCE_MS    Search debounce, clamped to 300-500 (default 350)
  DUGOUT_TIMEOUT_SECS   Per-request timeout (default 30)
  DUGOUT_PLAYER_A       Player compared on startup (default Mike Trout)
  DUGOUT_PLAYER_B       Player compared on startup (default Kyle Tucker)
  DUGOUT_VIEW           Initial view (default combined)"
}

async fn main_ui_loop(
    mut terminal: Terminal<CrosstermBackend<Stdout>>,
    app: Arc<Mutex<App>>,
    mut ui_events: mpsc::Receiver<UiEvent>,
    network_requests: mpsc::Sender<NetworkRequest>,
    mut network_responses: mpsc::Receiver<NetworkResponse>,
) {
    let mut loading = LoadingState::default();

    loop {
        tokio::select! {
            Some(ui_event) = ui_events.recv() => {
                handle_ui_event(ui_event, &app, &network_requests).await;
                let mut app_guard = app.lock().await;
                draw::draw(&mut terminal, &mut app_guard, loading);
            }

            Some(response) = network_responses.recv() => {
                handle_network_response(response, &app, &mut loading).await;
                let mut app_guard = app.lock().await;
                draw::draw(&mut terminal, &mut app_guard, loading);
            }
        }
    }
}

async fn handle_ui_event(
    ui_event: UiEvent,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
) {
    match ui_event {
        UiEvent::AppStarted => {
            let mut guard = app.lock().await;
            let has_players = guard.state.players.inputs.iter().all(|n| !n.trim().is_empty());
            let request = if has_players { guard.begin_player_comparison() } else { None };
            drop(guard);
            if let Some(request) = request {
                let _ = network_requests.send(request).await;
            }
        }
        UiEvent::KeyPressed(key_event) => {
            keys::handle_key_bindings(key_event, app, network_requests).await;
        }
        UiEvent::Resize => {}
    }
}

async fn handle_network_response(
    response: NetworkResponse,
    app: &Arc<Mutex<App>>,
    loading: &mut LoadingState,
) {
    match response {
        NetworkResponse::LoadingStateChanged { loading_state } => {
            *loading = loading_state;
        }
        NetworkResponse::PlayersCompared { generation, names, view, results } => {
            let mut guard = app.lock().await;
            guard.on_players_compared(generation, names, view, *results);
        }
        NetworkResponse::TeamsCompared { generation, names, stat_type, results } => {
            let mut guard = app.lock().await;
            guard.on_teams_compared(generation, names, stat_type, *results);
        }
        NetworkResponse::PopularLoaded { players } => {
            let mut guard = app.lock().await;
            guard.on_popular_loaded(players);
        }
        NetworkResponse::SearchCompleted { generation, side, results } => {
            let mut guard = app.lock().await;
            guard.on_search_completed(generation, side, results);
        }
        NetworkResponse::SelectionRequested { origin, prompt } => {
            let mut guard = app.lock().await;
            guard.on_selection_requested(origin, prompt);
        }
        NetworkResponse::Error { request, message } => {
            error!("Network error ({request:?}): {message}");
            let mut guard = app.lock().await;
            guard.on_error(request, message);
        }
    }
}

async fn input_handler_task(ui_events: mpsc::Sender<UiEvent>) {
    loop {
        // crossterm's read blocks; keep it off the async workers.
        let event = tokio::task::spawn_blocking(crossterm_event::read).await;
        if let Ok(Ok(event)) = event {
            let ui_event = match event {
                Event::Key(key_event) => Some(UiEvent::KeyPressed(key_event)),
                Event::Resize(_, _) => Some(UiEvent::Resize),
                _ => None,
            };

            if let Some(ui_event) = ui_event
                && ui_events.send(ui_event).await.is_err()
            {
                break;
            }
        }
    }
}

fn setup_terminal() {
    let mut stdout = io::stdout();
    let _ = execute!(stdout, cursor::Hide);
    let _ = execute!(stdout, terminal::EnterAlternateScreen);
    let _ = execute!(stdout, terminal::Clear(terminal::ClearType::All));
    let _ = terminal::enable_raw_mode();
}

pub fn cleanup_terminal() {
    let mut stdout = io::stdout();
    let _ = execute!(stdout, cursor::MoveTo(0, 0));
    let _ = execute!(stdout, terminal::Clear(terminal::ClearType::All));
    let _ = execute!(stdout, terminal::LeaveAlternateScreen);
    let _ = execute!(stdout, cursor::Show);
    let _ = terminal::disable_raw_mode();
}

fn setup_panic_hook() {
    panic::set_hook(Box::new(|panic_info| {
        cleanup_terminal();
        better_panic::Settings::auto().create_panic_handler()(panic_info);
    }));
}
