mod app;
mod draw;
mod keys;
mod state;
mod ui;

use crate::app::App;
use crate::state::app_settings::AppSettings;
use crate::state::messages::{NetworkRequest, NetworkResponse, UiEvent};
use crate::state::network::{LoadingState, NetworkWorker};
use crossterm::event::{self as crossterm_event, Event};
use crossterm::{cursor, execute, terminal};
use ftc_api::aggregate::LookupOutcome;
use std::io::Stdout;
use std::sync::Arc;
use std::{io, panic};
use tokio::sync::{Mutex, mpsc};
use tui::{Terminal, backend::CrosstermBackend};

const EXIT_LOOKUP_FAILED: i32 = 1;
const EXIT_USAGE: i32 = 2;
const EXIT_NOT_FOUND: i32 = 3;

enum Command {
    Tui { team: Option<String> },
    Json { team: String },
    Exit,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = AppSettings::load();

    let team = match parse_cli_args() {
        Command::Exit => return Ok(()),
        Command::Json { team } => return print_json(&settings, &team).await,
        Command::Tui { team } => team,
    };

    better_panic::install();

    let backend = CrosstermBackend::new(io::stdout());
    let terminal = Terminal::new(backend)?;

    setup_panic_hook();
    setup_terminal()?;

    tui_logger::init_logger(log::LevelFilter::Debug)?;
    tui_logger::set_default_level(log::LevelFilter::Info);

    let aggregator = settings.aggregator();
    let app = Arc::new(Mutex::new(App::new(settings, team)));

    let (ui_event_tx, ui_event_rx) = mpsc::channel::<UiEvent>(100);
    let (network_req_tx, network_req_rx) = mpsc::channel::<NetworkRequest>(100);
    let (network_resp_tx, network_resp_rx) = mpsc::channel::<NetworkResponse>(100);

    // Input handler thread
    let input_handler = tokio::spawn(input_handler_task(ui_event_tx.clone()));

    // Network thread
    let network_worker = NetworkWorker::new(aggregator, network_req_rx, network_resp_tx);
    let network_task = tokio::spawn(network_worker.run());

    // Look up the team given on the command line, if any
    let _ = ui_event_tx.send(UiEvent::AppStarted).await;

    main_ui_loop(terminal, app, ui_event_rx, network_req_tx, network_resp_rx).await;

    input_handler.abort();
    network_task.abort();

    Ok(())
}

fn parse_cli_args() -> Command {
    let mut args = std::env::args().skip(1);
    let Some(arg) = args.next() else {
        return Command::Tui { team: None };
    };

    match arg.as_str() {
        "-h" | "--help" => {
            println!("{}", usage_text());
            Command::Exit
        }
        "-V" | "--version" => {
            println!("ftctui {}", env!("CARGO_PKG_VERSION"));
            Command::Exit
        }
        "--json" => match args.next() {
            Some(team) => Command::Json { team },
            None => {
                eprintln!("--json needs a team number\n\n{}", usage_text());
                std::process::exit(EXIT_USAGE);
            }
        },
        other if other.starts_with('-') => {
            eprintln!("Unknown argument: {other}\n\n{}", usage_text());
            std::process::exit(EXIT_USAGE);
        }
        _ => Command::Tui { team: Some(arg) },
    }
}

fn usage_text() -> &'static str {
    "ftctui - FIRST Tech Challenge team lookup

Usage:
  ftctui [TEAM]
  ftctui --json TEAM
  ftctui --help
  ftctui --version

Environment:
  FTCTUI_API_URL             GraphQL endpoint (default https://api.ftcscout.org/graphql)
  FTCTUI_SEASON              Season year (default 2024)
  FTCTUI_MATCH_CONCURRENCY   Parallel event match requests (default 8)
  FTCTUI_TIMEOUT_SECS        Per-request timeout in seconds (default 10)
  FTCTUI_LOG                 Log level: error, warn, info, debug, trace"
}

/// Non-interactive lookup. The view goes to stdout, everything else to stderr.
async fn print_json(settings: &AppSettings, team: &str) -> anyhow::Result<()> {
    let aggregator = settings.aggregator();
    match aggregator.lookup(team).await {
        LookupOutcome::Found(view) => {
            println!("{}", serde_json::to_string_pretty(&view)?);
            Ok(())
        }
        LookupOutcome::TeamNotFound(number) => {
            eprintln!("team {number} not found for the {} season", aggregator.season());
            std::process::exit(EXIT_NOT_FOUND);
        }
        LookupOutcome::InvalidIdentifier(raw) => {
            eprintln!("\"{raw}\" is not a valid team number");
            std::process::exit(EXIT_USAGE);
        }
        LookupOutcome::LookupFailed(e) => {
            eprintln!("lookup failed: {e}");
            std::process::exit(EXIT_LOOKUP_FAILED);
        }
    }
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
                let should_redraw = handle_ui_event(ui_event, &app, &network_requests).await;
                if should_redraw {
                    let mut app_guard = app.lock().await;
                    draw::draw(&mut terminal, &mut app_guard, loading);
                }
            }

            Some(response) = network_responses.recv() => {
                let should_redraw = handle_network_response(response, &app, &mut loading).await;
                if should_redraw {
                    let mut app_guard = app.lock().await;
                    draw::draw(&mut terminal, &mut app_guard, loading);
                }
            }

            else => break,
        }
    }
}

async fn handle_ui_event(
    ui_event: UiEvent,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
) -> bool {
    match ui_event {
        UiEvent::AppStarted => {
            let mut guard = app.lock().await;
            if guard.state.input.editing {
                return true;
            }
            let request = guard.begin_lookup();
            drop(guard);
            if let Some((token, input)) = request {
                let _ = network_requests
                    .send(NetworkRequest::LookupTeam { token, input })
                    .await;
            }
            true
        }
        UiEvent::KeyPressed(key_event) => {
            keys::handle_key_bindings(key_event, app, network_requests).await;
            true
        }
        UiEvent::Resize => true,
    }
}

async fn handle_network_response(
    response: NetworkResponse,
    app: &Arc<Mutex<App>>,
    loading: &mut LoadingState,
) -> bool {
    match response {
        NetworkResponse::LoadingStateChanged { loading_state } => {
            *loading = loading_state;
            true
        }
        NetworkResponse::LookupCompleted { token, outcome } => {
            if let LookupOutcome::LookupFailed(e) = &outcome {
                log::error!("lookup failed: {e}");
            }
            let mut guard = app.lock().await;
            guard.on_lookup_completed(token, outcome)
        }
    }
}

async fn input_handler_task(ui_events: mpsc::Sender<UiEvent>) {
    loop {
        if let Ok(event) = crossterm_event::read() {
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

fn setup_terminal() -> io::Result<()> {
    let mut stdout = io::stdout();
    execute!(stdout, cursor::Hide)?;
    execute!(stdout, terminal::EnterAlternateScreen)?;
    execute!(stdout, terminal::Clear(terminal::ClearType::All))?;
    terminal::enable_raw_mode()
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
