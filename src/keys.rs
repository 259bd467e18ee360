use crate::app::{App, MenuItem};
use crate::state::messages::NetworkRequest;
use crossterm::event::KeyCode::Char;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

pub async fn handle_key_bindings(
    key_event: KeyEvent,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
) {
    let mut guard = app.lock().await;

    if let (Char('c'), KeyModifiers::CONTROL) = (key_event.code, key_event.modifiers) {
        crate::cleanup_terminal();
        std::process::exit(0);
    }

    // Team-number input line swallows everything while it is open.
    if guard.state.input.editing {
        match key_event.code {
            KeyCode::Enter => {
                if let Some((token, input)) = guard.begin_lookup() {
                    drop(guard);
                    let _ = network_requests
                        .send(NetworkRequest::LookupTeam { token, input })
                        .await;
                }
            }
            KeyCode::Esc => guard.state.input.editing = false,
            KeyCode::Backspace => guard.state.input.backspace(),
            Char(c) => guard.state.input.push(c),
            _ => {}
        }
        return;
    }

    match (guard.state.active_tab, key_event.code, key_event.modifiers) {
        // Quit
        (_, Char('q'), _) => {
            crate::cleanup_terminal();
            std::process::exit(0);
        }

        // Lookup
        (_, Char('/') | Char('t'), _) => guard.state.input.start_editing(),
        (_, Char('r'), _) => {
            if let Some((token, input)) = guard.retry_lookup() {
                drop(guard);
                let _ = network_requests
                    .send(NetworkRequest::LookupTeam { token, input })
                    .await;
            }
        }

        // Tab switching
        (_, Char('1'), _) => guard.update_tab(MenuItem::Overview),
        (_, Char('2'), _) => guard.update_tab(MenuItem::Matches),
        (_, Char('?'), _) => guard.update_tab(MenuItem::Help),
        (MenuItem::Help, KeyCode::Esc, _) => guard.exit_help(),

        // Event list
        (MenuItem::Overview, Char('j') | KeyCode::Down, _) => guard.event_down(),
        (MenuItem::Overview, Char('k') | KeyCode::Up, _) => guard.event_up(),
        (MenuItem::Overview, KeyCode::Enter, _) => guard.open_selected_event(),

        // Match table
        (MenuItem::Matches, Char('j') | KeyCode::Down, _) => guard.matches_down(),
        (MenuItem::Matches, Char('k') | KeyCode::Up, _) => guard.matches_up(),
        (MenuItem::Matches, Char('l') | KeyCode::Right, _) => guard.event_down(),
        (MenuItem::Matches, Char('h') | KeyCode::Left, _) => guard.event_up(),
        (MenuItem::Matches, KeyCode::Esc, _) => guard.update_tab(MenuItem::Overview),

        // Global
        (_, Char('f'), _) => guard.toggle_full_screen(),
        (_, Char('"'), _) => guard.toggle_show_logs(),

        _ => {}
    }
}
