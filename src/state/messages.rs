use crate::state::network::LoadingState;
use crossterm::event::KeyEvent;
use ftc_api::aggregate::LookupOutcome;
use ftc_api::lookup::LookupToken;

#[derive(Debug, Clone)]
pub enum NetworkRequest {
    /// Start a lookup, abandoning whatever lookup is still in flight.
    LookupTeam { token: LookupToken, input: String },
}

#[derive(Debug)]
pub enum NetworkResponse {
    LoadingStateChanged { loading_state: LoadingState },
    /// Drop on arrival unless `token` is still the current generation.
    LookupCompleted { token: LookupToken, outcome: LookupOutcome },
}

#[derive(Debug, Clone)]
pub enum UiEvent {
    KeyPressed(KeyEvent),
    Resize,
    AppStarted,
}
