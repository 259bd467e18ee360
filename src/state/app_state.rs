use crate::app::MenuItem;
use ftc_api::aggregate::LookupOutcome;
use ftc_api::{AggregatedTeamView, EventParticipation, TeamNumber};

/// Longest team-number input we bother keeping.
pub const MAX_INPUT_LEN: usize = 12;

// ---------------------------------------------------------------------------
// Team-number input line
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct InputState {
    pub text: String,
    pub editing: bool,
}

impl InputState {
    pub fn push(&mut self, c: char) {
        if !c.is_control() && self.text.chars().count() < MAX_INPUT_LEN {
            self.text.push(c);
        }
    }

    pub fn backspace(&mut self) {
        self.text.pop();
    }

    pub fn start_editing(&mut self) {
        self.editing = true;
        self.text.clear();
    }
}

// ---------------------------------------------------------------------------
// Lookup state: what the main pane shows
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub enum LookupState {
    #[default]
    Idle,
    Loading { input: String },
    Found(Box<AggregatedTeamView>),
    NotFound(TeamNumber),
    Invalid(String),
    Failed { message: String, retryable: bool },
}

impl LookupState {
    pub fn from_outcome(outcome: LookupOutcome) -> Self {
        match outcome {
            LookupOutcome::Found(view) => LookupState::Found(view),
            LookupOutcome::TeamNotFound(team) => LookupState::NotFound(team),
            LookupOutcome::InvalidIdentifier(raw) => LookupState::Invalid(raw),
            LookupOutcome::LookupFailed(e) => LookupState::Failed {
                retryable: e.is_retryable(),
                message: e.to_string(),
            },
        }
    }

    pub fn view(&self) -> Option<&AggregatedTeamView> {
        match self {
            LookupState::Found(view) => Some(view),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, LookupState::Loading { .. })
    }
}

// ---------------------------------------------------------------------------
// Event / match navigation
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct TeamViewState {
    pub selected_event: usize,
    pub match_scroll: u16,
}

impl TeamViewState {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn event_down(&mut self, event_count: usize) {
        let max = event_count.saturating_sub(1);
        if self.selected_event < max {
            self.selected_event += 1;
            self.match_scroll = 0;
        }
    }

    pub fn event_up(&mut self) {
        if self.selected_event > 0 {
            self.selected_event -= 1;
            self.match_scroll = 0;
        }
    }

    pub fn scroll_down(&mut self, match_count: usize) {
        let max = match_count.saturating_sub(1) as u16;
        self.match_scroll = (self.match_scroll + 1).min(max);
    }

    pub fn scroll_up(&mut self) {
        self.match_scroll = self.match_scroll.saturating_sub(1);
    }

    pub fn selected<'a>(&self, view: &'a AggregatedTeamView) -> Option<&'a EventParticipation> {
        view.events.get(self.selected_event)
    }
}

#[derive(Debug, Default)]
pub struct AppState {
    pub active_tab: MenuItem,
    pub previous_tab: MenuItem,
    pub show_logs: bool,
    pub input: InputState,
    pub lookup: LookupState,
    pub team_view: TeamViewState,
    /// Input of the most recent lookup, for retry.
    pub last_input: Option<String>,
    pub loaded_at: Option<String>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_caps_length_and_ignores_control_chars() {
        let mut input = InputState::default();
        for c in "1234567890123456".chars() {
            input.push(c);
        }
        input.push('\n');
        assert_eq!(input.text, "123456789012");
        input.backspace();
        assert_eq!(input.text, "12345678901");
    }

    #[test]
    fn event_selection_is_clamped() {
        let mut nav = TeamViewState::default();
        nav.event_up();
        assert_eq!(nav.selected_event, 0);
        nav.event_down(2);
        nav.event_down(2);
        assert_eq!(nav.selected_event, 1);
        nav.event_down(0);
        assert_eq!(nav.selected_event, 1);
    }

    #[test]
    fn changing_event_resets_match_scroll() {
        let mut nav = TeamViewState::default();
        nav.scroll_down(10);
        nav.scroll_down(10);
        assert_eq!(nav.match_scroll, 2);
        nav.event_down(3);
        assert_eq!(nav.match_scroll, 0);
    }

    #[test]
    fn match_scroll_stops_at_last_match() {
        let mut nav = TeamViewState::default();
        for _ in 0..5 {
            nav.scroll_down(2);
        }
        assert_eq!(nav.match_scroll, 1);
        nav.scroll_down(0);
        assert_eq!(nav.match_scroll, 0);
    }

    #[test]
    fn invalid_outcome_maps_to_invalid_state() {
        let state = LookupState::from_outcome(LookupOutcome::InvalidIdentifier("x1".into()));
        assert!(matches!(state, LookupState::Invalid(ref raw) if raw == "x1"));
        assert!(state.view().is_none());
    }
}
