use crate::state::app_settings::AppSettings;
use crate::state::app_state::{AppState, LookupState};
use chrono::Local;
use ftc_api::aggregate::LookupOutcome;
use ftc_api::lookup::{LookupGenerations, LookupToken};

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum MenuItem {
    #[default]
    Overview,
    Matches,
    Help,
}

pub struct App {
    pub settings: AppSettings,
    pub state: AppState,
    pub generations: LookupGenerations,
}

impl App {
    pub fn new(settings: AppSettings, initial_team: Option<String>) -> Self {
        let mut state = AppState::new();
        match initial_team {
            Some(team) => state.input.text = team,
            None => state.input.editing = true,
        }

        let app = Self {
            settings,
            state,
            generations: LookupGenerations::new(),
        };

        if let Some(level) = app.settings.log_level {
            log::set_max_level(level);
            tui_logger::set_default_level(level);
        }

        app
    }

    // -----------------------------------------------------------------------
    // Lookup lifecycle
    // -----------------------------------------------------------------------

    /// Stamp a new lookup for the text in the input line. Returns `None` when
    /// there is nothing to look up.
    pub fn begin_lookup(&mut self) -> Option<(LookupToken, String)> {
        let input = self.state.input.text.trim().to_owned();
        if input.is_empty() {
            return None;
        }
        self.state.input.editing = false;
        Some(self.issue(input))
    }

    /// Re-run the most recent lookup.
    pub fn retry_lookup(&mut self) -> Option<(LookupToken, String)> {
        let input = self.state.last_input.clone()?;
        Some(self.issue(input))
    }

    fn issue(&mut self, input: String) -> (LookupToken, String) {
        let token = self.generations.begin();
        self.state.lookup = LookupState::Loading { input: input.clone() };
        self.state.last_input = Some(input.clone());
        self.state.team_view.reset();
        (token, input)
    }

    /// Commit a finished lookup. Returns false when the result belongs to a
    /// superseded lookup and was dropped.
    pub fn on_lookup_completed(&mut self, token: LookupToken, outcome: LookupOutcome) -> bool {
        if !self.generations.is_current(token) {
            log::debug!("discarding result of superseded lookup");
            return false;
        }
        self.state.lookup = LookupState::from_outcome(outcome);
        self.state.team_view.reset();
        self.state.loaded_at = Some(Local::now().format("%H:%M").to_string());
        if self.state.lookup.view().is_none() && self.state.active_tab == MenuItem::Matches {
            self.state.active_tab = MenuItem::Overview;
        }
        true
    }

    // -----------------------------------------------------------------------
    // Tab management
    // -----------------------------------------------------------------------

    pub fn update_tab(&mut self, next: MenuItem) {
        if self.state.active_tab == next {
            return;
        }
        self.state.previous_tab = self.state.active_tab;
        self.state.active_tab = next;
    }

    pub fn exit_help(&mut self) {
        if self.state.active_tab == MenuItem::Help {
            self.state.active_tab = self.state.previous_tab;
        }
    }

    pub fn toggle_show_logs(&mut self) {
        self.state.show_logs = !self.state.show_logs;
    }

    pub fn toggle_full_screen(&mut self) {
        self.settings.full_screen = !self.settings.full_screen;
    }

    // -----------------------------------------------------------------------
    // Event / match navigation: delegated to TeamViewState
    // -----------------------------------------------------------------------

    pub fn event_down(&mut self) {
        let count = self.state.lookup.view().map(|v| v.events.len()).unwrap_or(0);
        self.state.team_view.event_down(count);
    }

    pub fn event_up(&mut self) {
        self.state.team_view.event_up();
    }

    pub fn matches_down(&mut self) {
        let count = self
            .state
            .lookup
            .view()
            .and_then(|v| self.state.team_view.selected(v))
            .and_then(|e| e.matches.matches())
            .map(|m| m.len())
            .unwrap_or(0);
        self.state.team_view.scroll_down(count);
    }

    pub fn matches_up(&mut self) {
        self.state.team_view.scroll_up();
    }

    /// Open the Matches tab for the selected event, if there is one.
    pub fn open_selected_event(&mut self) {
        let has_event = self
            .state
            .lookup
            .view()
            .is_some_and(|v| self.state.team_view.selected(v).is_some());
        if has_event {
            self.update_tab(MenuItem::Matches);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ftc_api::{AggregatedTeamView, EventParticipation, Location, TeamNumber, TeamProfile};

    fn app() -> App {
        App::new(AppSettings::default(), None)
    }

    fn view(events: usize) -> LookupOutcome {
        let number = TeamNumber::new(14584).unwrap();
        LookupOutcome::Found(Box::new(AggregatedTeamView {
            season: 2024,
            profile: TeamProfile {
                number,
                name: Some("Untitled".into()),
                school_name: None,
                sponsors: vec![],
                rookie_year: Some(2016),
                location: Location::default(),
            },
            metrics: None,
            events: (0..events).map(|_| EventParticipation::default()).collect(),
        }))
    }

    #[test]
    fn starts_editing_without_initial_team() {
        assert!(app().state.input.editing);
        let seeded = App::new(AppSettings::default(), Some("14584".into()));
        assert!(!seeded.state.input.editing);
        assert_eq!(seeded.state.input.text, "14584");
    }

    #[test]
    fn empty_input_does_not_start_lookup() {
        let mut app = app();
        app.state.input.text = "   ".into();
        assert!(app.begin_lookup().is_none());
        assert!(matches!(app.state.lookup, LookupState::Idle));
    }

    #[test]
    fn stale_results_are_discarded() {
        let mut app = app();
        app.state.input.text = "1".into();
        let (old, _) = app.begin_lookup().unwrap();
        app.state.input.text = "14584".into();
        let (new, input) = app.begin_lookup().unwrap();
        assert_eq!(input, "14584");

        let stale = LookupOutcome::TeamNotFound(TeamNumber::new(1).unwrap());
        assert!(!app.on_lookup_completed(old, stale));
        assert!(app.state.lookup.is_loading());

        assert!(app.on_lookup_completed(new, view(2)));
        assert!(app.state.lookup.view().is_some());
    }

    #[test]
    fn retry_reissues_last_input() {
        let mut app = app();
        assert!(app.retry_lookup().is_none());
        app.state.input.text = "42".into();
        let (first, _) = app.begin_lookup().unwrap();
        let (second, input) = app.retry_lookup().unwrap();
        assert_eq!(input, "42");
        assert!(second > first);
    }

    #[test]
    fn failed_lookup_leaves_matches_tab() {
        let mut app = app();
        app.state.input.text = "14584".into();
        let (token, _) = app.begin_lookup().unwrap();
        assert!(app.on_lookup_completed(token, view(1)));
        app.open_selected_event();
        assert_eq!(app.state.active_tab, MenuItem::Matches);

        let (token, _) = app.retry_lookup().unwrap();
        app.on_lookup_completed(token, LookupOutcome::InvalidIdentifier("x".into()));
        assert_eq!(app.state.active_tab, MenuItem::Overview);
    }

    #[test]
    fn open_selected_event_needs_an_event() {
        let mut app = app();
        app.state.input.text = "14584".into();
        let (token, _) = app.begin_lookup().unwrap();
        app.on_lookup_completed(token, view(0));
        app.open_selected_event();
        assert_eq!(app.state.active_tab, MenuItem::Overview);
    }
}
