use crate::client::{ApiError, FtcScoutApi};
use crate::{
    AggregatedTeamView, EventMatches, EventParticipation, Match, MatchKind, MatchRecord,
    TeamNumber,
};
use futures_util::StreamExt;
use futures_util::stream;
use log::{debug, error, info, warn};
use std::cmp::Ordering;
use std::fmt;

/// Concurrent match-history requests per lookup.
pub const DEFAULT_MATCH_CONCURRENCY: usize = 8;

/// Whole-lookup failure. Per-event match failures never end up here; they are
/// recorded on the event as [`EventMatches::Unavailable`].
#[derive(Debug)]
pub enum LookupError {
    /// Transport or HTTP status failure. Retrying the lookup may succeed.
    Network(ApiError),
    /// Upstream answered with something we could not interpret.
    Malformed(ApiError),
}

impl LookupError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, LookupError::Network(_))
    }
}

impl From<ApiError> for LookupError {
    fn from(e: ApiError) -> Self {
        if e.is_network() {
            LookupError::Network(e)
        } else {
            LookupError::Malformed(e)
        }
    }
}

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupError::Network(e) => write!(f, "network failure: {e}"),
            LookupError::Malformed(e) => write!(f, "unexpected upstream response: {e}"),
        }
    }
}

impl std::error::Error for LookupError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LookupError::Network(e) | LookupError::Malformed(e) => Some(e),
        }
    }
}

/// Terminal result of one lookup.
#[derive(Debug)]
pub enum LookupOutcome {
    Found(Box<AggregatedTeamView>),
    TeamNotFound(TeamNumber),
    InvalidIdentifier(String),
    LookupFailed(LookupError),
}

/// Turns a team identifier into an [`AggregatedTeamView`].
#[derive(Debug, Clone)]
pub struct Aggregator {
    api: FtcScoutApi,
    season: u16,
    concurrency: usize,
}

impl Aggregator {
    pub fn new(api: FtcScoutApi, season: u16) -> Self {
        Self {
            api,
            season,
            concurrency: DEFAULT_MATCH_CONCURRENCY,
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn season(&self) -> u16 {
        self.season
    }

    /// Validate `input` and run the full pipeline. Invalid input never
    /// reaches the network.
    pub async fn lookup(&self, input: &str) -> LookupOutcome {
        let team = match input.parse::<TeamNumber>() {
            Ok(team) => team,
            Err(e) => {
                debug!("{e}");
                return LookupOutcome::InvalidIdentifier(e.0);
            }
        };

        match self.aggregate(team).await {
            Ok(Some(view)) => LookupOutcome::Found(Box::new(view)),
            Ok(None) => LookupOutcome::TeamNotFound(team),
            Err(e) => {
                error!("lookup for team {team} failed: {e}");
                LookupOutcome::LookupFailed(e)
            }
        }
    }

    /// Profile, then events, then every event's matches. `Ok(None)` when the
    /// team does not exist upstream; no event or match queries are sent then.
    pub async fn aggregate(
        &self,
        team: TeamNumber,
    ) -> Result<Option<AggregatedTeamView>, LookupError> {
        let Some(bundle) = self.api.fetch_team_profile(team, self.season).await? else {
            info!("team {team} not found for season {}", self.season);
            return Ok(None);
        };

        let mut events = self.api.fetch_team_events(team, self.season).await?;
        sort_events_recent_first(&mut events);
        debug!("team {team}: {} events, fetching matches", events.len());

        // `buffered` yields in input order, so completion order cannot leak
        // into the view.
        let codes: Vec<String> = events.iter().map(|e| e.event.code.clone()).collect();
        let resolved: Vec<EventMatches> = stream::iter(codes)
            .map(|code| self.resolve_event_matches(code, team))
            .buffered(self.concurrency)
            .collect()
            .await;

        for (event, matches) in events.iter_mut().zip(resolved) {
            event.matches = matches;
        }

        let view = AggregatedTeamView {
            season: self.season,
            profile: bundle.profile,
            metrics: bundle.metrics,
            events,
        };
        if view.partial_failure() {
            warn!(
                "team {team}: matches unavailable for {} of {} events",
                view.unavailable_events().count(),
                view.events.len()
            );
        }
        Ok(Some(view))
    }

    async fn resolve_event_matches(&self, code: String, team: TeamNumber) -> EventMatches {
        match self.api.fetch_event_matches(self.season, &code, team).await {
            Ok(records) => EventMatches::Loaded {
                matches: qualification_matches(records, team),
            },
            Err(e) => {
                warn!("matches for event {code} unavailable: {e}");
                EventMatches::Unavailable {
                    reason: e.to_string(),
                }
            }
        }
    }
}

/// Most recent start date first. Stable, so events sharing a date keep their
/// upstream order; undated events go last.
pub fn sort_events_recent_first(events: &mut [EventParticipation]) {
    events.sort_by(|a, b| match (a.event.start, b.event.start) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

/// Qualification matches only, ascending by match number, enriched for `team`.
pub fn qualification_matches(records: Vec<MatchRecord>, team: TeamNumber) -> Vec<Match> {
    let mut matches: Vec<Match> = records
        .into_iter()
        .filter(|r| r.kind == MatchKind::Qualification)
        .map(|r| Match::from_record(r, team))
        .collect();
    matches.sort_by_key(|m| m.number);
    matches
}
