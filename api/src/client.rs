use crate::ftcscout::{
    EventMatchesData, FtcEvent, FtcMatch, FtcMatchTeam, FtcQuickStat, FtcTeam, FtcTeamEvent,
    TeamEventsData, TeamProfileData, is_degenerate,
};
use crate::queries::{self, Query};
use crate::{
    Alliance, AllianceColor, EventInfo, EventMatches, EventParticipation, Location, MatchKind,
    MatchRecord, Record, SeasonMetrics, StatValue, TeamBundle, TeamNumber, TeamProfile,
};
use chrono::NaiveDate;
use log::{debug, error, warn};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::fmt;
use std::time::Duration;

pub type ApiResult<T> = Result<T, ApiError>;

pub const FTCSCOUT_GRAPHQL: &str = "https://api.ftcscout.org/graphql";

/// GraphQL client for FTCScout. One HTTP request per call, no caching.
#[derive(Debug, Clone)]
pub struct FtcScoutApi {
    client: Client,
    endpoint: String,
    timeout: Duration,
}

impl Default for FtcScoutApi {
    fn default() -> Self {
        Self {
            client: Client::builder()
                .user_agent("ftctui/0.1 (terminal team stats viewer)")
                .build()
                .unwrap_or_default(),
            endpoint: FTCSCOUT_GRAPHQL.to_owned(),
            timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug)]
pub enum ApiError {
    /// Transport failure or timeout.
    Network(reqwest::Error, String),
    /// Non-success HTTP status without a GraphQL error body.
    Status(u16, String),
    /// Response body was not the structure we asked for.
    Malformed(String),
    /// Upstream answered with `errors` and no `data`.
    GraphQl(Vec<String>),
}

impl ApiError {
    /// Transport-level failures that re-triggering the lookup may fix.
    pub fn is_network(&self) -> bool {
        matches!(self, ApiError::Network(..) | ApiError::Status(..))
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Network(e, url) => write!(f, "Network error for {url}: {e}"),
            ApiError::Status(code, url) => write!(f, "HTTP {code} from {url}"),
            ApiError::Malformed(msg) => write!(f, "Malformed response: {msg}"),
            ApiError::GraphQl(messages) => write!(f, "GraphQL error: {}", messages.join("; ")),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::Network(e, _) => Some(e),
            _ => None,
        }
    }
}

impl FtcScoutApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Run one GraphQL query and return its `data` member.
    ///
    /// A null field inside `data` is how upstream says "not found"; that is
    /// returned as-is, not as an error.
    pub async fn execute(&self, query: &Query, variables: Value) -> ApiResult<Value> {
        let body = json!({
            "operationName": query.operation,
            "query": query.document,
            "variables": variables,
        });
        debug!("{} -> {}", query.operation, self.endpoint);

        let response = self
            .client
            .post(&self.endpoint)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| ApiError::Network(e, self.endpoint.clone()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::Network(e, self.endpoint.clone()))?;

        if !status.is_success() {
            // GraphQL servers report query errors with a 4xx and an errors body.
            if let Ok(envelope) = serde_json::from_str::<Value>(&text)
                && let Some(messages) = graphql_errors(&envelope)
            {
                return Err(ApiError::GraphQl(messages));
            }
            return Err(ApiError::Status(status.as_u16(), self.endpoint.clone()));
        }

        let envelope: Value = serde_json::from_str(&text).map_err(|e| {
            error!("{}: response is not JSON: {e}", query.operation);
            ApiError::Malformed(format!("{}: response is not JSON: {e}", query.operation))
        })?;
        extract_data(query.operation, envelope)
    }

    /// Team identity and season metrics. `None` when upstream has no such team.
    pub async fn fetch_team_profile(
        &self,
        team: TeamNumber,
        season: u16,
    ) -> ApiResult<Option<TeamBundle>> {
        let data = self
            .execute(
                &queries::team_profile(),
                json!({ "number": team.get(), "season": season }),
            )
            .await?;
        let raw: TeamProfileData = decode(queries::TEAM_PROFILE, data)?;
        Ok(raw.team_by_number.map(|t| map_team(team, t)))
    }

    /// Events attended in `season`, in the order upstream returned them.
    /// Match lists are left empty for the orchestrator to fill.
    pub async fn fetch_team_events(
        &self,
        team: TeamNumber,
        season: u16,
    ) -> ApiResult<Vec<EventParticipation>> {
        let data = self
            .execute(
                &queries::team_events(season),
                json!({ "number": team.get(), "season": season }),
            )
            .await?;
        let raw: TeamEventsData = decode(queries::TEAM_EVENTS, data)?;
        let Some(team_events) = raw.team_by_number else {
            debug!("team {team} vanished between profile and events queries");
            return Ok(Vec::new());
        };

        let entries = participation_entries(team, team_events.events)?;
        Ok(entries
            .into_iter()
            .filter_map(|entry| map_participation(team, entry))
            .collect())
    }

    /// The team's matches at one event, unfiltered and in upstream order.
    pub async fn fetch_event_matches(
        &self,
        season: u16,
        event_code: &str,
        team: TeamNumber,
    ) -> ApiResult<Vec<MatchRecord>> {
        let data = self
            .execute(
                &queries::event_matches(season),
                json!({ "season": season, "code": event_code, "number": team.get() }),
            )
            .await?;
        let raw: EventMatchesData = decode(queries::EVENT_MATCHES, data)?;
        let Some(event) = raw.event_by_code else {
            warn!("event {event_code} not found upstream for season {season}");
            return Ok(Vec::new());
        };

        Ok(event
            .team_matches
            .unwrap_or_default()
            .into_iter()
            .filter_map(|tm| tm.match_)
            .filter_map(map_match)
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Envelope handling
// ---------------------------------------------------------------------------

fn graphql_errors(envelope: &Value) -> Option<Vec<String>> {
    let errors = envelope.get("errors")?.as_array()?;
    if errors.is_empty() {
        return None;
    }
    Some(
        errors
            .iter()
            .map(|e| {
                e.get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown error")
                    .to_owned()
            })
            .collect(),
    )
}

fn extract_data(operation: &str, mut envelope: Value) -> ApiResult<Value> {
    if !envelope.is_object() {
        error!("{operation}: response is not a JSON object");
        return Err(ApiError::Malformed(format!(
            "{operation}: response is not a JSON object"
        )));
    }
    let errors = graphql_errors(&envelope);
    match (envelope.get_mut("data").map(Value::take), errors) {
        (Some(data), errors) if data.is_object() => match errors {
            // A failed resolver nulls its field; that null is not "not found".
            Some(messages) if missing_root_field(&data) => {
                error!("{operation}: {}", messages.join("; "));
                Err(ApiError::GraphQl(messages))
            }
            Some(messages) => {
                warn!("{operation}: partial data with errors: {}", messages.join("; "));
                Ok(data)
            }
            None => Ok(data),
        },
        (_, Some(messages)) => Err(ApiError::GraphQl(messages)),
        (Some(Value::Null), None) | (None, None) => {
            error!("{operation}: response has neither data nor errors");
            Err(ApiError::Malformed(format!(
                "{operation}: response has neither data nor errors"
            )))
        }
        (Some(other), None) => {
            error!("{operation}: data member is not an object");
            Err(ApiError::Malformed(format!("{operation}: unexpected data member {other}")))
        }
    }
}

fn missing_root_field(data: &Value) -> bool {
    data.as_object()
        .is_none_or(|fields| fields.is_empty() || fields.values().any(is_degenerate))
}

fn decode<T: DeserializeOwned>(operation: &str, data: Value) -> ApiResult<T> {
    serde_json::from_value(data).map_err(|e| {
        error!("{operation}: unexpected payload shape: {e}");
        ApiError::Malformed(format!("{operation}: {e}"))
    })
}

/// Normalize the `events` member. A list is the normal case; null or `{}`
/// both mean the team attended nothing this season.
fn participation_entries(team: TeamNumber, events: Value) -> ApiResult<Vec<FtcTeamEvent>> {
    if events.is_array() {
        return decode(queries::TEAM_EVENTS, events);
    }
    if is_degenerate(&events) {
        if events.is_object() {
            warn!("team {team}: events came back as an empty object, treating as no events");
        }
        return Ok(Vec::new());
    }
    error!("team {team}: events member has unexpected shape");
    Err(ApiError::Malformed(format!(
        "{}: events is neither a list nor empty: {events}",
        queries::TEAM_EVENTS
    )))
}

// ---------------------------------------------------------------------------
// Mapping: FTCScout wire types → clean domain types
// ---------------------------------------------------------------------------

fn map_team(number: TeamNumber, t: FtcTeam) -> TeamBundle {
    let location = t
        .location
        .map(|l| Location {
            city: non_empty(l.city),
            state: non_empty(l.state),
            country: non_empty(l.country),
        })
        .unwrap_or_default();

    let metrics = t.quick_stats.map(|qs| SeasonMetrics {
        total: qs.tot.and_then(map_stat),
        auto: qs.auto.and_then(map_stat),
        driver_controlled: qs.dc.and_then(map_stat),
        endgame: qs.eg.and_then(map_stat),
        team_count: qs.count,
    });

    TeamBundle {
        profile: TeamProfile {
            number,
            name: non_empty(t.name),
            school_name: non_empty(t.school_name),
            sponsors: t
                .sponsors
                .unwrap_or_default()
                .into_iter()
                .filter(|s| !s.trim().is_empty())
                .collect(),
            rookie_year: t.rookie_year,
            location,
        },
        metrics,
    }
}

fn map_stat(stat: FtcQuickStat) -> Option<StatValue> {
    stat.value.map(|value| StatValue { value, rank: stat.rank })
}

fn map_participation(team: TeamNumber, entry: FtcTeamEvent) -> Option<EventParticipation> {
    let Some(event) = entry.event else {
        warn!(
            "team {team}: participation {} has no event details, skipping",
            entry.event_code.as_deref().unwrap_or("<unknown>")
        );
        return None;
    };
    let Some(info) = map_event(event, entry.event_code) else {
        warn!("team {team}: participation without an event code, skipping");
        return None;
    };

    let stats = entry.stats;
    let record = stats.as_ref().and_then(|s| match (s.wins, s.losses, s.ties) {
        (None, None, None) => None,
        (w, l, t) => Some(Record {
            wins: w.unwrap_or(0),
            losses: l.unwrap_or(0),
            ties: t.unwrap_or(0),
        }),
    });

    Some(EventParticipation {
        event: info,
        rank: stats.as_ref().and_then(|s| s.rank),
        record,
        ranking_points: stats.as_ref().and_then(|s| s.rp),
        opr: stats
            .as_ref()
            .and_then(|s| s.opr.as_ref())
            .and_then(|o| o.total_points_np),
        average_points: stats
            .as_ref()
            .and_then(|s| s.avg.as_ref())
            .and_then(|a| a.total_points),
        qual_matches_played: stats.as_ref().and_then(|s| s.qual_matches_played),
        matches: EventMatches::default(),
    })
}

fn map_event(event: FtcEvent, fallback_code: Option<String>) -> Option<EventInfo> {
    let code = non_empty(event.code).or_else(|| non_empty(fallback_code))?;
    let location = event.location.unwrap_or_default();
    Some(EventInfo {
        code,
        name: non_empty(event.name),
        venue: non_empty(location.venue),
        city: non_empty(location.city),
        state: non_empty(location.state),
        country: non_empty(location.country),
        start: event.start.as_deref().and_then(parse_date),
        end: event.end.as_deref().and_then(parse_date),
        remote: event.remote,
    })
}

fn map_match(m: FtcMatch) -> Option<MatchRecord> {
    let Some(number) = m.match_num else {
        warn!("dropping match without a match number");
        return None;
    };
    let kind = m
        .tournament_level
        .as_deref()
        .map(MatchKind::from_level)
        .unwrap_or(MatchKind::Other);
    let teams = m.teams.unwrap_or_default();
    let scores = m.scores.unwrap_or_default();

    Some(MatchRecord {
        number,
        kind,
        red: alliance_roster(&teams, AllianceColor::Red),
        blue: alliance_roster(&teams, AllianceColor::Blue),
        red_points: scores.red.and_then(|s| s.total_points),
        blue_points: scores.blue.and_then(|s| s.total_points),
    })
}

/// Place each team of `color` into its station slot. Teams with an unknown
/// station fill the first free slot; extras beyond two are dropped.
fn alliance_roster(teams: &[FtcMatchTeam], color: AllianceColor) -> Alliance {
    let mut stations = [None, None];
    let mut unplaced = Vec::new();

    for t in teams.iter().filter(|t| t.alliance.as_deref() == Some(color.label())) {
        let Some(number) = t.team_number else {
            continue;
        };
        match t.station.as_deref().and_then(station_index) {
            Some(idx) if stations[idx].is_none() => stations[idx] = Some(number),
            _ => unplaced.push(number),
        }
    }

    for number in unplaced {
        if let Some(slot) = stations.iter_mut().find(|s| s.is_none()) {
            *slot = Some(number);
        } else {
            warn!("{} alliance has more than two teams, dropping {number}", color.label());
        }
    }

    Alliance { stations }
}

fn station_index(station: &str) -> Option<usize> {
    match station {
        "One" | "1" => Some(0),
        "Two" | "2" => Some(1),
        _ => None,
    }
}

/// Accepts "YYYY-MM-DD" and full timestamps ("2024-10-01T00:00:00Z").
fn parse_date(s: &str) -> Option<NaiveDate> {
    let trimmed = s.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .or_else(|| trimmed.get(..10).and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok()))
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.filter(|v| !v.trim().is_empty())
}
