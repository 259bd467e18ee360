pub mod aggregate;
pub mod client;
pub mod ftcscout;
pub mod lookup;
pub mod queries;

use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Season queried when nothing else is configured.
pub const DEFAULT_SEASON: u16 = 2024;

// ---------------------------------------------------------------------------
// Domain types: clean model, independent of FTCScout wire format
// ---------------------------------------------------------------------------

/// A FIRST Tech Challenge team number. Always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct TeamNumber(u32);

impl TeamNumber {
    pub fn new(number: u32) -> Option<Self> {
        (number > 0).then_some(Self(number))
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for TeamNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// The rejected input, verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidTeamNumber(pub String);

impl fmt::Display for InvalidTeamNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid team number: {:?}", self.0)
    }
}

impl std::error::Error for InvalidTeamNumber {}

impl FromStr for TeamNumber {
    type Err = InvalidTeamNumber;

    /// Accepts ASCII digits only (after trimming). Signs, separators, zero and
    /// values beyond `u32` are rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(InvalidTeamNumber(s.to_owned()));
        }
        trimmed
            .parse::<u32>()
            .ok()
            .and_then(Self::new)
            .ok_or_else(|| InvalidTeamNumber(s.to_owned()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Location {
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
}

impl Location {
    /// "City, State, Country" from whichever parts are present.
    pub fn display(&self) -> Option<String> {
        let parts: Vec<&str> = [&self.city, &self.state, &self.country]
            .into_iter()
            .filter_map(|p| p.as_deref())
            .filter(|p| !p.trim().is_empty())
            .collect();
        (!parts.is_empty()).then(|| parts.join(", "))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamProfile {
    pub number: TeamNumber,
    pub name: Option<String>,
    pub school_name: Option<String>,
    pub sponsors: Vec<String>,
    pub rookie_year: Option<i32>,
    pub location: Location,
}

/// One season statistic with its season-wide rank, when upstream has one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StatValue {
    pub value: f64,
    pub rank: Option<u32>,
}

/// Season-level contribution estimates. Each is absent until upstream has
/// computed it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SeasonMetrics {
    pub total: Option<StatValue>,
    pub auto: Option<StatValue>,
    pub driver_controlled: Option<StatValue>,
    pub endgame: Option<StatValue>,
    /// Number of teams the ranks are out of.
    pub team_count: Option<u32>,
}

/// Result of the profile resolver: identity plus season metrics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamBundle {
    pub profile: TeamProfile,
    pub metrics: Option<SeasonMetrics>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EventInfo {
    pub code: String,
    pub name: Option<String>,
    pub venue: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub remote: Option<bool>,
}

impl EventInfo {
    pub fn location(&self) -> Option<String> {
        Location {
            city: self.city.clone(),
            state: self.state.clone(),
            country: self.country.clone(),
        }
        .display()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Record {
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
}

impl Record {
    pub fn played(&self) -> u32 {
        self.wins + self.losses + self.ties
    }

    fn add(&mut self, result: TeamResult) {
        match result {
            TeamResult::Win => self.wins += 1,
            TeamResult::Loss => self.losses += 1,
            TeamResult::Tie => self.ties += 1,
        }
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.wins, self.losses, self.ties)
    }
}

/// Match history for one event. `Loaded` with no matches means none were
/// played; `Unavailable` means they could not be fetched.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EventMatches {
    Loaded { matches: Vec<Match> },
    Unavailable { reason: String },
}

impl Default for EventMatches {
    fn default() -> Self {
        EventMatches::Loaded { matches: Vec::new() }
    }
}

impl EventMatches {
    pub fn matches(&self) -> Option<&[Match]> {
        match self {
            EventMatches::Loaded { matches } => Some(matches),
            EventMatches::Unavailable { .. } => None,
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, EventMatches::Unavailable { .. })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EventParticipation {
    pub event: EventInfo,
    pub rank: Option<u32>,
    pub record: Option<Record>,
    /// Ranking-point average.
    pub ranking_points: Option<f64>,
    /// Non-penalty OPR at this event.
    pub opr: Option<f64>,
    pub average_points: Option<f64>,
    pub qual_matches_played: Option<u32>,
    pub matches: EventMatches,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MatchKind {
    Qualification,
    Playoff,
    Other,
}

impl MatchKind {
    /// Map an upstream tournament level ("Quals", "Semis", "Finals", ...).
    pub fn from_level(level: &str) -> Self {
        match level {
            "Quals" => MatchKind::Qualification,
            "Semis" | "Finals" | "DoubleElim" | "Playoffs" => MatchKind::Playoff,
            _ => MatchKind::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AllianceColor {
    Red,
    Blue,
}

impl AllianceColor {
    pub fn label(&self) -> &'static str {
        match self {
            AllianceColor::Red => "Red",
            AllianceColor::Blue => "Blue",
        }
    }
}

/// Which alliance scored more. Absent scores compare as zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Outcome {
    Red,
    Blue,
    Tie,
}

impl Outcome {
    pub fn classify(red: Option<u32>, blue: Option<u32>) -> Self {
        let (red, blue) = (red.unwrap_or(0), blue.unwrap_or(0));
        match red.cmp(&blue) {
            std::cmp::Ordering::Greater => Outcome::Red,
            std::cmp::Ordering::Less => Outcome::Blue,
            std::cmp::Ordering::Equal => Outcome::Tie,
        }
    }
}

/// A match result from the point of view of the looked-up team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TeamResult {
    Win,
    Loss,
    Tie,
}

impl TeamResult {
    pub fn short(&self) -> &'static str {
        match self {
            TeamResult::Win => "W",
            TeamResult::Loss => "L",
            TeamResult::Tie => "T",
        }
    }
}

/// A two-station roster. A slot is `None` when upstream left it unpopulated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Alliance {
    pub stations: [Option<u32>; 2],
}

impl Alliance {
    pub fn contains(&self, team: TeamNumber) -> bool {
        self.stations.contains(&Some(team.get()))
    }
}

/// One played match as reported upstream, before enrichment.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchRecord {
    pub number: u32,
    pub kind: MatchKind,
    pub red: Alliance,
    pub blue: Alliance,
    pub red_points: Option<u32>,
    pub blue_points: Option<u32>,
}

/// A match enriched with outcome fields for one team.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Match {
    pub number: u32,
    pub kind: MatchKind,
    pub red: Alliance,
    pub blue: Alliance,
    /// `None` = no score yet, which is not the same as zero.
    pub red_score: Option<u32>,
    pub blue_score: Option<u32>,
    pub outcome: Outcome,
    pub team_alliance: Option<AllianceColor>,
    pub team_result: Option<TeamResult>,
    /// Own alliance score minus the opponent's, absent scores counted as zero.
    pub team_margin: Option<i64>,
}

impl Match {
    pub fn from_record(record: MatchRecord, team: TeamNumber) -> Self {
        let outcome = Outcome::classify(record.red_points, record.blue_points);
        let team_alliance = if record.red.contains(team) {
            Some(AllianceColor::Red)
        } else if record.blue.contains(team) {
            Some(AllianceColor::Blue)
        } else {
            None
        };

        let red = i64::from(record.red_points.unwrap_or(0));
        let blue = i64::from(record.blue_points.unwrap_or(0));
        let (team_result, team_margin) = match team_alliance {
            Some(color) => {
                let result = match (color, outcome) {
                    (_, Outcome::Tie) => TeamResult::Tie,
                    (AllianceColor::Red, Outcome::Red) | (AllianceColor::Blue, Outcome::Blue) => {
                        TeamResult::Win
                    }
                    _ => TeamResult::Loss,
                };
                let margin = match color {
                    AllianceColor::Red => red - blue,
                    AllianceColor::Blue => blue - red,
                };
                (Some(result), Some(margin))
            }
            None => (None, None),
        };

        Match {
            number: record.number,
            kind: record.kind,
            red: record.red,
            blue: record.blue,
            red_score: record.red_points,
            blue_score: record.blue_points,
            outcome,
            team_alliance,
            team_result,
            team_margin,
        }
    }

    pub fn has_score(&self) -> bool {
        self.red_score.is_some() && self.blue_score.is_some()
    }
}

/// Everything the presentation layer gets for one team lookup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedTeamView {
    pub season: u16,
    pub profile: TeamProfile,
    pub metrics: Option<SeasonMetrics>,
    /// Most recent event first.
    pub events: Vec<EventParticipation>,
}

impl AggregatedTeamView {
    /// True when at least one event's matches could not be loaded.
    pub fn partial_failure(&self) -> bool {
        self.events.iter().any(|e| e.matches.is_unavailable())
    }

    pub fn unavailable_events(&self) -> impl Iterator<Item = &EventParticipation> {
        self.events.iter().filter(|e| e.matches.is_unavailable())
    }

    /// W-L-T over every loaded, scored qualification match.
    pub fn season_record(&self) -> Record {
        let mut record = Record::default();
        for m in self
            .events
            .iter()
            .filter_map(|e| e.matches.matches())
            .flatten()
            .filter(|m| m.has_score())
        {
            if let Some(result) = m.team_result {
                record.add(result);
            }
        }
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn team(n: u32) -> TeamNumber {
        TeamNumber::new(n).unwrap()
    }

    fn record(
        red: [Option<u32>; 2],
        blue: [Option<u32>; 2],
        scores: (Option<u32>, Option<u32>),
    ) -> MatchRecord {
        MatchRecord {
            number: 1,
            kind: MatchKind::Qualification,
            red: Alliance { stations: red },
            blue: Alliance { stations: blue },
            red_points: scores.0,
            blue_points: scores.1,
        }
    }

    /// Red 1 and 2 against blue 3 and 4.
    fn standard(red_points: Option<u32>, blue_points: Option<u32>) -> MatchRecord {
        record([Some(1), Some(2)], [Some(3), Some(4)], (red_points, blue_points))
    }

    #[test]
    fn team_number_accepts_positive_integers_only() {
        assert_eq!("14584".parse::<TeamNumber>(), Ok(team(14584)));
        assert_eq!(" 42 ".parse::<TeamNumber>(), Ok(team(42)));
        for bad in ["", "  ", "0", "000", "-5", "+5", "12a", "1.5", "1 2", "abc", "99999999999"] {
            assert!(bad.parse::<TeamNumber>().is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn invalid_team_number_keeps_raw_input() {
        let err = "12a".parse::<TeamNumber>().unwrap_err();
        assert_eq!(err.0, "12a");
    }

    #[test]
    fn outcome_is_total_and_exclusive() {
        for red in 0..5u32 {
            for blue in 0..5u32 {
                let expected = if red > blue {
                    Outcome::Red
                } else if blue > red {
                    Outcome::Blue
                } else {
                    Outcome::Tie
                };
                assert_eq!(Outcome::classify(Some(red), Some(blue)), expected);
            }
        }
    }

    #[test]
    fn equal_scores_tie() {
        assert_eq!(Outcome::classify(Some(120), Some(120)), Outcome::Tie);
    }

    #[test]
    fn absent_score_compares_as_zero_but_stays_absent() {
        let m = Match::from_record(standard(None, Some(10)), team(1));
        assert_eq!(m.outcome, Outcome::Blue);
        assert_eq!(m.red_score, None);
        assert!(!m.has_score());
        assert_eq!(m.team_margin, Some(-10));
    }

    #[test]
    fn team_perspective_follows_alliance() {
        let rec = standard(Some(90), Some(60));
        let red_side = Match::from_record(rec.clone(), team(2));
        assert_eq!(red_side.team_alliance, Some(AllianceColor::Red));
        assert_eq!(red_side.team_result, Some(TeamResult::Win));
        assert_eq!(red_side.team_margin, Some(30));

        let blue_side = Match::from_record(rec.clone(), team(3));
        assert_eq!(blue_side.team_result, Some(TeamResult::Loss));
        assert_eq!(blue_side.team_margin, Some(-30));

        let absent = Match::from_record(rec, team(99));
        assert_eq!(absent.team_alliance, None);
        assert_eq!(absent.team_result, None);
    }

    #[test]
    fn empty_slot_does_not_match_team() {
        let rec = record([Some(7), None], [Some(8), Some(9)], (Some(1), Some(1)));
        let m = Match::from_record(rec, team(7));
        assert_eq!(m.team_alliance, Some(AllianceColor::Red));
        assert_eq!(m.team_result, Some(TeamResult::Tie));
    }

    #[test]
    fn tournament_levels_map_to_kinds() {
        assert_eq!(MatchKind::from_level("Quals"), MatchKind::Qualification);
        assert_eq!(MatchKind::from_level("Semis"), MatchKind::Playoff);
        assert_eq!(MatchKind::from_level("DoubleElim"), MatchKind::Playoff);
        assert_eq!(MatchKind::from_level("Practice"), MatchKind::Other);
    }

    #[test]
    fn location_display_skips_missing_parts() {
        let loc = Location {
            city: Some("Seattle".into()),
            state: None,
            country: Some("USA".into()),
        };
        assert_eq!(loc.display().as_deref(), Some("Seattle, USA"));
        assert_eq!(Location::default().display(), None);
    }

    #[test]
    fn season_record_skips_unscored_and_unavailable() {
        let t = team(1);
        let scored = Match::from_record(standard(Some(5), Some(3)), t);
        let unscored = Match::from_record(standard(None, None), t);
        let view = AggregatedTeamView {
            season: DEFAULT_SEASON,
            profile: TeamProfile {
                number: t,
                name: None,
                school_name: None,
                sponsors: vec![],
                rookie_year: None,
                location: Location::default(),
            },
            metrics: None,
            events: vec![
                EventParticipation {
                    matches: EventMatches::Loaded { matches: vec![scored, unscored] },
                    ..Default::default()
                },
                EventParticipation {
                    matches: EventMatches::Unavailable { reason: "timeout".into() },
                    ..Default::default()
                },
            ],
        };
        assert_eq!(view.season_record(), Record { wins: 1, losses: 0, ties: 0 });
        assert!(view.partial_failure());
        assert_eq!(view.unavailable_events().count(), 1);
    }
}
