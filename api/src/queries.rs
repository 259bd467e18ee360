//! GraphQL documents for the FTCScout API.
//!
//! Score and per-event stat objects are season-specific union members
//! (`MatchScores2024`, `TeamEventStats2024`, ...), so documents that touch
//! them are built per season.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub operation: &'static str,
    pub document: String,
}

pub const TEAM_PROFILE: &str = "TeamProfile";
pub const TEAM_EVENTS: &str = "TeamEvents";
pub const EVENT_MATCHES: &str = "EventMatches";

/// Variables: `number: Int!`, `season: Int!`.
pub fn team_profile() -> Query {
    Query {
        operation: TEAM_PROFILE,
        document: "query TeamProfile($number: Int!, $season: Int!) {
  teamByNumber(number: $number) {
    name
    schoolName
    sponsors
    rookieYear
    location { city state country }
    quickStats(season: $season) {
      tot { value rank }
      auto { value rank }
      dc { value rank }
      eg { value rank }
      count
    }
  }
}"
        .to_owned(),
    }
}

/// Variables: `number: Int!`, `season: Int!`.
pub fn team_events(season: u16) -> Query {
    Query {
        operation: TEAM_EVENTS,
        document: format!(
            "query TeamEvents($number: Int!, $season: Int!) {{
  teamByNumber(number: $number) {{
    events(season: $season) {{
      eventCode
      event {{
        code
        name
        start
        end
        remote
        location {{ venue city state country }}
      }}
      stats {{
        ... on TeamEventStats{season} {{
          rank
          rp
          wins
          losses
          ties
          qualMatchesPlayed
          opr {{ totalPointsNp }}
          avg {{ totalPoints }}
        }}
      }}
    }}
  }}
}}"
        ),
    }
}

/// Variables: `season: Int!`, `code: String!`, `number: Int!`.
pub fn event_matches(season: u16) -> Query {
    Query {
        operation: EVENT_MATCHES,
        document: format!(
            "query EventMatches($season: Int!, $code: String!, $number: Int!) {{
  eventByCode(season: $season, code: $code) {{
    teamMatches(teamNumber: $number) {{
      match {{
        matchNum
        tournamentLevel
        teams {{ teamNumber alliance station }}
        scores {{
          ... on MatchScores{season} {{
            red {{ totalPoints }}
            blue {{ totalPoints }}
          }}
        }}
      }}
    }}
  }}
}}"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn season_fragments_follow_season() {
        assert!(team_events(2024).document.contains("... on TeamEventStats2024"));
        assert!(event_matches(2023).document.contains("... on MatchScores2023"));
    }

    #[test]
    fn operation_names_match_documents() {
        for q in [team_profile(), team_events(2024), event_matches(2024)] {
            assert!(q.document.starts_with(&format!("query {}(", q.operation)));
        }
    }
}
