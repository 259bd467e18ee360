//! FTCScout GraphQL wire types: serde shapes for the `data` member of each
//! response. These map to the domain types in client.rs.
//!
//! Upstream marks missing objects as null, `{}`, or by leaving the key out.
//! Every optional object field goes through [`absent`], so all three arrive
//! here as `None`.
use serde::de::{DeserializeOwned, Deserializer, Error as _};
use serde::Deserialize;
use serde_json::Value;

/// Deserialize an optional object, treating null, `{}` and a missing key
/// (with `#[serde(default)]`) as `None`.
pub fn absent<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(map)) if map.is_empty() => Ok(None),
        Some(value) => T::deserialize(value).map(Some).map_err(D::Error::custom),
    }
}

/// True when a value carries no information: null or an empty object.
pub fn is_degenerate(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

// ---------------------------------------------------------------------------
// TeamProfile
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TeamProfileData {
    #[serde(default, deserialize_with = "absent")]
    pub team_by_number: Option<FtcTeam>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct FtcTeam {
    pub name: Option<String>,
    pub school_name: Option<String>,
    pub sponsors: Option<Vec<String>>,
    pub rookie_year: Option<i32>,
    #[serde(default, deserialize_with = "absent")]
    pub location: Option<FtcLocation>,
    #[serde(default, deserialize_with = "absent")]
    pub quick_stats: Option<FtcQuickStats>,
}

#[derive(Debug, Deserialize, Default)]
pub struct FtcLocation {
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct FtcQuickStats {
    #[serde(default, deserialize_with = "absent")]
    pub tot: Option<FtcQuickStat>,
    #[serde(default, deserialize_with = "absent")]
    pub auto: Option<FtcQuickStat>,
    #[serde(default, deserialize_with = "absent")]
    pub dc: Option<FtcQuickStat>,
    #[serde(default, deserialize_with = "absent")]
    pub eg: Option<FtcQuickStat>,
    pub count: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
pub struct FtcQuickStat {
    pub value: Option<f64>,
    pub rank: Option<u32>,
}

// ---------------------------------------------------------------------------
// TeamEvents
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TeamEventsData {
    #[serde(default, deserialize_with = "absent")]
    pub team_by_number: Option<FtcTeamEvents>,
}

#[derive(Debug, Deserialize, Default)]
pub struct FtcTeamEvents {
    /// Normally a list, but historically sometimes `{}`. Shape is checked by
    /// the resolver so the quirk can be logged.
    #[serde(default)]
    pub events: Value,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct FtcTeamEvent {
    pub event_code: Option<String>,
    #[serde(default, deserialize_with = "absent")]
    pub event: Option<FtcEvent>,
    #[serde(default, deserialize_with = "absent")]
    pub stats: Option<FtcTeamEventStats>,
}

#[derive(Debug, Deserialize, Default)]
pub struct FtcEvent {
    pub code: Option<String>,
    pub name: Option<String>,
    pub start: Option<String>, // "2024-10-01"
    pub end: Option<String>,
    pub remote: Option<bool>,
    #[serde(default, deserialize_with = "absent")]
    pub location: Option<FtcEventLocation>,
}

#[derive(Debug, Deserialize, Default)]
pub struct FtcEventLocation {
    pub venue: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct FtcTeamEventStats {
    pub rank: Option<u32>,
    pub rp: Option<f64>,
    pub wins: Option<u32>,
    pub losses: Option<u32>,
    pub ties: Option<u32>,
    pub qual_matches_played: Option<u32>,
    #[serde(default, deserialize_with = "absent")]
    pub opr: Option<FtcPointsNp>,
    #[serde(default, deserialize_with = "absent")]
    pub avg: Option<FtcPoints>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct FtcPointsNp {
    pub total_points_np: Option<f64>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct FtcPoints {
    pub total_points: Option<f64>,
}

// ---------------------------------------------------------------------------
// EventMatches
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct EventMatchesData {
    #[serde(default, deserialize_with = "absent")]
    pub event_by_code: Option<FtcEventMatches>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct FtcEventMatches {
    pub team_matches: Option<Vec<FtcTeamMatch>>,
}

#[derive(Debug, Deserialize, Default)]
pub struct FtcTeamMatch {
    #[serde(rename = "match", default, deserialize_with = "absent")]
    pub match_: Option<FtcMatch>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct FtcMatch {
    pub match_num: Option<u32>,
    pub tournament_level: Option<String>, // "Quals" | "Semis" | "Finals" | "DoubleElim"
    pub teams: Option<Vec<FtcMatchTeam>>,
    #[serde(default, deserialize_with = "absent")]
    pub scores: Option<FtcMatchScores>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct FtcMatchTeam {
    pub team_number: Option<u32>,
    pub alliance: Option<String>, // "Red" | "Blue"
    pub station: Option<String>,  // "One" | "Two"
}

#[derive(Debug, Deserialize, Default)]
pub struct FtcMatchScores {
    #[serde(default, deserialize_with = "absent")]
    pub red: Option<FtcAllianceScore>,
    #[serde(default, deserialize_with = "absent")]
    pub blue: Option<FtcAllianceScore>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct FtcAllianceScore {
    pub total_points: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn null_empty_and_missing_objects_are_absent() {
        for payload in [
            json!({ "teamByNumber": null }),
            json!({ "teamByNumber": {} }),
            json!({}),
        ] {
            let data: TeamProfileData = serde_json::from_value(payload).unwrap();
            assert!(data.team_by_number.is_none());
        }
    }

    #[test]
    fn nested_empty_objects_are_absent() {
        let data: TeamProfileData = serde_json::from_value(json!({
            "teamByNumber": {
                "number": 14584,
                "name": "Untitled",
                "location": {},
                "quickStats": { "tot": null, "auto": {}, "dc": { "value": 12.5, "rank": 3 } }
            }
        }))
        .unwrap();
        let team = data.team_by_number.unwrap();
        assert!(team.location.is_none());
        let stats = team.quick_stats.unwrap();
        assert!(stats.tot.is_none());
        assert!(stats.auto.is_none());
        assert!(stats.eg.is_none());
        assert_eq!(stats.dc.unwrap().value, Some(12.5));
    }

    #[test]
    fn present_object_with_wrong_shape_is_an_error() {
        let payload = json!({ "teamByNumber": { "rookieYear": "soon" } });
        let res = serde_json::from_value::<TeamProfileData>(payload);
        assert!(res.is_err());
    }

    #[test]
    fn match_key_is_renamed() {
        let m: FtcTeamMatch = serde_json::from_value(json!({
            "match": { "matchNum": 3, "tournamentLevel": "Quals", "scores": {} }
        }))
        .unwrap();
        let inner = m.match_.unwrap();
        assert_eq!(inner.match_num, Some(3));
        assert!(inner.scores.is_none());
    }

    #[test]
    fn degenerate_values() {
        assert!(is_degenerate(&json!(null)));
        assert!(is_degenerate(&json!({})));
        assert!(!is_degenerate(&json!([])));
        assert!(!is_degenerate(&json!({ "a": 1 })));
    }
}
