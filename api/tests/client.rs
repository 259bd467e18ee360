//! Transport-level behavior of `FtcScoutApi::execute` and the resolvers.

use ftc_api::TeamNumber;
use ftc_api::client::{ApiError, FtcScoutApi};
use ftc_api::queries;
use mockito::{Matcher, ServerGuard};
use serde_json::json;

fn api(server: &ServerGuard) -> FtcScoutApi {
    FtcScoutApi::new().with_endpoint(format!("{}/graphql", server.url()))
}

#[tokio::test]
async fn execute_posts_query_and_variables() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/graphql")
        .match_header("content-type", "application/json")
        .match_body(Matcher::PartialJson(json!({
            "operationName": "TeamProfile",
            "variables": { "number": 14584, "season": 2024 }
        })))
        .with_status(200)
        .with_body(json!({ "data": { "teamByNumber": null } }).to_string())
        .expect(1)
        .create_async()
        .await;

    let data = api(&server)
        .execute(&queries::team_profile(), json!({ "number": 14584, "season": 2024 }))
        .await
        .expect("data");

    assert_eq!(data, json!({ "teamByNumber": null }));
    mock.assert_async().await;
}

#[tokio::test]
async fn server_error_is_a_status_failure() {
    let mut server = mockito::Server::new_async().await;
    let _m = server.mock("POST", "/graphql").with_status(502).create_async().await;

    let err = api(&server)
        .execute(&queries::team_profile(), json!({}))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Status(502, _)));
    assert!(err.is_network());
}

#[tokio::test]
async fn graphql_errors_on_bad_request_are_surfaced() {
    let mut server = mockito::Server::new_async().await;
    let _m = server
        .mock("POST", "/graphql")
        .with_status(400)
        .with_body(json!({ "errors": [{ "message": "Unknown type MatchScores1999" }] }).to_string())
        .create_async()
        .await;

    let err = api(&server)
        .execute(&queries::event_matches(1999), json!({}))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::GraphQl(ref m) if m[0].contains("MatchScores1999")));
    assert!(!err.is_network());
}

#[tokio::test]
async fn non_json_body_is_malformed() {
    let mut server = mockito::Server::new_async().await;
    let _m = server
        .mock("POST", "/graphql")
        .with_status(200)
        .with_body("not json")
        .create_async()
        .await;

    let err = api(&server)
        .execute(&queries::team_profile(), json!({}))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Malformed(_)));
}

#[tokio::test]
async fn profile_resolver_reports_absent_team() {
    let mut server = mockito::Server::new_async().await;
    let _m = server
        .mock("POST", "/graphql")
        .with_status(200)
        .with_body(json!({ "data": { "teamByNumber": {} } }).to_string())
        .create_async()
        .await;

    let team = TeamNumber::new(1).unwrap();
    let bundle = api(&server).fetch_team_profile(team, 2024).await.unwrap();
    assert!(bundle.is_none());
}

#[tokio::test]
async fn match_resolver_tolerates_missing_event() {
    let mut server = mockito::Server::new_async().await;
    let _m = server
        .mock("POST", "/graphql")
        .match_body(Matcher::PartialJson(json!({
            "variables": { "season": 2024, "code": "NOPE", "number": 7 }
        })))
        .with_status(200)
        .with_body(json!({ "data": { "eventByCode": null } }).to_string())
        .create_async()
        .await;

    let team = TeamNumber::new(7).unwrap();
    let matches = api(&server).fetch_event_matches(2024, "NOPE", team).await.unwrap();
    assert!(matches.is_empty());
}

#[tokio::test]
async fn event_resolver_skips_entries_without_event() {
    let mut server = mockito::Server::new_async().await;
    let _m = server
        .mock("POST", "/graphql")
        .with_status(200)
        .with_body(
            json!({
                "data": { "teamByNumber": { "events": [
                    { "eventCode": "GONE", "event": null, "stats": null },
                    {
                        "eventCode": "KEEP",
                        "event": { "code": "KEEP", "start": "2024-10-12" },
                        "stats": {}
                    }
                ] } }
            })
            .to_string(),
        )
        .create_async()
        .await;

    let team = TeamNumber::new(7).unwrap();
    let events = api(&server).fetch_team_events(team, 2024).await.unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event.code, "KEEP");
    assert_eq!(events[0].rank, None);
    assert_eq!(events[0].record, None);
}
