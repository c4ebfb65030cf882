use daily_paths::calendar::ScheduledSlot;
use daily_paths::config::Config;
use daily_paths::errors::RemoteError;
use daily_paths::remote::{ReadingSource, RestReadingSource};
use mockito::{Matcher, Server};
use std::path::PathBuf;
use std::time::Duration;

const API_KEY: &str = "test-anon-key";

fn client(server: &Server) -> RestReadingSource {
    RestReadingSource::new(server.url(), API_KEY, Duration::from_secs(5)).unwrap()
}

fn slot(n: u32) -> ScheduledSlot {
    ScheduledSlot::new(n).unwrap()
}

fn slot_query(n: u32) -> Matcher {
    Matcher::AllOf(vec![
        Matcher::UrlEncoded("select".into(), "*".into()),
        Matcher::UrlEncoded("day_of_year".into(), format!("eq.{}", n)),
        Matcher::UrlEncoded("limit".into(), "1".into()),
    ])
}

#[tokio::test]
async fn test_fetch_by_slot_sends_credentials_and_parses_row() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/rest/v1/readings")
        .match_query(slot_query(61))
        .match_header("apikey", API_KEY)
        .match_header("authorization", format!("Bearer {}", API_KEY).as_str())
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"[{"id": 61, "day_of_year": 61, "title": "March", "body": "One.\\n\\nTwo.",
                 "quote": "Q (A)", "thought_for_day": "T", "updated_at": "2024-01-02T00:00:00Z"}]"#,
        )
        .create_async()
        .await;

    let fetch = client(&server).fetch_by_slot(slot(61)).await.unwrap();

    mock.assert_async().await;
    let row = fetch.row.unwrap();
    assert_eq!(row.title.as_deref(), Some("March"));
    assert_eq!(row.body.as_deref(), Some("One.\\n\\nTwo."));
    assert_eq!(fetch.version_token.as_deref(), Some("2024-01-02T00:00:00Z"));
}

#[tokio::test]
async fn test_empty_result_is_not_found() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/rest/v1/readings")
        .match_query(slot_query(60))
        .with_status(200)
        .with_body("[]")
        .create_async()
        .await;

    let fetch = client(&server).fetch_by_slot(slot(60)).await.unwrap();

    assert!(fetch.row.is_none());
    assert!(fetch.version_token.is_none());
}

#[tokio::test]
async fn test_row_without_timestamp_has_no_version() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/rest/v1/readings")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"[{"id": "abc", "title": "Untimed"}]"#)
        .create_async()
        .await;

    let fetch = client(&server).fetch_by_slot(slot(1)).await.unwrap();

    assert!(fetch.row.is_some());
    assert!(fetch.version_token.is_none());
}

#[tokio::test]
async fn test_server_error_maps_to_status() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/rest/v1/readings")
        .match_query(Matcher::Any)
        .with_status(401)
        .with_body(r#"{"message":"Invalid API key"}"#)
        .create_async()
        .await;

    match client(&server).fetch_by_slot(slot(5)).await {
        Err(RemoteError::Status { status, body }) => {
            assert_eq!(status, 401);
            assert!(body.contains("Invalid API key"));
        }
        other => panic!("Expected Status error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_malformed_body_maps_to_invalid_response() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/rest/v1/readings")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("<html>maintenance</html>")
        .create_async()
        .await;

    assert!(matches!(
        client(&server).fetch_by_slot(slot(5)).await,
        Err(RemoteError::InvalidResponse(_))
    ));
}

#[tokio::test]
async fn test_unreachable_server_maps_to_transport() {
    let source =
        RestReadingSource::new("http://127.0.0.1:9", API_KEY, Duration::from_secs(2)).unwrap();

    assert!(matches!(
        source.fetch_by_slot(slot(5)).await,
        Err(RemoteError::Transport(_))
    ));
}

#[tokio::test]
async fn test_available_slots_lists_ascending_and_skips_invalid() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/rest/v1/readings")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("select".into(), "day_of_year".into()),
            Matcher::UrlEncoded("order".into(), "day_of_year.asc".into()),
        ]))
        .with_status(200)
        .with_body(r#"[{"day_of_year": 1}, {"day_of_year": 60}, {"day_of_year": 400}, {"day_of_year": 366}]"#)
        .create_async()
        .await;

    let slots = client(&server).available_slots().await.unwrap();

    mock.assert_async().await;
    assert_eq!(slots, vec![slot(1), slot(60), slot(366)]);
}

#[test]
fn test_from_config_without_endpoint_is_offline() {
    let config = Config {
        cache_path: PathBuf::from("/tmp/readings.db"),
        ..Config::default()
    };

    let source = RestReadingSource::from_config(&config).unwrap();
    assert!(!source.is_configured());
}

#[test]
fn test_from_config_with_endpoint_is_online() {
    let config = Config {
        api_url: Some("https://example.test".to_string()),
        api_key: Some(API_KEY.to_string()),
        cache_path: PathBuf::from("/tmp/readings.db"),
        ..Config::default()
    };

    let source = RestReadingSource::from_config(&config).unwrap();
    assert!(source.is_configured());
}
