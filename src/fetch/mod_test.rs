use super::*;
use crate::records::{ActivityItem, LeaderboardEntry};
use crate::test_helpers::{ScriptedSource, Step, leaderboard};
use serde_json::json;

// =============================================================================
// unwrap_envelope
// =============================================================================

#[test]
fn bare_list_is_accepted() {
    let items = unwrap_envelope(json!([{"id": 1}, {"id": 2}])).unwrap();
    assert_eq!(items.len(), 2);
}

#[test]
fn data_envelope_is_unwrapped() {
    let items = unwrap_envelope(json!({"data": [{"id": 1}], "total": 1})).unwrap();
    assert_eq!(items, vec![json!({"id": 1})]);
}

#[test]
fn object_without_data_is_malformed() {
    let err = unwrap_envelope(json!({"rows": []})).unwrap_err();
    assert!(matches!(err, FetchError::Malformed(msg) if msg.contains("`data`")));
}

#[test]
fn non_list_data_is_malformed() {
    let err = unwrap_envelope(json!({"data": {"id": 1}})).unwrap_err();
    assert_eq!(err, FetchError::Malformed("`data` is an object, expected a list".into()));
}

#[test]
fn scalar_body_is_malformed() {
    let err = unwrap_envelope(json!("ok")).unwrap_err();
    assert_eq!(err, FetchError::Malformed("body is a string, expected a list".into()));
}

// =============================================================================
// normalize
// =============================================================================

#[test]
fn one_bad_item_fails_the_whole_set() {
    let err = normalize::<LeaderboardEntry>(vec![json!({"id": 1, "points": 5}), json!({"id": 2})]).unwrap_err();
    match err {
        FetchError::Malformed(msg) => assert!(msg.starts_with("item 1:"), "{msg}"),
        other => panic!("expected malformed, got {other:?}"),
    }
}

#[test]
fn empty_list_normalizes_to_empty() {
    let records = normalize::<ActivityItem>(Vec::new()).unwrap();
    assert!(records.is_empty());
}

// =============================================================================
// fetch_records
// =============================================================================

#[tokio::test]
async fn fetch_records_passes_filters_and_normalizes() {
    let source = ScriptedSource::new(vec![Step::ok(json!({"data": [{"id": 3, "points": 40}]}))]);
    let filters = Filters { time_range: Some(TimeRange::Week), department: Some("Ops".into()), category: None };

    let records: Vec<LeaderboardEntry> = fetch_records(&source, &filters, Duration::from_secs(1))
        .await
        .unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, "3");
    assert_eq!(records[0].points, 40);
    assert_eq!(source.last_filters(), Some(filters));
}

#[tokio::test]
async fn fetch_records_surfaces_source_error() {
    let source = ScriptedSource::new(vec![Step::fail()]);
    let err = fetch_records::<LeaderboardEntry>(&source, &Filters::default(), Duration::from_secs(1))
        .await
        .unwrap_err();
    assert_eq!(err, FetchError::Status { status: 503 });
}

#[tokio::test(start_paused = true)]
async fn fetch_records_times_out_hung_source() {
    let source = ScriptedSource::new(vec![Step::ok(leaderboard(1, 1)).after(Duration::from_secs(60))]);
    let err = fetch_records::<LeaderboardEntry>(&source, &Filters::default(), Duration::from_secs(5))
        .await
        .unwrap_err();
    assert_eq!(err, FetchError::Timeout { after_ms: 5000 });
}

#[test]
fn fetch_error_messages_are_readable() {
    assert_eq!(FetchError::Status { status: 502 }.to_string(), "endpoint returned status 502");
    assert_eq!(FetchError::Timeout { after_ms: 250 }.to_string(), "fetch timed out after 250ms");
}
