use super::*;
use serde_json::json;

#[test]
fn leaderboard_accepts_numeric_id() {
    let entry = LeaderboardEntry::from_value(&json!({"id": 1, "points": 100})).unwrap();
    assert_eq!(entry.id(), "1");
    assert_eq!(entry.points, 100);
    assert!(entry.name.is_empty());
    assert!(entry.department.is_none());
}

#[test]
fn leaderboard_accepts_camel_case_aliases() {
    let entry = LeaderboardEntry::from_value(&json!({
        "id": "u-7",
        "userName": "Priya",
        "department": "Sales",
        "totalPoints": 2450,
        "level": 12,
        "rank": 3
    }))
    .unwrap();
    assert_eq!(entry.id, "u-7");
    assert_eq!(entry.name, "Priya");
    assert_eq!(entry.department.as_deref(), Some("Sales"));
    assert_eq!(entry.points, 2450);
    assert_eq!(entry.level, Some(12));
    assert_eq!(entry.rank, Some(3));
}

#[test]
fn leaderboard_missing_points_errors() {
    let err = LeaderboardEntry::from_value(&json!({"id": 1, "name": "x"})).unwrap_err();
    assert_eq!(err.kind, "leaderboard");
    assert!(err.reason.contains("points"));
}

#[test]
fn non_object_item_errors() {
    let err = ActivityItem::from_value(&json!("hello")).unwrap_err();
    assert_eq!(err.kind, "activity");
    assert!(err.to_string().starts_with("invalid activity record"));
}

#[test]
fn boolean_id_rejected() {
    assert!(RawRecord::from_value(&json!({"id": true})).is_err());
}

#[test]
fn sync_log_uses_system_alias_and_default_items() {
    let entry = SyncLogEntry::from_value(&json!({
        "id": 9,
        "system": "SCORM",
        "status": "success",
        "timestamp": "2024-03-01T10:00:00Z"
    }))
    .unwrap();
    assert_eq!(entry.source, "SCORM");
    assert_eq!(entry.items, 0);
    assert_eq!(entry.timestamp.as_deref(), Some("2024-03-01T10:00:00Z"));
}

#[test]
fn activity_item_reads_category() {
    let item = ActivityItem::from_value(&json!({
        "id": "a1",
        "user": "Sam",
        "action": "completed module",
        "category": "compliance"
    }))
    .unwrap();
    assert_eq!(item.user, "Sam");
    assert_eq!(item.category.as_deref(), Some("compliance"));
}

#[test]
fn raw_record_keeps_extra_fields() {
    let raw = RawRecord::from_value(&json!({"id": 5, "title": "Onboarding", "modules": 4})).unwrap();
    assert_eq!(raw.id(), "5");
    assert_eq!(raw.fields.get("title"), Some(&json!("Onboarding")));
    assert_eq!(raw.fields.get("modules"), Some(&json!(4)));
    assert!(!raw.fields.contains_key("id"));
}

#[test]
fn record_kind_parses_case_insensitively() {
    assert_eq!("Leaderboard".parse::<RecordKind>(), Ok(RecordKind::Leaderboard));
    assert_eq!(" sync ".parse::<RecordKind>(), Ok(RecordKind::Sync));
    assert_eq!(RecordKind::Activity.to_string(), "activity");
    assert_eq!(
        "charts".parse::<RecordKind>(),
        Err(ConfigError::UnknownRecordKind("charts".into()))
    );
}
