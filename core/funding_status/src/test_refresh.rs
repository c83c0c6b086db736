use chrono::{DateTime, TimeZone, Utc};

use crate::invariants::{assert_all_project_invariants, assert_valid_status_transition};
use crate::{
    parse_project, parse_project_list, refresh_statuses, FundingError, FundingProject,
    ProjectStatus, ProjectView, StatusColor,
};

fn ymd(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
}

fn project(id: &str, status: ProjectStatus) -> FundingProject {
    FundingProject {
        id: id.to_string(),
        title: format!("Album {id}"),
        artist: Some("Mina".to_string()),
        start_date: ymd(2025, 1, 1),
        end_date: ymd(2025, 1, 31),
        current_amount: 50_000.0,
        target_amount: 100_000.0,
        status,
    }
}

const LIST_PAYLOAD: &str = r#"{
    "projects": [
        {
            "id": 1,
            "title": "Debut EP",
            "artistName": "Mina",
            "startDate": "2025-01-01T00:00:00.000Z",
            "endDate": "2025-01-31T00:00:00.000Z",
            "currentAmount": 50000,
            "targetAmount": 100000,
            "status": "DRAFT"
        },
        {
            "id": "p-2",
            "title": "Tour film",
            "startDate": "2024-06-01",
            "endDate": "2024-07-01",
            "currentAmount": "120000.50",
            "targetAmount": "100000",
            "status": "EXECUTING"
        },
        {
            "id": 3,
            "startDate": "whenever",
            "endDate": "2025-01-31",
            "targetAmount": 10
        },
        {
            "id": 4,
            "startDate": "2025-02-01",
            "endDate": "2025-01-01",
            "targetAmount": 10
        },
        {
            "id": 5,
            "startDate": "2025-01-01",
            "endDate": "2025-01-31",
            "currentAmount": -1,
            "targetAmount": 10
        }
    ]
}"#;

#[test]
fn test_list_payload_keeps_valid_and_reports_rejects() {
    let now = ymd(2025, 1, 15);
    let batch = parse_project_list(LIST_PAYLOAD, now).unwrap();

    assert_eq!(batch.projects.len(), 2);
    assert_eq!(batch.rejected.len(), 3);

    let first = &batch.projects[0];
    assert_eq!(first.id, "1");
    assert_eq!(first.artist.as_deref(), Some("Mina"));
    // Stale window status from the wire is re-derived.
    assert_eq!(first.status, ProjectStatus::Collecting);

    let second = &batch.projects[1];
    assert_eq!(second.id, "p-2");
    assert_eq!(second.current_amount, 120_000.5);
    // Settlement status is owned by the platform.
    assert_eq!(second.status, ProjectStatus::Executing);

    let rejected: Vec<_> = batch
        .rejected
        .iter()
        .map(|r| r.id.clone().unwrap_or_default())
        .collect();
    assert_eq!(rejected, vec!["3", "4", "5"]);
    assert!(matches!(batch.rejected[0].error, FundingError::InvalidDate(_)));
    assert!(matches!(batch.rejected[1].error, FundingError::InvalidWindow { .. }));
    assert!(matches!(
        batch.rejected[2].error,
        FundingError::InvalidAmount { field: "currentAmount", .. }
    ));

    for p in &batch.projects {
        assert_all_project_invariants(p, now);
    }
}

#[test]
fn test_bare_array_and_data_envelope() {
    let now = ymd(2025, 1, 15);
    let item = r#"{"id":9,"startDate":"2025-01-01","endDate":"2025-01-31","targetAmount":1}"#;

    let bare = parse_project_list(&format!("[{item}]"), now).unwrap();
    assert_eq!(bare.projects.len(), 1);
    assert_eq!(bare.projects[0].current_amount, 0.0);
    assert_eq!(bare.projects[0].title, "");

    let wrapped = parse_project_list(&format!(r#"{{"data":[{item}]}}"#), now).unwrap();
    assert_eq!(wrapped.projects, bare.projects);

    assert!(matches!(
        parse_project_list(r#"{"items":[]}"#, now),
        Err(FundingError::InvalidPayload(_))
    ));
    assert!(matches!(
        parse_project_list("not json", now),
        Err(FundingError::Json(_))
    ));
}

#[test]
fn test_single_project_payload() {
    let now = ymd(2025, 2, 10);
    let json = r#"{"project":{"id":7,"title":"Vinyl","startDate":"2025-01-01","endDate":"2025-01-31","currentAmount":1,"targetAmount":2,"status":"collecting"}}"#;
    let p = parse_project(json, now).unwrap();
    assert_eq!(p.id, "7");
    assert_eq!(p.status, ProjectStatus::Closed);

    let unknown = r#"{"id":7,"startDate":"2025-01-01","endDate":"2025-01-31","targetAmount":2,"status":"ARCHIVED"}"#;
    assert!(matches!(
        parse_project(unknown, now),
        Err(FundingError::UnknownStatus(_))
    ));
}

#[test]
fn test_refresh_is_copy_on_write() {
    let before = vec![
        project("a", ProjectStatus::Draft),
        project("b", ProjectStatus::Collecting),
        project("c", ProjectStatus::Succeeded),
    ];
    let snapshot = before.clone();

    let refreshed = refresh_statuses(&before, ymd(2025, 2, 1));

    assert_eq!(before, snapshot);
    let statuses: Vec<_> = refreshed.projects.iter().map(|p| p.status).collect();
    assert_eq!(
        statuses,
        vec![
            ProjectStatus::Closed,
            ProjectStatus::Closed,
            ProjectStatus::Succeeded
        ]
    );
    assert_eq!(refreshed.changes.len(), 2);
    for change in &refreshed.changes {
        assert!(change.is_forward());
        assert_valid_status_transition(change.from, change.to);
    }
}

#[test]
fn test_refresh_is_idempotent() {
    let now = ymd(2025, 1, 10);
    let projects = vec![project("a", ProjectStatus::Draft)];

    let once = refresh_statuses(&projects, now);
    assert_eq!(once.changes.len(), 1);
    assert_eq!(once.changes[0].to, ProjectStatus::Collecting);

    let twice = refresh_statuses(&once.projects, now);
    assert!(twice.is_unchanged());
    assert_eq!(twice.projects, once.projects);
}

#[test]
fn test_extended_end_date_moves_backwards() {
    let mut p = project("a", ProjectStatus::Closed);
    p.end_date = ymd(2025, 3, 1);
    let refreshed = refresh_statuses(&[p], ymd(2025, 2, 15));
    assert_eq!(refreshed.changes[0].to, ProjectStatus::Collecting);
    assert!(!refreshed.changes[0].is_forward());
}

#[test]
fn test_project_view() {
    let now = ymd(2025, 1, 15);
    let view = ProjectView::at(&project("a", ProjectStatus::Collecting), now);

    assert_eq!(view.badge.label, "Funding");
    assert_eq!(view.badge.color, StatusColor::Blue);
    assert_eq!(view.progress, 50.0);
    assert_eq!(view.progress_label, "50%");
    assert_eq!(view.amount_label, "50,000");
    assert_eq!(view.target_label, "100,000");
    assert_eq!(view.days_until_start, -14);
    assert_eq!(view.days_until_end, 16);

    let json = serde_json::to_value(&view).unwrap();
    assert_eq!(json["badge"]["status"], "COLLECTING");
    assert_eq!(json["daysUntilEnd"], 16);
}

#[test]
fn test_project_and_change_serialize_camel_case() {
    let refreshed = refresh_statuses(&[project("a", ProjectStatus::Draft)], ymd(2025, 1, 10));

    let json = serde_json::to_value(&refreshed.projects[0]).unwrap();
    assert_eq!(json["startDate"], "2025-01-01T00:00:00Z");
    assert_eq!(json["targetAmount"], 100_000.0);
    assert_eq!(json["status"], "COLLECTING");

    let json = serde_json::to_value(&refreshed.changes[0]).unwrap();
    assert_eq!(
        json,
        serde_json::json!({ "projectId": "a", "from": "DRAFT", "to": "COLLECTING" })
    );
}
