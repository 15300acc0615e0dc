// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use chrono::Duration;
use serde_json::json;
use trail_recorder::error::AppError;
use trail_recorder::models::{ActivityCreate, FinishedSession, GeoSample, PathDetail, SessionMetrics};
use trail_recorder::services::{ActivityBackend, ActivityClient, PendingUploads};
use wiremock::matchers::{header, header_regex, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod common;
use common::t0;

/// Nothing listens on port 1.
fn unreachable_client() -> ActivityClient {
    ActivityClient::new("http://127.0.0.1:1", Some("test-token".to_string()))
}

fn activity() -> ActivityCreate {
    let finished = FinishedSession {
        start_time: t0(),
        end_time: t0() + Duration::minutes(10),
        path: vec![GeoSample::new(37.3, -122.0, t0())],
        metrics: SessionMetrics {
            duration: 600,
            ..Default::default()
        },
    };
    ActivityCreate::from_finished(&finished, PathDetail::Full)
}

#[tokio::test]
async fn test_create_rejects_invalid_activity_before_sending() {
    let mut invalid = activity();
    invalid.end_time = invalid.start_time - Duration::seconds(1);
    invalid.distance = -5.0;

    let err = unreachable_client()
        .create_activity(&invalid)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_unreachable_backend_is_persistence_failure() {
    let client = unreachable_client();

    let err = client.create_activity(&activity()).await.unwrap_err();
    assert!(matches!(err, AppError::PersistenceFailure(_)));
    assert!(err.is_retryable());

    assert!(matches!(
        client.list_activities().await,
        Err(AppError::PersistenceFailure(_))
    ));
    assert!(matches!(
        client.delete_activity("act-1").await,
        Err(AppError::PersistenceFailure(_))
    ));
}

#[tokio::test]
async fn test_pending_upload_survives_unreachable_backend() {
    let pending = PendingUploads::new();
    let id = pending.hold(activity());

    assert!(pending.submit(&unreachable_client(), id).await.is_err());
    assert_eq!(pending.get(id), Some(activity()));
}

const GPX: &str = r#"<?xml version="1.0"?><gpx version="1.1"><trk><trkseg/></trk></gpx>"#;

#[tokio::test]
async fn test_export_gpx_returns_document() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/gpx/export/act-1"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_string(GPX))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = ActivityClient::new(mock_server.uri(), Some("test-token".to_string()));
    assert_eq!(client.export_gpx("act-1").await.unwrap(), GPX);
}

#[tokio::test]
async fn test_export_gpx_unknown_activity_is_not_found() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/gpx/export/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Activity not found"))
        .mount(&mock_server)
        .await;

    let client = ActivityClient::new(mock_server.uri(), None);
    let err = client.export_gpx("missing").await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(body) if body == "Activity not found"));
}

#[tokio::test]
async fn test_import_gpx_creates_activity() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/gpx/import"))
        .and(header_regex("content-type", "^multipart/form-data; boundary="))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "imported-1",
            "startTime": "2024-06-01T08:00:00Z",
            "endTime": "2024-06-01T09:00:00Z",
            "distance": 4200.0,
            "duration": 3600,
            "elevationGain": 180.0,
            "avgSpeed": 1.17,
            "maxSpeed": 2.0,
            "calories": 245.0
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = ActivityClient::new(mock_server.uri(), None);
    let record = client
        .import_gpx("morning.gpx", GPX.as_bytes().to_vec())
        .await
        .unwrap();
    assert_eq!(record.id, "imported-1");
    assert_eq!(record.duration, 3600);
    assert!(record.path.is_empty());
}

#[tokio::test]
async fn test_import_gpx_rejected_credentials() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/gpx/import"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&mock_server)
        .await;

    let client = ActivityClient::new(mock_server.uri(), Some("expired".to_string()));
    let err = client
        .import_gpx("morning.gpx", GPX.as_bytes().to_vec())
        .await
        .unwrap_err();
    assert!(matches!(
        &err,
        AppError::PersistenceFailure(msg) if msg == AppError::BACKEND_AUTH_ERROR
    ));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_create_sends_gpx_data() {
    let mock_server = MockServer::start().await;
    let activity = activity().with_gpx_data(GPX);
    Mock::given(method("POST"))
        .and(path("/api/activities"))
        .and(wiremock::matchers::body_partial_json(json!({ "gpxData": GPX })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "act-9",
            "startTime": "2024-06-01T08:00:00Z",
            "endTime": "2024-06-01T08:10:00Z",
            "distance": 0.0,
            "duration": 600,
            "elevationGain": 0.0,
            "avgSpeed": 0.0,
            "maxSpeed": 0.0,
            "calories": 0.0
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = ActivityClient::new(mock_server.uri(), None);
    let record = client.create_activity(&activity).await.unwrap();
    assert_eq!(record.id, "act-9");
}
