use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use axum::{body, body::Body, http::Request, http::StatusCode, Router};
use berlin_events_lib::api::{create_router, AppState};
use berlin_events_lib::{DateRange, FetchError, FetchService};
use tower::ServiceExt;

const BODY_LIMIT: usize = 2 * 1024 * 1024;

const CSV: &str = "Name,Date,Start,End,Artists,Venue,Url,Attending\n\
Techno Night,2024-06-01,22:00,06:00,\"Artist A, Artist B\",Berghain,/events/123,450\n\
Afterhour,2024-06-02,06:00,14:00,Artist B,Kater Blau,/events/124,80\n";

struct CannedFetcher {
    fail: bool,
}

#[async_trait]
impl FetchService for CannedFetcher {
    async fn fetch(&self, _range: &DateRange, destination: &Path) -> Result<(), FetchError> {
        if self.fail {
            return Err(FetchError::MissingOutput(destination.to_path_buf()));
        }
        tokio::fs::write(destination, CSV)
            .await
            .expect("write canned csv");
        Ok(())
    }
}

fn app(dir: &Path, fail: bool) -> Router {
    create_router(AppState {
        fetcher: Arc::new(CannedFetcher { fail }),
        data_dir: Arc::new(PathBuf::from(dir)),
    })
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let req = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("build request");
    let resp = app.oneshot(req).await.expect("oneshot");
    let status = resp.status();
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body");
    let value = serde_json::from_slice(&bytes).expect("json body");
    (status, value)
}

#[tokio::test]
async fn scrape_events_returns_records() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (status, v) = get_json(
        app(dir.path(), false),
        "/api/scrape-events?startDate=2024-06-01&endDate=2024-06-08",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["success"], true);
    assert_eq!(v["count"], 2);
    assert_eq!(
        v["message"],
        "Successfully scraped 2 events from Resident Advisor"
    );
    let first = &v["events"][0];
    assert_eq!(first["name"], "Techno Night");
    assert_eq!(first["artists"], serde_json::json!(["Artist A", "Artist B"]));
    assert_eq!(first["sourceUrl"], "/events/123");
    assert_eq!(first["attendingCount"], 450);
}

#[tokio::test]
async fn blank_dates_fall_back_to_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (status, v) = get_json(app(dir.path(), false), "/api/scrape-events?startDate=&endDate=").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["count"], 2);
}

#[tokio::test]
async fn invalid_range_is_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (status, v) = get_json(
        app(dir.path(), false),
        "/api/scrape-events?startDate=2024-06-10&endDate=2024-06-01",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(v["success"], false);
    assert_eq!(v["message"], "Invalid date range");
}

#[tokio::test]
async fn fetch_failure_is_a_server_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (status, v) = get_json(app(dir.path(), true), "/api/scrape-events").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(v["success"], false);
    assert_eq!(v["message"], "Failed to scrape events");
    assert!(v["error"]
        .as_str()
        .unwrap_or_default()
        .contains("was not written"));
}

#[tokio::test]
async fn artists_endpoint_builds_profiles() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (status, v) = get_json(app(dir.path(), false), "/api/artists").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["count"], 2);

    let b = &v["artists"][1];
    assert_eq!(b["name"], "Artist B");
    assert_eq!(b["appearances"], 2);
    assert_eq!(b["venues"], serde_json::json!(["Berghain", "Kater Blau"]));
    assert_eq!(b["residentAdvisorUrl"], "https://ra.co/events/123");
}

#[tokio::test]
async fn whitespace_dates_are_not_treated_as_missing() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (status, v) = get_json(app(dir.path(), false), "/api/scrape-events?startDate=%20%20").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(v["success"], false);
}
