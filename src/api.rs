use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

use crate::fetch::FetchService;
use crate::models::{ArtistProfile, EventRecord, ScrapeOptions};
use crate::{artists, range, scrape_events, ScrapeError};

#[derive(Clone)]
pub struct AppState {
    pub fetcher: Arc<dyn FetchService>,
    pub data_dir: Arc<PathBuf>,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/api/scrape-events", get(scrape_events_handler))
        .route("/api/artists", get(artists_handler))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RangeQuery {
    start_date: Option<String>,
    end_date: Option<String>,
}

impl RangeQuery {
    /// Empty query values count as absent.
    fn into_options(self) -> ScrapeOptions {
        let non_empty = |value: Option<String>| value.filter(|v| !v.is_empty());
        ScrapeOptions {
            start_date: non_empty(self.start_date),
            end_date: non_empty(self.end_date),
            output_path: None,
        }
    }
}

#[derive(Serialize)]
struct EventsResp {
    success: bool,
    events: Vec<EventRecord>,
    count: usize,
    message: String,
}

#[derive(Serialize)]
struct ArtistsResp {
    success: bool,
    artists: Vec<ArtistProfile>,
    count: usize,
    message: String,
}

#[derive(Serialize)]
struct ErrorResp {
    success: bool,
    message: String,
    error: String,
}

fn failure(status: StatusCode, message: &str, error: String) -> Response {
    let body = ErrorResp {
        success: false,
        message: message.to_string(),
        error,
    };
    (status, Json(body)).into_response()
}

async fn load_events(state: &AppState, query: RangeQuery) -> Result<Vec<EventRecord>, Response> {
    let options = query.into_options();
    if options.start_date.is_some() || options.end_date.is_some() {
        let requested = range::resolve(options.start_date.as_deref(), options.end_date.as_deref());
        if let Err(err) = requested.validate() {
            return Err(failure(
                StatusCode::BAD_REQUEST,
                "Invalid date range",
                err.to_string(),
            ));
        }
    }

    scrape_events(state.fetcher.as_ref(), &state.data_dir, options)
        .await
        .map_err(|err: ScrapeError| {
            tracing::error!(error = %err, "event scraping failed");
            failure(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to scrape events",
                err.to_string(),
            )
        })
}

async fn scrape_events_handler(
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> Response {
    match load_events(&state, query).await {
        Ok(events) => {
            let count = events.len();
            Json(EventsResp {
                success: true,
                events,
                count,
                message: format!("Successfully scraped {count} events from Resident Advisor"),
            })
            .into_response()
        }
        Err(resp) => resp,
    }
}

async fn artists_handler(
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> Response {
    match load_events(&state, query).await {
        Ok(events) => {
            let artists = artists::profiles(&events);
            let count = artists.len();
            Json(ArtistsResp {
                success: true,
                artists,
                count,
                message: format!("Found {count} artists across {} events", events.len()),
            })
            .into_response()
        }
        Err(resp) => resp,
    }
}
