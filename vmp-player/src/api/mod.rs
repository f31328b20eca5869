//! HTTP status interface
//!
//! Read-only surface for a consumer/UI layer: health check, the playlist
//! snapshot, and an SSE stream of player events.

use crate::state::SharedState;
use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    response::Json,
    routing::get,
    Router,
};
use futures::stream::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tokio_stream::wrappers::BroadcastStream;
use tower_http::trace::TraceLayer;
use tracing::warn;
use vmp_common::playlist::SlotInfo;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Shared player state
    pub state: Arc<SharedState>,
    /// Server port
    pub port: u16,
}

/// Create the API router
pub fn create_router(app: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest(
            "/api/v1",
            Router::new()
                .route("/playlist", get(get_playlist))
                .route("/events", get(event_stream)),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(app)
}

/// Health check endpoint
async fn health_check(State(app): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "module": "vmp-player",
        "version": env!("CARGO_PKG_VERSION"),
        "port": app.port,
    }))
}

/// Playlist snapshot response
#[derive(Debug, Serialize, Deserialize)]
pub struct PlaylistResponse {
    pub slots: Vec<SlotInfo>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Read-only playlist snapshot for polling consumers
async fn get_playlist(State(app): State<AppState>) -> Json<PlaylistResponse> {
    Json(PlaylistResponse {
        slots: app.state.playlist_snapshot().await,
        timestamp: chrono::Utc::now(),
    })
}

/// SSE stream of player events
async fn event_stream(
    State(app): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = app.state.events.subscribe();
    let stream = BroadcastStream::new(rx).filter_map(|result| async move {
        match result {
            Ok(event) => Event::default()
                .event(event.event_type())
                .json_data(&event)
                .ok()
                .map(Ok),
            Err(e) => {
                // Slow client lagged behind the broadcast buffer
                warn!("SSE client error: {:?}", e);
                None
            }
        }
    });

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(30))
            .text("keep-alive"),
    )
}
