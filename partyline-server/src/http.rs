//! HTTP surface for the sync gateway
//!
//! | Path          | Description                                        |
//! |---------------|----------------------------------------------------|
//! | `POST /api/sync`   | Apply a mutation command (update/clear/host)  |
//! | `GET /api/state`   | Point-in-time snapshot read                   |
//! | `GET /api/events`  | SSE subscription; first event is the snapshot |
//! | `GET /api/info`    | Party metadata for joining guests             |
//! | `GET /health`      | Liveness probe                                |

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::sse::{Event, Sse},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_stream::{Stream, StreamExt};
use tower_http::cors::{Any, CorsLayer};

use partyline_broadcaster::StreamEvent;

use crate::gateway::{GatewayError, SyncGateway};

/// Shared state passed to all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<SyncGateway>,
    pub party_name: String,
}

/// Build the router with all sync endpoints.
///
/// CORS is wide open: guests reach the sync API from whatever origin the
/// media page was served from.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/sync", post(handle_sync))
        .route("/api/state", get(handle_state))
        .route("/api/events", get(handle_events))
        .route("/api/info", get(handle_info))
        .route("/health", get(|| async { "ok" }))
        .layer(cors)
        .with_state(state)
}

/// Party metadata returned by `/api/info`.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PartyInfo {
    name: String,
    server_version: &'static str,
    bpm: Option<f64>,
    beat_timestamp: Option<i64>,
    host_connected: bool,
}

async fn handle_sync(State(app): State<AppState>, body: Bytes) -> Response {
    let command = match SyncGateway::parse(&body) {
        Ok(command) => command,
        Err(error) => return error_response(error),
    };

    match app.gateway.apply(command).await {
        Ok(_) => (StatusCode::OK, Json(serde_json::json!({ "ok": true }))).into_response(),
        Err(error) => error_response(error),
    }
}

async fn handle_state(State(app): State<AppState>) -> Response {
    Json(app.gateway.snapshot().await).into_response()
}

async fn handle_info(State(app): State<AppState>) -> Response {
    let snapshot = app.gateway.snapshot().await;
    Json(PartyInfo {
        name: app.party_name.clone(),
        server_version: env!("CARGO_PKG_VERSION"),
        bpm: snapshot.bpm,
        beat_timestamp: snapshot.beat_timestamp,
        host_connected: snapshot.host_connected,
    })
    .into_response()
}

/// Handles `GET /api/events`.
///
/// The channel stays open until the client disconnects or the server
/// shuts down; dropping the response stream drops the receiver, and the
/// broadcaster prunes the channel on its next failed write.
async fn handle_events(
    State(app): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = app.gateway.subscribe().await;
    let stream = UnboundedReceiverStream::new(rx)
        .filter_map(|event| to_sse_event(&event).map(Ok::<_, Infallible>));
    Sse::new(stream)
}

/// Map a broadcaster event onto the SSE wire: named events carry JSON
/// payloads, the heartbeat is a bare comment line. An event whose payload
/// fails to serialize is dropped rather than breaking the stream.
fn to_sse_event(event: &StreamEvent) -> Option<Event> {
    match event.name() {
        None => Some(Event::default().comment("keep-alive")),
        Some(name) => match event.payload_json() {
            Ok(Some(payload)) => Some(Event::default().event(name).data(payload)),
            Ok(None) => None,
            Err(error) => {
                tracing::warn!("Dropping unserializable {} event: {}", name, error);
                None
            }
        },
    }
}

fn error_response(error: GatewayError) -> Response {
    tracing::warn!("Rejected sync request: {}", error);
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({ "error": error.to_string() })),
    )
        .into_response()
}
