use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::error;

use crate::store::{SnapshotKind, SnapshotStore};

#[derive(Clone)]
pub struct AppState {
    pub store: SnapshotStore,
}

/// Build the read-only query router. Handlers only ever read the last
/// published snapshot; they never trigger a fetch.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/schedule", get(schedule_handler))
        .route("/api/lineups", get(lineups_handler))
        .route("/api/incidents", get(incidents_handler))
        .route("/api/odds", get(odds_handler))
        .route("/results", get(lineups_handler))
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

/// GET /api/schedule
async fn schedule_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    snapshot_response(&state, SnapshotKind::Schedule).await
}

/// GET /api/lineups, GET /results
///
/// `/results` returns the same document as `/api/lineups`: the full bucket
/// shape (`finished`/`ongoing`/`upcoming`, complete match records). It is not
/// the older reduced `{ongoing, finished, not_started}` layout.
async fn lineups_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    snapshot_response(&state, SnapshotKind::Lineups).await
}

/// GET /api/incidents
async fn incidents_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    snapshot_response(&state, SnapshotKind::Incidents).await
}

/// GET /api/odds
async fn odds_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    snapshot_response(&state, SnapshotKind::Odds).await
}

async fn snapshot_response(
    state: &AppState,
    kind: SnapshotKind,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    match state.store.read(kind).await {
        Ok(Some(value)) => Ok(Json(value)),
        Ok(None) => Err((
            StatusCode::NOT_FOUND,
            format!("No {} snapshot published yet", kind),
        )),
        Err(e) => {
            error!("Serving {} snapshot failed: {:#}", kind, e);
            Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
    }
}
