use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;
use shared::protocol::API_PREFIX;
use shared::types::{HostId, HostRecord};
use crate::poller::LatestSnapshot;

#[derive(Clone)]
pub struct AppState {
    /// Written only by the poller
    pub latest: watch::Receiver<Option<LatestSnapshot>>,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub captured_at: Option<DateTime<Utc>>,
    pub hosts: usize,
}

#[derive(Serialize)]
pub struct FingerprintResponse {
    pub fingerprint: String,
    pub captured_at: DateTime<Utc>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(&format!("{}/health", API_PREFIX), get(get_health))
        .route(&format!("{}/hosts", API_PREFIX), get(get_hosts))
        .route(&format!("{}/hosts/:id", API_PREFIX), get(get_host))
        .route(&format!("{}/snapshot/fingerprint", API_PREFIX), get(get_fingerprint))
        .with_state(state)
}

fn latest(state: &AppState) -> Option<LatestSnapshot> {
    state.latest.borrow().clone()
}

async fn get_health(State(state): State<AppState>) -> Json<HealthResponse> {
    let latest = latest(&state);
    Json(HealthResponse {
        status: if latest.is_some() { "ok" } else { "waiting" },
        captured_at: latest.as_ref().map(|l| l.snapshot.captured_at()),
        hosts: latest.as_ref().map(|l| l.snapshot.len()).unwrap_or(0),
    })
}

async fn get_hosts(State(state): State<AppState>) -> Result<Json<Vec<HostRecord>>, StatusCode> {
    let latest = latest(&state).ok_or(StatusCode::SERVICE_UNAVAILABLE)?;
    Ok(Json(latest.snapshot.hosts().cloned().collect()))
}

async fn get_host(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<HostRecord>, StatusCode> {
    let latest = latest(&state).ok_or(StatusCode::SERVICE_UNAVAILABLE)?;
    latest
        .snapshot
        .get(&HostId::new(id))
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn get_fingerprint(State(state): State<AppState>) -> Result<Json<FingerprintResponse>, StatusCode> {
    let latest = latest(&state).ok_or(StatusCode::SERVICE_UNAVAILABLE)?;
    Ok(Json(FingerprintResponse {
        captured_at: latest.snapshot.captured_at(),
        fingerprint: latest.fingerprint,
    }))
}
