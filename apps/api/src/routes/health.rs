use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Service version, configured writers and whether the pool is up yet.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let writers: Vec<&str> = state
        .config
        .credentials
        .configured()
        .into_iter()
        .map(|(provider, _)| provider.as_str())
        .collect();

    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "blogwright-api",
        "writers": writers,
        "database": if state.db.is_connected() { "connected" } else { "idle" },
        "scheduler": state.scheduler.is_running(),
    }))
}
