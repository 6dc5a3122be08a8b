use crate::api::AppState;
use axum::extract::State;
use axum::Json;

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Readiness plus the replay limits this instance applies.
pub async fn ready(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ready",
        "flatMarkPolicy": state.config.flat_mark_policy,
        "maxEvents": state.config.max_events,
        "defaultBaseCapital": state.config.default_base_capital,
    }))
}
