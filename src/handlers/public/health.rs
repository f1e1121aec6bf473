use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::{json, Map, Value};

use crate::app::AppState;

/// GET /health, GET /api/v1/health - Document store reachability
pub async fn get(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();
    let repository = &state.repository;

    let mut component = Map::new();
    component.insert("database".into(), json!(repository.database_name()));

    let status = match repository.ping().await {
        Ok(()) => {
            component.insert("status".into(), json!("UP"));
            StatusCode::OK
        }
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            component.insert("status".into(), json!("DOWN"));
            component.insert("error".into(), json!(e.to_string()));
            StatusCode::SERVICE_UNAVAILABLE
        }
    };

    let overall = if status.is_success() { "UP" } else { "DOWN" };
    let mut components = Map::new();
    components.insert(repository.backend_name().to_string(), Value::Object(component));

    (
        status,
        Json(json!({
            "status": overall,
            "timestamp": now,
            "components": components,
        })),
    )
}
