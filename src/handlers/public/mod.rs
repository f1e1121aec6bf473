// handlers/public/mod.rs - Public handlers (no token required)
//
// Served on the gateway's allow-list: the banner at "/" and the health report.

pub mod health;

pub use health::get as health;

use axum::response::Json;
use serde_json::{json, Value};

/// GET / - Service banner
pub async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "name": "Classe Microservice",
        "version": version,
        "description": "Classes, schedules and exams for the academic platform",
        "endpoints": {
            "home": "/ (public)",
            "health": "/health, /api/v1/health (public)",
            "classes": "/api/v1/classes[/:id] (protected)",
            "exams": "/api/v1/classes/:id/exams[/:examId] (protected)",
        }
    }))
}
