use axum::{extract::State, Json};
use chrono::Utc;
use serde_json::{json, Value};

use crate::db;
use crate::AppState;

/// Root greeting
pub async fn home() -> Json<Value> {
    Json(json!({ "message": "Welcome to the API!" }))
}

/// Health check endpoint
///
/// Returns the health status of the server and database connection.
/// Used by load balancers and monitoring systems.
pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    let db_healthy = db::ping(&state.db).await;

    Json(json!({
        "status": if db_healthy { "healthy" } else { "degraded" },
        "database": if db_healthy { "connected" } else { "disconnected" },
        "timestamp": Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Basic connectivity check that never touches the database
pub async fn ping() -> Json<Value> {
    Json(json!({ "message": "pong" }))
}
