use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET / - service banner
pub async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Workforce Registry API",
            "version": version,
            "description": "Worker trade/training registrations with validity alerts",
            "endpoints": {
                "health": "/api/health",
                "trade_registers": "/api/trade-registers[/:workerId]",
                "trade_alerts": "/api/trade-registers/alerts, /api/trade-registers/:workerId/(complete|incomplete)-alert",
                "training_registers": "/api/training-registers[/:workerId]",
                "training_alerts": "/api/training-registers/alerts, /api/training-registers/:workerId/(complete|incomplete)-alert",
            }
        }
    }))
}

/// GET /api/health - database connectivity check, 500 when the store is unreachable
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.registrations.ping().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::warn!("health check failed: {}", e);
            let mut data = json!({
                "status": "degraded",
                "timestamp": now,
            });
            if state.expose_error_details() {
                data["database_error"] = json!(e.to_string());
            }
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "success": false,
                    "error": "database unavailable",
                    "data": data
                })),
            )
        }
    }
}
