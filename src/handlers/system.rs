use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::state::AppState;

/// GET / - service description
pub async fn root(State(state): State<AppState>) -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");
    let collection = format!("/{}", state.resource);
    let item = format!("/{}/:id", state.resource);

    Json(json!({
        "name": "notes-api",
        "version": version,
        "resource": &*state.resource,
        "store": state.store.backend(),
        "write_auth": if state.enforce_writes { "bearer token required" } else { "optional" },
        "endpoints": {
            "list": format!("GET {}?search=", collection),
            "create": format!("POST {}", collection),
            "update": format!("PUT {}", item),
            "delete": format!("DELETE {}", item),
            "health": "GET /health",
        }
    }))
}

/// GET /health - store connectivity
pub async fn health(State(state): State<AppState>) -> axum::response::Response {
    let now = chrono::Utc::now();

    match state.store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "store": state.store.backend(),
            })),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            ApiError::service_unavailable("Store unavailable").into_response()
        }
    }
}
