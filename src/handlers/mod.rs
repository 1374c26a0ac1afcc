pub mod links;
pub mod shared;

use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

use crate::state::AppState;

pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let links = match state.store.count().await {
        Ok(n) => Some(n),
        Err(e) => {
            tracing::warn!(error = ?e, "Health check: database query failed");
            None
        }
    };

    let http_status = if links.is_some() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        http_status,
        Json(json!({
            "status": if links.is_some() { "ok" } else { "degraded" },
            "service": "link-manager",
            "version": env!("CARGO_PKG_VERSION"),
            "database": if links.is_some() { "ok" } else { "unavailable" },
            "links": links,
        })),
    )
}
