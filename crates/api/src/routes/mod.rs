//! HTTP handlers, one module per resource.

pub mod analytics;
pub mod batches;
pub mod customers;
pub mod farms;
pub mod feeding_logs;
pub mod health;
pub mod health_logs;
pub mod index;
pub mod metrics;
pub mod orders;
pub mod shipments;
pub mod species;
pub mod tanks;
pub mod water_logs;

use axum::Json;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Body returned by a successful delete.
pub(crate) fn deleted(entity: &str) -> Json<MessageResponse> {
    Json(MessageResponse {
        message: format!("{entity} deleted successfully"),
    })
}

/// Body of a `PATCH .../status` request.
#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: String,
}

/// Fallback for unmatched paths.
pub async fn not_found() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({ "error": "Endpoint not found" })),
    )
}
