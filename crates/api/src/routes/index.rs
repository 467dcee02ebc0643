//! API index.

use axum::Json;
use serde::Serialize;

#[derive(Serialize)]
pub struct Endpoints {
    pub species: &'static str,
    pub farms: &'static str,
    pub tanks: &'static str,
    pub batches: &'static str,
    #[serde(rename = "waterLogs")]
    pub water_logs: &'static str,
    #[serde(rename = "feedingLogs")]
    pub feeding_logs: &'static str,
    #[serde(rename = "healthLogs")]
    pub health_logs: &'static str,
    pub customers: &'static str,
    pub orders: &'static str,
    pub shipments: &'static str,
    pub analytics: &'static str,
}

#[derive(Serialize)]
pub struct IndexResponse {
    pub message: &'static str,
    pub version: &'static str,
    pub endpoints: Endpoints,
}

/// GET /: names the API and maps its resource roots.
pub async fn get() -> Json<IndexResponse> {
    Json(IndexResponse {
        message: "Aquaculture Management System API",
        version: env!("CARGO_PKG_VERSION"),
        endpoints: Endpoints {
            species: "/api/species",
            farms: "/api/farms",
            tanks: "/api/tanks",
            batches: "/api/batches",
            water_logs: "/api/water-logs",
            feeding_logs: "/api/feeding-logs",
            health_logs: "/api/health-logs",
            customers: "/api/customers",
            orders: "/api/orders",
            shipments: "/api/shipments",
            analytics: "/api/analytics",
        },
    })
}
