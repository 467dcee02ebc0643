//! HTTP API server with observability for the aquaculture management system.
//!
//! Provides REST endpoints for the farm catalog, production records, sales
//! and analytics, with structured logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::middleware;
use axum::routing::{get, patch};
use domain::{AnalyticsService, CatalogService, ProductionService, SalesService};
use metrics_exporter_prometheus::PrometheusHandle;
use store::AquacultureStore;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use routes::{
    analytics, batches, customers, farms, feeding_logs, health_logs, orders, shipments, species,
    tanks, water_logs,
};

/// Shared application state accessible from all handlers.
pub struct AppState<S: AquacultureStore> {
    pub catalog: CatalogService<S>,
    pub production: ProductionService<S>,
    pub sales: SalesService<S>,
    pub analytics: AnalyticsService<S>,
    /// Whether 500 responses carry the error source chain.
    pub expose_error_detail: bool,
}

impl<S: AquacultureStore> AppState<S> {
    /// Builds every service over one shared store.
    pub fn new(store: S) -> Self {
        Self {
            catalog: CatalogService::new(store.clone()),
            production: ProductionService::new(store.clone()),
            sales: SalesService::new(store.clone()),
            analytics: AnalyticsService::new(store),
            expose_error_detail: true,
        }
    }
}

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: AquacultureStore>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let expose_error_detail = state.expose_error_detail;

    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    let api = Router::new()
        .route("/species", get(species::list::<S>).post(species::create::<S>))
        .route(
            "/species/{id}",
            get(species::get::<S>)
                .put(species::update::<S>)
                .delete(species::delete::<S>),
        )
        .route("/farms", get(farms::list::<S>).post(farms::create::<S>))
        .route("/farms/performance", get(farms::performance::<S>))
        .route(
            "/farms/{id}",
            get(farms::get::<S>)
                .put(farms::update::<S>)
                .delete(farms::delete::<S>),
        )
        .route("/tanks", get(tanks::list::<S>).post(tanks::create::<S>))
        .route(
            "/tanks/{id}",
            get(tanks::get::<S>)
                .put(tanks::update::<S>)
                .delete(tanks::delete::<S>),
        )
        .route(
            "/customers",
            get(customers::list::<S>).post(customers::create::<S>),
        )
        .route(
            "/customers/{id}",
            get(customers::get::<S>)
                .put(customers::update::<S>)
                .delete(customers::delete::<S>),
        )
        .route("/batches", get(batches::list::<S>).post(batches::create::<S>))
        .route(
            "/batches/{id}",
            get(batches::get::<S>)
                .put(batches::update::<S>)
                .delete(batches::delete::<S>),
        )
        .route(
            "/batches/{id}/financials",
            get(batches::financials::<S>).put(batches::update_financials::<S>),
        )
        .route("/batches/{id}/pricing", get(batches::pricing::<S>))
        .route(
            "/water-logs",
            get(water_logs::list::<S>).post(water_logs::create::<S>),
        )
        .route(
            "/water-logs/tank/{tank_id}/compliance",
            get(water_logs::compliance::<S>),
        )
        .route(
            "/feeding-logs",
            get(feeding_logs::list::<S>).post(feeding_logs::create::<S>),
        )
        .route(
            "/feeding-logs/batch/{batch_id}/summary",
            get(feeding_logs::summary::<S>),
        )
        .route(
            "/health-logs",
            get(health_logs::list::<S>).post(health_logs::create::<S>),
        )
        .route(
            "/health-logs/batch/{batch_id}/summary",
            get(health_logs::summary::<S>),
        )
        .route("/orders", get(orders::list::<S>).post(orders::create::<S>))
        .route(
            "/orders/{id}",
            get(orders::get::<S>).delete(orders::delete::<S>),
        )
        .route("/orders/{id}/status", patch(orders::update_status::<S>))
        .route(
            "/shipments",
            get(shipments::list::<S>).post(shipments::create::<S>),
        )
        .route("/shipments/{id}", get(shipments::get::<S>))
        .route(
            "/shipments/{id}/status",
            patch(shipments::update_status::<S>),
        )
        .route(
            "/shipments/{id}/traceability",
            get(shipments::traceability::<S>),
        )
        .route("/analytics/alerts", get(analytics::alerts::<S>))
        .route(
            "/analytics/alerts/biosecurity",
            get(analytics::biosecurity_alerts::<S>),
        )
        .route(
            "/analytics/alerts/{id}/status",
            patch(analytics::update_alert_status::<S>),
        )
        .route(
            "/analytics/mortality/analysis",
            get(analytics::mortality_analysis::<S>),
        )
        .route(
            "/analytics/mortality/high-risk",
            get(analytics::high_risk_batches::<S>),
        )
        .route(
            "/analytics/traceability/batch/{batch_id}",
            get(analytics::batch_traceability::<S>),
        )
        .route(
            "/analytics/traceability/report",
            get(analytics::traceability_report::<S>),
        )
        .route(
            "/analytics/pricing/overview",
            get(analytics::pricing_overview::<S>),
        )
        .route(
            "/analytics/pricing/batch/{batch_id}/calculate",
            get(analytics::selling_price::<S>),
        );

    let app = Router::new()
        .route("/", get(routes::index::get))
        .route("/health", get(routes::health::check))
        .nest("/api", api)
        .fallback(routes::not_found)
        .with_state(state)
        .merge(metrics_router);

    let app = if expose_error_detail {
        app.layer(middleware::map_response(error::expose_error_detail))
    } else {
        app
    };

    app.layer(
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
    )
    .layer(TraceLayer::new_for_http())
}
