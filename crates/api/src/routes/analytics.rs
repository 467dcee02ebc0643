//! Analytics endpoints under `/api/analytics`.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use common::{
    Alert, AlertId, BatchId, BatchTraceability, HighRiskBatch, MortalityAnalysis,
    PricingOverview, SellingPrice, TraceabilityRecord,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use store::{AlertFilter, AquacultureStore, PricingFilter, TraceabilityFilter};

use crate::AppState;
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct AlertStatusUpdate {
    pub status: String,
    pub resolved_by: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct HighRiskQuery {
    pub threshold: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
pub struct SellingPriceQuery {
    pub transport_cost: Option<Decimal>,
    pub packaging_cost: Option<Decimal>,
}

/// GET /api/analytics/alerts?status=&severity=&farm_id=
#[tracing::instrument(skip(state))]
pub async fn alerts<S: AquacultureStore>(
    State(state): State<Arc<AppState<S>>>,
    Query(filter): Query<AlertFilter>,
) -> Result<Json<Vec<Alert>>, ApiError> {
    Ok(Json(state.analytics.list_alerts(filter).await?))
}

/// GET /api/analytics/alerts/biosecurity: unresolved, most severe first.
#[tracing::instrument(skip(state))]
pub async fn biosecurity_alerts<S: AquacultureStore>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<Alert>>, ApiError> {
    Ok(Json(state.analytics.biosecurity_alerts().await?))
}

/// PATCH /api/analytics/alerts/{id}/status
#[tracing::instrument(skip(state))]
pub async fn update_alert_status<S: AquacultureStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<AlertId>,
    Json(req): Json<AlertStatusUpdate>,
) -> Result<Json<Alert>, ApiError> {
    let alert = state
        .analytics
        .update_alert_status(id, &req.status, req.resolved_by)
        .await?;
    Ok(Json(alert))
}

#[tracing::instrument(skip(state))]
pub async fn mortality_analysis<S: AquacultureStore>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<MortalityAnalysis>>, ApiError> {
    Ok(Json(state.analytics.mortality_analysis().await?))
}

/// GET /api/analytics/mortality/high-risk?threshold=
#[tracing::instrument(skip(state))]
pub async fn high_risk_batches<S: AquacultureStore>(
    State(state): State<Arc<AppState<S>>>,
    Query(query): Query<HighRiskQuery>,
) -> Result<Json<Vec<HighRiskBatch>>, ApiError> {
    Ok(Json(state.analytics.high_risk_batches(query.threshold).await?))
}

#[tracing::instrument(skip(state))]
pub async fn batch_traceability<S: AquacultureStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(batch_id): Path<BatchId>,
) -> Result<Json<BatchTraceability>, ApiError> {
    let trace = state
        .analytics
        .batch_traceability(batch_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Batch not found"))?;
    Ok(Json(trace))
}

/// GET /api/analytics/traceability/report?shipment_id=&customer_id=&start_date=&end_date=
#[tracing::instrument(skip(state))]
pub async fn traceability_report<S: AquacultureStore>(
    State(state): State<Arc<AppState<S>>>,
    Query(filter): Query<TraceabilityFilter>,
) -> Result<Json<Vec<TraceabilityRecord>>, ApiError> {
    Ok(Json(state.analytics.traceability_report(filter).await?))
}

#[tracing::instrument(skip(state))]
pub async fn pricing_overview<S: AquacultureStore>(
    State(state): State<Arc<AppState<S>>>,
    Query(filter): Query<PricingFilter>,
) -> Result<Json<Vec<PricingOverview>>, ApiError> {
    Ok(Json(state.analytics.pricing_overview(filter).await?))
}

/// GET /api/analytics/pricing/batch/{batch_id}/calculate?transport_cost=&packaging_cost=
#[tracing::instrument(skip(state))]
pub async fn selling_price<S: AquacultureStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(batch_id): Path<BatchId>,
    Query(query): Query<SellingPriceQuery>,
) -> Result<Json<SellingPrice>, ApiError> {
    let price = state
        .analytics
        .selling_price(batch_id, query.transport_cost, query.packaging_cost)
        .await?
        .ok_or_else(|| ApiError::not_found("Batch not found"))?;
    Ok(Json(price))
}
