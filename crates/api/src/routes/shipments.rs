//! Shipment endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use chrono::NaiveDate;
use common::{
    NewShipment, Shipment, ShipmentAggregate, ShipmentId, ShipmentSummary, TraceabilityRecord,
};
use serde::Deserialize;
use store::{AquacultureStore, ShipmentFilter};

use crate::AppState;
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct ShipmentStatusUpdate {
    pub status: String,
    pub actual_delivery_date: Option<NaiveDate>,
}

/// GET /api/shipments?order_id=&status=
#[tracing::instrument(skip(state))]
pub async fn list<S: AquacultureStore>(
    State(state): State<Arc<AppState<S>>>,
    Query(filter): Query<ShipmentFilter>,
) -> Result<Json<Vec<ShipmentSummary>>, ApiError> {
    Ok(Json(state.sales.list_shipments(filter).await?))
}

/// GET /api/shipments/{id}: the shipment with its batch allocations.
#[tracing::instrument(skip(state))]
pub async fn get<S: AquacultureStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<ShipmentId>,
) -> Result<Json<ShipmentAggregate>, ApiError> {
    let shipment = state
        .sales
        .get_shipment(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Shipment not found"))?;
    Ok(Json(shipment))
}

/// POST /api/shipments: each detail freezes its batch's cost at creation.
#[tracing::instrument(skip(state, req))]
pub async fn create<S: AquacultureStore>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<NewShipment>,
) -> Result<(StatusCode, Json<ShipmentAggregate>), ApiError> {
    let shipment = state.sales.create_shipment(req).await?;
    Ok((StatusCode::CREATED, Json(shipment)))
}

/// PATCH /api/shipments/{id}/status
#[tracing::instrument(skip(state))]
pub async fn update_status<S: AquacultureStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<ShipmentId>,
    Json(req): Json<ShipmentStatusUpdate>,
) -> Result<Json<Shipment>, ApiError> {
    let shipment = state
        .sales
        .update_shipment_status(id, &req.status, req.actual_delivery_date)
        .await?;
    Ok(Json(shipment))
}

/// GET /api/shipments/{id}/traceability
#[tracing::instrument(skip(state))]
pub async fn traceability<S: AquacultureStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<ShipmentId>,
) -> Result<Json<Vec<TraceabilityRecord>>, ApiError> {
    Ok(Json(state.sales.shipment_traceability(id).await?))
}
