//! Batch endpoints: CRUD, the cost ledger and per-batch pricing.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use common::{
    Batch, BatchFinancials, BatchId, BatchUpdate, FinancialsInput, NewBatch, PricingOverview,
};
use store::{AquacultureStore, BatchFilter};

use super::{MessageResponse, deleted};
use crate::AppState;
use crate::error::ApiError;

/// GET /api/batches?farm_id=&species_id=&stage=
#[tracing::instrument(skip(state))]
pub async fn list<S: AquacultureStore>(
    State(state): State<Arc<AppState<S>>>,
    Query(filter): Query<BatchFilter>,
) -> Result<Json<Vec<Batch>>, ApiError> {
    Ok(Json(state.production.list_batches(filter).await?))
}

#[tracing::instrument(skip(state))]
pub async fn get<S: AquacultureStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<BatchId>,
) -> Result<Json<Batch>, ApiError> {
    let batch = state
        .production
        .get_batch(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Batch not found"))?;
    Ok(Json(batch))
}

#[tracing::instrument(skip(state, input))]
pub async fn create<S: AquacultureStore>(
    State(state): State<Arc<AppState<S>>>,
    Json(input): Json<NewBatch>,
) -> Result<(StatusCode, Json<Batch>), ApiError> {
    let batch = state.production.create_batch(input).await?;
    Ok((StatusCode::CREATED, Json(batch)))
}

#[tracing::instrument(skip(state, input))]
pub async fn update<S: AquacultureStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<BatchId>,
    Json(input): Json<BatchUpdate>,
) -> Result<Json<Batch>, ApiError> {
    Ok(Json(state.production.update_batch(id, input).await?))
}

/// DELETE /api/batches/{id}: refused once the batch appears in a shipment.
#[tracing::instrument(skip(state))]
pub async fn delete<S: AquacultureStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<BatchId>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.production.delete_batch(id).await?;
    Ok(deleted("Batch"))
}

/// GET /api/batches/{id}/financials
#[tracing::instrument(skip(state))]
pub async fn financials<S: AquacultureStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<BatchId>,
) -> Result<Json<BatchFinancials>, ApiError> {
    Ok(Json(state.production.get_financials(id).await?))
}

/// PUT /api/batches/{id}/financials
#[tracing::instrument(skip(state, input))]
pub async fn update_financials<S: AquacultureStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<BatchId>,
    Json(input): Json<FinancialsInput>,
) -> Result<Json<BatchFinancials>, ApiError> {
    Ok(Json(state.production.upsert_financials(id, input).await?))
}

/// GET /api/batches/{id}/pricing
#[tracing::instrument(skip(state))]
pub async fn pricing<S: AquacultureStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<BatchId>,
) -> Result<Json<PricingOverview>, ApiError> {
    let pricing = state
        .analytics
        .batch_pricing(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Batch not found or not ready for sale"))?;
    Ok(Json(pricing))
}
