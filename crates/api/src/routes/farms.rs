//! Farm endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::{Farm, FarmId, FarmInput, FarmPerformance};
use store::AquacultureStore;

use super::{MessageResponse, deleted};
use crate::AppState;
use crate::error::ApiError;

#[tracing::instrument(skip(state))]
pub async fn list<S: AquacultureStore>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<Farm>>, ApiError> {
    Ok(Json(state.catalog.list_farms().await?))
}

/// GET /api/farms/performance: stock, mortality and cost per farm.
#[tracing::instrument(skip(state))]
pub async fn performance<S: AquacultureStore>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<FarmPerformance>>, ApiError> {
    Ok(Json(state.catalog.farm_performance().await?))
}

#[tracing::instrument(skip(state))]
pub async fn get<S: AquacultureStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<FarmId>,
) -> Result<Json<Farm>, ApiError> {
    let farm = state
        .catalog
        .get_farm(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Farm not found"))?;
    Ok(Json(farm))
}

#[tracing::instrument(skip(state, input))]
pub async fn create<S: AquacultureStore>(
    State(state): State<Arc<AppState<S>>>,
    Json(input): Json<FarmInput>,
) -> Result<(StatusCode, Json<Farm>), ApiError> {
    let farm = state.catalog.create_farm(input).await?;
    Ok((StatusCode::CREATED, Json(farm)))
}

#[tracing::instrument(skip(state, input))]
pub async fn update<S: AquacultureStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<FarmId>,
    Json(input): Json<FarmInput>,
) -> Result<Json<Farm>, ApiError> {
    Ok(Json(state.catalog.update_farm(id, input).await?))
}

/// DELETE /api/farms/{id}: refused while the farm still has tanks.
#[tracing::instrument(skip(state))]
pub async fn delete<S: AquacultureStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<FarmId>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.catalog.delete_farm(id).await?;
    Ok(deleted("Farm"))
}
