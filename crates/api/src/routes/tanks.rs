//! Tank endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use common::{Tank, TankId, TankInput};
use store::{AquacultureStore, TankFilter};

use super::{MessageResponse, deleted};
use crate::AppState;
use crate::error::ApiError;

/// GET /api/tanks?farm_id=
#[tracing::instrument(skip(state))]
pub async fn list<S: AquacultureStore>(
    State(state): State<Arc<AppState<S>>>,
    Query(filter): Query<TankFilter>,
) -> Result<Json<Vec<Tank>>, ApiError> {
    Ok(Json(state.catalog.list_tanks(filter).await?))
}

#[tracing::instrument(skip(state))]
pub async fn get<S: AquacultureStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<TankId>,
) -> Result<Json<Tank>, ApiError> {
    let tank = state
        .catalog
        .get_tank(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Tank not found"))?;
    Ok(Json(tank))
}

#[tracing::instrument(skip(state, input))]
pub async fn create<S: AquacultureStore>(
    State(state): State<Arc<AppState<S>>>,
    Json(input): Json<TankInput>,
) -> Result<(StatusCode, Json<Tank>), ApiError> {
    let tank = state.catalog.create_tank(input).await?;
    Ok((StatusCode::CREATED, Json(tank)))
}

#[tracing::instrument(skip(state, input))]
pub async fn update<S: AquacultureStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<TankId>,
    Json(input): Json<TankInput>,
) -> Result<Json<Tank>, ApiError> {
    Ok(Json(state.catalog.update_tank(id, input).await?))
}

#[tracing::instrument(skip(state))]
pub async fn delete<S: AquacultureStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<TankId>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.catalog.delete_tank(id).await?;
    Ok(deleted("Tank"))
}
