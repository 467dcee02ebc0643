//! Species endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::{Species, SpeciesId, SpeciesInput};
use store::AquacultureStore;

use super::{MessageResponse, deleted};
use crate::AppState;
use crate::error::ApiError;

/// GET /api/species
#[tracing::instrument(skip(state))]
pub async fn list<S: AquacultureStore>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<Species>>, ApiError> {
    Ok(Json(state.catalog.list_species().await?))
}

/// GET /api/species/{id}
#[tracing::instrument(skip(state))]
pub async fn get<S: AquacultureStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<SpeciesId>,
) -> Result<Json<Species>, ApiError> {
    let species = state
        .catalog
        .get_species(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Species not found"))?;
    Ok(Json(species))
}

/// POST /api/species
#[tracing::instrument(skip(state, input))]
pub async fn create<S: AquacultureStore>(
    State(state): State<Arc<AppState<S>>>,
    Json(input): Json<SpeciesInput>,
) -> Result<(StatusCode, Json<Species>), ApiError> {
    let species = state.catalog.create_species(input).await?;
    Ok((StatusCode::CREATED, Json(species)))
}

/// PUT /api/species/{id}
#[tracing::instrument(skip(state, input))]
pub async fn update<S: AquacultureStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<SpeciesId>,
    Json(input): Json<SpeciesInput>,
) -> Result<Json<Species>, ApiError> {
    Ok(Json(state.catalog.update_species(id, input).await?))
}

/// DELETE /api/species/{id}
#[tracing::instrument(skip(state))]
pub async fn delete<S: AquacultureStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<SpeciesId>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.catalog.delete_species(id).await?;
    Ok(deleted("Species"))
}
