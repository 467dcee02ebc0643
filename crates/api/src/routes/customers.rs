//! Customer endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::{Customer, CustomerId, CustomerInput};
use store::AquacultureStore;

use super::{MessageResponse, deleted};
use crate::AppState;
use crate::error::ApiError;

#[tracing::instrument(skip(state))]
pub async fn list<S: AquacultureStore>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<Customer>>, ApiError> {
    Ok(Json(state.catalog.list_customers().await?))
}

#[tracing::instrument(skip(state))]
pub async fn get<S: AquacultureStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<CustomerId>,
) -> Result<Json<Customer>, ApiError> {
    let customer = state
        .catalog
        .get_customer(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Customer not found"))?;
    Ok(Json(customer))
}

#[tracing::instrument(skip(state, input))]
pub async fn create<S: AquacultureStore>(
    State(state): State<Arc<AppState<S>>>,
    Json(input): Json<CustomerInput>,
) -> Result<(StatusCode, Json<Customer>), ApiError> {
    let customer = state.catalog.create_customer(input).await?;
    Ok((StatusCode::CREATED, Json(customer)))
}

#[tracing::instrument(skip(state, input))]
pub async fn update<S: AquacultureStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<CustomerId>,
    Json(input): Json<CustomerInput>,
) -> Result<Json<Customer>, ApiError> {
    Ok(Json(state.catalog.update_customer(id, input).await?))
}

#[tracing::instrument(skip(state))]
pub async fn delete<S: AquacultureStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<CustomerId>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.catalog.delete_customer(id).await?;
    Ok(deleted("Customer"))
}
