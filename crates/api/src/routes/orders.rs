//! Order endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use common::{NewOrder, Order, OrderAggregate, OrderId, OrderSummary};
use store::{AquacultureStore, OrderFilter};

use super::{MessageResponse, StatusUpdate, deleted};
use crate::AppState;
use crate::error::ApiError;

/// GET /api/orders?customer_id=&status=
#[tracing::instrument(skip(state))]
pub async fn list<S: AquacultureStore>(
    State(state): State<Arc<AppState<S>>>,
    Query(filter): Query<OrderFilter>,
) -> Result<Json<Vec<OrderSummary>>, ApiError> {
    Ok(Json(state.sales.list_orders(filter).await?))
}

/// GET /api/orders/{id}: the order with its customer and items.
#[tracing::instrument(skip(state))]
pub async fn get<S: AquacultureStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<OrderId>,
) -> Result<Json<OrderAggregate>, ApiError> {
    let order = state
        .sales
        .get_order(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Order not found"))?;
    Ok(Json(order))
}

/// POST /api/orders: creates the order and all its items atomically.
#[tracing::instrument(skip(state, req))]
pub async fn create<S: AquacultureStore>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<NewOrder>,
) -> Result<(StatusCode, Json<OrderAggregate>), ApiError> {
    let order = state.sales.create_order(req).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// PATCH /api/orders/{id}/status
#[tracing::instrument(skip(state))]
pub async fn update_status<S: AquacultureStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<OrderId>,
    Json(req): Json<StatusUpdate>,
) -> Result<Json<Order>, ApiError> {
    Ok(Json(state.sales.update_order_status(id, &req.status).await?))
}

#[tracing::instrument(skip(state))]
pub async fn delete<S: AquacultureStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<OrderId>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.sales.delete_order(id).await?;
    Ok(deleted("Order"))
}
