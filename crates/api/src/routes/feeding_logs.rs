//! Feeding records.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use common::{BatchId, FeedingLog, FeedingSummary, NewFeedingLog};
use store::{AquacultureStore, FeedingLogFilter};

use crate::AppState;
use crate::error::ApiError;

#[tracing::instrument(skip(state))]
pub async fn list<S: AquacultureStore>(
    State(state): State<Arc<AppState<S>>>,
    Query(filter): Query<FeedingLogFilter>,
) -> Result<Json<Vec<FeedingLog>>, ApiError> {
    Ok(Json(state.production.list_feeding_logs(filter).await?))
}

#[tracing::instrument(skip(state, input))]
pub async fn create<S: AquacultureStore>(
    State(state): State<Arc<AppState<S>>>,
    Json(input): Json<NewFeedingLog>,
) -> Result<(StatusCode, Json<FeedingLog>), ApiError> {
    let log = state.production.create_feeding_log(input).await?;
    Ok((StatusCode::CREATED, Json(log)))
}

#[tracing::instrument(skip(state))]
pub async fn summary<S: AquacultureStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(batch_id): Path<BatchId>,
) -> Result<Json<FeedingSummary>, ApiError> {
    Ok(Json(state.production.feeding_summary(batch_id).await?))
}
