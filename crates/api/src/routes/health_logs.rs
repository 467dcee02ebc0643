//! Health observations and losses.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use common::{BatchId, HealthLog, HealthSummary, NewHealthLog};
use store::{AquacultureStore, HealthLogFilter};

use crate::AppState;
use crate::error::ApiError;

#[tracing::instrument(skip(state))]
pub async fn list<S: AquacultureStore>(
    State(state): State<Arc<AppState<S>>>,
    Query(filter): Query<HealthLogFilter>,
) -> Result<Json<Vec<HealthLog>>, ApiError> {
    Ok(Json(state.production.list_health_logs(filter).await?))
}

/// POST /api/health-logs: losses are taken off the batch's live stock.
#[tracing::instrument(skip(state, input))]
pub async fn create<S: AquacultureStore>(
    State(state): State<Arc<AppState<S>>>,
    Json(input): Json<NewHealthLog>,
) -> Result<(StatusCode, Json<HealthLog>), ApiError> {
    let log = state.production.create_health_log(input).await?;
    Ok((StatusCode::CREATED, Json(log)))
}

#[tracing::instrument(skip(state))]
pub async fn summary<S: AquacultureStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(batch_id): Path<BatchId>,
) -> Result<Json<HealthSummary>, ApiError> {
    Ok(Json(state.production.health_summary(batch_id).await?))
}
