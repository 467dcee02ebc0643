//! Water quality readings.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use common::{NewWaterLog, TankId, WaterCompliance, WaterLog};
use store::{AquacultureStore, WaterLogFilter};

use crate::AppState;
use crate::error::ApiError;

/// GET /api/water-logs?tank_id=&start_date=&end_date=&status=
#[tracing::instrument(skip(state))]
pub async fn list<S: AquacultureStore>(
    State(state): State<Arc<AppState<S>>>,
    Query(filter): Query<WaterLogFilter>,
) -> Result<Json<Vec<WaterLog>>, ApiError> {
    Ok(Json(state.production.list_water_logs(filter).await?))
}

/// POST /api/water-logs: the reading is classified on insert.
#[tracing::instrument(skip(state, input))]
pub async fn create<S: AquacultureStore>(
    State(state): State<Arc<AppState<S>>>,
    Json(input): Json<NewWaterLog>,
) -> Result<(StatusCode, Json<WaterLog>), ApiError> {
    let log = state.production.create_water_log(input).await?;
    Ok((StatusCode::CREATED, Json(log)))
}

/// GET /api/water-logs/tank/{tank_id}/compliance
#[tracing::instrument(skip(state))]
pub async fn compliance<S: AquacultureStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(tank_id): Path<TankId>,
) -> Result<Json<Vec<WaterCompliance>>, ApiError> {
    Ok(Json(state.production.water_compliance(tank_id).await?))
}
