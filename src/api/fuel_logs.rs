//! Fuel logs API endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::{
    error::AppResult,
    models::fuel_log::{CreateFuelLog, FuelLog, FuelSummary, UpdateFuelLog},
};

use super::AuthenticatedUser;

/// Fill-ups of an equipment, latest first
#[utoipa::path(
    get,
    path = "/equipment/{id}/fuel-logs",
    tag = "fuel_logs",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Equipment ID")),
    responses(
        (status = 200, description = "Fuel logs", body = Vec<FuelLog>),
        (status = 404, description = "Equipment not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_fuel_logs(
    State(state): State<crate::AppState>,
    user: AuthenticatedUser,
    Path(equipment_id): Path<i32>,
) -> AppResult<Json<Vec<FuelLog>>> {
    let logs = state.services.fuel_logs.list(user.owner_id(), equipment_id).await?;
    Ok(Json(logs))
}

/// Fuel totals and consumption of an equipment
#[utoipa::path(
    get,
    path = "/equipment/{id}/fuel-logs/summary",
    tag = "fuel_logs",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Equipment ID")),
    responses(
        (status = 200, description = "Fuel summary", body = FuelSummary)
    )
)]
pub async fn fuel_summary(
    State(state): State<crate::AppState>,
    user: AuthenticatedUser,
    Path(equipment_id): Path<i32>,
) -> AppResult<Json<FuelSummary>> {
    let summary = state.services.fuel_logs.summary(user.owner_id(), equipment_id).await?;
    Ok(Json(summary))
}

/// Record a fill-up
#[utoipa::path(
    post,
    path = "/equipment/{id}/fuel-logs",
    tag = "fuel_logs",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Equipment ID")),
    request_body = CreateFuelLog,
    responses(
        (status = 201, description = "Fuel log recorded", body = FuelLog),
        (status = 400, description = "Invalid quantity or price", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_fuel_log(
    State(state): State<crate::AppState>,
    user: AuthenticatedUser,
    Path(equipment_id): Path<i32>,
    Json(data): Json<CreateFuelLog>,
) -> AppResult<(StatusCode, Json<FuelLog>)> {
    data.validate()?;
    let log = state
        .services
        .fuel_logs
        .create(user.owner_id(), equipment_id, &data)
        .await?;
    Ok((StatusCode::CREATED, Json(log)))
}

#[utoipa::path(
    put,
    path = "/fuel-logs/{id}",
    tag = "fuel_logs",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Fuel log ID")),
    request_body = UpdateFuelLog,
    responses(
        (status = 200, description = "Fuel log updated", body = FuelLog)
    )
)]
pub async fn update_fuel_log(
    State(state): State<crate::AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<UpdateFuelLog>,
) -> AppResult<Json<FuelLog>> {
    data.validate()?;
    let log = state.services.fuel_logs.update(user.owner_id(), id, &data).await?;
    Ok(Json(log))
}

#[utoipa::path(
    delete,
    path = "/fuel-logs/{id}",
    tag = "fuel_logs",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Fuel log ID")),
    responses(
        (status = 204, description = "Fuel log deleted")
    )
)]
pub async fn delete_fuel_log(
    State(state): State<crate::AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.fuel_logs.delete(user.owner_id(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
