//! Equipment API endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::{
    dashboard::FilterOptions,
    error::AppResult,
    models::{
        equipment::{CreateEquipment, Equipment, EquipmentQuery, UpdateEquipment, UpdateWear},
        part::Part,
        qrcode::EquipmentQrCode,
    },
};

use super::AuthenticatedUser;

/// List equipment
#[utoipa::path(
    get,
    path = "/equipment",
    tag = "equipment",
    security(("bearer_auth" = [])),
    params(EquipmentQuery),
    responses(
        (status = 200, description = "Equipment list", body = Vec<Equipment>)
    )
)]
pub async fn list_equipment(
    State(state): State<crate::AppState>,
    user: AuthenticatedUser,
    Query(query): Query<EquipmentQuery>,
) -> AppResult<Json<Vec<Equipment>>> {
    let equipment = state.services.equipment.list(user.owner_id(), &query).await?;
    Ok(Json(equipment))
}

/// Values available for the equipment list filters
#[utoipa::path(
    get,
    path = "/equipment/filters",
    tag = "equipment",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Filter options", body = FilterOptions)
    )
)]
pub async fn equipment_filter_options(
    State(state): State<crate::AppState>,
    user: AuthenticatedUser,
) -> AppResult<Json<FilterOptions>> {
    let options = state.services.equipment.filter_options(user.owner_id()).await?;
    Ok(Json(options))
}

/// Get equipment by ID
#[utoipa::path(
    get,
    path = "/equipment/{id}",
    tag = "equipment",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Equipment ID")),
    responses(
        (status = 200, description = "Equipment details", body = Equipment),
        (status = 403, description = "Owned by another user", body = crate::error::ErrorResponse),
        (status = 404, description = "Equipment not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_equipment(
    State(state): State<crate::AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Equipment>> {
    let equipment = state.services.equipment.get_by_id(user.owner_id(), id).await?;
    Ok(Json(equipment))
}

/// Parts compatible with an equipment
#[utoipa::path(
    get,
    path = "/equipment/{id}/parts",
    tag = "equipment",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Equipment ID")),
    responses(
        (status = 200, description = "Compatible parts by name", body = Vec<Part>),
        (status = 404, description = "Equipment not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn equipment_parts(
    State(state): State<crate::AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Vec<Part>>> {
    let parts = state.services.parts.for_equipment(user.owner_id(), id).await?;
    Ok(Json(parts))
}

/// Create equipment
#[utoipa::path(
    post,
    path = "/equipment",
    tag = "equipment",
    security(("bearer_auth" = [])),
    request_body = CreateEquipment,
    responses(
        (status = 201, description = "Equipment created", body = Equipment),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_equipment(
    State(state): State<crate::AppState>,
    user: AuthenticatedUser,
    Json(data): Json<CreateEquipment>,
) -> AppResult<(StatusCode, Json<Equipment>)> {
    data.validate()?;
    let equipment = state.services.equipment.create(user.owner_id(), &data).await?;
    Ok((StatusCode::CREATED, Json(equipment)))
}

/// Update equipment
#[utoipa::path(
    put,
    path = "/equipment/{id}",
    tag = "equipment",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Equipment ID")),
    request_body = UpdateEquipment,
    responses(
        (status = 200, description = "Equipment updated", body = Equipment)
    )
)]
pub async fn update_equipment(
    State(state): State<crate::AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<UpdateEquipment>,
) -> AppResult<Json<Equipment>> {
    data.validate()?;
    let equipment = state.services.equipment.update(user.owner_id(), id, &data).await?;
    Ok(Json(equipment))
}

/// Record a wear counter reading
#[utoipa::path(
    put,
    path = "/equipment/{id}/wear",
    tag = "equipment",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Equipment ID")),
    request_body = UpdateWear,
    responses(
        (status = 200, description = "Wear updated", body = Equipment),
        (status = 422, description = "Reading below the current value", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_wear(
    State(state): State<crate::AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<UpdateWear>,
) -> AppResult<Json<Equipment>> {
    data.validate()?;
    let equipment = state.services.equipment.update_wear(user.owner_id(), id, &data).await?;
    Ok(Json(equipment))
}

/// Delete equipment
#[utoipa::path(
    delete,
    path = "/equipment/{id}",
    tag = "equipment",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Equipment ID")),
    responses(
        (status = 204, description = "Equipment deleted")
    )
)]
pub async fn delete_equipment(
    State(state): State<crate::AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.equipment.delete(user.owner_id(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Get (or issue) the equipment's QR code
#[utoipa::path(
    post,
    path = "/equipment/{id}/qrcode",
    tag = "equipment",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Equipment ID")),
    responses(
        (status = 200, description = "Active QR code", body = EquipmentQrCode)
    )
)]
pub async fn issue_qrcode(
    State(state): State<crate::AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<EquipmentQrCode>> {
    let code = state.services.qrcodes.issue(user.owner_id(), id).await?;
    Ok(Json(code))
}

/// Revoke the equipment's QR codes
#[utoipa::path(
    delete,
    path = "/equipment/{id}/qrcode",
    tag = "equipment",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Equipment ID")),
    responses(
        (status = 204, description = "QR codes revoked")
    )
)]
pub async fn revoke_qrcode(
    State(state): State<crate::AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.qrcodes.revoke(user.owner_id(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
