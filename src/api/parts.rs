//! Parts inventory API endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::{
    error::AppResult,
    models::part::{
        AdjustStock, CreatePart, Part, PartLookupRequest, PartLookupResponse, PartQuery, UpdatePart,
    },
};

use super::AuthenticatedUser;

/// List parts
#[utoipa::path(
    get,
    path = "/parts",
    tag = "parts",
    security(("bearer_auth" = [])),
    params(PartQuery),
    responses(
        (status = 200, description = "Parts list", body = Vec<Part>)
    )
)]
pub async fn list_parts(
    State(state): State<crate::AppState>,
    user: AuthenticatedUser,
    Query(query): Query<PartQuery>,
) -> AppResult<Json<Vec<Part>>> {
    let parts = state.services.parts.list(user.owner_id(), &query).await?;
    Ok(Json(parts))
}

/// Get part by ID
#[utoipa::path(
    get,
    path = "/parts/{id}",
    tag = "parts",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Part ID")),
    responses(
        (status = 200, description = "Part details", body = Part),
        (status = 404, description = "Part not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_part(
    State(state): State<crate::AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Part>> {
    let part = state.services.parts.get_by_id(user.owner_id(), id).await?;
    Ok(Json(part))
}

/// Create part
#[utoipa::path(
    post,
    path = "/parts",
    tag = "parts",
    security(("bearer_auth" = [])),
    request_body = CreatePart,
    responses(
        (status = 201, description = "Part created", body = Part)
    )
)]
pub async fn create_part(
    State(state): State<crate::AppState>,
    user: AuthenticatedUser,
    Json(data): Json<CreatePart>,
) -> AppResult<(StatusCode, Json<Part>)> {
    data.validate()?;
    let part = state.services.parts.create(user.owner_id(), &data).await?;
    Ok((StatusCode::CREATED, Json(part)))
}

/// Update part
#[utoipa::path(
    put,
    path = "/parts/{id}",
    tag = "parts",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Part ID")),
    request_body = UpdatePart,
    responses(
        (status = 200, description = "Part updated", body = Part)
    )
)]
pub async fn update_part(
    State(state): State<crate::AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<UpdatePart>,
) -> AppResult<Json<Part>> {
    data.validate()?;
    let part = state.services.parts.update(user.owner_id(), id, &data).await?;
    Ok(Json(part))
}

/// Receive or consume stock
#[utoipa::path(
    post,
    path = "/parts/{id}/stock",
    tag = "parts",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Part ID")),
    request_body = AdjustStock,
    responses(
        (status = 200, description = "Stock adjusted", body = Part),
        (status = 422, description = "Not enough stock", body = crate::error::ErrorResponse)
    )
)]
pub async fn adjust_stock(
    State(state): State<crate::AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<AdjustStock>,
) -> AppResult<Json<Part>> {
    let part = state.services.parts.adjust_stock(user.owner_id(), id, &data).await?;
    Ok(Json(part))
}

/// Delete part
#[utoipa::path(
    delete,
    path = "/parts/{id}",
    tag = "parts",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Part ID")),
    responses(
        (status = 204, description = "Part deleted")
    )
)]
pub async fn delete_part(
    State(state): State<crate::AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.parts.delete(user.owner_id(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Technical information about a part number
#[utoipa::path(
    post,
    path = "/parts/lookup",
    tag = "parts",
    security(("bearer_auth" = [])),
    request_body = PartLookupRequest,
    responses(
        (status = 200, description = "Lookup result, possibly the placeholder with a notice", body = PartLookupResponse)
    )
)]
pub async fn lookup_part(
    State(state): State<crate::AppState>,
    _user: AuthenticatedUser,
    Json(data): Json<PartLookupRequest>,
) -> AppResult<Json<PartLookupResponse>> {
    data.validate()?;
    let response = state
        .services
        .parts_lookup
        .lookup(&data.part_number, data.context.as_deref())
        .await;
    Ok(Json(response))
}
