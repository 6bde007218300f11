//! Field interventions API endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::{
    error::AppResult,
    models::intervention::{
        CreateIntervention, Intervention, InterventionQuery, InterventionReport, UpdateIntervention,
    },
};

use super::AuthenticatedUser;

/// List interventions
#[utoipa::path(
    get,
    path = "/interventions",
    tag = "interventions",
    security(("bearer_auth" = [])),
    params(InterventionQuery),
    responses(
        (status = 200, description = "Intervention list", body = Vec<Intervention>)
    )
)]
pub async fn list_interventions(
    State(state): State<crate::AppState>,
    user: AuthenticatedUser,
    Query(query): Query<InterventionQuery>,
) -> AppResult<Json<Vec<Intervention>>> {
    let interventions = state.services.interventions.list(user.owner_id(), &query).await?;
    Ok(Json(interventions))
}

/// Get intervention by ID
#[utoipa::path(
    get,
    path = "/interventions/{id}",
    tag = "interventions",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Intervention ID")),
    responses(
        (status = 200, description = "Intervention details", body = Intervention),
        (status = 404, description = "Intervention not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_intervention(
    State(state): State<crate::AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Intervention>> {
    let intervention = state.services.interventions.get_by_id(user.owner_id(), id).await?;
    Ok(Json(intervention))
}

/// Create intervention
#[utoipa::path(
    post,
    path = "/interventions",
    tag = "interventions",
    security(("bearer_auth" = [])),
    request_body = CreateIntervention,
    responses(
        (status = 201, description = "Intervention created", body = Intervention)
    )
)]
pub async fn create_intervention(
    State(state): State<crate::AppState>,
    user: AuthenticatedUser,
    Json(data): Json<CreateIntervention>,
) -> AppResult<(StatusCode, Json<Intervention>)> {
    data.validate()?;
    let intervention = state.services.interventions.create(user.owner_id(), &data).await?;
    Ok((StatusCode::CREATED, Json(intervention)))
}

/// Update intervention
#[utoipa::path(
    put,
    path = "/interventions/{id}",
    tag = "interventions",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Intervention ID")),
    request_body = UpdateIntervention,
    responses(
        (status = 200, description = "Intervention updated", body = Intervention)
    )
)]
pub async fn update_intervention(
    State(state): State<crate::AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<UpdateIntervention>,
) -> AppResult<Json<Intervention>> {
    data.validate()?;
    let intervention = state.services.interventions.update(user.owner_id(), id, &data).await?;
    Ok(Json(intervention))
}

/// Complete an intervention and consume the parts used
#[utoipa::path(
    post,
    path = "/interventions/{id}/complete",
    tag = "interventions",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Intervention ID")),
    request_body = InterventionReport,
    responses(
        (status = 200, description = "Intervention completed", body = Intervention),
        (status = 422, description = "Already closed or not enough stock", body = crate::error::ErrorResponse)
    )
)]
pub async fn complete_intervention(
    State(state): State<crate::AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<InterventionReport>,
) -> AppResult<Json<Intervention>> {
    data.validate()?;
    let intervention = state.services.interventions.complete(user.owner_id(), id, &data).await?;
    Ok(Json(intervention))
}

/// Delete intervention
#[utoipa::path(
    delete,
    path = "/interventions/{id}",
    tag = "interventions",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Intervention ID")),
    responses(
        (status = 204, description = "Intervention deleted")
    )
)]
pub async fn delete_intervention(
    State(state): State<crate::AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.interventions.delete(user.owner_id(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
