//! Field observations API endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::{
    error::AppResult,
    models::observation::{CreateObservation, FieldObservation, ObservationQuery},
};

use super::AuthenticatedUser;

/// List the caller's observations
#[utoipa::path(
    get,
    path = "/observations",
    tag = "observations",
    security(("bearer_auth" = [])),
    params(ObservationQuery),
    responses(
        (status = 200, description = "Observation list", body = Vec<FieldObservation>)
    )
)]
pub async fn list_observations(
    State(state): State<crate::AppState>,
    user: AuthenticatedUser,
    Query(query): Query<ObservationQuery>,
) -> AppResult<Json<Vec<FieldObservation>>> {
    let observations = state
        .services
        .observations
        .list(user.owner_id(), query.equipment_id)
        .await?;
    Ok(Json(observations))
}

/// Report an observation
#[utoipa::path(
    post,
    path = "/observations",
    tag = "observations",
    security(("bearer_auth" = [])),
    request_body = CreateObservation,
    responses(
        (status = 201, description = "Observation recorded", body = FieldObservation),
        (status = 404, description = "Equipment not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_observation(
    State(state): State<crate::AppState>,
    user: AuthenticatedUser,
    Json(data): Json<CreateObservation>,
) -> AppResult<(StatusCode, Json<FieldObservation>)> {
    data.validate()?;
    let observation = state.services.observations.create(user.owner_id(), &data).await?;
    Ok((StatusCode::CREATED, Json(observation)))
}

/// Delete observation
#[utoipa::path(
    delete,
    path = "/observations/{id}",
    tag = "observations",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Observation ID")),
    responses(
        (status = 204, description = "Observation deleted")
    )
)]
pub async fn delete_observation(
    State(state): State<crate::AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.observations.delete(user.owner_id(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
