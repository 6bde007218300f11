//! Storage locations API endpoints

use axum::{extract::State, http::StatusCode, Json};
use validator::Validate;

use crate::{
    error::AppResult,
    models::location::{CreateLocation, StorageLocation},
    services::locations::AddedLocation,
};

use super::AuthenticatedUser;

/// Storage locations by name
#[utoipa::path(
    get,
    path = "/locations",
    tag = "locations",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Location list", body = Vec<StorageLocation>)
    )
)]
pub async fn list_locations(
    State(state): State<crate::AppState>,
    user: AuthenticatedUser,
) -> AppResult<Json<Vec<StorageLocation>>> {
    let locations = state.services.locations.list(user.owner_id()).await?;
    Ok(Json(locations))
}

/// Add a location; an existing location with the same name is returned as is
#[utoipa::path(
    post,
    path = "/locations",
    tag = "locations",
    security(("bearer_auth" = [])),
    request_body = CreateLocation,
    responses(
        (status = 201, description = "Location created", body = StorageLocation),
        (status = 200, description = "Location already existed", body = StorageLocation)
    )
)]
pub async fn add_location(
    State(state): State<crate::AppState>,
    user: AuthenticatedUser,
    Json(data): Json<CreateLocation>,
) -> AppResult<(StatusCode, Json<StorageLocation>)> {
    data.validate()?;
    let added = state.services.locations.add(user.owner_id(), &data).await?;
    let status = match added {
        AddedLocation::Created(_) => StatusCode::CREATED,
        AddedLocation::Existing(_) => StatusCode::OK,
    };
    Ok((status, Json(added.into_inner())))
}
