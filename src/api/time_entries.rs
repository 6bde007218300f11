//! Time tracking API endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dashboard::TimeSummary,
    error::AppResult,
    models::time_entry::{StartTimeEntry, StopTimeEntry, TimeEntry, TimeEntryQuery},
};

use super::AuthenticatedUser;

/// List the caller's time entries
#[utoipa::path(
    get,
    path = "/time-entries",
    tag = "time_entries",
    security(("bearer_auth" = [])),
    params(TimeEntryQuery),
    responses(
        (status = 200, description = "Time entries", body = Vec<TimeEntry>)
    )
)]
pub async fn list_time_entries(
    State(state): State<crate::AppState>,
    user: AuthenticatedUser,
    Query(query): Query<TimeEntryQuery>,
) -> AppResult<Json<Vec<TimeEntry>>> {
    let entries = state.services.time_tracking.list(user.owner_id(), &query).await?;
    Ok(Json(entries))
}

/// Active or paused session, if any
#[utoipa::path(
    get,
    path = "/time-entries/current",
    tag = "time_entries",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current session or null", body = Option<TimeEntry>)
    )
)]
pub async fn current_time_entry(
    State(state): State<crate::AppState>,
    user: AuthenticatedUser,
) -> AppResult<Json<Option<TimeEntry>>> {
    let entry = state.services.time_tracking.current(user.owner_id()).await?;
    Ok(Json(entry))
}

/// Hours per task type and equipment
#[utoipa::path(
    get,
    path = "/time-entries/summary",
    tag = "time_entries",
    security(("bearer_auth" = [])),
    params(TimeEntryQuery),
    responses(
        (status = 200, description = "Time summary", body = TimeSummary)
    )
)]
pub async fn time_summary(
    State(state): State<crate::AppState>,
    user: AuthenticatedUser,
    Query(query): Query<TimeEntryQuery>,
) -> AppResult<Json<TimeSummary>> {
    let summary = state.services.time_tracking.summary(user.owner_id(), &query).await?;
    Ok(Json(summary))
}

/// Get time entry by ID
#[utoipa::path(
    get,
    path = "/time-entries/{id}",
    tag = "time_entries",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Time entry ID")),
    responses(
        (status = 200, description = "Time entry", body = TimeEntry),
        (status = 404, description = "Time entry not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_time_entry(
    State(state): State<crate::AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<TimeEntry>> {
    let entry = state.services.time_tracking.get_by_id(user.owner_id(), id).await?;
    Ok(Json(entry))
}

/// Start a session
#[utoipa::path(
    post,
    path = "/time-entries",
    tag = "time_entries",
    security(("bearer_auth" = [])),
    request_body = StartTimeEntry,
    responses(
        (status = 201, description = "Session started", body = TimeEntry)
    )
)]
pub async fn start_time_entry(
    State(state): State<crate::AppState>,
    user: AuthenticatedUser,
    Json(data): Json<StartTimeEntry>,
) -> AppResult<(StatusCode, Json<TimeEntry>)> {
    data.validate()?;
    let entry = state.services.time_tracking.start(user.owner_id(), &data).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// Pause a session
#[utoipa::path(
    post,
    path = "/time-entries/{id}/pause",
    tag = "time_entries",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Time entry ID")),
    responses(
        (status = 200, description = "Session paused", body = TimeEntry),
        (status = 422, description = "Session is not active", body = crate::error::ErrorResponse)
    )
)]
pub async fn pause_time_entry(
    State(state): State<crate::AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<TimeEntry>> {
    let entry = state.services.time_tracking.pause(user.owner_id(), id).await?;
    Ok(Json(entry))
}

/// Resume a paused session
#[utoipa::path(
    post,
    path = "/time-entries/{id}/resume",
    tag = "time_entries",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Time entry ID")),
    responses(
        (status = 200, description = "Session resumed", body = TimeEntry),
        (status = 422, description = "Session is not paused", body = crate::error::ErrorResponse)
    )
)]
pub async fn resume_time_entry(
    State(state): State<crate::AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<TimeEntry>> {
    let entry = state.services.time_tracking.resume(user.owner_id(), id).await?;
    Ok(Json(entry))
}

/// Stop a session and record its duration
#[utoipa::path(
    post,
    path = "/time-entries/{id}/stop",
    tag = "time_entries",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Time entry ID")),
    request_body = StopTimeEntry,
    responses(
        (status = 200, description = "Session completed", body = TimeEntry),
        (status = 422, description = "Session already completed", body = crate::error::ErrorResponse)
    )
)]
pub async fn stop_time_entry(
    State(state): State<crate::AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    data: Option<Json<StopTimeEntry>>,
) -> AppResult<Json<TimeEntry>> {
    let data = data.map(|Json(d)| d).unwrap_or_default();
    let entry = state.services.time_tracking.stop(user.owner_id(), id, &data).await?;
    Ok(Json(entry))
}

/// Delete time entry
#[utoipa::path(
    delete,
    path = "/time-entries/{id}",
    tag = "time_entries",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Time entry ID")),
    responses(
        (status = 204, description = "Time entry deleted")
    )
)]
pub async fn delete_time_entry(
    State(state): State<crate::AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.services.time_tracking.delete(user.owner_id(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
