//! Maintenance tasks and plans API endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::{
    error::AppResult,
    models::maintenance::{
        CreatePlan, CreateTask, MaintenancePlan, MaintenanceTask, ScheduleRequest, TaskQuery,
        TaskTransition, UpdatePlan, UpdateTask,
    },
    services::maintenance::ScheduleResult,
};

use super::AuthenticatedUser;

/// List maintenance tasks
#[utoipa::path(
    get,
    path = "/maintenance/tasks",
    tag = "maintenance",
    security(("bearer_auth" = [])),
    params(TaskQuery),
    responses(
        (status = 200, description = "Task list", body = Vec<MaintenanceTask>)
    )
)]
pub async fn list_tasks(
    State(state): State<crate::AppState>,
    user: AuthenticatedUser,
    Query(query): Query<TaskQuery>,
) -> AppResult<Json<Vec<MaintenanceTask>>> {
    let tasks = state.services.maintenance.list_tasks(user.owner_id(), &query).await?;
    Ok(Json(tasks))
}

/// Get task by ID
#[utoipa::path(
    get,
    path = "/maintenance/tasks/{id}",
    tag = "maintenance",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Task ID")),
    responses(
        (status = 200, description = "Task details", body = MaintenanceTask),
        (status = 404, description = "Task not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_task(
    State(state): State<crate::AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<MaintenanceTask>> {
    let task = state.services.maintenance.get_task(user.owner_id(), id).await?;
    Ok(Json(task))
}

/// Create task
#[utoipa::path(
    post,
    path = "/maintenance/tasks",
    tag = "maintenance",
    security(("bearer_auth" = [])),
    request_body = CreateTask,
    responses(
        (status = 201, description = "Task created", body = MaintenanceTask)
    )
)]
pub async fn create_task(
    State(state): State<crate::AppState>,
    user: AuthenticatedUser,
    Json(data): Json<CreateTask>,
) -> AppResult<(StatusCode, Json<MaintenanceTask>)> {
    data.validate()?;
    let task = state.services.maintenance.create_task(user.owner_id(), &data).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

/// Update task
#[utoipa::path(
    put,
    path = "/maintenance/tasks/{id}",
    tag = "maintenance",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Task ID")),
    request_body = UpdateTask,
    responses(
        (status = 200, description = "Task updated", body = MaintenanceTask)
    )
)]
pub async fn update_task(
    State(state): State<crate::AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<UpdateTask>,
) -> AppResult<Json<MaintenanceTask>> {
    data.validate()?;
    let task = state.services.maintenance.update_task(user.owner_id(), id, &data).await?;
    Ok(Json(task))
}

/// Change task status
#[utoipa::path(
    post,
    path = "/maintenance/tasks/{id}/status",
    tag = "maintenance",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Task ID")),
    request_body = TaskTransition,
    responses(
        (status = 200, description = "Status changed", body = MaintenanceTask),
        (status = 422, description = "Transition not allowed", body = crate::error::ErrorResponse)
    )
)]
pub async fn transition_task(
    State(state): State<crate::AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<TaskTransition>,
) -> AppResult<Json<MaintenanceTask>> {
    data.validate()?;
    let task = state.services.maintenance.transition_task(user.owner_id(), id, &data).await?;
    Ok(Json(task))
}

/// Delete task
#[utoipa::path(
    delete,
    path = "/maintenance/tasks/{id}",
    tag = "maintenance",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Task ID")),
    responses(
        (status = 204, description = "Task deleted")
    )
)]
pub async fn delete_task(
    State(state): State<crate::AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.maintenance.delete_task(user.owner_id(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// List maintenance plans
#[utoipa::path(
    get,
    path = "/maintenance/plans",
    tag = "maintenance",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Plan list", body = Vec<MaintenancePlan>)
    )
)]
pub async fn list_plans(
    State(state): State<crate::AppState>,
    user: AuthenticatedUser,
) -> AppResult<Json<Vec<MaintenancePlan>>> {
    let plans = state.services.maintenance.list_plans(user.owner_id()).await?;
    Ok(Json(plans))
}

/// Get plan by ID
#[utoipa::path(
    get,
    path = "/maintenance/plans/{id}",
    tag = "maintenance",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Plan ID")),
    responses(
        (status = 200, description = "Plan details", body = MaintenancePlan),
        (status = 404, description = "Plan not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_plan(
    State(state): State<crate::AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<MaintenancePlan>> {
    let plan = state.services.maintenance.get_plan(user.owner_id(), id).await?;
    Ok(Json(plan))
}

/// Create plan
#[utoipa::path(
    post,
    path = "/maintenance/plans",
    tag = "maintenance",
    security(("bearer_auth" = [])),
    request_body = CreatePlan,
    responses(
        (status = 201, description = "Plan created", body = MaintenancePlan)
    )
)]
pub async fn create_plan(
    State(state): State<crate::AppState>,
    user: AuthenticatedUser,
    Json(data): Json<CreatePlan>,
) -> AppResult<(StatusCode, Json<MaintenancePlan>)> {
    data.validate()?;
    let plan = state.services.maintenance.create_plan(user.owner_id(), &data).await?;
    Ok((StatusCode::CREATED, Json(plan)))
}

/// Update plan
#[utoipa::path(
    put,
    path = "/maintenance/plans/{id}",
    tag = "maintenance",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Plan ID")),
    request_body = UpdatePlan,
    responses(
        (status = 200, description = "Plan updated", body = MaintenancePlan)
    )
)]
pub async fn update_plan(
    State(state): State<crate::AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<UpdatePlan>,
) -> AppResult<Json<MaintenancePlan>> {
    data.validate()?;
    let plan = state.services.maintenance.update_plan(user.owner_id(), id, &data).await?;
    Ok(Json(plan))
}

/// Delete plan
#[utoipa::path(
    delete,
    path = "/maintenance/plans/{id}",
    tag = "maintenance",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Plan ID")),
    responses(
        (status = 204, description = "Plan deleted")
    )
)]
pub async fn delete_plan(
    State(state): State<crate::AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.maintenance.delete_plan(user.owner_id(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Generate the plan's tasks up to a date
#[utoipa::path(
    post,
    path = "/maintenance/plans/{id}/schedule",
    tag = "maintenance",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Plan ID")),
    request_body = ScheduleRequest,
    responses(
        (status = 200, description = "Tasks generated", body = ScheduleResult),
        (status = 422, description = "Plan inactive or wear-driven", body = crate::error::ErrorResponse)
    )
)]
pub async fn schedule_plan(
    State(state): State<crate::AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<ScheduleRequest>,
) -> AppResult<Json<ScheduleResult>> {
    let result = state
        .services
        .maintenance
        .schedule_plan(user.owner_id(), id, data.until)
        .await?;
    Ok(Json(result))
}
