//! Dashboard API endpoint

use axum::{extract::State, Json};

use crate::{dashboard::DashboardOverview, error::AppResult};

use super::AuthenticatedUser;

/// Stats, alerts and calendar derived from the caller's data
#[utoipa::path(
    get,
    path = "/dashboard",
    tag = "dashboard",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Dashboard overview", body = DashboardOverview)
    )
)]
pub async fn get_dashboard(
    State(state): State<crate::AppState>,
    user: AuthenticatedUser,
) -> AppResult<Json<DashboardOverview>> {
    let overview = state.services.dashboard.overview(user.owner_id()).await?;
    Ok(Json(overview))
}
