//! Public QR code scan endpoint

use axum::{
    extract::{Path, State},
    response::Redirect,
};

use crate::error::AppResult;

/// Resolve a scanned QR code to the equipment page
#[utoipa::path(
    get,
    path = "/scan/{hash}",
    tag = "scan",
    params(("hash" = String, Path, description = "Hash printed in the QR code")),
    responses(
        (status = 303, description = "Redirect to the equipment page"),
        (status = 404, description = "Unknown or revoked code", body = crate::error::ErrorResponse)
    )
)]
pub async fn scan(
    State(state): State<crate::AppState>,
    Path(hash): Path<String>,
) -> AppResult<Redirect> {
    let route = state.services.qrcodes.resolve(&hash).await?;
    Ok(Redirect::to(&route))
}
