//! CSV export/import endpoints

use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
    Json,
};

use crate::{error::AppResult, models::import_report::ImportReport};

use super::AuthenticatedUser;

/// Export all assets as CSV
#[utoipa::path(
    get,
    path = "/assets/export",
    tag = "transfer",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "CSV file", content_type = "text/csv", body = String)
    )
)]
pub async fn export_assets(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<impl IntoResponse> {
    let csv = state.services.transfer.export_csv().await?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"assets.csv\""),
        ],
        csv,
    ))
}

/// Import assets from a CSV body. Any invalid row rejects the whole file.
#[utoipa::path(
    post,
    path = "/assets/import",
    tag = "transfer",
    security(("bearer_auth" = [])),
    request_body(content = String, content_type = "text/csv"),
    responses(
        (status = 200, description = "Import committed", body = ImportReport),
        (status = 400, description = "Invalid file; the message names the failing row"),
        (status = 403, description = "Administrator privileges required")
    )
)]
pub async fn import_assets(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    body: String,
) -> AppResult<Json<ImportReport>> {
    claims.require_admin()?;
    let report = state
        .services
        .transfer
        .import_csv(&body, Some(claims.user_id))
        .await?;
    Ok(Json(report))
}
