//! Settings endpoints

use axum::{extract::State, Json};

use crate::{
    error::AppResult,
    models::setting::{SettingsResponse, UpdateSettings},
};

use super::AuthenticatedUser;

/// Get application settings
#[utoipa::path(
    get,
    path = "/settings",
    tag = "settings",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current settings", body = SettingsResponse),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn get_settings(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<SettingsResponse>> {
    let settings = state.services.settings.get_settings().await?;
    Ok(Json(settings))
}

/// Update application settings
#[utoipa::path(
    put,
    path = "/settings",
    tag = "settings",
    security(("bearer_auth" = [])),
    request_body = UpdateSettings,
    responses(
        (status = 200, description = "Settings updated", body = SettingsResponse),
        (status = 400, description = "Invalid value"),
        (status = 403, description = "Administrator privileges required")
    )
)]
pub async fn update_settings(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<UpdateSettings>,
) -> AppResult<Json<SettingsResponse>> {
    claims.require_admin()?;
    let settings = state.services.settings.update_settings(request).await?;
    Ok(Json(settings))
}
