//! Dashboard endpoint

use axum::{extract::State, Json};

use crate::{error::AppResult, models::dashboard::Dashboard};

use super::AuthenticatedUser;

/// Asset counts per status and the assets needing attention
#[utoipa::path(
    get,
    path = "/dashboard",
    tag = "assets",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Dashboard summary", body = Dashboard),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn get_dashboard(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<Dashboard>> {
    let dashboard = state.services.assets.dashboard().await?;
    Ok(Json(dashboard))
}
