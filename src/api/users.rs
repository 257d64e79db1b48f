//! User administration endpoints (admin only)

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::user::{CreateUser, ResetPassword, SetAdmin, User},
};

use super::AuthenticatedUser;

/// List users
#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "List of users", body = Vec<User>),
        (status = 403, description = "Administrator privileges required")
    )
)]
pub async fn list_users(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<User>>> {
    claims.require_admin()?;
    let users = state.services.auth.list_users().await?;
    Ok(Json(users))
}

/// Create a user
#[utoipa::path(
    post,
    path = "/users",
    tag = "users",
    security(("bearer_auth" = [])),
    request_body = CreateUser,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Username already exists")
    )
)]
pub async fn create_user(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<CreateUser>,
) -> AppResult<(StatusCode, Json<User>)> {
    claims.require_admin()?;
    let user = state.services.auth.create_user(data).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Grant or revoke administrator rights
#[utoipa::path(
    put,
    path = "/users/{id}/admin",
    tag = "users",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "User ID")),
    request_body = SetAdmin,
    responses(
        (status = 200, description = "User updated", body = User),
        (status = 404, description = "User not found"),
        (status = 422, description = "Cannot change own administrator status")
    )
)]
pub async fn set_admin(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<SetAdmin>,
) -> AppResult<Json<User>> {
    claims.require_admin()?;
    let user = state
        .services
        .auth
        .set_admin(claims.user_id, id, data.is_admin)
        .await?;
    Ok(Json(user))
}

/// Reset a user's password
#[utoipa::path(
    put,
    path = "/users/{id}/password",
    tag = "users",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "User ID")),
    request_body = ResetPassword,
    responses(
        (status = 204, description = "Password reset"),
        (status = 404, description = "User not found")
    )
)]
pub async fn reset_password(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<ResetPassword>,
) -> AppResult<StatusCode> {
    claims.require_admin()?;
    state.services.auth.reset_password(id, data).await?;
    Ok(StatusCode::NO_CONTENT)
}
