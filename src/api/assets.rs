//! Asset endpoints: CRUD, history and lifecycle actions

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{
        asset::{
            Asset, AssetPage, AssetQuery, AssignAsset, CompleteRepair, CreateAsset, MoveAsset,
            StartRepair, TransitionResponse, UpdateAsset,
        },
        asset_event::AssetEvent,
        tag_sequence::AssetTagSequence,
    },
};

use super::AuthenticatedUser;

/// List assets with filters and pagination
#[utoipa::path(
    get,
    path = "/assets",
    tag = "assets",
    security(("bearer_auth" = [])),
    params(AssetQuery),
    responses(
        (status = 200, description = "Page of assets", body = AssetPage),
        (status = 400, description = "Unknown status filter"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_assets(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Query(query): Query<AssetQuery>,
) -> AppResult<Json<AssetPage>> {
    let page = state.services.assets.list(&query).await?;
    Ok(Json(page))
}

/// Get asset details by ID
#[utoipa::path(
    get,
    path = "/assets/{id}",
    tag = "assets",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Asset ID")),
    responses(
        (status = 200, description = "Asset details", body = Asset),
        (status = 404, description = "Asset not found")
    )
)]
pub async fn get_asset(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Asset>> {
    let asset = state.services.assets.get(id).await?;
    Ok(Json(asset))
}

/// Event history of an asset, newest first
#[utoipa::path(
    get,
    path = "/assets/{id}/events",
    tag = "assets",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Asset ID")),
    responses(
        (status = 200, description = "Asset events", body = Vec<AssetEvent>),
        (status = 404, description = "Asset not found")
    )
)]
pub async fn list_asset_events(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Vec<AssetEvent>>> {
    let events = state.services.assets.history(id).await?;
    Ok(Json(events))
}

/// Create an asset; its tag is generated from the location and category codes
#[utoipa::path(
    post,
    path = "/assets",
    tag = "assets",
    security(("bearer_auth" = [])),
    request_body = CreateAsset,
    responses(
        (status = 201, description = "Asset created", body = Asset),
        (status = 400, description = "Invalid input or missing location/category code"),
        (status = 409, description = "Tag counter busy, retry")
    )
)]
pub async fn create_asset(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<CreateAsset>,
) -> AppResult<(StatusCode, Json<Asset>)> {
    claims.require_admin()?;
    let asset = state.services.assets.create(data, Some(claims.user_id)).await?;
    Ok((StatusCode::CREATED, Json(asset)))
}

/// Update descriptive fields of an asset
#[utoipa::path(
    put,
    path = "/assets/{id}",
    tag = "assets",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Asset ID")),
    request_body = UpdateAsset,
    responses(
        (status = 200, description = "Asset updated", body = Asset),
        (status = 404, description = "Asset not found"),
        (status = 422, description = "Location must be changed with the move action")
    )
)]
pub async fn update_asset(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<UpdateAsset>,
) -> AppResult<Json<Asset>> {
    claims.require_admin()?;
    let asset = state.services.assets.update(id, data).await?;
    Ok(Json(asset))
}

/// Delete an asset and its history
#[utoipa::path(
    delete,
    path = "/assets/{id}",
    tag = "assets",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Asset ID")),
    responses(
        (status = 204, description = "Asset deleted"),
        (status = 404, description = "Asset not found")
    )
)]
pub async fn delete_asset(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    claims.require_admin()?;
    state.services.assets.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// LIFECYCLE
// =============================================================================

/// Assign an asset to a person
#[utoipa::path(
    post,
    path = "/assets/{id}/assign",
    tag = "lifecycle",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Asset ID")),
    request_body = AssignAsset,
    responses(
        (status = 200, description = "Asset assigned", body = TransitionResponse),
        (status = 400, description = "Assignee name missing"),
        (status = 422, description = "Asset cannot be assigned in its current status")
    )
)]
pub async fn assign(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<AssignAsset>,
) -> AppResult<Json<TransitionResponse>> {
    claims.require_admin()?;
    let response = state.services.assets.assign(id, data, Some(claims.user_id)).await?;
    Ok(Json(response))
}

/// Clear the current assignment
#[utoipa::path(
    post,
    path = "/assets/{id}/unassign",
    tag = "lifecycle",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Asset ID")),
    responses(
        (status = 200, description = "Asset unassigned", body = TransitionResponse),
        (status = 422, description = "Asset is not assigned")
    )
)]
pub async fn unassign(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<TransitionResponse>> {
    claims.require_admin()?;
    let response = state.services.assets.unassign(id, Some(claims.user_id)).await?;
    Ok(Json(response))
}

/// Send an asset to repair
#[utoipa::path(
    post,
    path = "/assets/{id}/repair/start",
    tag = "lifecycle",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Asset ID")),
    request_body = StartRepair,
    responses(
        (status = 200, description = "Repair started", body = TransitionResponse),
        (status = 400, description = "Unknown vendor without phone and address"),
        (status = 422, description = "Asset cannot be sent to repair in its current status")
    )
)]
pub async fn start_repair(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<StartRepair>,
) -> AppResult<Json<TransitionResponse>> {
    claims.require_admin()?;
    let response = state
        .services
        .assets
        .start_repair(id, data, Some(claims.user_id))
        .await?;
    Ok(Json(response))
}

/// Close the open repair
#[utoipa::path(
    post,
    path = "/assets/{id}/repair/complete",
    tag = "lifecycle",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Asset ID")),
    request_body = CompleteRepair,
    responses(
        (status = 200, description = "Repair completed", body = TransitionResponse),
        (status = 400, description = "Invalid repair cost"),
        (status = 422, description = "Asset is not under repair")
    )
)]
pub async fn complete_repair(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<CompleteRepair>,
) -> AppResult<Json<TransitionResponse>> {
    claims.require_admin()?;
    let response = state
        .services
        .assets
        .complete_repair(id, data, Some(claims.user_id))
        .await?;
    Ok(Json(response))
}

/// Dispose of an asset
#[utoipa::path(
    post,
    path = "/assets/{id}/dispose",
    tag = "lifecycle",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Asset ID")),
    responses(
        (status = 200, description = "Asset disposed, or already disposed (changed = false)", body = TransitionResponse)
    )
)]
pub async fn dispose(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<TransitionResponse>> {
    claims.require_admin()?;
    let response = state.services.assets.dispose(id, Some(claims.user_id)).await?;
    Ok(Json(response))
}

/// Mark an asset as damaged
#[utoipa::path(
    post,
    path = "/assets/{id}/damaged",
    tag = "lifecycle",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Asset ID")),
    responses(
        (status = 200, description = "Asset marked as damaged", body = TransitionResponse),
        (status = 422, description = "Asset is disposed")
    )
)]
pub async fn mark_damaged(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<TransitionResponse>> {
    claims.require_admin()?;
    let response = state.services.assets.mark_damaged(id, Some(claims.user_id)).await?;
    Ok(Json(response))
}

/// Mark an asset as missing
#[utoipa::path(
    post,
    path = "/assets/{id}/missing",
    tag = "lifecycle",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Asset ID")),
    responses(
        (status = 200, description = "Asset marked as missing", body = TransitionResponse),
        (status = 422, description = "Asset is disposed")
    )
)]
pub async fn mark_missing(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<TransitionResponse>> {
    claims.require_admin()?;
    let response = state.services.assets.mark_missing(id, Some(claims.user_id)).await?;
    Ok(Json(response))
}

/// Move an asset to another location
#[utoipa::path(
    post,
    path = "/assets/{id}/move",
    tag = "lifecycle",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Asset ID")),
    request_body = MoveAsset,
    responses(
        (status = 200, description = "Asset moved", body = TransitionResponse),
        (status = 400, description = "Asset is already at that location"),
        (status = 404, description = "Asset or location not found")
    )
)]
pub async fn move_asset(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<MoveAsset>,
) -> AppResult<Json<TransitionResponse>> {
    claims.require_admin()?;
    let response = state.services.assets.move_to(id, data, Some(claims.user_id)).await?;
    Ok(Json(response))
}

/// Tag counters per office and year
#[utoipa::path(
    get,
    path = "/tag-sequences",
    tag = "assets",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Counters", body = Vec<AssetTagSequence>),
        (status = 403, description = "Administrator privileges required")
    )
)]
pub async fn list_tag_sequences(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<AssetTagSequence>>> {
    claims.require_admin()?;
    let counters = state.services.tags.counters().await?;
    Ok(Json(counters))
}
