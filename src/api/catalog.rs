//! Reference data endpoints: locations, categories, sub-categories, vendors

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{
        category::{Category, CreateCategory, CreateSubCategory, SubCategory, UpdateCategory},
        location::{CreateLocation, Location, UpdateLocation},
        vendor::{CreateVendor, UpdateVendor, Vendor},
    },
};

use super::AuthenticatedUser;

// =============================================================================
// LOCATIONS
// =============================================================================

/// List locations
#[utoipa::path(
    get,
    path = "/locations",
    tag = "catalog",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "List of locations", body = Vec<Location>))
)]
pub async fn list_locations(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<Vec<Location>>> {
    Ok(Json(state.services.catalog.list_locations().await?))
}

/// Get location by ID
#[utoipa::path(
    get,
    path = "/locations/{id}",
    tag = "catalog",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Location ID")),
    responses(
        (status = 200, description = "Location", body = Location),
        (status = 404, description = "Location not found")
    )
)]
pub async fn get_location(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Location>> {
    Ok(Json(state.services.catalog.get_location(id).await?))
}

/// Create a location
#[utoipa::path(
    post,
    path = "/locations",
    tag = "catalog",
    security(("bearer_auth" = [])),
    request_body = CreateLocation,
    responses(
        (status = 201, description = "Location created", body = Location),
        (status = 409, description = "Name or code already used")
    )
)]
pub async fn create_location(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<CreateLocation>,
) -> AppResult<(StatusCode, Json<Location>)> {
    claims.require_admin()?;
    let location = state.services.catalog.create_location(data).await?;
    Ok((StatusCode::CREATED, Json(location)))
}

/// Update a location
#[utoipa::path(
    put,
    path = "/locations/{id}",
    tag = "catalog",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Location ID")),
    request_body = UpdateLocation,
    responses(
        (status = 200, description = "Location updated", body = Location),
        (status = 404, description = "Location not found")
    )
)]
pub async fn update_location(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<UpdateLocation>,
) -> AppResult<Json<Location>> {
    claims.require_admin()?;
    Ok(Json(state.services.catalog.update_location(id, data).await?))
}

// =============================================================================
// CATEGORIES
// =============================================================================

/// List categories
#[utoipa::path(
    get,
    path = "/categories",
    tag = "catalog",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "List of categories", body = Vec<Category>))
)]
pub async fn list_categories(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<Vec<Category>>> {
    Ok(Json(state.services.catalog.list_categories().await?))
}

/// Get category by ID
#[utoipa::path(
    get,
    path = "/categories/{id}",
    tag = "catalog",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Category", body = Category),
        (status = 404, description = "Category not found")
    )
)]
pub async fn get_category(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Category>> {
    Ok(Json(state.services.catalog.get_category(id).await?))
}

/// Create a category
#[utoipa::path(
    post,
    path = "/categories",
    tag = "catalog",
    security(("bearer_auth" = [])),
    request_body = CreateCategory,
    responses(
        (status = 201, description = "Category created", body = Category),
        (status = 409, description = "Name already used")
    )
)]
pub async fn create_category(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<CreateCategory>,
) -> AppResult<(StatusCode, Json<Category>)> {
    claims.require_admin()?;
    let category = state.services.catalog.create_category(data).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// Update a category
#[utoipa::path(
    put,
    path = "/categories/{id}",
    tag = "catalog",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Category ID")),
    request_body = UpdateCategory,
    responses(
        (status = 200, description = "Category updated", body = Category),
        (status = 404, description = "Category not found")
    )
)]
pub async fn update_category(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<UpdateCategory>,
) -> AppResult<Json<Category>> {
    claims.require_admin()?;
    Ok(Json(state.services.catalog.update_category(id, data).await?))
}

/// List sub-categories of a category
#[utoipa::path(
    get,
    path = "/categories/{id}/subcategories",
    tag = "catalog",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Sub-categories", body = Vec<SubCategory>),
        (status = 404, description = "Category not found")
    )
)]
pub async fn list_subcategories(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Vec<SubCategory>>> {
    Ok(Json(state.services.catalog.list_subcategories(id).await?))
}

/// Create a sub-category
#[utoipa::path(
    post,
    path = "/categories/{id}/subcategories",
    tag = "catalog",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Category ID")),
    request_body = CreateSubCategory,
    responses(
        (status = 201, description = "Sub-category created", body = SubCategory),
        (status = 409, description = "Name already used in this category")
    )
)]
pub async fn create_subcategory(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<CreateSubCategory>,
) -> AppResult<(StatusCode, Json<SubCategory>)> {
    claims.require_admin()?;
    let sub = state.services.catalog.create_subcategory(id, data).await?;
    Ok((StatusCode::CREATED, Json(sub)))
}

/// Delete a sub-category
#[utoipa::path(
    delete,
    path = "/subcategories/{id}",
    tag = "catalog",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Sub-category ID")),
    responses(
        (status = 204, description = "Sub-category deleted"),
        (status = 404, description = "Sub-category not found"),
        (status = 409, description = "Sub-category still used by assets")
    )
)]
pub async fn delete_subcategory(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    claims.require_admin()?;
    state.services.catalog.delete_subcategory(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// VENDORS
// =============================================================================

/// List vendors
#[utoipa::path(
    get,
    path = "/vendors",
    tag = "catalog",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "List of vendors", body = Vec<Vendor>))
)]
pub async fn list_vendors(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<Vec<Vendor>>> {
    Ok(Json(state.services.catalog.list_vendors().await?))
}

/// Get vendor by ID
#[utoipa::path(
    get,
    path = "/vendors/{id}",
    tag = "catalog",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Vendor ID")),
    responses(
        (status = 200, description = "Vendor", body = Vendor),
        (status = 404, description = "Vendor not found")
    )
)]
pub async fn get_vendor(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Vendor>> {
    Ok(Json(state.services.catalog.get_vendor(id).await?))
}

/// Create a vendor (any authenticated user)
#[utoipa::path(
    post,
    path = "/vendors",
    tag = "catalog",
    security(("bearer_auth" = [])),
    request_body = CreateVendor,
    responses(
        (status = 201, description = "Vendor created", body = Vendor),
        (status = 409, description = "Name or code already used")
    )
)]
pub async fn create_vendor(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Json(data): Json<CreateVendor>,
) -> AppResult<(StatusCode, Json<Vendor>)> {
    let vendor = state.services.catalog.create_vendor(data).await?;
    Ok((StatusCode::CREATED, Json(vendor)))
}

/// Update a vendor (any authenticated user)
#[utoipa::path(
    put,
    path = "/vendors/{id}",
    tag = "catalog",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Vendor ID")),
    request_body = UpdateVendor,
    responses(
        (status = 200, description = "Vendor updated", body = Vendor),
        (status = 404, description = "Vendor not found")
    )
)]
pub async fn update_vendor(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<UpdateVendor>,
) -> AppResult<Json<Vendor>> {
    Ok(Json(state.services.catalog.update_vendor(id, data).await?))
}
