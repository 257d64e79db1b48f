//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{assets, auth, catalog, dashboard, health, settings, transfer, users};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Inventory API",
        version = "0.3.0",
        description = "IT asset inventory REST API: assets, tags, lifecycle and audit trail"
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::login,
        auth::me,
        // Assets
        assets::list_assets,
        assets::get_asset,
        assets::list_asset_events,
        assets::create_asset,
        assets::update_asset,
        assets::delete_asset,
        assets::list_tag_sequences,
        dashboard::get_dashboard,
        // Lifecycle
        assets::assign,
        assets::unassign,
        assets::start_repair,
        assets::complete_repair,
        assets::dispose,
        assets::mark_damaged,
        assets::mark_missing,
        assets::move_asset,
        // Transfer
        transfer::export_assets,
        transfer::import_assets,
        // Catalog
        catalog::list_locations,
        catalog::get_location,
        catalog::create_location,
        catalog::update_location,
        catalog::list_categories,
        catalog::get_category,
        catalog::create_category,
        catalog::update_category,
        catalog::list_subcategories,
        catalog::create_subcategory,
        catalog::delete_subcategory,
        catalog::list_vendors,
        catalog::get_vendor,
        catalog::create_vendor,
        catalog::update_vendor,
        // Users
        users::list_users,
        users::create_user,
        users::set_admin,
        users::reset_password,
        // Settings
        settings::get_settings,
        settings::update_settings,
    ),
    components(
        schemas(
            // Auth & users
            crate::models::user::LoginRequest,
            crate::models::user::LoginResponse,
            crate::models::user::User,
            crate::models::user::CreateUser,
            crate::models::user::ResetPassword,
            crate::models::user::SetAdmin,
            // Assets
            crate::models::asset::Asset,
            crate::models::asset::AssetPage,
            crate::models::asset::CreateAsset,
            crate::models::asset::UpdateAsset,
            crate::models::asset::AssignAsset,
            crate::models::asset::StartRepair,
            crate::models::asset::CompleteRepair,
            crate::models::asset::MoveAsset,
            crate::models::asset::TransitionResponse,
            crate::models::asset_event::AssetEvent,
            crate::models::tag_sequence::AssetTagSequence,
            crate::models::dashboard::Dashboard,
            crate::models::dashboard::StatusCounts,
            crate::models::enums::AssetStatus,
            crate::models::enums::AssetEventType,
            crate::models::import_report::ImportReport,
            // Catalog
            crate::models::location::Location,
            crate::models::location::CreateLocation,
            crate::models::location::UpdateLocation,
            crate::models::category::Category,
            crate::models::category::CreateCategory,
            crate::models::category::UpdateCategory,
            crate::models::category::SubCategory,
            crate::models::category::CreateSubCategory,
            crate::models::vendor::Vendor,
            crate::models::vendor::CreateVendor,
            crate::models::vendor::UpdateVendor,
            // Settings
            crate::models::setting::SettingsResponse,
            crate::models::setting::UpdateSettings,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "assets", description = "Asset records and history"),
        (name = "lifecycle", description = "Asset lifecycle actions"),
        (name = "transfer", description = "CSV export and import"),
        (name = "catalog", description = "Locations, categories and vendors"),
        (name = "users", description = "User administration"),
        (name = "settings", description = "Application settings")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_lifecycle_paths() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;
        assert!(paths.contains_key("/assets/{id}/assign"));
        assert!(paths.contains_key("/assets/{id}/repair/complete"));
        assert!(paths.contains_key("/assets/import"));
        assert!(paths.contains_key("/dashboard"));
    }

    #[test]
    fn test_openapi_has_no_user_deletion() {
        let doc = ApiDoc::openapi();
        assert!(!doc.paths.paths.contains_key("/users/{id}"));
    }
}
