//! Inventory Server - IT asset inventory
//!
//! REST API server for asset tags, lifecycle and audit trail.

use anyhow::Context;
use axum::{
    routing::{delete, get, post, put},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use inventory_server::{
    api,
    config::AppConfig,
    repository::Repository,
    services::Services,
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("inventory_server={},tower_http=debug", config.logging.level).into());

    let registry = tracing_subscriber::registry().with(filter);
    if config.logging.format.eq_ignore_ascii_case("json") {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("Starting Inventory Server v{}", env!("CARGO_PKG_VERSION"));

    // Create database connection pool
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await
        .context("Failed to connect to database")?;

    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;

    tracing::info!("Database migrations completed");

    let addr = SocketAddr::new(
        config.server.host.parse().context("Invalid host address")?,
        config.server.port,
    );

    // Create repository and services
    let repository = Repository::new(pool).with_lock_timeout(config.database.lock_timeout_ms);
    let services = Services::new(repository, &config);
    services.auth.ensure_bootstrap_admin().await?;

    tracing::info!(company_code = %services.tags.company_code(), "Asset tags configured");

    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    };

    let app = create_router(state);

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes
fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API v1 routes
    let api_v1 = Router::new()
        // Health check
        .route("/health", get(api::health::health_check))
        .route("/ready", get(api::health::readiness_check))
        // Authentication
        .route("/auth/login", post(api::auth::login))
        .route("/auth/me", get(api::auth::me))
        // Dashboard
        .route("/dashboard", get(api::dashboard::get_dashboard))
        // Assets
        .route("/assets", get(api::assets::list_assets).post(api::assets::create_asset))
        .route("/assets/export", get(api::transfer::export_assets))
        .route("/assets/import", post(api::transfer::import_assets))
        .route(
            "/assets/:id",
            get(api::assets::get_asset)
                .put(api::assets::update_asset)
                .delete(api::assets::delete_asset),
        )
        .route("/assets/:id/events", get(api::assets::list_asset_events))
        // Lifecycle
        .route("/assets/:id/assign", post(api::assets::assign))
        .route("/assets/:id/unassign", post(api::assets::unassign))
        .route("/assets/:id/repair/start", post(api::assets::start_repair))
        .route("/assets/:id/repair/complete", post(api::assets::complete_repair))
        .route("/assets/:id/dispose", post(api::assets::dispose))
        .route("/assets/:id/damaged", post(api::assets::mark_damaged))
        .route("/assets/:id/missing", post(api::assets::mark_missing))
        .route("/assets/:id/move", post(api::assets::move_asset))
        .route("/tag-sequences", get(api::assets::list_tag_sequences))
        // Locations
        .route("/locations", get(api::catalog::list_locations).post(api::catalog::create_location))
        .route("/locations/:id", get(api::catalog::get_location).put(api::catalog::update_location))
        // Categories
        .route("/categories", get(api::catalog::list_categories).post(api::catalog::create_category))
        .route("/categories/:id", get(api::catalog::get_category).put(api::catalog::update_category))
        .route(
            "/categories/:id/subcategories",
            get(api::catalog::list_subcategories).post(api::catalog::create_subcategory),
        )
        .route("/subcategories/:id", delete(api::catalog::delete_subcategory))
        // Vendors
        .route("/vendors", get(api::catalog::list_vendors).post(api::catalog::create_vendor))
        .route("/vendors/:id", get(api::catalog::get_vendor).put(api::catalog::update_vendor))
        // Users
        .route("/users", get(api::users::list_users).post(api::users::create_user))
        .route("/users/:id/admin", put(api::users::set_admin))
        .route("/users/:id/password", put(api::users::reset_password))
        // Settings
        .route("/settings", get(api::settings::get_settings).put(api::settings::update_settings))
        .with_state(state);

    // OpenAPI documentation
    let openapi = api::openapi::create_openapi_router();

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(cors),
        )
}
