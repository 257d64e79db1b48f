//! Shared setup for database-backed tests.
//!
//! Tests run against the PostgreSQL database named by `DATABASE_URL`; every
//! context truncates all tables, so point it at a throwaway database.

use std::env;

use anyhow::{Context, Result};
use sqlx::postgres::{PgPool, PgPoolOptions};
use tokio::sync::{Mutex, MutexGuard};

use inventory_server::{
    config::{AppConfig, AuthConfig, DatabaseConfig, LoggingConfig, ServerConfig, TagsConfig},
    models::{
        asset::CreateAsset,
        category::{Category, CreateCategory},
        location::{CreateLocation, Location},
    },
    repository::Repository,
    services::Services,
};

static DB_LOCK: Mutex<()> = Mutex::const_new(());

/// Serializes tests that share the database
pub async fn acquire_db_lock() -> MutexGuard<'static, ()> {
    DB_LOCK.lock().await
}

pub struct TestContext {
    pub pool: PgPool,
    pub services: Services,
}

impl TestContext {
    pub async fn new() -> Result<Self> {
        let database_url =
            env::var("DATABASE_URL").context("DATABASE_URL must be set for database tests")?;

        let pool = PgPoolOptions::new()
            .max_connections(20)
            .connect(&database_url)
            .await
            .context("failed to connect to test database")?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("failed to run migrations")?;

        sqlx::query(
            "TRUNCATE TABLE asset_events, assets, asset_tag_sequences, subcategories, categories, \
             locations, vendors, users, settings RESTART IDENTITY CASCADE",
        )
        .execute(&pool)
        .await
        .context("failed to truncate tables")?;

        let config = AppConfig {
            server: ServerConfig::default(),
            database: DatabaseConfig {
                url: database_url,
                lock_timeout_ms: 5000,
                ..DatabaseConfig::default()
            },
            auth: AuthConfig::default(),
            logging: LoggingConfig::default(),
            tags: TagsConfig::default(),
        };

        let repository = Repository::new(pool.clone()).with_lock_timeout(config.database.lock_timeout_ms);
        let services = Services::new(repository, &config);

        Ok(Self { pool, services })
    }

    pub async fn location(&self, name: &str, code: Option<&str>) -> Result<Location> {
        let location = self
            .services
            .catalog
            .create_location(CreateLocation {
                name: name.to_string(),
                code: code.map(str::to_string),
                description: None,
            })
            .await?;
        Ok(location)
    }

    pub async fn category(&self, name: &str, code: Option<&str>) -> Result<Category> {
        let category = self
            .services
            .catalog
            .create_category(CreateCategory {
                name: name.to_string(),
                code: code.map(str::to_string),
                description: None,
            })
            .await?;
        Ok(category)
    }

    pub async fn asset_count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM assets")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

/// Minimal create request for `location` / `category`
pub fn new_asset(name: &str, location: &Location, category: &Category) -> CreateAsset {
    CreateAsset {
        name: name.to_string(),
        description: None,
        serial_number: None,
        status: None,
        location_id: location.id,
        category_id: category.id,
        subcategory_id: None,
        vendor_id: None,
        purchase_date: None,
        warranty_expiry_date: None,
        cost: None,
        notes: None,
    }
}
