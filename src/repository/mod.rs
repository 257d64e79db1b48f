//! Repository layer for database operations

pub mod asset_events;
pub mod assets;
pub mod categories;
pub mod locations;
pub mod sequences;
pub mod settings;
pub mod users;
pub mod vendors;

use sqlx::{Pool, Postgres, Transaction};

use crate::error::AppResult;

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    lock_timeout_ms: u64,
    pub assets: assets::AssetsRepository,
    pub asset_events: asset_events::AssetEventsRepository,
    pub sequences: sequences::SequencesRepository,
    pub locations: locations::LocationsRepository,
    pub categories: categories::CategoriesRepository,
    pub vendors: vendors::VendorsRepository,
    pub users: users::UsersRepository,
    pub settings: settings::SettingsRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            assets: assets::AssetsRepository::new(pool.clone()),
            asset_events: asset_events::AssetEventsRepository::new(pool.clone()),
            sequences: sequences::SequencesRepository::new(pool.clone()),
            locations: locations::LocationsRepository::new(pool.clone()),
            categories: categories::CategoriesRepository::new(pool.clone()),
            vendors: vendors::VendorsRepository::new(pool.clone()),
            users: users::UsersRepository::new(pool.clone()),
            settings: settings::SettingsRepository::new(pool.clone()),
            lock_timeout_ms: 5000,
            pool,
        }
    }

    /// Bound row-lock waits in write transactions
    pub fn with_lock_timeout(mut self, lock_timeout_ms: u64) -> Self {
        self.lock_timeout_ms = lock_timeout_ms;
        self
    }

    /// Round-trip to the database
    pub async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Start a write transaction. Dropping it without `commit` rolls back.
    pub async fn begin(&self) -> AppResult<Transaction<'static, Postgres>> {
        let mut tx = self.pool.begin().await?;
        // SET does not take bind parameters
        sqlx::query(&format!("SET LOCAL lock_timeout = '{}ms'", self.lock_timeout_ms))
            .execute(&mut *tx)
            .await?;
        Ok(tx)
    }
}
