//! Locations repository

use chrono::Utc;
use sqlx::{PgConnection, Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::location::{CreateLocation, Location, UpdateLocation},
};

#[derive(Clone)]
pub struct LocationsRepository {
    pool: Pool<Postgres>,
}

impl LocationsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List all locations
    pub async fn list(&self) -> AppResult<Vec<Location>> {
        let rows = sqlx::query_as::<_, Location>("SELECT * FROM locations ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Get location by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Location> {
        sqlx::query_as::<_, Location>("SELECT * FROM locations WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Location {} not found", id)))
    }

    /// Find location by code, ignoring case
    pub async fn find_by_code(&self, conn: &mut PgConnection, code: &str) -> AppResult<Option<Location>> {
        let row = sqlx::query_as::<_, Location>(
            "SELECT * FROM locations WHERE UPPER(code) = UPPER($1)",
        )
        .bind(code.trim())
        .fetch_optional(&mut *conn)
        .await?;
        Ok(row)
    }

    /// Create location
    pub async fn create(&self, data: &CreateLocation) -> AppResult<Location> {
        let row = sqlx::query_as::<_, Location>(
            r#"
            INSERT INTO locations (name, code, description)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(data.name.trim())
        .bind(data.code.as_deref().map(str::trim))
        .bind(&data.description)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Update location
    pub async fn update(&self, id: i32, data: &UpdateLocation) -> AppResult<Location> {
        let row = sqlx::query_as::<_, Location>(
            r#"
            UPDATE locations SET
                name = COALESCE($2, name),
                code = COALESCE($3, code),
                description = COALESCE($4, description),
                is_active = COALESCE($5, is_active),
                updated_at = $6
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(data.name.as_deref().map(str::trim))
        .bind(data.code.as_deref().map(str::trim))
        .bind(&data.description)
        .bind(data.is_active)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Location {} not found", id)))?;
        Ok(row)
    }
}
