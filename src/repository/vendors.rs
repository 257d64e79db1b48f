//! Vendors repository

use chrono::Utc;
use sqlx::{PgConnection, Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::vendor::{CreateVendor, UpdateVendor, Vendor},
};

#[derive(Clone)]
pub struct VendorsRepository {
    pool: Pool<Postgres>,
}

impl VendorsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List all vendors
    pub async fn list(&self) -> AppResult<Vec<Vendor>> {
        let rows = sqlx::query_as::<_, Vendor>("SELECT * FROM vendors ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Get vendor by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Vendor> {
        sqlx::query_as::<_, Vendor>("SELECT * FROM vendors WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Vendor {} not found", id)))
    }

    /// Get vendor by ID inside a transaction
    pub async fn find_by_id(&self, conn: &mut PgConnection, id: i32) -> AppResult<Option<Vendor>> {
        let row = sqlx::query_as::<_, Vendor>("SELECT * FROM vendors WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;
        Ok(row)
    }

    /// Find vendor by name, ignoring case and surrounding spaces
    pub async fn find_by_name(&self, conn: &mut PgConnection, name: &str) -> AppResult<Option<Vendor>> {
        let row = sqlx::query_as::<_, Vendor>(
            "SELECT * FROM vendors WHERE LOWER(name) = LOWER($1)",
        )
        .bind(name.trim())
        .fetch_optional(&mut *conn)
        .await?;
        Ok(row)
    }

    /// Insert a vendor in the caller's transaction
    pub async fn insert(&self, conn: &mut PgConnection, data: &CreateVendor) -> AppResult<Vendor> {
        let row = sqlx::query_as::<_, Vendor>(
            r#"
            INSERT INTO vendors (name, code, contact_email, contact_phone, website, address)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(data.name.trim())
        .bind(&data.code)
        .bind(&data.contact_email)
        .bind(&data.contact_phone)
        .bind(&data.website)
        .bind(&data.address)
        .fetch_one(&mut *conn)
        .await?;
        Ok(row)
    }

    /// Create vendor
    pub async fn create(&self, data: &CreateVendor) -> AppResult<Vendor> {
        let mut conn = self.pool.acquire().await?;
        self.insert(&mut conn, data).await
    }

    /// Update vendor
    pub async fn update(&self, id: i32, data: &UpdateVendor) -> AppResult<Vendor> {
        sqlx::query_as::<_, Vendor>(
            r#"
            UPDATE vendors SET
                name = COALESCE($2, name),
                code = COALESCE($3, code),
                contact_email = COALESCE($4, contact_email),
                contact_phone = COALESCE($5, contact_phone),
                website = COALESCE($6, website),
                address = COALESCE($7, address),
                is_active = COALESCE($8, is_active),
                updated_at = $9
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(data.name.as_deref().map(str::trim))
        .bind(&data.code)
        .bind(&data.contact_email)
        .bind(&data.contact_phone)
        .bind(&data.website)
        .bind(&data.address)
        .bind(data.is_active)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Vendor {} not found", id)))
    }
}
