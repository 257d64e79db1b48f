//! Categories and sub-categories repository

use chrono::Utc;
use sqlx::{PgConnection, Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::category::{Category, CreateCategory, CreateSubCategory, SubCategory, UpdateCategory},
};

#[derive(Clone)]
pub struct CategoriesRepository {
    pool: Pool<Postgres>,
}

impl CategoriesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List all categories
    pub async fn list(&self) -> AppResult<Vec<Category>> {
        let rows = sqlx::query_as::<_, Category>("SELECT * FROM categories ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Get category by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Category> {
        sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Category {} not found", id)))
    }

    /// Find category by code, ignoring case
    pub async fn find_by_code(&self, conn: &mut PgConnection, code: &str) -> AppResult<Option<Category>> {
        let row = sqlx::query_as::<_, Category>(
            "SELECT * FROM categories WHERE UPPER(code) = UPPER($1) ORDER BY id LIMIT 1",
        )
        .bind(code.trim())
        .fetch_optional(&mut *conn)
        .await?;
        Ok(row)
    }

    /// Create category
    pub async fn create(&self, data: &CreateCategory) -> AppResult<Category> {
        let row = sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (name, code, description)
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

    /// Update category
    pub async fn update(&self, id: i32, data: &UpdateCategory) -> AppResult<Category> {
        sqlx::query_as::<_, Category>(
            r#"
            UPDATE categories SET
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
        .ok_or_else(|| AppError::NotFound(format!("Category {} not found", id)))
    }

    // Sub-categories

    /// Sub-categories of a category
    pub async fn list_subcategories(&self, category_id: i32) -> AppResult<Vec<SubCategory>> {
        let rows = sqlx::query_as::<_, SubCategory>(
            "SELECT * FROM subcategories WHERE category_id = $1 ORDER BY name",
        )
        .bind(category_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Get sub-category by ID
    pub async fn get_subcategory(&self, id: i32) -> AppResult<SubCategory> {
        sqlx::query_as::<_, SubCategory>("SELECT * FROM subcategories WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Sub-category {} not found", id)))
    }

    /// Find a sub-category of `category_id` by name, ignoring case
    pub async fn find_subcategory_by_name(
        &self,
        conn: &mut PgConnection,
        category_id: i32,
        name: &str,
    ) -> AppResult<Option<SubCategory>> {
        let row = sqlx::query_as::<_, SubCategory>(
            "SELECT * FROM subcategories WHERE category_id = $1 AND LOWER(name) = LOWER($2)",
        )
        .bind(category_id)
        .bind(name.trim())
        .fetch_optional(&mut *conn)
        .await?;
        Ok(row)
    }

    /// Create sub-category
    pub async fn create_subcategory(&self, category_id: i32, data: &CreateSubCategory) -> AppResult<SubCategory> {
        let row = sqlx::query_as::<_, SubCategory>(
            r#"
            INSERT INTO subcategories (name, description, category_id)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(data.name.trim())
        .bind(&data.description)
        .bind(category_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Delete sub-category
    pub async fn delete_subcategory(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM subcategories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Sub-category {} not found", id)));
        }
        Ok(())
    }
}
