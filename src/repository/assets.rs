//! Assets repository

use chrono::{NaiveDate, Utc};
use sqlx::{PgConnection, Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        asset::{Asset, AssetQuery, CreateAsset, UpdateAsset},
        enums::AssetStatus,
        import_report::AssetExportRow,
    },
};

#[derive(Clone)]
pub struct AssetsRepository {
    pool: Pool<Postgres>,
}

impl AssetsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List assets with optional filters and pagination, newest first
    pub async fn list(&self, query: &AssetQuery, status: Option<AssetStatus>) -> AppResult<(Vec<Asset>, i64)> {
        let per_page = query.per_page();
        let offset = query.offset();

        let search = query
            .q
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(|q| format!("%{}%", q));

        let mut conditions = Vec::new();
        let mut idx = 1;

        if status.is_some() {
            conditions.push(format!("status = ${}", idx));
            idx += 1;
        }
        if query.location_id.is_some() {
            conditions.push(format!("location_id = ${}", idx));
            idx += 1;
        }
        if search.is_some() {
            conditions.push(format!(
                "(name ILIKE ${0} OR asset_tag ILIKE ${0} OR serial_number ILIKE ${0})",
                idx
            ));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        // Count total
        let count_q = format!("SELECT COUNT(*) FROM assets {}", where_clause);
        let mut count_builder = sqlx::query_scalar::<_, i64>(&count_q);
        if let Some(s) = status { count_builder = count_builder.bind(s); }
        if let Some(l) = query.location_id { count_builder = count_builder.bind(l); }
        if let Some(ref q) = search { count_builder = count_builder.bind(q); }
        let total = count_builder.fetch_one(&self.pool).await?;

        // Fetch rows
        let select_q = format!(
            "SELECT * FROM assets {} ORDER BY id DESC LIMIT {} OFFSET {}",
            where_clause, per_page, offset
        );
        let mut builder = sqlx::query_as::<_, Asset>(&select_q);
        if let Some(s) = status { builder = builder.bind(s); }
        if let Some(l) = query.location_id { builder = builder.bind(l); }
        if let Some(ref q) = search { builder = builder.bind(q); }

        let rows = builder.fetch_all(&self.pool).await?;
        Ok((rows, total))
    }

    /// Get asset by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Asset> {
        sqlx::query_as::<_, Asset>("SELECT * FROM assets WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Asset {} not found", id)))
    }

    /// Get asset by ID and hold its row lock until the transaction ends
    pub async fn get_for_update(&self, conn: &mut PgConnection, id: i32) -> AppResult<Asset> {
        sqlx::query_as::<_, Asset>("SELECT * FROM assets WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Asset {} not found", id)))
    }

    /// Whether a tag is already used (case-insensitive)
    pub async fn tag_exists(&self, conn: &mut PgConnection, tag: &str) -> AppResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM assets WHERE UPPER(asset_tag) = UPPER($1))")
                .bind(tag)
                .fetch_one(&mut *conn)
                .await?;
        Ok(exists)
    }

    /// Insert an asset with an already minted tag
    pub async fn insert(
        &self,
        conn: &mut PgConnection,
        asset_tag: &str,
        status: AssetStatus,
        data: &CreateAsset,
    ) -> AppResult<Asset> {
        let row = sqlx::query_as::<_, Asset>(
            r#"
            INSERT INTO assets (
                asset_tag, name, description, serial_number, status,
                purchase_date, warranty_expiry_date, cost,
                category_id, subcategory_id, location_id, vendor_id, notes
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING *
            "#,
        )
        .bind(asset_tag)
        .bind(data.name.trim())
        .bind(&data.description)
        .bind(&data.serial_number)
        .bind(status)
        .bind(data.purchase_date)
        .bind(data.warranty_expiry_date)
        .bind(data.cost)
        .bind(data.category_id)
        .bind(data.subcategory_id)
        .bind(data.location_id)
        .bind(data.vendor_id)
        .bind(&data.notes)
        .fetch_one(&mut *conn)
        .await?;
        Ok(row)
    }

    /// Update descriptive fields; `clear_subcategory` sets the sub-category to NULL
    pub async fn update(&self, id: i32, data: &UpdateAsset, clear_subcategory: bool) -> AppResult<Asset> {
        let now = Utc::now();
        let mut sets = vec!["updated_at = $1".to_string()];
        let mut idx = 2;

        if clear_subcategory {
            sets.push("subcategory_id = NULL".to_string());
        }

        macro_rules! add_field {
            ($field:expr, $name:expr) => {
                if $field.is_some() {
                    sets.push(format!("{} = ${}", $name, idx));
                    idx += 1;
                }
            };
        }

        add_field!(data.name, "name");
        add_field!(data.description, "description");
        add_field!(data.serial_number, "serial_number");
        add_field!(data.category_id, "category_id");
        add_field!(data.subcategory_id, "subcategory_id");
        add_field!(data.vendor_id, "vendor_id");
        add_field!(data.purchase_date, "purchase_date");
        add_field!(data.warranty_expiry_date, "warranty_expiry_date");
        add_field!(data.cost, "cost");
        add_field!(data.notes, "notes");

        let query = format!("UPDATE assets SET {} WHERE id = ${} RETURNING *", sets.join(", "), idx);

        let mut builder = sqlx::query_as::<_, Asset>(&query).bind(now);

        macro_rules! bind_field {
            ($field:expr) => {
                if let Some(ref val) = $field {
                    builder = builder.bind(val);
                }
            };
        }

        bind_field!(data.name);
        bind_field!(data.description);
        bind_field!(data.serial_number);
        bind_field!(data.category_id);
        bind_field!(data.subcategory_id);
        bind_field!(data.vendor_id);
        bind_field!(data.purchase_date);
        bind_field!(data.warranty_expiry_date);
        bind_field!(data.cost);
        bind_field!(data.notes);

        builder
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Asset {} not found", id)))
    }

    /// Persist the lifecycle-owned columns of an asset
    pub async fn save_lifecycle(&self, conn: &mut PgConnection, asset: &Asset) -> AppResult<Asset> {
        let row = sqlx::query_as::<_, Asset>(
            r#"
            UPDATE assets SET
                status = $2,
                location_id = $3,
                assigned_to = $4,
                assigned_department = $5,
                assigned_email = $6,
                assigned_at = $7,
                repair_opened_at = $8,
                repair_vendor = $9,
                repair_vendor_phone = $10,
                repair_vendor_address = $11,
                repair_reference = $12,
                repair_notes = $13,
                repair_closed_at = $14,
                repair_cost = $15,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(asset.id)
        .bind(asset.status)
        .bind(asset.location_id)
        .bind(&asset.assigned_to)
        .bind(&asset.assigned_department)
        .bind(&asset.assigned_email)
        .bind(asset.assigned_at)
        .bind(asset.repair_opened_at)
        .bind(&asset.repair_vendor)
        .bind(&asset.repair_vendor_phone)
        .bind(&asset.repair_vendor_address)
        .bind(&asset.repair_reference)
        .bind(&asset.repair_notes)
        .bind(asset.repair_closed_at)
        .bind(asset.repair_cost)
        .fetch_one(&mut *conn)
        .await?;
        Ok(row)
    }

    /// Delete an asset; its events go with it
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM assets WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Asset {} not found", id)));
        }
        Ok(())
    }

    /// Asset count per stored status
    pub async fn count_by_status(&self) -> AppResult<Vec<(AssetStatus, i64)>> {
        let rows = sqlx::query_as::<_, (AssetStatus, i64)>(
            "SELECT status, COUNT(*) FROM assets GROUP BY status",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Assets needing attention: open problems, warranties ending on or
    /// before `warranty_before` (disposed excluded), or missing location or
    /// category. Soonest warranty end first, then newest.
    pub async fn needing_attention(&self, warranty_before: NaiveDate, limit: i64) -> AppResult<Vec<Asset>> {
        let rows = sqlx::query_as::<_, Asset>(
            r#"
            SELECT * FROM assets
            WHERE (warranty_expiry_date IS NOT NULL
                   AND warranty_expiry_date <= $1
                   AND status NOT IN ('disposed', 'retired'))
               OR status IN ('repair', 'under_repair', 'damaged', 'missing')
               OR location_id IS NULL
               OR category_id IS NULL
            ORDER BY warranty_expiry_date ASC NULLS LAST, id DESC
            LIMIT $2
            "#,
        )
        .bind(warranty_before)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// All assets with the codes and names used by the CSV export
    pub async fn list_for_export(&self) -> AppResult<Vec<AssetExportRow>> {
        let rows = sqlx::query_as::<_, AssetExportRow>(
            r#"
            SELECT a.asset_tag, a.name, a.status,
                   c.code AS category_code,
                   sc.name AS subcategory_name,
                   l.code AS location_code,
                   v.name AS vendor_name,
                   a.serial_number, a.purchase_date, a.warranty_expiry_date,
                   a.cost, a.description, a.notes
            FROM assets a
            LEFT JOIN categories c ON a.category_id = c.id
            LEFT JOIN subcategories sc ON a.subcategory_id = sc.id
            LEFT JOIN locations l ON a.location_id = l.id
            LEFT JOIN vendors v ON a.vendor_id = v.id
            ORDER BY a.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
