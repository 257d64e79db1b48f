//! Asset event log. Rows are only ever inserted.

use sqlx::{PgConnection, Pool, Postgres};

use crate::{
    error::AppResult,
    inventory::lifecycle::EventRecord,
    models::asset_event::AssetEvent,
};

#[derive(Clone)]
pub struct AssetEventsRepository {
    pool: Pool<Postgres>,
}

impl AssetEventsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Append an event in the caller's transaction
    pub async fn insert(
        &self,
        conn: &mut PgConnection,
        asset_id: i32,
        record: &EventRecord,
        performed_by: Option<i32>,
    ) -> AppResult<AssetEvent> {
        let row = sqlx::query_as::<_, AssetEvent>(
            r#"
            INSERT INTO asset_events (
                asset_id, event_type, note, from_status, to_status,
                from_location_id, to_location_id, performed_by_id
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(asset_id)
        .bind(record.event_type)
        .bind(&record.note)
        .bind(record.from_status)
        .bind(record.to_status)
        .bind(record.from_location_id)
        .bind(record.to_location_id)
        .bind(performed_by)
        .fetch_one(&mut *conn)
        .await?;
        Ok(row)
    }

    /// History of an asset, newest first
    pub async fn list_for_asset(&self, asset_id: i32) -> AppResult<Vec<AssetEvent>> {
        let rows = sqlx::query_as::<_, AssetEvent>(
            "SELECT * FROM asset_events WHERE asset_id = $1 ORDER BY created_at DESC, id DESC",
        )
        .bind(asset_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
