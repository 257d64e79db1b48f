//! Asset tag counters.
//!
//! A counter is only ever advanced through [`SequencesRepository::next_seq`]
//! or raised through [`SequencesRepository::raise_to`], both of which hold a
//! row lock on the (office, year) row until the caller's transaction ends.

use sqlx::{PgConnection, Pool, Postgres};

use crate::{
    error::AppResult,
    inventory::tag::{max_seq_in, scope_like_pattern, TagScope},
    models::tag_sequence::AssetTagSequence,
};

#[derive(Clone)]
pub struct SequencesRepository {
    pool: Pool<Postgres>,
}

impl SequencesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List all counters
    pub async fn list(&self) -> AppResult<Vec<AssetTagSequence>> {
        let rows = sqlx::query_as::<_, AssetTagSequence>(
            "SELECT * FROM asset_tag_sequences ORDER BY year DESC, office_code",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Lock the counter row, creating it at zero when missing
    async fn lock(&self, conn: &mut PgConnection, scope: &TagScope) -> AppResult<AssetTagSequence> {
        sqlx::query(
            r#"
            INSERT INTO asset_tag_sequences (office_code, year, last_seq)
            VALUES ($1, $2, 0)
            ON CONFLICT (office_code, year) DO NOTHING
            "#,
        )
        .bind(&scope.office_code)
        .bind(scope.year)
        .execute(&mut *conn)
        .await?;

        let row = sqlx::query_as::<_, AssetTagSequence>(
            "SELECT * FROM asset_tag_sequences WHERE office_code = $1 AND year = $2 FOR UPDATE",
        )
        .bind(&scope.office_code)
        .bind(scope.year)
        .fetch_one(&mut *conn)
        .await?;
        Ok(row)
    }

    /// One-time reconciliation with tags already stored in `assets`.
    /// Returns the value the counter must be at least.
    async fn backfill_floor(
        &self,
        conn: &mut PgConnection,
        company: &str,
        scope: &TagScope,
    ) -> AppResult<i32> {
        let tags: Vec<String> =
            sqlx::query_scalar("SELECT asset_tag FROM assets WHERE asset_tag ILIKE $1")
                .bind(scope_like_pattern(company, scope))
                .fetch_all(&mut *conn)
                .await?;
        Ok(max_seq_in(tags.iter().map(String::as_str), company, scope))
    }

    /// Issue the next sequence number for `scope`.
    ///
    /// Must run inside a transaction: the number only counts as issued once
    /// that transaction commits.
    pub async fn next_seq(
        &self,
        conn: &mut PgConnection,
        company: &str,
        scope: &TagScope,
    ) -> AppResult<i32> {
        let row = self.lock(conn, scope).await?;
        let mut current = row.last_seq;

        if row.verified_at.is_none() {
            let observed = self.backfill_floor(conn, company, scope).await?;
            if observed > current {
                tracing::warn!(
                    office = %scope.office_code,
                    year = scope.year,
                    stored = current,
                    observed,
                    "Tag counter behind existing tags, raising it"
                );
                current = observed;
            }
        }

        let next = current + 1;
        sqlx::query(
            r#"
            UPDATE asset_tag_sequences
            SET last_seq = $1, verified_at = COALESCE(verified_at, NOW())
            WHERE id = $2
            "#,
        )
        .bind(next)
        .bind(row.id)
        .execute(&mut *conn)
        .await?;

        Ok(next)
    }

    /// Make sure the counter never issues `seq` or anything below it again.
    /// Used when a tag enters the system without being minted (CSV import).
    pub async fn raise_to(&self, conn: &mut PgConnection, scope: &TagScope, seq: i32) -> AppResult<()> {
        let row = self.lock(conn, scope).await?;
        if seq > row.last_seq {
            sqlx::query("UPDATE asset_tag_sequences SET last_seq = $1 WHERE id = $2")
                .bind(seq)
                .bind(row.id)
                .execute(&mut *conn)
                .await?;
        }
        Ok(())
    }
}
