//! Asset tag issuance

use sqlx::PgConnection;

use crate::{
    error::AppResult,
    inventory::tag::AssetTag,
    models::{category::Category, location::Location, tag_sequence::AssetTagSequence},
    repository::Repository,
};

/// Mints `{COMPANY}-{OFFICE}-{CATEGORY}-{YEAR}-{SEQ}` tags from the
/// per-office, per-year counters.
#[derive(Clone)]
pub struct TagSequencer {
    repository: Repository,
    company_code: String,
}

impl TagSequencer {
    pub fn new(repository: Repository, company_code: impl Into<String>) -> Self {
        Self {
            repository,
            company_code: company_code.into().trim().to_uppercase(),
        }
    }

    pub fn company_code(&self) -> &str {
        &self.company_code
    }

    /// Issue the next tag for an asset at `location` in `category`.
    ///
    /// Runs in the caller's transaction; the number is only consumed if that
    /// transaction commits.
    pub async fn next_tag(
        &self,
        conn: &mut PgConnection,
        location: &Location,
        category: &Category,
        year: i32,
    ) -> AppResult<AssetTag> {
        // Codes are checked before the counter row is touched
        let draft = AssetTag::new(
            &self.company_code,
            location.code.as_deref(),
            category.code.as_deref(),
            year,
            0,
        )?;

        let seq = self
            .repository
            .sequences
            .next_seq(conn, &self.company_code, &draft.scope())
            .await?;

        let tag = AssetTag { seq, ..draft };
        tracing::info!(tag = %tag, location_id = location.id, category_id = category.id, "Issued asset tag");
        Ok(tag)
    }

    /// Record a tag that entered the system without being minted so its
    /// number is never issued again. Tags of another company are ignored.
    pub async fn reserve(&self, conn: &mut PgConnection, tag: &AssetTag) -> AppResult<()> {
        if !tag.company.eq_ignore_ascii_case(&self.company_code) {
            return Ok(());
        }
        self.repository.sequences.raise_to(conn, &tag.scope(), tag.seq).await
    }

    /// Current counters
    pub async fn counters(&self) -> AppResult<Vec<AssetTagSequence>> {
        self.repository.sequences.list().await
    }
}
