//! Per-office, per-year tag counter

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

/// Counter row; `last_seq` is the highest sequence number issued so far
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct AssetTagSequence {
    pub id: i32,
    pub office_code: String,
    pub year: i32,
    pub last_seq: i32,
    /// Set once the counter has been reconciled against existing tags
    pub verified_at: Option<DateTime<Utc>>,
}
