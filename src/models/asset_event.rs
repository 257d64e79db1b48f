//! Asset audit trail entries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::enums::{AssetEventType, AssetStatus};

/// One immutable lifecycle event of an asset
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct AssetEvent {
    pub id: i32,
    pub asset_id: i32,
    pub event_type: AssetEventType,
    pub note: Option<String>,
    pub from_status: Option<AssetStatus>,
    pub to_status: Option<AssetStatus>,
    pub from_location_id: Option<i32>,
    pub to_location_id: Option<i32>,
    /// User who performed the action, if known
    pub performed_by_id: Option<i32>,
    pub created_at: DateTime<Utc>,
}
