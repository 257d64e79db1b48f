//! Dashboard summary

use chrono::NaiveDate;
use serde::Serialize;
use utoipa::ToSchema;

use super::{asset::Asset, enums::AssetStatus};

/// Days ahead of today within which a warranty end needs attention
pub const WARRANTY_WARNING_DAYS: i64 = 30;

/// Maximum number of assets listed as needing attention
pub const ATTENTION_LIMIT: i64 = 10;

/// Asset counts per status
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct StatusCounts {
    pub total: i64,
    pub in_stock: i64,
    pub assigned: i64,
    pub repair: i64,
    pub damaged: i64,
    pub missing: i64,
    pub disposed: i64,
}

impl StatusCounts {
    /// Fold `(status, count)` rows; legacy spellings arrive already mapped
    pub fn from_rows<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = (AssetStatus, i64)>,
    {
        let mut counts = Self::default();
        for (status, n) in rows {
            counts.total += n;
            let slot = match status {
                AssetStatus::InStock => &mut counts.in_stock,
                AssetStatus::Assigned => &mut counts.assigned,
                AssetStatus::Repair => &mut counts.repair,
                AssetStatus::Damaged => &mut counts.damaged,
                AssetStatus::Missing => &mut counts.missing,
                AssetStatus::Disposed => &mut counts.disposed,
            };
            *slot += n;
        }
        counts
    }
}

/// Dashboard response
#[derive(Debug, Serialize, ToSchema)]
pub struct Dashboard {
    pub counts: StatusCounts,
    /// Warranties ending on or before this date are flagged
    pub warranty_warning_date: NaiveDate,
    /// Assets in repair, damaged or missing, with a warranty ending soon,
    /// or without location or category. Soonest warranty end first.
    pub attention: Vec<Asset>,
}
