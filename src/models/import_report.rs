//! CSV import/export types

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::enums::AssetStatus;

/// Column order of the asset CSV export; also the accepted import headers
pub const EXPORT_HEADERS: [&str; 13] = [
    "asset_tag",
    "name",
    "status",
    "category_code",
    "subcategory_name",
    "location_code",
    "vendor_name",
    "serial_number",
    "purchase_date",
    "warranty_expiry_date",
    "cost",
    "description",
    "notes",
];

/// Headers an import file must carry
pub const REQUIRED_IMPORT_HEADERS: [&str; 4] = ["name", "status", "category_code", "location_code"];

/// Summary of a committed import
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ImportReport {
    /// Number of assets created
    pub imported: usize,
    /// Tags minted for rows that had none
    pub minted_tags: Vec<String>,
    /// Tags taken as given from the file
    pub kept_tags: Vec<String>,
}

/// Asset joined with the codes and names used in CSV files
#[derive(Debug, Clone, FromRow)]
pub struct AssetExportRow {
    pub asset_tag: String,
    pub name: String,
    pub status: AssetStatus,
    pub category_code: Option<String>,
    pub subcategory_name: Option<String>,
    pub location_code: Option<String>,
    pub vendor_name: Option<String>,
    pub serial_number: Option<String>,
    pub purchase_date: Option<NaiveDate>,
    pub warranty_expiry_date: Option<NaiveDate>,
    pub cost: Option<Decimal>,
    pub description: Option<String>,
    pub notes: Option<String>,
}
