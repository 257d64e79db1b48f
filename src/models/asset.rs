//! Asset model and lifecycle request types

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::asset_event::AssetEvent;
use super::enums::AssetStatus;
use crate::inventory::lifecycle::{AssetState, Effect};

/// Asset record
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Asset {
    pub id: i32,
    /// Immutable tag, e.g. ESS-M-COMP-2025-0001
    pub asset_tag: String,
    pub name: String,
    pub description: Option<String>,
    pub serial_number: Option<String>,
    pub status: AssetStatus,
    pub purchase_date: Option<NaiveDate>,
    pub warranty_expiry_date: Option<NaiveDate>,
    pub cost: Option<Decimal>,
    pub category_id: Option<i32>,
    pub subcategory_id: Option<i32>,
    pub location_id: Option<i32>,
    pub vendor_id: Option<i32>,
    pub notes: Option<String>,
    // Assignment, set only while assigned
    pub assigned_to: Option<String>,
    pub assigned_department: Option<String>,
    pub assigned_email: Option<String>,
    pub assigned_at: Option<NaiveDate>,
    // Latest repair cycle
    pub repair_opened_at: Option<NaiveDate>,
    pub repair_vendor: Option<String>,
    pub repair_vendor_phone: Option<String>,
    pub repair_vendor_address: Option<String>,
    pub repair_reference: Option<String>,
    pub repair_notes: Option<String>,
    pub repair_closed_at: Option<NaiveDate>,
    pub repair_cost: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Asset {
    pub fn lifecycle_state(&self) -> AssetState {
        AssetState {
            status: self.status,
            location_id: self.location_id,
            assigned_to: self.assigned_to.clone(),
            assigned_at: self.assigned_at,
        }
    }

    /// Apply the field changes of a planned transition in memory
    pub fn apply_effects(&mut self, effects: &[Effect]) {
        for effect in effects {
            match effect {
                Effect::SetStatus(status) => self.status = *status,
                Effect::SetLocation(location_id) => self.location_id = Some(*location_id),
                Effect::Assign { to, at } => {
                    self.assigned_to = Some(to.name.clone());
                    self.assigned_department = to.department.clone();
                    self.assigned_email = to.email.clone();
                    self.assigned_at = Some(*at);
                }
                Effect::ClearAssignment => {
                    self.assigned_to = None;
                    self.assigned_department = None;
                    self.assigned_email = None;
                    self.assigned_at = None;
                }
                Effect::OpenRepair { opened_at, ticket } => {
                    self.repair_opened_at = Some(*opened_at);
                    self.repair_vendor = ticket.vendor.clone();
                    self.repair_vendor_phone = ticket.vendor_phone.clone();
                    self.repair_vendor_address = ticket.vendor_address.clone();
                    self.repair_reference = ticket.reference.clone();
                    self.repair_notes = ticket.notes.clone();
                    self.repair_closed_at = None;
                    self.repair_cost = None;
                }
                Effect::CloseRepair {
                    closed_at,
                    cost,
                    notes,
                } => {
                    self.repair_closed_at = Some(*closed_at);
                    if cost.is_some() {
                        self.repair_cost = *cost;
                    }
                    if notes.is_some() {
                        self.repair_notes = notes.clone();
                    }
                }
            }
        }
    }
}

/// Create asset request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateAsset {
    #[validate(length(min = 1, max = 150, message = "Name must be 1 to 150 characters"))]
    pub name: String,
    pub description: Option<String>,
    #[validate(length(max = 150))]
    pub serial_number: Option<String>,
    /// Initial status (default in_stock)
    pub status: Option<AssetStatus>,
    /// Location whose code becomes the office segment of the tag
    pub location_id: i32,
    /// Category whose code becomes the category segment of the tag
    pub category_id: i32,
    pub subcategory_id: Option<i32>,
    pub vendor_id: Option<i32>,
    pub purchase_date: Option<NaiveDate>,
    pub warranty_expiry_date: Option<NaiveDate>,
    pub cost: Option<Decimal>,
    pub notes: Option<String>,
}

/// Update asset request (descriptive fields only; tag, status and
/// location change through lifecycle actions)
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateAsset {
    #[validate(length(min = 1, max = 150))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(length(max = 150))]
    pub serial_number: Option<String>,
    pub category_id: Option<i32>,
    pub subcategory_id: Option<i32>,
    pub vendor_id: Option<i32>,
    pub purchase_date: Option<NaiveDate>,
    pub warranty_expiry_date: Option<NaiveDate>,
    pub cost: Option<Decimal>,
    pub notes: Option<String>,
    /// Not editable; relocations go through the move action
    pub location_id: Option<i32>,
}

/// Query parameters for asset listing
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct AssetQuery {
    /// Filter by status (legacy names such as in_use are accepted)
    pub status: Option<String>,
    pub location_id: Option<i32>,
    /// Case-insensitive search over name, tag and serial number
    pub q: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// Largest page size a listing returns
pub const MAX_PER_PAGE: i64 = 500;

impl AssetQuery {
    /// Requested page, 1-based; bounded so the row offset fits in an `i64`
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).clamp(1, i64::MAX / MAX_PER_PAGE)
    }

    pub fn per_page(&self) -> i64 {
        self.per_page.unwrap_or(50).clamp(1, MAX_PER_PAGE)
    }

    pub fn offset(&self) -> i64 {
        (self.page() - 1) * self.per_page()
    }
}

/// Assign request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AssignAsset {
    pub assigned_to: String,
    pub assigned_department: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub assigned_email: Option<String>,
}

/// Start repair request
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct StartRepair {
    /// Reuse the asset's own vendor as repair vendor
    #[serde(default)]
    pub use_asset_vendor: bool,
    /// Vendor name; matched case-insensitively, created when unknown
    pub repair_vendor: Option<String>,
    pub repair_vendor_phone: Option<String>,
    pub repair_vendor_address: Option<String>,
    pub repair_reference: Option<String>,
    pub repair_notes: Option<String>,
}

/// Complete repair request
#[derive(Debug, Deserialize, ToSchema)]
pub struct CompleteRepair {
    /// "disposed" or "back_to_stock"; anything else returns the asset to stock
    pub outcome: Option<String>,
    /// Decimal amount as typed by the user
    pub repair_cost: Option<String>,
    pub repair_notes: Option<String>,
}

/// Move request
#[derive(Debug, Deserialize, ToSchema)]
pub struct MoveAsset {
    pub new_location_id: i32,
    pub reason: Option<String>,
    pub reference: Option<String>,
}

/// Outcome of a lifecycle action
#[derive(Debug, Serialize, ToSchema)]
pub struct TransitionResponse {
    /// False when the asset was already in the requested state
    pub changed: bool,
    pub message: String,
    pub asset: Asset,
    /// The audit entry written by this action
    pub event: Option<AssetEvent>,
}

/// Page of assets
#[derive(Debug, Serialize, ToSchema)]
pub struct AssetPage {
    pub items: Vec<Asset>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_defaults() {
        let query = AssetQuery::default();
        assert_eq!(query.page(), 1);
        assert_eq!(query.per_page(), 50);
        assert_eq!(query.offset(), 0);
    }

    #[test]
    fn test_huge_page_does_not_overflow() {
        let query = AssetQuery {
            page: Some(i64::MAX),
            per_page: Some(i64::MAX),
            ..Default::default()
        };
        assert_eq!(query.per_page(), MAX_PER_PAGE);
        assert!(query.offset() >= 0);

        let query = AssetQuery {
            page: Some(-3),
            per_page: Some(0),
            ..Default::default()
        };
        assert_eq!(query.page(), 1);
        assert_eq!(query.per_page(), 1);
    }
}
