//! Vendor model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Vendor {
    pub id: i32,
    pub name: String,
    pub code: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub website: Option<String>,
    pub address: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create vendor request
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct CreateVendor {
    #[validate(length(min = 1, max = 150))]
    pub name: String,
    #[validate(length(max = 20))]
    pub code: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub contact_email: Option<String>,
    #[validate(length(max = 50))]
    pub contact_phone: Option<String>,
    #[validate(length(max = 200))]
    pub website: Option<String>,
    pub address: Option<String>,
}

/// Update vendor request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateVendor {
    #[validate(length(min = 1, max = 150))]
    pub name: Option<String>,
    #[validate(length(max = 20))]
    pub code: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub contact_email: Option<String>,
    #[validate(length(max = 50))]
    pub contact_phone: Option<String>,
    #[validate(length(max = 200))]
    pub website: Option<String>,
    pub address: Option<String>,
    pub is_active: Option<bool>,
}
