//! Application settings exposed over the API

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

pub const APP_NAME_KEY: &str = "app_name";
pub const SUPPORT_EMAIL_KEY: &str = "support_email";
pub const DEFAULT_APP_NAME: &str = "IT Inventory";

#[derive(Debug, Serialize, ToSchema)]
pub struct SettingsResponse {
    pub app_name: String,
    pub support_email: Option<String>,
    /// Company segment of minted asset tags (read-only, from configuration)
    pub company_code: String,
    /// Column order of the CSV export
    pub export_headers: Vec<String>,
}

/// Update settings request; omitted fields are left unchanged and an empty
/// support email clears it
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateSettings {
    #[validate(length(min = 1, max = 100))]
    pub app_name: Option<String>,
    pub support_email: Option<String>,
}
