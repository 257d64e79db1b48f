//! Data models for the inventory server

pub mod asset;
pub mod asset_event;
pub mod category;
pub mod dashboard;
pub mod enums;
pub mod import_report;
pub mod location;
pub mod setting;
pub mod tag_sequence;
pub mod user;
pub mod vendor;

// Re-export commonly used types
pub use asset::Asset;
pub use asset_event::AssetEvent;
pub use category::{Category, SubCategory};
pub use enums::{AssetEventType, AssetStatus, RepairOutcome};
pub use location::Location;
pub use user::{User, UserClaims};
pub use vendor::Vendor;
