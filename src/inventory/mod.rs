//! Inventory domain rules that do not touch the database:
//! asset tag formatting/parsing and the lifecycle state machine.

pub mod lifecycle;
pub mod tag;

pub use lifecycle::{Action, AssetState, Plan, Transition};
pub use tag::{AssetTag, TagScope};
