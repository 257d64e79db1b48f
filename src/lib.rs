//! IT asset inventory server
//!
//! REST JSON API for tracking IT assets: generated asset tags, a lifecycle
//! state machine with an append-only event log, reference data, users and
//! CSV import/export.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod inventory;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
