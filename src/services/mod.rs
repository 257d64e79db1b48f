//! Business logic services

pub mod assets;
pub mod auth;
pub mod catalog;
pub mod settings;
pub mod tags;
pub mod transfer;

use crate::{config::AppConfig, error::AppResult, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub auth: auth::AuthService,
    pub assets: assets::AssetsService,
    pub catalog: catalog::CatalogService,
    pub tags: tags::TagSequencer,
    pub transfer: transfer::TransferService,
    pub settings: settings::SettingsService,
    repository: Repository,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, config: &AppConfig) -> Self {
        let tags = tags::TagSequencer::new(repository.clone(), config.tags.company_code.clone());
        Self {
            auth: auth::AuthService::new(repository.clone(), config.auth.clone()),
            assets: assets::AssetsService::new(repository.clone(), tags.clone()),
            catalog: catalog::CatalogService::new(repository.clone()),
            transfer: transfer::TransferService::new(repository.clone(), tags.clone()),
            settings: settings::SettingsService::new(repository.clone(), tags.company_code().to_string()),
            tags,
            repository,
        }
    }

    /// Check database connectivity
    pub async fn ping(&self) -> AppResult<()> {
        self.repository.ping().await
    }
}
