//! Settings service

use validator::{Validate, ValidateEmail};

use crate::{
    error::{AppError, AppResult},
    models::{
        import_report::EXPORT_HEADERS,
        setting::{SettingsResponse, UpdateSettings, APP_NAME_KEY, DEFAULT_APP_NAME, SUPPORT_EMAIL_KEY},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct SettingsService {
    repository: Repository,
    company_code: String,
}

impl SettingsService {
    pub fn new(repository: Repository, company_code: String) -> Self {
        Self {
            repository,
            company_code,
        }
    }

    /// Get current settings
    pub async fn get_settings(&self) -> AppResult<SettingsResponse> {
        let app_name = self
            .repository
            .settings
            .get(APP_NAME_KEY)
            .await?
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_APP_NAME.to_string());
        let support_email = self.repository.settings.get(SUPPORT_EMAIL_KEY).await?;

        Ok(SettingsResponse {
            app_name,
            support_email,
            company_code: self.company_code.clone(),
            export_headers: EXPORT_HEADERS.iter().map(|h| h.to_string()).collect(),
        })
    }

    /// Update settings
    pub async fn update_settings(&self, request: UpdateSettings) -> AppResult<SettingsResponse> {
        request.validate()?;
        let email = request.support_email.as_deref().map(str::trim);
        if let Some(email) = email.filter(|e| !e.is_empty()) {
            if !email.validate_email() {
                return Err(AppError::Validation("Invalid support email".to_string()));
            }
        }

        if let Some(app_name) = request.app_name.as_deref() {
            self.repository.settings.set(APP_NAME_KEY, Some(app_name.trim())).await?;
        }
        if let Some(email) = email {
            let value = Some(email).filter(|e| !e.is_empty());
            self.repository.settings.set(SUPPORT_EMAIL_KEY, value).await?;
        }

        tracing::info!("Settings updated");
        self.get_settings().await
    }
}
