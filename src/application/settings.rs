use std::sync::{Arc, RwLock};
use tracing::{debug, info, warn};

use crate::domain::{DomainError, SettingsUpdate, SiteSettings};
use crate::ports::SettingsRepository;

/// Holds the site settings document and persists every accepted change.
pub struct SettingsStore {
    repository: Arc<dyn SettingsRepository>,
    settings: RwLock<SiteSettings>,
}

impl SettingsStore {
    pub fn new(repository: Arc<dyn SettingsRepository>) -> Self {
        Self {
            repository,
            settings: RwLock::new(SiteSettings::default()),
        }
    }

    pub fn current(&self) -> SiteSettings {
        self.settings
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Loads the saved document, merged over the defaults.
    pub async fn load(&self) -> Result<SiteSettings, DomainError> {
        let loaded = match self.repository.load().await {
            Ok(Some(saved)) => saved,
            Ok(None) => {
                debug!("No saved settings, using defaults");
                SiteSettings::default()
            }
            Err(e) => {
                warn!(error = %e, "Failed to load settings");
                return Err(e);
            }
        };
        *self.settings.write().unwrap_or_else(|e| e.into_inner()) = loaded.clone();
        Ok(loaded)
    }

    /// Validates and applies one section update, then saves the document.
    /// Nothing changes in memory if validation or saving fails.
    pub async fn update(&self, update: SettingsUpdate) -> Result<SiteSettings, DomainError> {
        let mut next = self.current();
        next.apply(&update)?;
        self.repository.save(&next).await?;

        *self.settings.write().unwrap_or_else(|e| e.into_inner()) = next.clone();
        info!(section = update.section(), "Settings updated");
        Ok(next)
    }
}
