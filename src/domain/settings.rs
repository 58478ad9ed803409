//! Site-wide settings document.
//!
//! Unlike the REST collections this is a single document edited in sections.
//! Every section deserializes with `#[serde(default)]`, so a stored document
//! that predates a field is merged over the defaults rather than rejected.

use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WebsiteMetadata {
    pub title: String,
    pub description: String,
    pub keywords: String,
    pub twitter_handle: String,
    pub analytics_id: String,
    pub maps_api_key: String,
}

impl Default for WebsiteMetadata {
    fn default() -> Self {
        Self {
            title: "PNE Pizza - Quality Pizza & Community Service".to_string(),
            description: "Your local pizza restaurant committed to serving the community with quality food and exceptional service.".to_string(),
            keywords: "pizza, community service, love kitchen, restaurant, local business".to_string(),
            twitter_handle: "@PNEPizza".to_string(),
            analytics_id: String::new(),
            maps_api_key: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SecuritySettings {
    pub two_factor_auth: bool,
    /// Minutes.
    pub session_timeout: u32,
    /// Days.
    pub password_expiration: u32,
}

impl Default for SecuritySettings {
    fn default() -> Self {
        Self {
            two_factor_auth: false,
            session_timeout: 30,
            password_expiration: 90,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackupFrequency {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BackupSettings {
    pub auto_backup: bool,
    pub backup_frequency: BackupFrequency,
    /// Days.
    pub retention_period: u32,
}

impl Default for BackupSettings {
    fn default() -> Self {
        Self {
            auto_backup: true,
            backup_frequency: BackupFrequency::Daily,
            retention_period: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContentSettings {
    pub enable_comments: bool,
    pub moderate_comments: bool,
    /// Megabytes.
    pub max_upload_size: u32,
}

impl Default for ContentSettings {
    fn default() -> Self {
        Self {
            enable_comments: true,
            moderate_comments: true,
            max_upload_size: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PaymentSettings {
    pub currency: String,
    /// Percent.
    pub tax_rate: f64,
    pub minimum_order: f64,
}

impl Default for PaymentSettings {
    fn default() -> Self {
        Self {
            currency: "USD".to_string(),
            tax_rate: 8.5,
            minimum_order: 10.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteSettings {
    pub metadata: WebsiteMetadata,
    pub security: SecuritySettings,
    pub backup: BackupSettings,
    pub content: ContentSettings,
    pub payment: PaymentSettings,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetadataChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub keywords: Option<String>,
    pub twitter_handle: Option<String>,
    pub analytics_id: Option<String>,
    pub maps_api_key: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SecurityChanges {
    pub two_factor_auth: Option<bool>,
    pub session_timeout: Option<u32>,
    pub password_expiration: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BackupChanges {
    pub auto_backup: Option<bool>,
    pub backup_frequency: Option<BackupFrequency>,
    pub retention_period: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentChanges {
    pub enable_comments: Option<bool>,
    pub moderate_comments: Option<bool>,
    pub max_upload_size: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaymentChanges {
    pub currency: Option<String>,
    pub tax_rate: Option<f64>,
    pub minimum_order: Option<f64>,
}

/// A partial update to one settings section.
#[derive(Debug, Clone, PartialEq)]
pub enum SettingsUpdate {
    Metadata(MetadataChanges),
    Security(SecurityChanges),
    Backup(BackupChanges),
    Content(ContentChanges),
    Payment(PaymentChanges),
}

impl SettingsUpdate {
    pub fn section(&self) -> &'static str {
        match self {
            SettingsUpdate::Metadata(_) => "metadata",
            SettingsUpdate::Security(_) => "security",
            SettingsUpdate::Backup(_) => "backup",
            SettingsUpdate::Content(_) => "content",
            SettingsUpdate::Payment(_) => "payment",
        }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        match self {
            SettingsUpdate::Metadata(c) => {
                if c.title.as_ref().is_some_and(|t| t.chars().count() > 60) {
                    return Err(DomainError::validation("Title must be less than 60 characters"));
                }
                if c.description.as_ref().is_some_and(|d| d.chars().count() > 160) {
                    return Err(DomainError::validation(
                        "Description must be less than 160 characters",
                    ));
                }
            }
            SettingsUpdate::Security(c) => {
                if c.session_timeout.is_some_and(|t| !(5..=120).contains(&t)) {
                    return Err(DomainError::validation(
                        "Session timeout must be between 5 and 120 minutes",
                    ));
                }
            }
            SettingsUpdate::Backup(c) => {
                if c.retention_period.is_some_and(|d| !(7..=365).contains(&d)) {
                    return Err(DomainError::validation(
                        "Retention period must be between 7 and 365 days",
                    ));
                }
            }
            SettingsUpdate::Content(c) => {
                if c.max_upload_size.is_some_and(|s| !(1..=50).contains(&s)) {
                    return Err(DomainError::validation(
                        "Maximum upload size must be between 1 and 50 MB",
                    ));
                }
            }
            SettingsUpdate::Payment(c) => {
                if c.tax_rate.is_some_and(|r| !(0.0..=100.0).contains(&r)) {
                    return Err(DomainError::validation("Tax rate must be between 0 and 100%"));
                }
                if c.minimum_order.is_some_and(|m| m < 0.0) {
                    return Err(DomainError::validation(
                        "Minimum order amount cannot be negative",
                    ));
                }
            }
        }
        Ok(())
    }
}

fn set<T: Clone>(target: &mut T, value: &Option<T>) {
    if let Some(v) = value {
        *target = v.clone();
    }
}

impl SiteSettings {
    /// Validates and applies `update`. On error nothing is changed.
    pub fn apply(&mut self, update: &SettingsUpdate) -> Result<(), DomainError> {
        update.validate()?;
        match update {
            SettingsUpdate::Metadata(c) => {
                let m = &mut self.metadata;
                set(&mut m.title, &c.title);
                set(&mut m.description, &c.description);
                set(&mut m.keywords, &c.keywords);
                set(&mut m.twitter_handle, &c.twitter_handle);
                set(&mut m.analytics_id, &c.analytics_id);
                set(&mut m.maps_api_key, &c.maps_api_key);
            }
            SettingsUpdate::Security(c) => {
                let s = &mut self.security;
                set(&mut s.two_factor_auth, &c.two_factor_auth);
                set(&mut s.session_timeout, &c.session_timeout);
                set(&mut s.password_expiration, &c.password_expiration);
            }
            SettingsUpdate::Backup(c) => {
                let b = &mut self.backup;
                set(&mut b.auto_backup, &c.auto_backup);
                set(&mut b.backup_frequency, &c.backup_frequency);
                set(&mut b.retention_period, &c.retention_period);
            }
            SettingsUpdate::Content(c) => {
                let s = &mut self.content;
                set(&mut s.enable_comments, &c.enable_comments);
                set(&mut s.moderate_comments, &c.moderate_comments);
                set(&mut s.max_upload_size, &c.max_upload_size);
            }
            SettingsUpdate::Payment(c) => {
                let p = &mut self.payment;
                set(&mut p.currency, &c.currency);
                set(&mut p.tax_rate, &c.tax_rate);
                set(&mut p.minimum_order, &c.minimum_order);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_document_merges_over_defaults() {
        let stored = r#"{"security": {"sessionTimeout": 45}, "payment": {"currency": "EUR"}}"#;
        let settings: SiteSettings = serde_json::from_str(stored).unwrap();
        assert_eq!(settings.security.session_timeout, 45);
        assert_eq!(settings.security.password_expiration, 90);
        assert_eq!(settings.payment.currency, "EUR");
        assert_eq!(settings.payment.tax_rate, 8.5);
        assert_eq!(settings.metadata, WebsiteMetadata::default());
    }

    #[test]
    fn test_invalid_update_leaves_settings_untouched() {
        let mut settings = SiteSettings::default();
        let update = SettingsUpdate::Payment(PaymentChanges {
            currency: Some("EUR".into()),
            tax_rate: Some(120.0),
            ..Default::default()
        });
        assert!(matches!(settings.apply(&update), Err(DomainError::Validation(_))));
        assert_eq!(settings, SiteSettings::default());
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let mut settings = SiteSettings::default();
        settings
            .apply(&SettingsUpdate::Security(SecurityChanges {
                session_timeout: Some(120),
                ..Default::default()
            }))
            .unwrap();
        assert_eq!(settings.security.session_timeout, 120);

        let too_short = SettingsUpdate::Backup(BackupChanges {
            retention_period: Some(6),
            ..Default::default()
        });
        assert!(too_short.validate().is_err());

        let zero_upload = SettingsUpdate::Content(ContentChanges {
            max_upload_size: Some(0),
            ..Default::default()
        });
        assert!(zero_upload.validate().is_err());
    }

    #[test]
    fn test_long_title_rejected() {
        let update = SettingsUpdate::Metadata(MetadataChanges {
            title: Some("x".repeat(61)),
            ..Default::default()
        });
        assert!(update.validate().is_err());
    }
}
