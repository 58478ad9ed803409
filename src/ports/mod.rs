use async_trait::async_trait;
use std::path::PathBuf;

use crate::domain::{
    AuthResponse, DomainError, Filter, LoginRequest, PageMeta, RegisterRequest, Resource,
    SessionUser, SiteSettings,
};

/// One page of wire records as a backend returned it.
#[derive(Debug, Clone, PartialEq)]
pub struct Listing<W> {
    pub records: Vec<W>,
    /// Pagination reported by the backend, when it sends any.
    pub meta: Option<PageMeta>,
}

impl<W> Listing<W> {
    pub fn unpaged(records: Vec<W>) -> Self {
        Self {
            records,
            meta: None,
        }
    }
}

/// Where a [`ResourceStore`](crate::application::ResourceStore) reads and writes records.
#[async_trait]
pub trait ResourceBackend<R: Resource>: Send + Sync {
    async fn list(&self, filter: &Filter) -> Result<Listing<R::Wire>, DomainError>;
    async fn get(&self, id: &str) -> Result<R::Wire, DomainError>;
    async fn create(&self, draft: &R::Draft) -> Result<R::Wire, DomainError>;
    async fn update(&self, id: &str, changes: &R::Changes) -> Result<R::Wire, DomainError>;
    async fn delete(&self, id: &str) -> Result<(), DomainError>;
    /// Runs an entity-specific operation. Returns the affected record when
    /// the backend sends one back.
    async fn perform(&self, action: &R::Action) -> Result<Option<R::Wire>, DomainError>;
    fn backend_name(&self) -> &'static str;
}

/// Supplies the bearer token for authenticated calls.
pub trait CredentialSource: Send + Sync {
    /// Current token, read fresh on every call.
    fn bearer(&self) -> Result<String, DomainError>;
    /// Called when the backend refused the token.
    fn reject(&self);
}

/// Durable storage for the session token.
pub trait CredentialStore: Send + Sync {
    fn load(&self) -> Result<Option<String>, DomainError>;
    fn save(&self, token: &str) -> Result<(), DomainError>;
    fn clear(&self) -> Result<(), DomainError>;
}

#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, DomainError>;
    async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, DomainError>;
    async fn logout(&self, token: &str) -> Result<(), DomainError>;
    async fn current_user(&self, token: &str) -> Result<SessionUser, DomainError>;
}

#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// `None` when nothing has been saved yet.
    async fn load(&self) -> Result<Option<SiteSettings>, DomainError>;
    async fn save(&self, settings: &SiteSettings) -> Result<(), DomainError>;
}

/// Destination for exported files.
#[async_trait]
pub trait FileSink: Send + Sync {
    async fn save(&self, file_name: &str, bytes: &[u8]) -> Result<PathBuf, DomainError>;
}
