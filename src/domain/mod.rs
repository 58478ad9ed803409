pub mod contact;
pub mod event;
pub mod feedback;
pub mod gallery;
pub mod inquiry;
pub mod location;
pub mod notification;
pub mod query;
pub mod resource;
pub mod session;
pub mod settings;
pub mod team;
pub mod user;

pub use contact::*;
pub use event::*;
pub use feedback::*;
pub use gallery::*;
pub use inquiry::*;
pub use location::*;
pub use notification::*;
pub use query::*;
pub use resource::*;
pub use session::*;
pub use settings::*;
pub use team::*;
pub use user::*;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DomainError {
    #[error("Missing credential: no session token is stored")]
    MissingCredential,

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("HTTP error {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invalid response: {0}")]
    Decode(String),

    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Event is full: {id} already has {max} attendees")]
    EventFull { id: String, max: u32 },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Export failed: {0}")]
    Export(String),
}

impl DomainError {
    pub fn validation(message: impl Into<String>) -> Self {
        DomainError::Validation(message.into())
    }

    /// True for responses that mean the stored credential is no longer accepted.
    pub fn is_auth_rejection(&self) -> bool {
        matches!(
            self,
            DomainError::Unauthorized(_) | DomainError::Http { status: 401, .. }
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            DomainError::ResourceNotFound(_) | DomainError::Http { status: 404, .. }
        )
    }
}
