pub mod auth;
pub mod dashboard;
pub mod export;
pub mod settings;
pub mod store;
pub mod stores;

pub use auth::AuthGate;
pub use dashboard::{Backends, Dashboard, Summary};
pub use export::ExportFormat;
pub use settings::SettingsStore;
pub use store::{LoadingGuard, OperationStatus, ResourceStore, StoreEvent};
pub use stores::*;
