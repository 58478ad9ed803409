//! Wires a [`Dashboard`] to concrete adapters.

use std::sync::Arc;
use tracing::info;

use crate::application::{AuthGate, Backends, Dashboard};
use crate::domain::{DomainError, Resource, Simulated};
use crate::infrastructure::adapters::http::{self, HttpAuthProvider, HttpBackend};
use crate::infrastructure::adapters::memory::{fixtures, InMemoryBackend, MemoryAuthProvider};
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::storage::{
    DirectorySink, FileCredentialStore, JsonSettingsRepository, MemoryCredentialStore,
};
use crate::ports::{CredentialSource, ResourceBackend};

/// Every store talks to the REST API at `PNE_BACKEND_URL`.
pub fn connect(config: &AppConfig) -> Result<Dashboard, DomainError> {
    let base_url = config.backend_url()?;
    let client = http::client()?;

    let auth = Arc::new(AuthGate::new(
        Arc::new(HttpAuthProvider::with_client(client.clone(), base_url)),
        Arc::new(FileCredentialStore::new(&config.token_file)),
    ));
    let credentials: Arc<dyn CredentialSource> = auth.clone();

    fn remote<R: Resource>(
        client: &reqwest::Client,
        base_url: &str,
        credentials: &Arc<dyn CredentialSource>,
    ) -> Arc<dyn ResourceBackend<R>> {
        Arc::new(HttpBackend::<R>::with_client(
            client.clone(),
            base_url,
            credentials.clone(),
        ))
    }

    let backends = Backends {
        locations: remote(&client, base_url, &credentials),
        contacts: remote(&client, base_url, &credentials),
        feedback: remote(&client, base_url, &credentials),
        inquiries: remote(&client, base_url, &credentials),
        users: remote(&client, base_url, &credentials),
        events: remote(&client, base_url, &credentials),
        gallery: remote(&client, base_url, &credentials),
        notifications: remote(&client, base_url, &credentials),
        team_members: remote(&client, base_url, &credentials),
        milestones: remote(&client, base_url, &credentials),
    };

    info!(%base_url, "Dashboard connected");
    Ok(assemble(config, auth, backends))
}

/// Every store runs against seeded in-memory data. The demo account from
/// [`fixtures`] can sign in.
pub fn offline(config: &AppConfig) -> Result<Dashboard, DomainError> {
    let auth = Arc::new(AuthGate::new(
        Arc::new(MemoryAuthProvider::with_account(
            fixtures::DEMO_NAME,
            fixtures::DEMO_EMAIL,
            fixtures::DEMO_PASSWORD,
        )),
        Arc::new(MemoryCredentialStore::default()),
    ));

    fn seeded<R: Simulated>(records: Vec<R::Wire>) -> Arc<dyn ResourceBackend<R>> {
        Arc::new(InMemoryBackend::<R>::with_records(records))
    }

    let backends = Backends {
        locations: seeded(fixtures::locations()?),
        contacts: seeded(fixtures::contacts()?),
        feedback: seeded(fixtures::feedback()?),
        inquiries: seeded(fixtures::inquiries()?),
        users: seeded(fixtures::users()?),
        events: seeded(fixtures::events()?),
        gallery: seeded(fixtures::gallery()?),
        notifications: seeded(fixtures::notifications()?),
        team_members: seeded(fixtures::team_members()?),
        milestones: seeded(fixtures::milestones()?),
    };

    info!("Dashboard running offline");
    Ok(assemble(config, auth, backends))
}

fn assemble(config: &AppConfig, auth: Arc<AuthGate>, backends: Backends) -> Dashboard {
    Dashboard::new(
        auth,
        backends,
        Arc::new(JsonSettingsRepository::new(&config.settings_file)),
        Arc::new(DirectorySink::new(&config.export_dir)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_offline_dashboard_refresh() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig {
            settings_file: dir.path().join("settings.json"),
            export_dir: dir.path().to_path_buf(),
            offline: true,
            ..AppConfig::default()
        };
        let dashboard = offline(&config).unwrap();
        let summary = dashboard.refresh().await.unwrap();

        assert_eq!(summary.locations, 3);
        assert_eq!(summary.active_locations, 2);
        assert_eq!(summary.pending_contacts, 1);
        assert_eq!(summary.average_rating, 4.0);
        assert_eq!(summary.unread_notifications, 2);
        assert_eq!(summary.upcoming_events, 2);
        assert_eq!(summary.new_inquiries, 1);
    }

    #[test]
    fn test_connect_requires_backend_url() {
        let err = connect(&AppConfig::default()).err().unwrap();
        assert!(matches!(err, DomainError::Validation(_)));
    }
}
