//! In-process backend.
//!
//! Keeps wire records in insertion order and applies drafts, changes, and
//! actions through each entity's [`Simulated`] rules. Used for offline mode
//! and as the test double for the stores.

mod auth;
pub mod fixtures;

pub use auth::MemoryAuthProvider;

use async_trait::async_trait;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;
use tracing::debug;

use crate::domain::{ActionRoute, DomainError, Filter, ResourceAction, Simulated};
use crate::ports::{Listing, ResourceBackend};

pub struct InMemoryBackend<R: Simulated> {
    records: RwLock<Vec<R::Wire>>,
    next_id: AtomicU64,
    latency: Option<Duration>,
    _resource: PhantomData<fn() -> R>,
}

impl<R: Simulated> Default for InMemoryBackend<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Simulated> InMemoryBackend<R> {
    pub fn new() -> Self {
        Self::with_records(Vec::new())
    }

    /// Starts from existing records. New ids continue after the highest
    /// numeric id already present.
    pub fn with_records(records: Vec<R::Wire>) -> Self {
        let next_id = records
            .iter()
            .filter_map(|w| R::wire_id(w).parse::<u64>().ok())
            .max()
            .map_or(1, |max| max + 1);
        Self {
            records: RwLock::new(records),
            next_id: AtomicU64::new(next_id),
            latency: None,
            _resource: PhantomData,
        }
    }

    /// Delays every call, so in-flight state can be observed.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn snapshot(&self) -> Vec<R::Wire> {
        self.read().clone()
    }

    async fn pause(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }

    fn not_found(id: &str) -> DomainError {
        DomainError::ResourceNotFound(format!("{} {}", R::NAME, id))
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<R::Wire>> {
        self.records.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<R::Wire>> {
        self.records.write().unwrap_or_else(|e| e.into_inner())
    }
}

fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

#[async_trait]
impl<R: Simulated> ResourceBackend<R> for InMemoryBackend<R> {
    async fn list(&self, filter: &Filter) -> Result<Listing<R::Wire>, DomainError> {
        self.pause().await;
        let records: Vec<R::Wire> = self
            .read()
            .iter()
            .filter(|w| R::from_wire((*w).clone()).matches(filter))
            .cloned()
            .collect();
        debug!(resource = R::NAME, count = records.len(), "Listed in memory");
        Ok(Listing::unpaged(records))
    }

    async fn get(&self, id: &str) -> Result<R::Wire, DomainError> {
        self.pause().await;
        self.read()
            .iter()
            .find(|w| R::wire_id(w) == id)
            .cloned()
            .ok_or_else(|| Self::not_found(id))
    }

    async fn create(&self, draft: &R::Draft) -> Result<R::Wire, DomainError> {
        self.pause().await;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst).to_string();
        let wire = R::wire_from_draft(id, draft, &now());
        self.write().push(wire.clone());
        Ok(wire)
    }

    async fn update(&self, id: &str, changes: &R::Changes) -> Result<R::Wire, DomainError> {
        self.pause().await;
        let mut records = self.write();
        let wire = records
            .iter_mut()
            .find(|w| R::wire_id(w) == id)
            .ok_or_else(|| Self::not_found(id))?;
        R::apply_changes(wire, changes, &now());
        Ok(wire.clone())
    }

    async fn delete(&self, id: &str) -> Result<(), DomainError> {
        self.pause().await;
        self.write().retain(|w| R::wire_id(w) != id);
        Ok(())
    }

    async fn perform(&self, action: &R::Action) -> Result<Option<R::Wire>, DomainError> {
        self.pause().await;
        let stamp = now();
        let mut records = self.write();
        match action.route() {
            ActionRoute::Item { id, .. } => {
                let wire = records
                    .iter_mut()
                    .find(|w| R::wire_id(w) == id)
                    .ok_or_else(|| Self::not_found(&id))?;
                R::apply_action(wire, action, &stamp)?;
                Ok(Some(wire.clone()))
            }
            ActionRoute::Collection { .. } => {
                for wire in records.iter_mut() {
                    R::apply_action(wire, action, &stamp)?;
                }
                Ok(None)
            }
        }
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Location, LocationDraft, Notification, NotificationAction};

    #[tokio::test]
    async fn test_ids_continue_after_seed() {
        let backend = InMemoryBackend::<Location>::with_records(fixtures::locations().unwrap());
        let seeded = backend.snapshot().len();
        let created = backend
            .create(&LocationDraft {
                name: "Harbor".into(),
                city: "Tacoma".into(),
                state: "WA".into(),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(created.id, (seeded + 1).to_string());
        assert!(backend.get("404").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_collection_action_touches_every_record() {
        let backend =
            InMemoryBackend::<Notification>::with_records(fixtures::notifications().unwrap());
        let returned = backend.perform(&NotificationAction::MarkAllAsRead).await.unwrap();

        assert!(returned.is_none());
        assert!(backend.snapshot().iter().all(|n| n.is_read == 1));
    }
}
