//! # Resource Store
//!
//! A [`ResourceStore`] is the client-side state for one collection: the
//! records last fetched, pagination metadata, and an operation status
//! (`loading` / `error`). Every operation goes through the backend first and
//! only touches the local collection once the backend has accepted it.
//!
//! The store is written once against [`Resource`] and instantiated per
//! entity. Entity-specific operations live in `application::stores` as
//! inherent `impl ResourceStore<X>` blocks.
//!
//! ## Concurrency
//!
//! Operations may overlap. `loading` is an in-flight counter, so it only
//! drops back to `false` once every operation has finished; each operation
//! holds a [`LoadingGuard`] that releases its slot even if the future is
//! dropped. Collection writes are last-writer-wins. No lock is held across
//! an `.await`.

use std::future::Future;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::application::export::{self, ExportFormat};
use crate::domain::{DomainError, Filter, InsertPosition, PageMeta, Resource};
use crate::ports::{FileSink, ResourceBackend};

const EVENT_CAPACITY: usize = 64;

/// `{loading, error}` snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OperationStatus {
    pub loading: bool,
    pub error: Option<String>,
}

/// Change notifications for subscribers of one store.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    Loading { operation: &'static str },
    Fetched { count: usize },
    Created { id: String },
    Updated { id: String },
    Deleted { id: String },
    Failed { operation: &'static str, message: String },
    Exported { path: PathBuf },
}

struct StoreState<R> {
    items: Vec<R>,
    meta: PageMeta,
    error: Option<String>,
}

/// Holds one slot of the in-flight counter.
pub struct LoadingGuard<'a> {
    in_flight: &'a AtomicUsize,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

pub struct ResourceStore<R: Resource> {
    backend: Arc<dyn ResourceBackend<R>>,
    state: RwLock<StoreState<R>>,
    in_flight: AtomicUsize,
    events: broadcast::Sender<StoreEvent>,
}

impl<R: Resource> ResourceStore<R> {
    pub fn new(backend: Arc<dyn ResourceBackend<R>>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            backend,
            state: RwLock::new(StoreState {
                items: Vec::new(),
                meta: PageMeta::default(),
                error: None,
            }),
            in_flight: AtomicUsize::new(0),
            events,
        }
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.backend_name()
    }

    pub(crate) fn backend(&self) -> &dyn ResourceBackend<R> {
        self.backend.as_ref()
    }

    // --- Operations ---

    /// Replaces the collection with every record matching `filter`.
    ///
    /// Filter predicates and the requested sort are applied again on the
    /// client after the backend answers, so the result honours every
    /// predicate even when the backend ignores a query parameter.
    pub async fn fetch_all(&self, filter: &Filter) -> Result<Vec<R>, DomainError> {
        self.track("fetch", async {
            filter.check_sort::<R>()?;
            let listing = self.backend.list(filter).await?;
            let items = filter.apply(listing.records.into_iter().map(R::from_wire).collect());
            let meta = listing
                .meta
                .unwrap_or_else(|| PageMeta::from_len(items.len(), filter));

            {
                let mut state = self.write();
                state.items = items.clone();
                state.meta = meta;
            }

            info!(resource = R::NAME, count = items.len(), total = meta.total, "Fetched");
            self.emit(StoreEvent::Fetched { count: items.len() });
            Ok(items)
        })
        .await
    }

    /// Loads a single record and refreshes its local copy, if one is held.
    pub async fn fetch_by_id(&self, id: &str) -> Result<R, DomainError> {
        self.track("fetch", async {
            let record = R::from_wire(self.backend.get(id).await?);
            self.replace_local(record.clone());
            debug!(resource = R::NAME, %id, "Fetched record");
            Ok(record)
        })
        .await
    }

    pub async fn create(&self, draft: R::Draft) -> Result<R, DomainError> {
        self.track("create", async {
            R::validate_draft(&draft)?;
            let record = R::from_wire(self.backend.create(&draft).await?);

            {
                let mut state = self.write();
                match R::INSERT {
                    InsertPosition::Append => state.items.push(record.clone()),
                    InsertPosition::Prepend => state.items.insert(0, record.clone()),
                }
            }

            info!(resource = R::NAME, id = %record.id(), "Created");
            self.emit(StoreEvent::Created {
                id: record.id().to_string(),
            });
            Ok(record)
        })
        .await
    }

    /// Applies a sparse update. The local entry is replaced in place; when no
    /// local entry has `id` the server result is still returned.
    pub async fn update(&self, id: &str, changes: R::Changes) -> Result<R, DomainError> {
        self.track("update", async {
            R::validate_changes(&changes)?;
            let updated = R::from_wire(self.backend.update(id, &changes).await?);

            let merged = {
                let mut state = self.write();
                match state.items.iter().position(|item| item.id() == id) {
                    Some(pos) => {
                        let merged = R::reconcile(Some(&state.items[pos]), updated, &changes);
                        state.items[pos] = merged.clone();
                        merged
                    }
                    None => R::reconcile(None, updated, &changes),
                }
            };

            info!(resource = R::NAME, %id, "Updated");
            self.emit(StoreEvent::Updated { id: id.to_string() });
            Ok(merged)
        })
        .await
    }

    /// Removes a record. A record the backend no longer knows counts as deleted.
    pub async fn delete(&self, id: &str) -> Result<(), DomainError> {
        self.track("delete", async {
            match self.backend.delete(id).await {
                Ok(()) => {}
                Err(e) if e.is_not_found() => {
                    debug!(resource = R::NAME, %id, "Already gone");
                }
                Err(e) => return Err(e),
            }

            self.write().items.retain(|item| item.id() != id);

            info!(resource = R::NAME, %id, "Deleted");
            self.emit(StoreEvent::Deleted { id: id.to_string() });
            Ok(())
        })
        .await
    }

    /// Writes the records currently held (not a fresh fetch) as `<resource>.<ext>`.
    pub async fn export(&self, format: ExportFormat, sink: &dyn FileSink) -> Result<PathBuf, DomainError> {
        self.track("export", async {
            let bytes = export::render(&self.items(), format)?;
            let file_name = format!("{}.{}", R::NAME, format.extension());
            let path = sink.save(&file_name, &bytes).await?;

            info!(resource = R::NAME, path = %path.display(), bytes = bytes.len(), "Exported");
            self.emit(StoreEvent::Exported { path: path.clone() });
            Ok(path)
        })
        .await
    }

    /// Runs an entity-specific action and refreshes the local copy when the
    /// backend returns the affected record.
    pub async fn perform(&self, operation: &'static str, action: R::Action) -> Result<Option<R>, DomainError> {
        self.track(operation, async {
            let record = self.backend.perform(&action).await?.map(R::from_wire);
            if let Some(record) = &record {
                self.replace_local(record.clone());
                self.emit(StoreEvent::Updated {
                    id: record.id().to_string(),
                });
            }
            debug!(resource = R::NAME, ?action, "Performed");
            Ok(record)
        })
        .await
    }

    // --- Snapshots ---

    pub fn items(&self) -> Vec<R> {
        self.read().items.clone()
    }

    pub fn len(&self) -> usize {
        self.read().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().items.is_empty()
    }

    pub fn find(&self, id: &str) -> Option<R> {
        self.read().items.iter().find(|item| item.id() == id).cloned()
    }

    pub fn lookup(&self, id: &str) -> Result<R, DomainError> {
        self.find(id)
            .ok_or_else(|| DomainError::ResourceNotFound(format!("{} {}", R::NAME, id)))
    }

    /// Records satisfying `predicate`, in collection order.
    pub fn select(&self, predicate: impl Fn(&R) -> bool) -> Vec<R> {
        self.read()
            .items
            .iter()
            .filter(|item| predicate(item))
            .cloned()
            .collect()
    }

    /// Runs `f` over the held records without cloning them.
    pub fn with_items<T>(&self, f: impl FnOnce(&[R]) -> T) -> T {
        f(&self.read().items)
    }

    pub fn status(&self) -> OperationStatus {
        OperationStatus {
            loading: self.in_flight.load(Ordering::SeqCst) > 0,
            error: self.read().error.clone(),
        }
    }

    pub fn meta(&self) -> PageMeta {
        self.read().meta
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    // --- Internals shared with the entity extensions ---

    /// Marks an operation in flight for its whole duration, clears the
    /// previous error, and records a failure message if `work` fails.
    pub(crate) async fn track<T, F>(&self, operation: &'static str, work: F) -> Result<T, DomainError>
    where
        F: Future<Output = Result<T, DomainError>>,
    {
        let _guard = self.begin(operation);
        match work.await {
            Ok(value) => Ok(value),
            Err(e) => Err(self.fail(operation, e)),
        }
    }

    fn begin(&self, operation: &'static str) -> LoadingGuard<'_> {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        self.write().error = None;
        debug!(resource = R::NAME, operation, "Started");
        self.emit(StoreEvent::Loading { operation });
        LoadingGuard {
            in_flight: &self.in_flight,
        }
    }

    fn fail(&self, operation: &'static str, error: DomainError) -> DomainError {
        let message = format!("Failed to {} {}: {}", operation, R::NAME, error);
        warn!(resource = R::NAME, operation, error = %error, "Operation failed");
        self.write().error = Some(message.clone());
        self.emit(StoreEvent::Failed { operation, message });
        error
    }

    /// Replaces the local record with the same id, if any.
    pub(crate) fn replace_local(&self, record: R) -> bool {
        let mut state = self.write();
        match state.items.iter_mut().find(|item| item.id() == record.id()) {
            Some(slot) => {
                *slot = record;
                true
            }
            None => false,
        }
    }

    /// Mutates the local record with `id` in place.
    pub(crate) fn modify_local(&self, id: &str, f: impl FnOnce(&mut R)) -> bool {
        let mut state = self.write();
        match state.items.iter_mut().find(|item| item.id() == id) {
            Some(item) => {
                f(item);
                true
            }
            None => false,
        }
    }

    pub(crate) fn modify_all(&self, f: impl FnMut(&mut R)) {
        self.write().items.iter_mut().for_each(f);
    }

    pub(crate) fn emit(&self, event: StoreEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    fn read(&self) -> RwLockReadGuard<'_, StoreState<R>> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoreState<R>> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Location, LocationChanges, LocationDraft, LocationWire, SortOrder};
    use crate::infrastructure::adapters::memory::InMemoryBackend;
    use crate::ports::Listing;
    use async_trait::async_trait;

    fn draft(name: &str, state: &str, active: bool) -> LocationDraft {
        LocationDraft {
            name: name.to_string(),
            address: "1 Main St".to_string(),
            city: "Springfield".to_string(),
            state: state.to_string(),
            zip_code: "00000".to_string(),
            is_active: active,
            ..Default::default()
        }
    }

    fn store() -> ResourceStore<Location> {
        ResourceStore::new(Arc::new(InMemoryBackend::<Location>::new()))
    }

    /// Backend that refuses every call with the given status.
    struct Refusing(u16);

    #[async_trait]
    impl ResourceBackend<Location> for Refusing {
        async fn list(&self, _filter: &Filter) -> Result<Listing<LocationWire>, DomainError> {
            Err(self.error())
        }
        async fn get(&self, _id: &str) -> Result<LocationWire, DomainError> {
            Err(self.error())
        }
        async fn create(&self, _draft: &LocationDraft) -> Result<LocationWire, DomainError> {
            Err(self.error())
        }
        async fn update(&self, _id: &str, _changes: &LocationChanges) -> Result<LocationWire, DomainError> {
            Err(self.error())
        }
        async fn delete(&self, _id: &str) -> Result<(), DomainError> {
            Err(self.error())
        }
        async fn perform(&self, action: &crate::domain::NoAction) -> Result<Option<LocationWire>, DomainError> {
            match *action {}
        }
        fn backend_name(&self) -> &'static str {
            "refusing"
        }
    }

    impl Refusing {
        fn error(&self) -> DomainError {
            DomainError::Http {
                status: self.0,
                message: "refused".to_string(),
            }
        }
    }

    #[tokio::test]
    async fn test_create_then_fetch_contains_record_once() {
        let store = store();
        let created = store.create(draft("Downtown", "IL", true)).await.unwrap();

        let items = store.fetch_all(&Filter::new()).await.unwrap();
        assert_eq!(items.iter().filter(|l| l.id == created.id).count(), 1);
        assert_eq!(store.find(&created.id), Some(created));
        assert_eq!(store.status(), OperationStatus::default());
    }

    #[tokio::test]
    async fn test_update_changes_only_requested_field() {
        let store = store();
        let created = store.create(draft("Downtown", "IL", true)).await.unwrap();

        let updated = store
            .update(
                &created.id,
                LocationChanges {
                    city: Some("Chicago".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let found = store.lookup(&created.id).unwrap();
        assert_eq!(found, updated);
        assert_eq!(found.city, "Chicago");
        assert_eq!(found.name, created.name);
        assert_eq!(found.address, created.address);
        assert_eq!(found.is_active, created.is_active);
    }

    #[tokio::test]
    async fn test_delete_then_lookup_is_not_found() {
        let store = store();
        let created = store.create(draft("Downtown", "IL", true)).await.unwrap();

        store.delete(&created.id).await.unwrap();
        assert!(matches!(
            store.lookup(&created.id),
            Err(DomainError::ResourceNotFound(_))
        ));

        let other = store.create(draft("Uptown", "IL", true)).await.unwrap();
        store.delete("missing").await.unwrap();
        assert_eq!(store.items(), vec![other]);
    }

    #[tokio::test]
    async fn test_filters_are_conjunctive_and_sort_is_stable() {
        let store = store();
        store.create(draft("Bravo", "IL", true)).await.unwrap();
        store.create(draft("alpha", "IL", false)).await.unwrap();
        store.create(draft("Charlie", "WI", true)).await.unwrap();
        store.create(draft("Delta", "IL", true)).await.unwrap();

        let active_il = store
            .fetch_all(&Filter::new().state("IL").active(true))
            .await
            .unwrap();
        let names: Vec<_> = active_il.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["Bravo", "Delta"]);

        // Equal keys keep insertion order in both directions.
        let by_state = store
            .fetch_all(&Filter::new().sort("state", SortOrder::Desc))
            .await
            .unwrap();
        let names: Vec<_> = by_state.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["Charlie", "Bravo", "alpha", "Delta"]);

        let by_name = store
            .fetch_all(&Filter::new().sort("name", SortOrder::Asc))
            .await
            .unwrap();
        assert_eq!(by_name[0].name, "alpha");
        assert_eq!(store.meta().total, 4);
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_collection_and_records_error() {
        let seeded = Arc::new(InMemoryBackend::<Location>::new());
        let good = ResourceStore::new(seeded);
        good.create(draft("Downtown", "IL", true)).await.unwrap();
        let items = good.items();

        let store = ResourceStore::<Location>::new(Arc::new(Refusing(401)));
        store.write().items = items.clone();
        let mut events = store.subscribe();

        let err = store.fetch_all(&Filter::new()).await.unwrap_err();
        assert!(err.is_auth_rejection());
        assert_eq!(store.items(), items);

        let status = store.status();
        assert!(!status.loading);
        let message = status.error.unwrap();
        assert!(message.starts_with("Failed to fetch locations"));

        assert_eq!(events.recv().await.unwrap(), StoreEvent::Loading { operation: "fetch" });
        assert!(matches!(events.recv().await.unwrap(), StoreEvent::Failed { .. }));
    }

    #[tokio::test]
    async fn test_validation_fails_before_backend() {
        let store = ResourceStore::<Location>::new(Arc::new(Refusing(500)));
        let err = store.create(draft("", "IL", true)).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert!(store.status().error.is_some());
    }

    #[tokio::test]
    async fn test_loading_released_when_future_dropped() {
        let backend = InMemoryBackend::<Location>::new()
            .with_latency(std::time::Duration::from_millis(200));
        let store = ResourceStore::new(Arc::new(backend));
        let all = Filter::new();
        {
            let fut = store.fetch_all(&all);
            tokio::pin!(fut);
            let timed_out =
                tokio::time::timeout(std::time::Duration::from_millis(10), fut.as_mut()).await;
            assert!(timed_out.is_err());
            assert!(store.status().loading);
        }
        assert!(!store.status().loading);
    }

    #[tokio::test]
    async fn test_overlapping_operations_share_loading_flag() {
        let backend = InMemoryBackend::<Location>::new()
            .with_latency(std::time::Duration::from_millis(20));
        let store = ResourceStore::new(Arc::new(backend));
        let all = Filter::new();

        let (a, b) = tokio::join!(
            store.create(draft("Downtown", "IL", true)),
            store.fetch_all(&all)
        );
        a.unwrap();
        b.unwrap();
        assert!(!store.status().loading);
    }
}
