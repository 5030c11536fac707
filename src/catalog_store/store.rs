//! In-memory catalog store, one instance per entity family.
//!
//! The store is the single source of truth visible to the presentation
//! layer. Reads hand out snapshots; writes run validate → persist → commit →
//! publish behind one lock, so the sequence is atomic even when the store is
//! shared across tasks.

use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

use super::error::CatalogError;
use super::trait_def::PersistenceGateway;
use crate::catalog::{generate_record_id, CatalogRecord};

/// Load lifecycle of a store.
///
/// Owned by the store itself so the load-exactly-once guarantee holds no
/// matter how many views trigger the initial load.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadState {
    NotStarted,
    InFlight,
    Loaded,
}

/// What a [`CatalogStore::load`] call actually did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The gateway was queried and the collection replaced.
    Fresh,
    /// A previous load already completed; nothing was fetched.
    AlreadyLoaded,
    /// Another load is in flight; this request was suppressed.
    SuppressedInFlight,
}

struct StoreState<R> {
    records: Vec<R>,
    load_state: LoadState,
}

/// Authoritative collection for one entity family.
pub struct CatalogStore<R: CatalogRecord> {
    gateway: Box<dyn PersistenceGateway<R>>,
    state: Mutex<StoreState<R>>,
    publisher: watch::Sender<Vec<R>>,
}

impl<R: CatalogRecord> CatalogStore<R> {
    pub fn new(gateway: Box<dyn PersistenceGateway<R>>) -> Self {
        let (publisher, _) = watch::channel(Vec::new());
        CatalogStore {
            gateway,
            state: Mutex::new(StoreState {
                records: Vec::new(),
                load_state: LoadState::NotStarted,
            }),
            publisher,
        }
    }

    /// Current collection snapshot, insertion order preserved.
    pub async fn all(&self) -> Vec<R> {
        self.state.lock().await.records.clone()
    }

    pub async fn find(&self, id: &str) -> Option<R> {
        self.state
            .lock()
            .await
            .records
            .iter()
            .find(|record| record.id() == id)
            .cloned()
    }

    pub async fn load_state(&self) -> LoadState {
        self.state.lock().await.load_state
    }

    /// Observe collection snapshots. A fresh snapshot is published after a
    /// completed load and after every committed mutation.
    pub fn subscribe(&self) -> watch::Receiver<Vec<R>> {
        self.publisher.subscribe()
    }

    /// Fetch the collection from the gateway.
    ///
    /// Runs at most once: a repeat request after a completed load and a
    /// request racing an in-flight load are both suppressed. A failed load
    /// keeps the previous collection and reverts to `NotStarted`; retrying
    /// is the caller's responsibility.
    pub async fn load(&self) -> Result<LoadOutcome, CatalogError> {
        {
            let mut state = self.state.lock().await;
            match state.load_state {
                LoadState::Loaded => return Ok(LoadOutcome::AlreadyLoaded),
                LoadState::InFlight => {
                    debug!(
                        "{} load suppressed, another is in flight",
                        R::FAMILY.as_str()
                    );
                    return Ok(LoadOutcome::SuppressedInFlight);
                }
                LoadState::NotStarted => state.load_state = LoadState::InFlight,
            }
        }

        let loaded = self.gateway.load_all().await;

        let mut state = self.state.lock().await;
        match loaded {
            Ok(records) => {
                info!("Loaded {} {} records", records.len(), R::FAMILY.as_str());
                state.records = records;
                state.load_state = LoadState::Loaded;
                self.publish(&state);
                Ok(LoadOutcome::Fresh)
            }
            Err(e) => {
                warn!("{} load failed: {e:#}", R::FAMILY.as_str());
                state.load_state = LoadState::NotStarted;
                Err(CatalogError::Gateway(e))
            }
        }
    }

    /// Create a record from a draft, assigning a fresh id and an
    /// `order_index` equal to the collection size before the insert.
    pub async fn add(&self, draft: R::Draft) -> Result<R, CatalogError> {
        if R::draft_name(&draft).is_empty() {
            warn!("Rejected {} add with empty name", R::FAMILY.as_str());
            return Err(CatalogError::EmptyName);
        }

        let mut state = self.state.lock().await;
        let order_index = state.records.len() as u32;
        let record = R::from_draft(draft, generate_record_id(), order_index);

        let mut next = state.records.clone();
        next.push(record.clone());
        self.persist_and_commit(&mut state, next).await?;
        info!(
            "Added {} '{}' at index {}",
            R::FAMILY.as_str(),
            record.name(),
            order_index
        );
        Ok(record)
    }

    /// Replace every field of an existing record except `id` and
    /// `order_index`, which are carried over from the stored record no
    /// matter what the caller supplied. Seed records reject the edit.
    pub async fn update(&self, record: R) -> Result<R, CatalogError> {
        let mut state = self.state.lock().await;
        let position = state
            .records
            .iter()
            .position(|r| r.id() == record.id())
            .ok_or_else(|| CatalogError::NotFound(record.id().to_owned()))?;

        let existing_order_index = state.records[position].order_index();
        if state.records[position].is_seed() {
            warn!(
                "Rejected update of seed {} '{}'",
                R::FAMILY.as_str(),
                record.id()
            );
            return Err(CatalogError::SeedProtected {
                id: record.id().to_owned(),
                operation: "updated",
            });
        }

        let mut updated = record;
        updated.set_order_index(existing_order_index);

        let mut next = state.records.clone();
        next[position] = updated.clone();
        self.persist_and_commit(&mut state, next).await?;
        Ok(updated)
    }

    /// Remove a record. Seed records reject the delete.
    pub async fn delete(&self, id: &str) -> Result<(), CatalogError> {
        let mut state = self.state.lock().await;
        let position = state
            .records
            .iter()
            .position(|r| r.id() == id)
            .ok_or_else(|| CatalogError::NotFound(id.to_owned()))?;

        if state.records[position].is_seed() {
            warn!("Rejected delete of seed {} '{id}'", R::FAMILY.as_str());
            return Err(CatalogError::SeedProtected {
                id: id.to_owned(),
                operation: "deleted",
            });
        }

        let mut next = state.records.clone();
        let removed = next.remove(position);
        self.persist_and_commit(&mut state, next).await?;
        info!("Deleted {} '{}'", R::FAMILY.as_str(), removed.name());
        Ok(())
    }

    /// Flip `is_favorite`. Unknown ids are a silent no-op (`Ok(None)`).
    pub async fn toggle_favorite(&self, id: &str) -> Result<Option<R>, CatalogError> {
        self.amend(id, |record| {
            let favorite = record.is_favorite();
            record.set_favorite(!favorite);
        })
        .await
    }

    /// Count one "entity opened" event. Unknown ids are a silent no-op.
    pub async fn increment_view_count(&self, id: &str) -> Result<Option<R>, CatalogError> {
        self.amend(id, |record| record.bump_view_count()).await
    }

    /// Shared path of the two counter mutations. These bypass seed
    /// protection: the favorite flag and view count stay mutable on seeds.
    async fn amend(
        &self,
        id: &str,
        mutate: impl FnOnce(&mut R) + Send,
    ) -> Result<Option<R>, CatalogError> {
        let mut state = self.state.lock().await;
        let Some(position) = state.records.iter().position(|r| r.id() == id) else {
            debug!("Ignored {} amend for unknown id '{id}'", R::FAMILY.as_str());
            return Ok(None);
        };

        let mut next = state.records.clone();
        mutate(&mut next[position]);
        let updated = next[position].clone();
        self.persist_and_commit(&mut state, next).await?;
        Ok(Some(updated))
    }

    /// Persist `next` through the gateway, then make it the in-memory
    /// collection and publish it. On gateway failure the in-memory
    /// collection keeps its last known-good value.
    async fn persist_and_commit(
        &self,
        state: &mut StoreState<R>,
        next: Vec<R>,
    ) -> Result<(), CatalogError> {
        if let Err(e) = self.gateway.save_all(&next).await {
            warn!(
                "{} save failed, keeping previous collection: {e:#}",
                R::FAMILY.as_str()
            );
            return Err(CatalogError::Gateway(e));
        }
        state.records = next;
        self.publish(state);
        Ok(())
    }

    fn publish(&self, state: &StoreState<R>) {
        self.publisher.send_replace(state.records.clone());
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use anyhow::Result;
    use async_trait::async_trait;
    use tokio::sync::Notify;

    use super::*;
    use crate::catalog::{Planet, PlanetDraft};
    use crate::catalog_store::MemoryPersistenceGateway;

    fn draft(name: &str) -> PlanetDraft {
        PlanetDraft {
            name: name.to_string(),
            description: format!("{name} description"),
            ..Default::default()
        }
    }

    async fn seeded_store() -> (Arc<MemoryPersistenceGateway<Planet>>, CatalogStore<Planet>) {
        let gateway = Arc::new(MemoryPersistenceGateway::new());
        let store = CatalogStore::new(Box::new(gateway.clone()));
        store.load().await.unwrap();
        for name in ["Mercury", "Venus", "Earth"] {
            store.add(draft(name)).await.unwrap();
        }
        (gateway, store)
    }

    #[tokio::test]
    async fn test_add_assigns_sequential_order_indices_and_defaults() {
        let (_, store) = seeded_store().await;

        let added = store.add(draft("Mars")).await.unwrap();
        assert_eq!(added.order_index, 3);
        assert_eq!(added.view_count, 0);
        assert!(!added.is_favorite);

        let records = store.all().await;
        assert_eq!(records.len(), 4);
        let indices: Vec<u32> = records.iter().map(|r| r.order_index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3]);
    }

    #[tokio::test]
    async fn test_add_rejects_empty_name() {
        let (gateway, store) = seeded_store().await;

        let err = store.add(draft("")).await.unwrap_err();
        assert!(matches!(err, CatalogError::EmptyName));
        assert_eq!(store.all().await.len(), 3);
        assert_eq!(gateway.stored().len(), 3);
    }

    #[tokio::test]
    async fn test_update_carries_over_id_and_order_index() {
        let (_, store) = seeded_store().await;
        let added = store.add(draft("Mars")).await.unwrap();

        let mut edited = added.clone();
        edited.description = "The red planet".to_string();
        edited.order_index = 99;

        let updated = store.update(edited).await.unwrap();
        assert_eq!(updated.id, added.id);
        assert_eq!(updated.order_index, 3);
        assert_eq!(updated.description, "The red planet");
        assert_eq!(
            store.find(&added.id).await.unwrap().description,
            "The red planet"
        );
    }

    #[tokio::test]
    async fn test_update_unknown_id_is_rejected() {
        let (_, store) = seeded_store().await;
        let mut record = store.all().await[0].clone();
        record.id = "missing".to_string();

        let err = store.update(record).await.unwrap_err();
        assert!(matches!(err, CatalogError::NotFound(id) if id == "missing"));
    }

    #[tokio::test]
    async fn test_seed_records_reject_update_and_delete() {
        let (_, store) = seeded_store().await;
        let seeds = store.all().await;

        for seed in &seeds {
            let mut edited = seed.clone();
            edited.name = "Renamed".to_string();
            let err = store.update(edited).await.unwrap_err();
            assert!(matches!(err, CatalogError::SeedProtected { .. }));

            let err = store.delete(&seed.id).await.unwrap_err();
            assert!(matches!(err, CatalogError::SeedProtected { .. }));
        }

        // the rejected operations left every record unchanged
        assert_eq!(store.all().await, seeds);
    }

    #[tokio::test]
    async fn test_add_then_delete_restores_seed_collection() {
        let (gateway, store) = seeded_store().await;
        let seeds = store.all().await;

        let added = store.add(draft("Mars")).await.unwrap();
        assert_eq!(added.order_index, 3);
        store.delete(&added.id).await.unwrap();

        assert_eq!(store.all().await, seeds);
        assert_eq!(gateway.stored(), seeds);
    }

    #[tokio::test]
    async fn test_toggle_favorite_is_its_own_inverse() {
        let (_, store) = seeded_store().await;
        let seed_id = store.all().await[0].id.clone();

        let toggled = store.toggle_favorite(&seed_id).await.unwrap().unwrap();
        assert!(toggled.is_favorite);
        let toggled = store.toggle_favorite(&seed_id).await.unwrap().unwrap();
        assert!(!toggled.is_favorite);
    }

    #[tokio::test]
    async fn test_toggle_favorite_unknown_id_is_a_noop() {
        let (_, store) = seeded_store().await;
        assert!(store.toggle_favorite("missing").await.unwrap().is_none());
        assert!(store
            .increment_view_count("missing")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_increment_view_count_survives_interleaved_mutations() {
        let (_, store) = seeded_store().await;
        let watched_id = store.all().await[0].id.clone();
        let other_id = store.all().await[1].id.clone();

        for _ in 0..3 {
            store.increment_view_count(&watched_id).await.unwrap();
            store.toggle_favorite(&other_id).await.unwrap();
            store.increment_view_count(&other_id).await.unwrap();
        }

        assert_eq!(store.find(&watched_id).await.unwrap().view_count, 3);
        assert_eq!(store.find(&other_id).await.unwrap().view_count, 3);
    }

    #[tokio::test]
    async fn test_save_failure_keeps_last_known_good_collection() {
        let (gateway, store) = seeded_store().await;
        let before = store.all().await;

        gateway.set_fail_saves(true);
        let err = store.add(draft("Mars")).await.unwrap_err();
        assert!(matches!(err, CatalogError::Gateway(_)));
        assert_eq!(store.all().await, before);
        assert_eq!(gateway.stored(), before);

        gateway.set_fail_saves(false);
        store.add(draft("Mars")).await.unwrap();
        assert_eq!(store.all().await.len(), 4);
    }

    #[tokio::test]
    async fn test_load_is_idempotent_after_completion() {
        let gateway = Arc::new(MemoryPersistenceGateway::with_records(vec![
            Planet::from_draft(draft("Mercury"), "p-0".to_string(), 0),
        ]));
        let store = CatalogStore::new(Box::new(gateway));

        assert_eq!(store.load().await.unwrap(), LoadOutcome::Fresh);
        assert_eq!(store.load().await.unwrap(), LoadOutcome::AlreadyLoaded);
        assert_eq!(store.all().await.len(), 1);
        assert_eq!(store.load_state().await, LoadState::Loaded);
    }

    #[tokio::test]
    async fn test_failed_load_keeps_collection_and_allows_retry() {
        let gateway = Arc::new(MemoryPersistenceGateway::with_records(vec![
            Planet::from_draft(draft("Mercury"), "p-0".to_string(), 0),
        ]));
        let store = CatalogStore::new(Box::new(gateway.clone()));

        gateway.set_fail_loads(true);
        let err = store.load().await.unwrap_err();
        assert!(matches!(err, CatalogError::Gateway(_)));
        assert!(store.all().await.is_empty());
        assert_eq!(store.load_state().await, LoadState::NotStarted);

        gateway.set_fail_loads(false);
        assert_eq!(store.load().await.unwrap(), LoadOutcome::Fresh);
        assert_eq!(store.all().await.len(), 1);
    }

    struct BlockingGateway {
        release: Notify,
        inner: MemoryPersistenceGateway<Planet>,
    }

    #[async_trait]
    impl PersistenceGateway<Planet> for BlockingGateway {
        async fn load_all(&self) -> Result<Vec<Planet>> {
            self.release.notified().await;
            self.inner.load_all().await
        }

        async fn save_all(&self, records: &[Planet]) -> Result<()> {
            self.inner.save_all(records).await
        }
    }

    #[tokio::test]
    async fn test_load_racing_an_in_flight_load_is_suppressed() {
        let gateway = Arc::new(BlockingGateway {
            release: Notify::new(),
            inner: MemoryPersistenceGateway::new(),
        });
        let store = Arc::new(CatalogStore::<Planet>::new(Box::new(gateway.clone())));

        let first = tokio::spawn({
            let store = store.clone();
            async move { store.load().await }
        });
        while store.load_state().await != LoadState::InFlight {
            tokio::task::yield_now().await;
        }

        assert_eq!(
            store.load().await.unwrap(),
            LoadOutcome::SuppressedInFlight
        );

        gateway.release.notify_one();
        assert_eq!(first.await.unwrap().unwrap(), LoadOutcome::Fresh);
        assert_eq!(store.load_state().await, LoadState::Loaded);
    }

    #[tokio::test]
    async fn test_subscribers_receive_committed_snapshots() {
        let (_, store) = seeded_store().await;
        let mut receiver = store.subscribe();
        receiver.mark_unchanged();

        let added = store.add(draft("Mars")).await.unwrap();
        receiver.changed().await.unwrap();

        let snapshot = receiver.borrow_and_update().clone();
        assert_eq!(snapshot.len(), 4);
        assert_eq!(snapshot[3].id, added.id);
    }
}
