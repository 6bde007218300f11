//! Optimistic mutations
//!
//! The cached list is patched before the request is sent. On success the
//! affected queries are invalidated and the list is refetched so
//! server-computed fields replace the guess; on failure the snapshot is put
//! back. Nothing is retried.

use std::{future::Future, marker::PhantomData, sync::Arc};

use serde_json::Value;
use tokio::sync::watch;

use super::{
    backend::{Backend, TaskBackend},
    cache::QueryCache,
    error::{SyncError, SyncResult},
    notify::{Notification, Notifier},
    record::Record,
};
use crate::models::{
    maintenance::{MaintenanceTask, TaskTransition},
    TaskStatus,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Change<T> {
    Create(T),
    Update(T),
    Delete(i32),
}

impl<T: Record> Change<T> {
    pub fn id(&self) -> i32 {
        match self {
            Change::Create(r) | Change::Update(r) => r.id(),
            Change::Delete(id) => *id,
        }
    }

    fn verb(&self) -> &'static str {
        match self {
            Change::Create(_) => "created",
            Change::Update(_) => "updated",
            Change::Delete(_) => "deleted",
        }
    }
}

/// Cached list after `change`: create appends, update replaces the row with the
/// same id, delete removes it. Other rows and their order are untouched.
pub fn apply_optimistic<T: Record>(list: &[T], change: &Change<T>) -> Vec<T> {
    match change {
        Change::Create(record) => {
            let mut next = list.to_vec();
            next.push(record.clone());
            next
        }
        Change::Update(record) => list
            .iter()
            .map(|r| if r.id() == record.id() { record.clone() } else { r.clone() })
            .collect(),
        Change::Delete(id) => list.iter().filter(|r| r.id() != *id).cloned().collect(),
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum MutationState {
    #[default]
    Idle,
    Pending { snapshot: Option<Value> },
    Committed,
    Failed { snapshot: Option<Value>, error: SyncError },
}

/// Mutation hook for one entity type
pub struct Mutations<T: Record> {
    backend: Arc<dyn Backend<T>>,
    cache: QueryCache,
    notifier: Arc<dyn Notifier>,
    state: watch::Sender<MutationState>,
    _record: PhantomData<T>,
}

impl<T: Record> Mutations<T> {
    pub fn new(backend: Arc<dyn Backend<T>>, cache: QueryCache, notifier: Arc<dyn Notifier>) -> Self {
        let (state, _) = watch::channel(MutationState::Idle);
        Self {
            backend,
            cache,
            notifier,
            state,
            _record: PhantomData,
        }
    }

    pub fn state(&self) -> MutationState {
        self.state.borrow().clone()
    }

    pub fn watch(&self) -> watch::Receiver<MutationState> {
        self.state.subscribe()
    }

    /// Load the list from the backend into the cache
    pub async fn fetch(&self) -> SyncResult<Vec<T>> {
        let list = self.backend.list().await?;
        self.cache.set(&T::list_key(), &list).await?;
        Ok(list)
    }

    pub async fn create(&self, record: T) -> SyncResult<Option<T>> {
        self.mutate(Change::Create(record)).await
    }

    pub async fn update(&self, record: T) -> SyncResult<Option<T>> {
        self.mutate(Change::Update(record)).await
    }

    pub async fn delete(&self, id: i32) -> SyncResult<Option<T>> {
        self.mutate(Change::Delete(id)).await
    }

    /// Apply `change` optimistically and send it; returns the saved row for
    /// creates and updates
    pub async fn mutate(&self, change: Change<T>) -> SyncResult<Option<T>> {
        if let Change::Update(record) = &change {
            self.check_read_only(record).await?;
        }

        let backend = self.backend.clone();
        let request = change.clone();
        self.run(change, async move {
            match request {
                Change::Create(record) => backend.create(record).await.map(Some),
                Change::Update(record) => backend.update(record).await.map(Some),
                Change::Delete(id) => backend.delete(id).await.map(|_| None),
            }
        })
        .await
    }

    /// Rejects updates to fields the update endpoint ignores, leaving the cache untouched
    async fn check_read_only(&self, record: &T) -> SyncResult<()> {
        let cached: Vec<T> = self.cache.get(&T::list_key()).await.unwrap_or_default();
        let field = cached
            .iter()
            .find(|r| r.id() == record.id())
            .and_then(|previous| record.read_only_change(previous));

        match field {
            Some(field) => {
                let error = SyncError::ReadOnlyField { table: T::TABLE.as_str(), field };
                self.notifier.notify(Notification::error("Error", error.user_message()));
                Err(error)
            }
            None => Ok(()),
        }
    }

    /// Optimistic pipeline around `request`, which performs the server call for `change`
    pub(crate) async fn run<F>(&self, change: Change<T>, request: F) -> SyncResult<Option<T>>
    where
        F: Future<Output = SyncResult<Option<T>>>,
    {
        let key = T::list_key();
        let snapshot = self.cache.snapshot(&key).await;
        let current: Vec<T> = self.cache.get(&key).await.unwrap_or_default();

        self.cache.set(&key, &apply_optimistic(&current, &change)).await?;
        self.state.send_replace(MutationState::Pending { snapshot: snapshot.clone() });

        match request.await {
            Ok(saved) => {
                let id = saved.as_ref().map(Record::id).unwrap_or_else(|| change.id());
                self.cache.invalidate(&key).await;
                for related in T::related_keys(id) {
                    self.cache.invalidate(&related).await;
                }
                if let Err(e) = self.fetch().await {
                    tracing::warn!("Refetch of {} after mutation failed: {}", key, e);
                }

                self.notifier.notify(Notification::success(
                    "Saved",
                    format!("{} {} {}", T::TABLE, id, change.verb()),
                ));
                self.state.send_replace(MutationState::Committed);
                Ok(saved)
            }
            Err(error) => {
                tracing::warn!("Mutation on {} {} failed: {}", key, change.id(), error);
                self.cache.restore(&key, snapshot.clone()).await;
                self.notifier.notify(Notification::error("Error", error.user_message()));
                self.state.send_replace(MutationState::Failed { snapshot, error: error.clone() });
                Err(error)
            }
        }
    }

    pub(crate) fn cache(&self) -> &QueryCache {
        &self.cache
    }
}

/// Task mutations, with status changes sent through the transition endpoint
pub struct TaskMutations {
    tasks: Mutations<MaintenanceTask>,
    transitions: Arc<dyn TaskBackend>,
}

impl TaskMutations {
    pub fn new(
        backend: Arc<dyn Backend<MaintenanceTask>>,
        transitions: Arc<dyn TaskBackend>,
        cache: QueryCache,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            tasks: Mutations::new(backend, cache, notifier),
            transitions,
        }
    }

    /// Create, update and delete
    pub fn records(&self) -> &Mutations<MaintenanceTask> {
        &self.tasks
    }

    /// Move a cached task to `status`. Moves the status machine forbids are
    /// rejected before anything is sent.
    pub async fn transition(
        &self,
        id: i32,
        status: TaskStatus,
        actual_duration: Option<f64>,
    ) -> SyncResult<MaintenanceTask> {
        let cached: Vec<MaintenanceTask> = self
            .tasks
            .cache()
            .get(&MaintenanceTask::list_key())
            .await
            .unwrap_or_default();
        let current = cached
            .into_iter()
            .find(|t| t.id == id)
            .ok_or_else(|| SyncError::NotFound(format!("Maintenance task {} is not loaded", id)))?;

        if !current.status.can_transition_to(status) {
            return Err(SyncError::Data(format!(
                "Cannot move task {} from {} to {}",
                id, current.status, status
            )));
        }

        let mut moved = current;
        moved.status = status;
        if actual_duration.is_some() {
            moved.actual_duration = actual_duration;
        }

        let transitions = self.transitions.clone();
        let data = TaskTransition { status, actual_duration };
        let saved = self
            .tasks
            .run(Change::Update(moved), async move {
                transitions.transition(id, data).await.map(Some)
            })
            .await?;

        saved.ok_or_else(|| SyncError::Data(format!("No task returned for {}", id)))
    }
}
