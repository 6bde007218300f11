//! Network boundary of the sync client

use async_trait::async_trait;
use uuid::Uuid;

use super::{error::SyncResult, record::Record};
use crate::models::{
    maintenance::{MaintenanceTask, TaskTransition},
    time_entry::{StartTimeEntry, TimeEntry},
};

/// CRUD on one table
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Backend<T: Record>: Send + Sync {
    async fn list(&self) -> SyncResult<Vec<T>>;
    async fn create(&self, record: T) -> SyncResult<T>;
    async fn update(&self, record: T) -> SyncResult<T>;
    async fn delete(&self, id: i32) -> SyncResult<()>;
}

/// Task status changes, which the update endpoint does not accept
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskBackend: Send + Sync {
    async fn transition(&self, id: i32, data: TaskTransition) -> SyncResult<MaintenanceTask>;
}

/// Time tracking session calls
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TimeEntryBackend: Send + Sync {
    /// Active or paused session of the caller
    async fn current(&self) -> SyncResult<Option<TimeEntry>>;
    async fn start(&self, data: StartTimeEntry) -> SyncResult<TimeEntry>;
    async fn pause(&self, id: Uuid) -> SyncResult<TimeEntry>;
    async fn resume(&self, id: Uuid) -> SyncResult<TimeEntry>;
    async fn stop(&self, id: Uuid, notes: Option<String>) -> SyncResult<TimeEntry>;
}
