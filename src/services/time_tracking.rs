//! Time tracking sessions

use chrono::Utc;
use uuid::Uuid;

use super::realtime::ChangeFeed;
use crate::{
    dashboard::{summarize_time, TimeSummary},
    error::AppResult,
    models::{
        realtime::Table,
        time_entry::{
            hours_between, next_status, StartTimeEntry, StopTimeEntry, TimeAction, TimeEntry,
            TimeEntryQuery,
        },
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct TimeTrackingService {
    repository: Repository,
    feed: ChangeFeed,
}

impl TimeTrackingService {
    pub fn new(repository: Repository, feed: ChangeFeed) -> Self {
        Self { repository, feed }
    }

    pub async fn list(&self, user_id: Uuid, query: &TimeEntryQuery) -> AppResult<Vec<TimeEntry>> {
        self.repository.time_entries.list(user_id, query).await
    }

    pub async fn get_by_id(&self, user_id: Uuid, id: Uuid) -> AppResult<TimeEntry> {
        self.repository.time_entries.get(user_id, id).await
    }

    /// The user's running or paused session
    pub async fn current(&self, user_id: Uuid) -> AppResult<Option<TimeEntry>> {
        self.repository.time_entries.current(user_id).await
    }

    /// Start a session. Overlapping sessions are not refused here; the client
    /// keeps a single one open.
    pub async fn start(&self, user_id: Uuid, data: &StartTimeEntry) -> AppResult<TimeEntry> {
        next_status(None, TimeAction::Start)?;
        if let Some(equipment_id) = data.equipment_id {
            self.repository.equipment.get(user_id, equipment_id).await?;
        }

        let entry = self.repository.time_entries.create(user_id, data, Utc::now()).await?;
        tracing::info!("Time entry {} started ({})", entry.id, entry.task_type);
        self.feed.inserted(Table::TimeEntries, user_id, &entry);
        Ok(entry)
    }

    pub async fn pause(&self, user_id: Uuid, id: Uuid) -> AppResult<TimeEntry> {
        self.change_status(user_id, id, TimeAction::Pause).await
    }

    pub async fn resume(&self, user_id: Uuid, id: Uuid) -> AppResult<TimeEntry> {
        self.change_status(user_id, id, TimeAction::Resume).await
    }

    async fn change_status(&self, user_id: Uuid, id: Uuid, action: TimeAction) -> AppResult<TimeEntry> {
        let old = self.repository.time_entries.get(user_id, id).await?;
        let status = next_status(Some(old.status), action)?;

        let entry = self.repository.time_entries.set_status(user_id, id, status).await?;
        tracing::debug!("Time entry {}: {} -> {}", id, old.status, entry.status);
        self.feed.updated(Table::TimeEntries, user_id, Some(&old), &entry);
        Ok(entry)
    }

    /// Close a session; duration is the wall-clock time since start, in hours
    pub async fn stop(&self, user_id: Uuid, id: Uuid, data: &StopTimeEntry) -> AppResult<TimeEntry> {
        let old = self.repository.time_entries.get(user_id, id).await?;
        next_status(Some(old.status), TimeAction::Stop)?;

        let end_time = Utc::now();
        let duration = hours_between(old.start_time, end_time);
        let entry = self
            .repository
            .time_entries
            .complete(user_id, id, end_time, duration, data.notes.as_deref())
            .await?;
        tracing::info!("Time entry {} stopped after {:.2}h", id, duration);
        self.feed.updated(Table::TimeEntries, user_id, Some(&old), &entry);
        Ok(entry)
    }

    pub async fn delete(&self, user_id: Uuid, id: Uuid) -> AppResult<()> {
        let entry = self.repository.time_entries.delete(user_id, id).await?;
        self.feed.deleted(Table::TimeEntries, user_id, &entry);
        Ok(())
    }

    /// Hours per task type and equipment over the selected entries
    pub async fn summary(&self, user_id: Uuid, query: &TimeEntryQuery) -> AppResult<TimeSummary> {
        let entries = self.repository.time_entries.list(user_id, query).await?;
        Ok(summarize_time(&entries, Utc::now()))
    }
}
