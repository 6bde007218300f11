//! Client side of the time tracking session
//!
//! The cached current entry decides what is allowed: a second start is
//! refused locally without touching the running entry, and the transitions
//! follow [`next_status`].

use std::sync::Arc;

use super::{
    backend::TimeEntryBackend,
    cache::QueryCache,
    error::{SyncError, SyncResult},
    notify::{Notification, Notifier},
    record::DASHBOARD_KEY,
};
use crate::models::{
    realtime::Table,
    time_entry::{next_status, InvalidTransition, StartTimeEntry, TimeAction, TimeEntry},
};

pub const CURRENT_ENTRY_KEY: &str = "time_entries:current";

pub struct TimeTracker {
    backend: Arc<dyn TimeEntryBackend>,
    cache: QueryCache,
    notifier: Arc<dyn Notifier>,
}

impl TimeTracker {
    pub fn new(backend: Arc<dyn TimeEntryBackend>, cache: QueryCache, notifier: Arc<dyn Notifier>) -> Self {
        Self { backend, cache, notifier }
    }

    /// Cached active or paused entry
    pub async fn current(&self) -> Option<TimeEntry> {
        self.cache.get(CURRENT_ENTRY_KEY).await
    }

    /// Reload the current entry from the backend
    pub async fn refresh(&self) -> SyncResult<Option<TimeEntry>> {
        let entry = self.backend.current().await?;
        self.store(entry.as_ref()).await?;
        Ok(entry)
    }

    pub async fn start(&self, data: StartTimeEntry) -> SyncResult<TimeEntry> {
        if let Some(active) = self.current().await {
            let err = SyncError::AlreadyActive(active.id);
            self.notifier.notify(Notification::error("Time tracking", err.user_message()));
            return Err(err);
        }
        next_status(None, TimeAction::Start)?;

        let entry = self.call(self.backend.start(data)).await?;
        self.store(Some(&entry)).await?;
        self.notifier.notify(Notification::success("Time tracking", "Session started"));
        Ok(entry)
    }

    pub async fn pause(&self) -> SyncResult<TimeEntry> {
        let active = self.expect_current(TimeAction::Pause).await?;
        next_status(Some(active.status), TimeAction::Pause)?;

        let entry = self.call(self.backend.pause(active.id)).await?;
        let entry = keep_start_time(&active, entry);
        self.store(Some(&entry)).await?;
        Ok(entry)
    }

    pub async fn resume(&self) -> SyncResult<TimeEntry> {
        let paused = self.expect_current(TimeAction::Resume).await?;
        next_status(Some(paused.status), TimeAction::Resume)?;

        let entry = self.call(self.backend.resume(paused.id)).await?;
        let entry = keep_start_time(&paused, entry);
        self.store(Some(&entry)).await?;
        Ok(entry)
    }

    pub async fn stop(&self, notes: Option<String>) -> SyncResult<TimeEntry> {
        let running = self.expect_current(TimeAction::Stop).await?;
        next_status(Some(running.status), TimeAction::Stop)?;

        let entry = self.call(self.backend.stop(running.id, notes)).await?;
        self.store(None).await?;
        self.notifier.notify(Notification::success(
            "Time tracking",
            format!("Session stopped ({:.2} h)", entry.duration.unwrap_or_default()),
        ));
        Ok(entry)
    }

    async fn expect_current(&self, action: TimeAction) -> SyncResult<TimeEntry> {
        self.current()
            .await
            .ok_or_else(|| InvalidTransition { from: None, action }.into())
    }

    async fn call<F>(&self, request: F) -> SyncResult<TimeEntry>
    where
        F: std::future::Future<Output = SyncResult<TimeEntry>>,
    {
        request.await.map_err(|e| {
            self.notifier.notify(Notification::error("Time tracking", e.user_message()));
            e
        })
    }

    /// Invalidates the time entry queries, the current entry key included, then
    /// caches `entry` as current
    async fn store(&self, entry: Option<&TimeEntry>) -> SyncResult<()> {
        self.cache.invalidate(Table::TimeEntries.as_str()).await;
        self.cache.invalidate(DASHBOARD_KEY).await;
        if let Some(entry) = entry {
            self.cache.set(CURRENT_ENTRY_KEY, entry).await?;
        }
        Ok(())
    }
}

/// Pausing and resuming never move the session start
fn keep_start_time(before: &TimeEntry, mut after: TimeEntry) -> TimeEntry {
    if after.start_time != before.start_time {
        tracing::warn!("Time entry {} came back with a different start time", after.id);
        after.start_time = before.start_time;
    }
    after
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::tests::time_entry;
    use crate::models::{TimeEntryStatus, TimeEntryTaskType};
    use crate::sync::{backend::MockTimeEntryBackend, notify::tests::RecordingNotifier};
    use chrono::{Duration, Utc};

    fn start_request() -> StartTimeEntry {
        StartTimeEntry {
            equipment_id: Some(1),
            intervention_id: None,
            task_type: TimeEntryTaskType::Maintenance,
            custom_task_type: None,
            title: None,
            notes: None,
            location: None,
            coordinates: None,
        }
    }

    fn with_status(entry: &TimeEntry, status: TimeEntryStatus) -> TimeEntry {
        let mut next = entry.clone();
        next.status = status;
        next
    }

    fn tracker(backend: MockTimeEntryBackend, cache: QueryCache) -> TimeTracker {
        TimeTracker::new(Arc::new(backend), cache, Arc::new(RecordingNotifier::default()))
    }

    #[tokio::test]
    async fn test_second_start_is_rejected_without_touching_active_entry() {
        let cache = QueryCache::new();
        let active = time_entry(TimeEntryTaskType::Repair, Some(2), Utc::now() - Duration::hours(1));
        cache.set(CURRENT_ENTRY_KEY, &active).await.unwrap();

        let mut backend = MockTimeEntryBackend::new();
        backend.expect_start().never();

        let tracker = tracker(backend, cache);
        let err = tracker.start(start_request()).await.unwrap_err();

        assert_eq!(err, SyncError::AlreadyActive(active.id));
        assert_eq!(tracker.current().await, Some(active));
    }

    #[tokio::test]
    async fn test_pause_resume_keeps_start_time() {
        let start = Utc::now() - Duration::minutes(30);
        let entry = time_entry(TimeEntryTaskType::Maintenance, Some(1), start);

        let mut backend = MockTimeEntryBackend::new();
        let started = entry.clone();
        backend.expect_start().times(1).returning(move |_| Ok(started.clone()));
        let paused = with_status(&entry, TimeEntryStatus::Paused);
        backend.expect_pause().times(1).returning(move |_| Ok(paused.clone()));
        let mut resumed = with_status(&entry, TimeEntryStatus::Active);
        resumed.start_time = Utc::now();
        backend.expect_resume().times(1).returning(move |_| Ok(resumed.clone()));

        let tracker = tracker(backend, QueryCache::new());
        tracker.start(start_request()).await.unwrap();

        let after_pause = tracker.pause().await.unwrap();
        assert_eq!(after_pause.status, TimeEntryStatus::Paused);
        assert_eq!(after_pause.start_time, start);

        let after_resume = tracker.resume().await.unwrap();
        assert_eq!(after_resume.status, TimeEntryStatus::Active);
        assert_eq!(after_resume.start_time, start);
        assert_eq!(tracker.current().await.map(|e| e.start_time), Some(start));
    }

    #[tokio::test]
    async fn test_invalid_transitions_are_local() {
        let cache = QueryCache::new();
        let mut backend = MockTimeEntryBackend::new();
        backend.expect_pause().never();
        backend.expect_resume().never();
        let tracker = tracker(backend, cache.clone());

        assert!(matches!(tracker.pause().await, Err(SyncError::InvalidTransition(_))));

        let active = time_entry(TimeEntryTaskType::Other, None, Utc::now());
        cache.set(CURRENT_ENTRY_KEY, &active).await.unwrap();
        assert!(matches!(tracker.resume().await, Err(SyncError::InvalidTransition(_))));
    }

    #[tokio::test]
    async fn test_stop_clears_current_entry() {
        let cache = QueryCache::new();
        let active = time_entry(TimeEntryTaskType::Repair, None, Utc::now() - Duration::hours(2));
        cache.set(CURRENT_ENTRY_KEY, &active).await.unwrap();
        cache.set("time_entries", &Vec::<TimeEntry>::new()).await.unwrap();

        let mut stopped = with_status(&active, TimeEntryStatus::Completed);
        stopped.end_time = Some(Utc::now());
        stopped.duration = Some(2.0);

        let mut backend = MockTimeEntryBackend::new();
        let id = active.id;
        backend
            .expect_stop()
            .withf(move |entry_id, notes| *entry_id == id && notes.as_deref() == Some("done"))
            .times(1)
            .returning(move |_, _| Ok(stopped.clone()));

        let tracker = tracker(backend, cache.clone());
        let entry = tokio_test::assert_ok!(tracker.stop(Some("done".into())).await);

        assert_eq!(entry.status, TimeEntryStatus::Completed);
        assert_eq!(tracker.current().await, None);
        assert!(!cache.contains("time_entries").await);
    }

    #[tokio::test]
    async fn test_backend_failure_keeps_state() {
        let cache = QueryCache::new();
        let active = time_entry(TimeEntryTaskType::Repair, None, Utc::now());
        cache.set(CURRENT_ENTRY_KEY, &active).await.unwrap();

        let mut backend = MockTimeEntryBackend::new();
        backend
            .expect_pause()
            .returning(|_| Err(SyncError::Network("offline".into())));

        let tracker = tracker(backend, cache);
        tokio_test::assert_err!(tracker.pause().await);
        assert_eq!(tracker.current().await, Some(active));
    }
}
