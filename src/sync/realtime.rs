//! Realtime subscription manager
//!
//! One task per subscription. Matching change events invoke the callback and
//! invalidate the table's cached queries. A failed or closed channel is
//! reopened with exponential backoff; once the attempts run out the
//! subscription stays in [`SubscriptionStatus::Failed`].

use std::{pin::Pin, sync::Arc, time::Duration};

use async_trait::async_trait;
use futures::{Stream, StreamExt};
use tokio::{sync::watch, task::JoinHandle};

use super::{
    cache::QueryCache,
    error::SyncError,
    notify::{Notification, Notifier},
    record::DASHBOARD_KEY,
};
use crate::models::realtime::{ChangeEvent, ChangeKind, RowFilter, Table};

pub const DEFAULT_SCHEMA: &str = "public";

/// What to listen to
#[derive(Debug, Clone, PartialEq)]
pub struct SubscriptionSpec {
    pub table: Table,
    /// Empty means every event type
    pub events: Vec<ChangeKind>,
    pub schema: String,
    pub filter: Option<RowFilter>,
    pub show_notifications: bool,
}

impl SubscriptionSpec {
    pub fn new(table: Table) -> Self {
        Self {
            table,
            events: Vec::new(),
            schema: DEFAULT_SCHEMA.to_string(),
            filter: None,
            show_notifications: true,
        }
    }

    pub fn events(mut self, events: &[ChangeKind]) -> Self {
        self.events = events.to_vec();
        self
    }

    pub fn filter(mut self, filter: RowFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn notifications(mut self, show: bool) -> Self {
        self.show_notifications = show;
        self
    }

    /// `events` query parameter value
    pub fn events_param(&self) -> Option<String> {
        if self.events.is_empty() {
            None
        } else {
            Some(self.events.iter().map(|k| k.as_str()).collect::<Vec<_>>().join(","))
        }
    }

    pub fn matches(&self, event: &ChangeEvent) -> bool {
        event.table == self.table
            && event.schema == self.schema
            && (self.events.is_empty() || self.events.contains(&event.event_type))
            && self.filter.as_ref().map_or(true, |f| f.matches(event))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub base: Duration,
    pub cap: Duration,
    pub max_attempts: u32,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            base: Duration::from_secs(1),
            cap: Duration::from_secs(30),
            max_attempts: 5,
        }
    }
}

impl ReconnectPolicy {
    /// `min(base * 2^attempt, cap)`
    pub fn delay(&self, attempt: u32) -> Duration {
        let factor = 2_u32.checked_pow(attempt).unwrap_or(u32::MAX);
        self.base.checked_mul(factor).map_or(self.cap, |d| d.min(self.cap))
    }

    /// Delay before the next attempt, `None` once `attempt` reached the maximum
    pub fn next_delay(&self, attempt: u32) -> Option<Duration> {
        (attempt < self.max_attempts).then(|| self.delay(attempt))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionStatus {
    Connecting,
    Subscribed,
    Reconnecting { attempt: u32, delay: Duration },
    Failed,
    Closed,
}

#[async_trait]
pub trait Clock: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

pub type EventStream = Pin<Box<dyn Stream<Item = Result<ChangeEvent, SyncError>> + Send>>;

/// Opens a channel delivering the events of one subscription
#[async_trait]
pub trait RealtimeTransport: Send + Sync {
    async fn connect(&self, spec: &SubscriptionSpec) -> Result<EventStream, SyncError>;
}

pub type EventCallback = Arc<dyn Fn(&ChangeEvent) + Send + Sync>;

#[derive(Clone)]
pub struct SubscriptionManager {
    transport: Arc<dyn RealtimeTransport>,
    cache: QueryCache,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    policy: ReconnectPolicy,
}

impl SubscriptionManager {
    pub fn new(
        transport: Arc<dyn RealtimeTransport>,
        cache: QueryCache,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            transport,
            cache,
            notifier,
            clock: Arc::new(TokioClock),
            policy: ReconnectPolicy::default(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_policy(mut self, policy: ReconnectPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Open a channel for `spec`; dropping the handle closes it
    pub fn subscribe<F>(&self, spec: SubscriptionSpec, callback: F) -> SubscriptionHandle
    where
        F: Fn(&ChangeEvent) + Send + Sync + 'static,
    {
        let (status_tx, status_rx) = watch::channel(SubscriptionStatus::Connecting);
        let worker = Worker {
            manager: self.clone(),
            spec,
            callback: Arc::new(callback),
            status: status_tx,
        };
        let task = tokio::spawn(worker.run());

        SubscriptionHandle {
            status: status_rx,
            task,
        }
    }
}

struct Worker {
    manager: SubscriptionManager,
    spec: SubscriptionSpec,
    callback: EventCallback,
    status: watch::Sender<SubscriptionStatus>,
}

impl Worker {
    async fn run(self) {
        let table = self.spec.table;
        let policy = self.manager.policy;
        let mut attempt = 0;

        loop {
            match self.manager.transport.connect(&self.spec).await {
                Ok(mut events) => {
                    attempt = 0;
                    self.status.send_replace(SubscriptionStatus::Subscribed);
                    tracing::info!("Subscribed to {} changes", table);

                    while let Some(item) = events.next().await {
                        match item {
                            Ok(event) => self.dispatch(&event).await,
                            Err(e) => {
                                tracing::warn!("Realtime channel for {} failed: {}", table, e);
                                break;
                            }
                        }
                    }
                    tracing::warn!("Realtime channel for {} closed", table);
                }
                Err(e) => tracing::warn!("Subscription to {} failed: {}", table, e),
            }

            match policy.next_delay(attempt) {
                Some(delay) => {
                    attempt += 1;
                    tracing::info!(
                        "Reconnecting to {} in {:?} (attempt {}/{})",
                        table,
                        delay,
                        attempt,
                        policy.max_attempts
                    );
                    self.status.send_replace(SubscriptionStatus::Reconnecting { attempt, delay });
                    self.manager.clock.sleep(delay).await;
                    self.status.send_replace(SubscriptionStatus::Connecting);
                }
                None => {
                    tracing::error!(
                        "Failed to reconnect to {} after {} attempts",
                        table,
                        policy.max_attempts
                    );
                    self.status.send_replace(SubscriptionStatus::Failed);
                    self.manager.notifier.notify(Notification::error(
                        "Connection lost",
                        format!("Live updates for {} are unavailable", table),
                    ));
                    return;
                }
            }
        }
    }

    async fn dispatch(&self, event: &ChangeEvent) {
        if !self.spec.matches(event) {
            return;
        }
        tracing::debug!("{} event on {}", event.event_type.as_str(), event.table);

        (self.callback)(event);
        self.manager.cache.invalidate(event.table.as_str()).await;
        self.manager.cache.invalidate(DASHBOARD_KEY).await;

        if self.spec.show_notifications {
            let title = match event.event_type {
                ChangeKind::Insert => "Item added",
                ChangeKind::Update => "Item updated",
                ChangeKind::Delete => "Item deleted",
            };
            self.manager
                .notifier
                .notify(Notification::info(title, format!("A row changed in {}", event.table)));
        }
    }
}

/// Live subscription; aborts its task when dropped
pub struct SubscriptionHandle {
    status: watch::Receiver<SubscriptionStatus>,
    task: JoinHandle<()>,
}

impl SubscriptionHandle {
    pub fn status(&self) -> SubscriptionStatus {
        self.status.borrow().clone()
    }

    pub fn watch(&self) -> watch::Receiver<SubscriptionStatus> {
        self.status.clone()
    }

    pub fn close(self) {
        drop(self);
    }
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        self.task.abort();
        tracing::debug!("Realtime subscription closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::notify::tests::RecordingNotifier;
    use chrono::Utc;
    use serde_json::json;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    };
    use uuid::Uuid;

    /// Records requested sleeps without waiting
    #[derive(Default)]
    struct FakeClock {
        sleeps: Mutex<Vec<Duration>>,
    }

    #[async_trait]
    impl Clock for FakeClock {
        async fn sleep(&self, duration: Duration) {
            self.sleeps.lock().unwrap().push(duration);
            tokio::task::yield_now().await;
        }
    }

    /// Fails the first `failures` connects, then serves `events` and stays open
    struct FakeTransport {
        failures: usize,
        connects: AtomicUsize,
        events: Vec<ChangeEvent>,
    }

    #[async_trait]
    impl RealtimeTransport for FakeTransport {
        async fn connect(&self, _spec: &SubscriptionSpec) -> Result<EventStream, SyncError> {
            let n = self.connects.fetch_add(1, Ordering::SeqCst);
            if n < self.failures {
                return Err(SyncError::Network("channel error".into()));
            }
            let events: Vec<Result<ChangeEvent, SyncError>> =
                self.events.iter().cloned().map(Ok).collect();
            Ok(Box::pin(futures::stream::iter(events).chain(futures::stream::pending())))
        }
    }

    fn event(kind: ChangeKind, id: i32) -> ChangeEvent {
        ChangeEvent {
            table: Table::Parts,
            event_type: kind,
            schema: DEFAULT_SCHEMA.to_string(),
            owner_id: Uuid::nil(),
            old: None,
            new: Some(json!({ "id": id, "category": "filters" })),
            commit_timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_backoff_sequence() {
        let policy = ReconnectPolicy::default();
        let delays: Vec<u64> = (0..6)
            .map_while(|a| policy.next_delay(a))
            .map(|d| d.as_secs())
            .collect();
        assert_eq!(delays, vec![1, 2, 4, 8, 16]);
        assert_eq!(policy.next_delay(5), None);
    }

    #[test]
    fn test_backoff_is_capped() {
        let policy = ReconnectPolicy::default();
        assert_eq!(policy.delay(5), Duration::from_secs(30));
        assert_eq!(policy.delay(40), Duration::from_secs(30));
    }

    #[test]
    fn test_spec_matching() {
        let spec = SubscriptionSpec::new(Table::Parts)
            .events(&[ChangeKind::Update])
            .filter(RowFilter::parse("category=eq.filters").unwrap());
        assert!(spec.matches(&event(ChangeKind::Update, 1)));
        assert!(!spec.matches(&event(ChangeKind::Insert, 1)));
        assert_eq!(spec.events_param().as_deref(), Some("update"));
        assert_eq!(SubscriptionSpec::new(Table::Parts).events_param(), None);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let clock = Arc::new(FakeClock::default());
        let transport = Arc::new(FakeTransport {
            failures: usize::MAX,
            connects: AtomicUsize::new(0),
            events: vec![],
        });
        let notifier = Arc::new(RecordingNotifier::default());
        let manager = SubscriptionManager::new(transport.clone(), QueryCache::new(), notifier.clone())
            .with_clock(clock.clone());

        let handle = manager.subscribe(SubscriptionSpec::new(Table::Parts), |_| {});
        let mut status = handle.watch();
        status
            .wait_for(|s| *s == SubscriptionStatus::Failed)
            .await
            .unwrap();

        let sleeps: Vec<u64> = clock.sleeps.lock().unwrap().iter().map(|d| d.as_secs()).collect();
        assert_eq!(sleeps, vec![1, 2, 4, 8, 16]);
        assert_eq!(transport.connects.load(Ordering::SeqCst), 6);
        assert_eq!(notifier.all().len(), 1);
    }

    #[tokio::test]
    async fn test_events_invoke_callback_and_invalidate_cache() {
        let cache = QueryCache::new();
        cache.set("parts", &vec![1]).await.unwrap();
        cache.set("dashboard", &1).await.unwrap();
        cache.set("equipment", &vec![1]).await.unwrap();

        let transport = Arc::new(FakeTransport {
            failures: 2,
            connects: AtomicUsize::new(0),
            events: vec![event(ChangeKind::Insert, 1), event(ChangeKind::Delete, 2)],
        });
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = seen.clone();

        let manager = SubscriptionManager::new(
            transport,
            cache.clone(),
            Arc::new(RecordingNotifier::default()),
        )
        .with_clock(Arc::new(FakeClock::default()));

        let spec = SubscriptionSpec::new(Table::Parts).events(&[ChangeKind::Insert]);
        let handle = manager.subscribe(spec, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        handle
            .watch()
            .wait_for(|s| *s == SubscriptionStatus::Subscribed)
            .await
            .unwrap();
        for _ in 0..100 {
            if seen.load(Ordering::SeqCst) > 0 && !cache.contains("dashboard").await {
                break;
            }
            tokio::task::yield_now().await;
        }

        assert_eq!(seen.load(Ordering::SeqCst), 1);
        assert!(!cache.contains("parts").await);
        assert!(!cache.contains("dashboard").await);
        assert!(cache.contains("equipment").await);
        assert_eq!(handle.status(), SubscriptionStatus::Subscribed);
        handle.close();
    }
}
