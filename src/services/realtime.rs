//! Change feed: every committed row change is broadcast to realtime subscribers

use chrono::Utc;
use serde::Serialize;
use tokio::sync::broadcast;
use tokio_stream::{wrappers::BroadcastStream, Stream, StreamExt};
use uuid::Uuid;

use crate::models::realtime::{ChangeEvent, ChangeKind, RowFilter, Table};

pub const SCHEMA: &str = "public";

/// What a subscriber wants to receive
#[derive(Debug, Clone)]
pub struct Subscription {
    pub owner_id: Uuid,
    pub table: Table,
    /// Empty means every kind
    pub kinds: Vec<ChangeKind>,
    pub filter: Option<RowFilter>,
}

impl Subscription {
    pub fn matches(&self, event: &ChangeEvent) -> bool {
        event.owner_id == self.owner_id
            && event.table == self.table
            && (self.kinds.is_empty() || self.kinds.contains(&event.event_type))
            && self.filter.as_ref().map_or(true, |f| f.matches(event))
    }
}

#[derive(Clone)]
pub struct ChangeFeed {
    sender: broadcast::Sender<ChangeEvent>,
}

impl ChangeFeed {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    fn snapshot<T: Serialize>(row: Option<&T>) -> Option<serde_json::Value> {
        row.and_then(|r| match serde_json::to_value(r) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("Failed to serialize change snapshot: {}", e);
                None
            }
        })
    }

    /// Broadcast a change; having no subscriber is not an error
    pub fn publish<T: Serialize>(
        &self,
        table: Table,
        event_type: ChangeKind,
        owner_id: Uuid,
        old: Option<&T>,
        new: Option<&T>,
    ) {
        let event = ChangeEvent {
            table,
            event_type,
            schema: SCHEMA.to_string(),
            owner_id,
            old: Self::snapshot(old),
            new: Self::snapshot(new),
            commit_timestamp: Utc::now(),
        };

        match self.sender.send(event) {
            Ok(receivers) => tracing::debug!("{} {} delivered to {} subscribers", table, event_type.as_str(), receivers),
            Err(_) => tracing::trace!("{} {} published without subscribers", table, event_type.as_str()),
        }
    }

    pub fn inserted<T: Serialize>(&self, table: Table, owner_id: Uuid, row: &T) {
        self.publish(table, ChangeKind::Insert, owner_id, None, Some(row));
    }

    pub fn updated<T: Serialize>(&self, table: Table, owner_id: Uuid, old: Option<&T>, new: &T) {
        self.publish(table, ChangeKind::Update, owner_id, old, Some(new));
    }

    pub fn deleted<T: Serialize>(&self, table: Table, owner_id: Uuid, row: &T) {
        self.publish(table, ChangeKind::Delete, owner_id, Some(row), None);
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Stream of the events matching `subscription`. A lagging subscriber skips the
    /// events it missed; clients refetch on the next event anyway.
    pub fn subscribe(&self, subscription: Subscription) -> impl Stream<Item = ChangeEvent> + Send + 'static {
        BroadcastStream::new(self.sender.subscribe()).filter_map(move |item| match item {
            Ok(event) if subscription.matches(&event) => Some(event),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!("Realtime subscriber on {} lagged: {}", subscription.table, e);
                None
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;

    fn subscription(owner_id: Uuid, kinds: Vec<ChangeKind>, filter: Option<&str>) -> Subscription {
        Subscription {
            owner_id,
            table: Table::Parts,
            kinds,
            filter: filter.map(|f| RowFilter::parse(f).unwrap()),
        }
    }

    async fn next(stream: &mut (impl Stream<Item = ChangeEvent> + Unpin)) -> Option<ChangeEvent> {
        tokio::time::timeout(Duration::from_millis(100), stream.next())
            .await
            .ok()
            .flatten()
    }

    #[tokio::test]
    async fn test_subscriber_receives_own_rows_only() {
        let feed = ChangeFeed::new(16);
        let owner = Uuid::new_v4();
        let stream = feed.subscribe(subscription(owner, vec![], None));
        tokio::pin!(stream);

        feed.inserted(Table::Parts, Uuid::new_v4(), &json!({"id": 1}));
        feed.inserted(Table::Equipment, owner, &json!({"id": 2}));
        feed.inserted(Table::Parts, owner, &json!({"id": 3}));

        let event = next(&mut stream).await.unwrap();
        assert_eq!(event.row_id(), Some(&json!(3)));
        assert_eq!(event.schema, SCHEMA);
        assert!(next(&mut stream).await.is_none());
    }

    #[tokio::test]
    async fn test_kinds_and_filter() {
        let feed = ChangeFeed::new(16);
        let owner = Uuid::new_v4();
        let stream = feed.subscribe(subscription(owner, vec![ChangeKind::Delete], Some("id=eq.7")));
        tokio::pin!(stream);

        feed.inserted(Table::Parts, owner, &json!({"id": 7}));
        feed.deleted(Table::Parts, owner, &json!({"id": 8}));
        feed.deleted(Table::Parts, owner, &json!({"id": 7}));

        let event = next(&mut stream).await.unwrap();
        assert_eq!(event.event_type, ChangeKind::Delete);
        assert_eq!(event.old, Some(json!({"id": 7})));
        assert!(event.new.is_none());
    }

    #[tokio::test]
    async fn test_lagged_subscriber_keeps_going() {
        let feed = ChangeFeed::new(2);
        let owner = Uuid::new_v4();
        let stream = feed.subscribe(subscription(owner, vec![], None));
        tokio::pin!(stream);

        for id in 0..5 {
            feed.inserted(Table::Parts, owner, &json!({"id": id}));
        }

        let event = next(&mut stream).await.unwrap();
        assert_eq!(event.row_id(), Some(&json!(3)));
        assert_eq!(next(&mut stream).await.unwrap().row_id(), Some(&json!(4)));
    }

    #[test]
    fn test_publish_without_subscribers() {
        let feed = ChangeFeed::new(4);
        feed.inserted(Table::Parts, Uuid::nil(), &json!({"id": 1}));
        assert_eq!(feed.subscriber_count(), 0);
    }
}
