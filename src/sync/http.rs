//! REST and SSE backend over reqwest

use std::time::Duration;

use async_trait::async_trait;
use eventsource_stream::{Event, EventStreamError, Eventsource};
use futures::StreamExt;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use super::{
    backend::{Backend, TaskBackend, TimeEntryBackend},
    error::{SyncError, SyncResult},
    realtime::{EventStream, RealtimeTransport, SubscriptionSpec},
    record::Record,
};
use crate::models::{
    maintenance::{MaintenanceTask, TaskTransition},
    realtime::ChangeEvent,
    time_entry::{StartTimeEntry, StopTimeEntry, TimeEntry},
};

const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    /// API root, e.g. `http://localhost:8080/api/v1`
    base_url: String,
    token: String,
}

impl HttpBackend {
    pub fn new(base_url: &str, token: &str) -> SyncResult<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| SyncError::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.bearer_auth(&self.token)
    }

    async fn send(&self, builder: RequestBuilder) -> SyncResult<Response> {
        let response = self
            .request(builder)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .send()
            .await?;
        check_status(response).await
    }

    async fn json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> SyncResult<T> {
        Ok(self.send(builder).await?.json().await?)
    }
}

/// Map error statuses onto the client error taxonomy
async fn check_status(response: Response) -> SyncResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(status_error(status, body))
}

pub(crate) fn status_error(status: StatusCode, body: String) -> SyncError {
    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or(body);

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => SyncError::Authorization(message),
        StatusCode::NOT_FOUND => SyncError::NotFound(message),
        StatusCode::BAD_REQUEST | StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => {
            SyncError::Data(message)
        }
        s if s.is_server_error() => SyncError::Service { status: s.as_u16(), message },
        s => SyncError::Network(format!("Unexpected status {}: {}", s, message)),
    }
}

#[async_trait]
impl<T: Record> Backend<T> for HttpBackend {
    async fn list(&self) -> SyncResult<Vec<T>> {
        self.json(self.client.get(self.url(T::PATH))).await
    }

    async fn create(&self, record: T) -> SyncResult<T> {
        self.json(self.client.post(self.url(T::PATH)).json(&record)).await
    }

    async fn update(&self, record: T) -> SyncResult<T> {
        let path = format!("{}/{}", T::PATH, record.id());
        self.json(self.client.put(self.url(&path)).json(&record)).await
    }

    async fn delete(&self, id: i32) -> SyncResult<()> {
        let path = format!("{}/{}", T::PATH, id);
        self.send(self.client.delete(self.url(&path))).await?;
        Ok(())
    }
}

#[async_trait]
impl TaskBackend for HttpBackend {
    async fn transition(&self, id: i32, data: TaskTransition) -> SyncResult<MaintenanceTask> {
        let url = self.url(&format!("{}/{}/status", MaintenanceTask::PATH, id));
        self.json(self.client.post(url).json(&data)).await
    }
}

#[async_trait]
impl TimeEntryBackend for HttpBackend {
    async fn current(&self) -> SyncResult<Option<TimeEntry>> {
        self.json(self.client.get(self.url("/time-entries/current"))).await
    }

    async fn start(&self, data: StartTimeEntry) -> SyncResult<TimeEntry> {
        self.json(self.client.post(self.url("/time-entries")).json(&data)).await
    }

    async fn pause(&self, id: Uuid) -> SyncResult<TimeEntry> {
        let url = self.url(&format!("/time-entries/{}/pause", id));
        self.json(self.client.post(url)).await
    }

    async fn resume(&self, id: Uuid) -> SyncResult<TimeEntry> {
        let url = self.url(&format!("/time-entries/{}/resume", id));
        self.json(self.client.post(url)).await
    }

    async fn stop(&self, id: Uuid, notes: Option<String>) -> SyncResult<TimeEntry> {
        let url = self.url(&format!("/time-entries/{}/stop", id));
        self.json(self.client.post(url).json(&StopTimeEntry { notes })).await
    }
}

#[async_trait]
impl RealtimeTransport for HttpBackend {
    async fn connect(&self, spec: &SubscriptionSpec) -> SyncResult<EventStream> {
        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(events) = spec.events_param() {
            query.push(("events", events));
        }
        if let Some(filter) = &spec.filter {
            query.push(("filter", filter.to_string()));
        }

        let url = self.url(&format!("/realtime/{}", spec.table));
        let response = self
            .request(self.client.get(url).query(&query))
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .send()
            .await?;
        let response = check_status(response).await?;

        let stream = response
            .bytes_stream()
            .eventsource()
            .filter_map(|item| async move {
                match item {
                    Ok(event) => decode_event(&event),
                    Err(e) => Some(Err(stream_error(e))),
                }
            });

        Ok(Box::pin(stream))
    }
}

/// Change events become stream items; the subscription ack and unknown events are skipped
fn decode_event(event: &Event) -> Option<SyncResult<ChangeEvent>> {
    match event.event.as_str() {
        "insert" | "update" | "delete" | "message" => {
            Some(serde_json::from_str(&event.data).map_err(SyncError::from))
        }
        _ => None,
    }
}

fn stream_error<E>(err: EventStreamError<E>) -> SyncError
where
    E: Into<SyncError> + std::fmt::Display,
{
    match err {
        EventStreamError::Transport(e) => e.into(),
        other => SyncError::Data(format!("Malformed event stream: {}", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::tests::{part, task};
    use crate::models::{realtime::ChangeKind, Part, Table, TaskStatus};
    use mockito::{Matcher, Server};

    fn frame(event: &str, data: &str) -> Event {
        Event {
            event: event.into(),
            data: data.into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_split_chunks_and_comments_decode() {
        let event = r#"{"table":"parts","event_type":"update","schema":"public","owner_id":"00000000-0000-0000-0000-000000000000","old":null,"new":{"id":1},"commit_timestamp":"2024-05-01T08:00:00Z"}"#;
        let (head, tail) = event.split_at(40);
        let chunks: Vec<Result<Vec<u8>, std::io::Error>> = vec![
            Ok(b": keep-alive\n\nevent: upd".to_vec()),
            Ok(format!("ate\r\ndata: {}", head).into_bytes()),
            Ok(format!("{}\r\n\r\n", tail).into_bytes()),
        ];

        let decoded: Vec<SyncResult<ChangeEvent>> = futures::stream::iter(chunks)
            .eventsource()
            .filter_map(|item| async move {
                match item {
                    Ok(event) => decode_event(&event),
                    Err(e) => Some(Err(stream_error(e))),
                }
            })
            .collect()
            .await;

        assert_eq!(decoded.len(), 1);
        let change = decoded[0].clone().unwrap();
        assert_eq!(change.event_type, ChangeKind::Update);
        assert_eq!(change.row_id(), Some(&serde_json::json!(1)));
    }

    #[test]
    fn test_subscribed_ack_is_skipped() {
        assert!(decode_event(&frame("subscribed", "{}")).is_none());
        assert!(matches!(
            decode_event(&frame("insert", "not json")),
            Some(Err(SyncError::Data(_)))
        ));
    }

    #[test]
    fn test_malformed_stream_is_a_data_error() {
        let utf8 = String::from_utf8(vec![0xff]).unwrap_err();
        let err = stream_error::<std::io::Error>(EventStreamError::Utf8(utf8));
        assert!(matches!(err, SyncError::Data(_)));
    }

    #[test]
    fn test_status_mapping() {
        let body = r#"{"code":3,"error":"Forbidden","message":"not yours"}"#;
        assert_eq!(
            status_error(StatusCode::FORBIDDEN, body.into()),
            SyncError::Authorization("not yours".into())
        );
        assert!(matches!(status_error(StatusCode::NOT_FOUND, String::new()), SyncError::NotFound(_)));
        assert!(matches!(
            status_error(StatusCode::BAD_GATEWAY, String::new()),
            SyncError::Service { status: 502, .. }
        ));
    }

    #[tokio::test]
    async fn test_list_and_update_parts() {
        let mut server = Server::new_async().await;
        let list = server
            .mock("GET", "/api/v1/parts")
            .match_header("authorization", "Bearer token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(serde_json::to_string(&vec![part(1, 4, Some(2))]).unwrap())
            .create_async()
            .await;
        let update = server
            .mock("PUT", "/api/v1/parts/1")
            .match_body(Matcher::PartialJson(serde_json::json!({"id": 1, "quantity": 9})))
            .with_status(403)
            .with_body(r#"{"code":3,"error":"Forbidden","message":"Part 1 belongs to another user"}"#)
            .create_async()
            .await;

        let backend = HttpBackend::new(&format!("{}/api/v1/", server.url()), "token").unwrap();
        let parts: Vec<Part> = Backend::<Part>::list(&backend).await.unwrap();
        assert_eq!(parts.len(), 1);

        let err = Backend::<Part>::update(&backend, part(1, 9, Some(2))).await.unwrap_err();
        assert!(err.is_authorization());

        list.assert_async().await;
        update.assert_async().await;
    }

    #[tokio::test]
    async fn test_task_transition_posts_status() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/v1/maintenance/tasks/4/status")
            .match_body(Matcher::PartialJson(serde_json::json!({"status": "in_progress"})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(serde_json::to_string(&task(4, TaskStatus::InProgress, None)).unwrap())
            .create_async()
            .await;

        let backend = HttpBackend::new(&format!("{}/api/v1", server.url()), "token").unwrap();
        let data = TaskTransition { status: TaskStatus::InProgress, actual_duration: None };
        let saved = backend.transition(4, data).await.unwrap();

        assert_eq!(saved.status, TaskStatus::InProgress);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_realtime_stream_decodes_events() {
        let event = ChangeEvent {
            table: Table::Parts,
            event_type: ChangeKind::Insert,
            schema: "public".into(),
            owner_id: Uuid::nil(),
            old: None,
            new: Some(serde_json::json!({"id": 3})),
            commit_timestamp: chrono::Utc::now(),
        };
        let body = format!(
            "event: subscribed\ndata: {{\"table\":\"parts\"}}\n\nevent: insert\ndata: {}\n\n",
            serde_json::to_string(&event).unwrap()
        );

        let mut server = Server::new_async().await;
        server
            .mock("GET", "/api/v1/realtime/parts")
            .match_query(Matcher::UrlEncoded("events".into(), "insert".into()))
            .with_status(200)
            .with_header("content-type", "text/event-stream")
            .with_body(body)
            .create_async()
            .await;

        let backend = HttpBackend::new(&format!("{}/api/v1", server.url()), "token").unwrap();
        let spec = SubscriptionSpec::new(Table::Parts).events(&[ChangeKind::Insert]);
        let mut stream = backend.connect(&spec).await.unwrap();

        assert_eq!(stream.next().await, Some(Ok(event)));
        assert_eq!(stream.next().await, None);
    }
}
