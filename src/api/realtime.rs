//! Realtime change stream (server-sent events)

use std::time::Duration;

use axum::{
    extract::{Path, Query, State},
    response::sse::{Event, KeepAlive, Sse},
};
use serde_json::json;
use tokio_stream::{Stream, StreamExt};

use crate::{
    error::{AppError, AppResult},
    models::realtime::{SubscriptionQuery, Table},
    services::realtime::Subscription,
};

use super::AuthenticatedUser;

/// Name of the first frame sent once the subscription is registered
pub const SUBSCRIBED_EVENT: &str = "subscribed";

/// Subscribe to row changes of a table
///
/// Each change is sent as an SSE frame whose event name is the change kind
/// (`insert`, `update`, `delete`) and whose data is the JSON change event.
#[utoipa::path(
    get,
    path = "/realtime/{table}",
    tag = "realtime",
    security(("bearer_auth" = [])),
    params(
        ("table" = String, Path, description = "Table name, e.g. parts or maintenance_tasks"),
        SubscriptionQuery
    ),
    responses(
        (status = 200, description = "Event stream", content_type = "text/event-stream", body = crate::models::realtime::ChangeEvent),
        (status = 400, description = "Unknown table, event type or filter", body = crate::error::ErrorResponse)
    )
)]
pub async fn subscribe(
    State(state): State<crate::AppState>,
    user: AuthenticatedUser,
    Path(table): Path<String>,
    Query(query): Query<SubscriptionQuery>,
) -> AppResult<Sse<impl Stream<Item = Result<Event, axum::Error>>>> {
    let table: Table = table.parse().map_err(AppError::BadRequest)?;
    let kinds = query.kinds().map_err(AppError::BadRequest)?;
    let filter = query.row_filter().map_err(AppError::BadRequest)?;

    tracing::info!(
        "Realtime subscription on {} for {} (events: {:?}, filter: {:?})",
        table,
        user.owner_id(),
        kinds,
        filter.as_ref().map(|f| f.to_string())
    );

    let ack = Event::default().event(SUBSCRIBED_EVENT).json_data(json!({
        "table": table,
        "events": kinds,
        "filter": filter.as_ref().map(|f| f.to_string()),
    }));

    let changes = state
        .services
        .feed
        .subscribe(Subscription {
            owner_id: user.owner_id(),
            table,
            kinds,
            filter,
        })
        .map(|event| Event::default().event(event.event_type.as_str()).json_data(&event));

    let stream = tokio_stream::once(ack).chain(changes);
    let keep_alive = KeepAlive::new().interval(Duration::from_secs(state.config.realtime.keep_alive_seconds));

    Ok(Sse::new(stream).keep_alive(keep_alive))
}
