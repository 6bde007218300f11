//! Time tracking sessions
//!
//! A session moves through `none -> active <-> paused -> completed`.
//! [`next_status`] is the single definition of the allowed moves and is used by
//! both the server and the sync client.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use thiserror::Error;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::enums::{TimeEntryStatus, TimeEntryTaskType};
use super::intervention::Coordinates;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct TimeEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub equipment_id: Option<i32>,
    pub intervention_id: Option<i32>,
    pub task_type: TimeEntryTaskType,
    pub custom_task_type: Option<String>,
    pub title: Option<String>,
    pub notes: Option<String>,
    pub location: Option<String>,
    #[schema(value_type = Option<Coordinates>)]
    pub coordinates: Option<Json<Coordinates>>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    /// Hours, set when the session is stopped
    pub duration: Option<f64>,
    pub status: TimeEntryStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TimeEntry {
    /// Elapsed hours between start and end (or `now` for open sessions)
    pub fn elapsed_hours(&self, now: DateTime<Utc>) -> f64 {
        let end = self.end_time.unwrap_or(now);
        hours_between(self.start_time, end)
    }
}

pub fn hours_between(start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    ((end - start).num_seconds().max(0) as f64) / 3600.0
}

/// Actions a user can take on a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TimeAction {
    Start,
    Pause,
    Resume,
    Stop,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot {action:?} a time entry that is {}", describe(.from))]
pub struct InvalidTransition {
    pub from: Option<TimeEntryStatus>,
    pub action: TimeAction,
}

fn describe(status: &Option<TimeEntryStatus>) -> &'static str {
    status.map(|s| s.as_str()).unwrap_or("not started")
}

/// Status after applying `action` to a session in state `current` (`None` = no session)
pub fn next_status(
    current: Option<TimeEntryStatus>,
    action: TimeAction,
) -> Result<TimeEntryStatus, InvalidTransition> {
    use TimeEntryStatus::*;

    match (current, action) {
        (None, TimeAction::Start) => Ok(Active),
        (Some(Active), TimeAction::Pause) => Ok(Paused),
        (Some(Paused), TimeAction::Resume) => Ok(Active),
        (Some(Active), TimeAction::Stop) | (Some(Paused), TimeAction::Stop) => Ok(Completed),
        (from, action) => Err(InvalidTransition { from, action }),
    }
}

/// Start a new time tracking session
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct StartTimeEntry {
    pub equipment_id: Option<i32>,
    pub intervention_id: Option<i32>,
    pub task_type: TimeEntryTaskType,
    #[validate(length(max = 100))]
    pub custom_task_type: Option<String>,
    #[validate(length(max = 200))]
    pub title: Option<String>,
    pub notes: Option<String>,
    pub location: Option<String>,
    pub coordinates: Option<Coordinates>,
}

/// Closing notes recorded when a session is stopped
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct StopTimeEntry {
    pub notes: Option<String>,
}

/// Query parameters for listing time entries
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct TimeEntryQuery {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub equipment_id: Option<i32>,
    pub intervention_id: Option<i32>,
    pub task_type: Option<TimeEntryTaskType>,
    pub status: Option<TimeEntryStatus>,
}
