//! Field intervention model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::enums::{InterventionStatus, Priority};

/// GPS position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// A part consumed during an intervention
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PartUsage {
    pub part_id: i32,
    pub name: String,
    pub quantity: i32,
}

/// Intervention record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Intervention {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub equipment_id: Option<i32>,
    /// Equipment name at the time the intervention was created
    pub equipment: Option<String>,
    pub status: InterventionStatus,
    pub priority: Priority,
    pub date: DateTime<Utc>,
    /// Actual duration in hours
    pub duration: Option<f64>,
    /// Planned duration in hours
    pub scheduled_duration: Option<f64>,
    pub technician: Option<String>,
    pub location: Option<String>,
    #[schema(value_type = Option<Coordinates>)]
    pub coordinates: Option<Json<Coordinates>>,
    #[schema(value_type = Vec<PartUsage>)]
    pub parts_used: Json<Vec<PartUsage>>,
    pub notes: Option<String>,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InterventionStatus {
    pub fn is_open(&self) -> bool {
        matches!(self, InterventionStatus::Scheduled | InterventionStatus::InProgress)
    }
}

/// Create intervention request
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateIntervention {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    pub description: Option<String>,
    pub equipment_id: Option<i32>,
    pub priority: Option<Priority>,
    pub date: DateTime<Utc>,
    #[validate(range(min = 0.0, max = 1000.0))]
    pub scheduled_duration: Option<f64>,
    pub technician: Option<String>,
    pub location: Option<String>,
    pub coordinates: Option<Coordinates>,
    pub notes: Option<String>,
}

/// Update intervention request
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateIntervention {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<InterventionStatus>,
    pub priority: Option<Priority>,
    pub date: Option<DateTime<Utc>>,
    #[validate(range(min = 0.0, max = 1000.0))]
    pub scheduled_duration: Option<f64>,
    pub technician: Option<String>,
    pub location: Option<String>,
    pub coordinates: Option<Coordinates>,
    pub notes: Option<String>,
}

/// Completion report: closes the intervention and consumes parts from stock
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct InterventionReport {
    #[validate(range(min = 0.0, max = 1000.0))]
    pub duration: f64,
    pub notes: Option<String>,
    #[serde(default)]
    pub parts_used: Vec<PartUsage>,
}

/// Query parameters for listing interventions
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct InterventionQuery {
    pub status: Option<InterventionStatus>,
    pub priority: Option<Priority>,
    pub equipment_id: Option<i32>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}
