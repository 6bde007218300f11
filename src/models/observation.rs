//! Field observation model (issues spotted on equipment during field work)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::enums::{Priority, UrgencyLevel};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct FieldObservation {
    pub id: i32,
    pub equipment_id: i32,
    pub equipment: String,
    /// Kind of issue ("leak", "noise", "wear", ...)
    pub observation_type: String,
    pub urgency_level: UrgencyLevel,
    /// Derived from the urgency level
    pub priority: Priority,
    pub description: Option<String>,
    /// Photo URLs
    pub photos: Vec<String>,
    pub location: Option<String>,
    pub observer_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateObservation {
    pub equipment_id: i32,
    #[validate(length(min = 1, max = 100))]
    pub observation_type: String,
    pub urgency_level: UrgencyLevel,
    pub description: Option<String>,
    #[serde(default)]
    pub photos: Vec<String>,
    pub location: Option<String>,
}

/// Query parameters for listing observations
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct ObservationQuery {
    pub equipment_id: Option<i32>,
}
