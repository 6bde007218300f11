//! Equipment model

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::enums::{EquipmentStatus, WearUnit};

/// Equipment record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Equipment {
    pub id: i32,
    pub name: String,
    /// Free-form type ("tractor", "harvester", ...); doubles as the UI category tab
    pub equipment_type: Option<String>,
    pub category: Option<String>,
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub serial_number: Option<String>,
    pub purchase_date: Option<NaiveDate>,
    pub status: EquipmentStatus,
    pub location: Option<String>,
    /// Unit of the wear counter
    pub wear_unit: WearUnit,
    /// Current wear counter value (engine hours, kilometers or acres worked)
    pub wear_value: f64,
    pub last_wear_update: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub owner_id: Uuid,
    pub farm_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create equipment request
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateEquipment {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub equipment_type: Option<String>,
    pub category: Option<String>,
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    #[validate(range(min = 1900, max = 2100))]
    pub year: Option<i32>,
    pub serial_number: Option<String>,
    pub purchase_date: Option<NaiveDate>,
    pub status: Option<EquipmentStatus>,
    pub location: Option<String>,
    pub wear_unit: Option<WearUnit>,
    #[validate(range(min = 0.0))]
    pub wear_value: Option<f64>,
    pub notes: Option<String>,
    pub farm_id: Option<Uuid>,
}

/// Update equipment request
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateEquipment {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    pub equipment_type: Option<String>,
    pub category: Option<String>,
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    #[validate(range(min = 1900, max = 2100))]
    pub year: Option<i32>,
    pub serial_number: Option<String>,
    pub purchase_date: Option<NaiveDate>,
    pub status: Option<EquipmentStatus>,
    pub location: Option<String>,
    pub notes: Option<String>,
}

/// Wear counter reading
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateWear {
    #[validate(range(min = 0.0))]
    pub value: f64,
    /// Switch unit (resets the monotonic check)
    pub unit: Option<WearUnit>,
}

/// Query parameters for listing equipment
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct EquipmentQuery {
    /// Free text over name, model, manufacturer, type and serial number
    pub search: Option<String>,
    /// "all", "other" (no type) or an exact type
    pub category: Option<String>,
    /// Comma-separated statuses
    pub status: Option<String>,
    /// Comma-separated types
    pub equipment_type: Option<String>,
    /// Comma-separated manufacturers
    pub manufacturer: Option<String>,
    /// Comma-separated years
    pub year: Option<String>,
    /// name | year | manufacturer | status
    pub sort_by: Option<String>,
    /// asc | desc
    pub sort_order: Option<String>,
}
