//! Parts inventory model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::equipment::Equipment;

/// Reorder point applied when a part has no explicit threshold
pub const DEFAULT_REORDER_POINT: i32 = 5;

/// Part record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Part {
    pub id: i32,
    pub name: String,
    pub part_number: Option<String>,
    pub category: Option<String>,
    pub manufacturer: Option<String>,
    pub supplier: Option<String>,
    /// Equipment names or models this part fits
    pub compatible_with: Vec<String>,
    pub quantity: i32,
    pub reorder_threshold: Option<i32>,
    #[schema(value_type = Option<String>)]
    pub unit_price: Option<Decimal>,
    pub location: Option<String>,
    pub last_ordered: Option<DateTime<Utc>>,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Part {
    pub fn reorder_point(&self) -> i32 {
        self.reorder_threshold.unwrap_or(DEFAULT_REORDER_POINT)
    }

    pub fn is_low_stock(&self) -> bool {
        self.quantity <= self.reorder_point()
    }
}

/// Terms a part's `compatible_with` entry may use to name `equipment`: its id,
/// type, model, or manufacturer and model together
pub fn compatibility_terms(equipment: &Equipment) -> Vec<String> {
    let mut terms = vec![equipment.id.to_string()];
    terms.extend(equipment.equipment_type.clone());
    terms.extend(equipment.model.clone());
    if let (Some(manufacturer), Some(model)) = (&equipment.manufacturer, &equipment.model) {
        terms.push(format!("{} {}", manufacturer, model));
    }
    terms
        .into_iter()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Parts compatible with `equipment`, in input order, each part at most once
pub fn compatible_parts(equipment: &Equipment, parts: &[Part]) -> Vec<Part> {
    let terms = compatibility_terms(equipment);
    parts
        .iter()
        .filter(|p| {
            p.compatible_with
                .iter()
                .any(|c| terms.contains(&c.trim().to_lowercase()))
        })
        .cloned()
        .collect()
}

/// Create part request
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreatePart {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub part_number: Option<String>,
    pub category: Option<String>,
    pub manufacturer: Option<String>,
    pub supplier: Option<String>,
    #[serde(default)]
    pub compatible_with: Vec<String>,
    #[validate(range(min = 0))]
    pub quantity: i32,
    #[validate(range(min = 0))]
    pub reorder_threshold: Option<i32>,
    #[schema(value_type = Option<String>)]
    pub unit_price: Option<Decimal>,
    pub location: Option<String>,
}

/// Update part request
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdatePart {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    pub part_number: Option<String>,
    pub category: Option<String>,
    pub manufacturer: Option<String>,
    pub supplier: Option<String>,
    pub compatible_with: Option<Vec<String>>,
    #[validate(range(min = 0))]
    pub quantity: Option<i32>,
    #[validate(range(min = 0))]
    pub reorder_threshold: Option<i32>,
    #[schema(value_type = Option<String>)]
    pub unit_price: Option<Decimal>,
    pub location: Option<String>,
}

/// Stock movement (positive = received, negative = consumed)
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AdjustStock {
    pub delta: i32,
    /// Marks the part as just reordered
    #[serde(default)]
    pub reordered: bool,
}

/// Query parameters for listing parts
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct PartQuery {
    /// Matches name or part number
    pub search: Option<String>,
    pub category: Option<String>,
    /// Only parts at or below their reorder point
    pub low_stock: Option<bool>,
    /// Only parts whose compatibility list contains this value
    pub compatible_with: Option<String>,
}

/// Technical lookup for a part number
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct PartLookupRequest {
    #[validate(length(min = 1, max = 100))]
    pub part_number: String,
    /// Extra context such as the equipment model
    #[validate(length(max = 500))]
    pub context: Option<String>,
}

/// Technical information about a part
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PartTechnicalInfo {
    pub function: String,
    pub installation: String,
    pub symptoms: String,
    pub maintenance: String,
    pub compatible_equipment: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum LookupSource {
    Llm,
    Cache,
    /// Placeholder returned when the provider could not answer
    Unavailable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PartLookupResponse {
    pub part_number: String,
    pub info: PartTechnicalInfo,
    pub source: LookupSource,
    /// User-facing explanation when the placeholder is returned
    pub notice: Option<String>,
}
