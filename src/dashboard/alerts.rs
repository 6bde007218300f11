//! Urgent interventions and low-stock alerts

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Intervention, InterventionStatus, Part, Priority};

pub const MAX_URGENT_INTERVENTIONS: usize = 5;
pub const MAX_STOCK_ALERTS: usize = 10;

pub const UNASSIGNED_TECHNICIAN: &str = "Unassigned";
pub const UNKNOWN_LOCATION: &str = "Unknown";
pub const UNKNOWN_EQUIPMENT: &str = "Unknown equipment";
pub const UNCATEGORIZED: &str = "Uncategorized";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UrgentIntervention {
    pub id: i32,
    pub title: String,
    pub equipment: String,
    pub priority: Priority,
    pub status: InterventionStatus,
    pub date: DateTime<Utc>,
    pub technician: String,
    pub location: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct StockAlert {
    pub id: i32,
    pub name: String,
    pub category: String,
    pub current_stock: i32,
    pub reorder_point: i32,
    pub percent_remaining: u32,
}

pub(crate) fn is_urgent(intervention: &Intervention) -> bool {
    intervention.priority.is_urgent() || intervention.status == InterventionStatus::InProgress
}

/// High-priority or running interventions, in input order
pub fn derive_urgent_interventions(interventions: &[Intervention]) -> Vec<UrgentIntervention> {
    interventions
        .iter()
        .filter(|i| is_urgent(i))
        .take(MAX_URGENT_INTERVENTIONS)
        .map(|i| UrgentIntervention {
            id: i.id,
            title: i.title.clone(),
            equipment: i.equipment.clone().unwrap_or_else(|| UNKNOWN_EQUIPMENT.to_string()),
            priority: i.priority,
            status: i.status,
            date: i.date,
            technician: i.technician.clone().unwrap_or_else(|| UNASSIGNED_TECHNICIAN.to_string()),
            location: i.location.clone().unwrap_or_else(|| UNKNOWN_LOCATION.to_string()),
        })
        .collect()
}

/// Share of the reorder point still in stock, 0 when the reorder point is 0
pub fn percent_remaining(quantity: i32, reorder_point: i32) -> u32 {
    if reorder_point <= 0 {
        return 0;
    }
    (quantity.max(0) as f64 / reorder_point as f64 * 100.0).round() as u32
}

/// Parts at or below their reorder point, in input order
pub fn derive_stock_alerts(parts: &[Part]) -> Vec<StockAlert> {
    parts
        .iter()
        .filter(|p| p.is_low_stock())
        .take(MAX_STOCK_ALERTS)
        .map(|p| StockAlert {
            id: p.id,
            name: p.name.clone(),
            category: p.category.clone().unwrap_or_else(|| UNCATEGORIZED.to_string()),
            current_stock: p.quantity,
            reorder_point: p.reorder_point(),
            percent_remaining: percent_remaining(p.quantity, p.reorder_point()),
        })
        .collect()
}
