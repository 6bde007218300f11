//! Derived dashboard data
//!
//! Pure functions over fetched rows: same input, same output, input order preserved.
//! The server uses them for `/dashboard` and the sync client can run them on its
//! cached lists.

pub mod alerts;
pub mod calendar;
pub mod filters;
pub mod stats;
pub mod time;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Equipment, Intervention, MaintenanceTask, Part};

pub use alerts::{derive_stock_alerts, derive_urgent_interventions, StockAlert, UrgentIntervention};
pub use calendar::{create_calendar_events, upcoming_tasks, CalendarEvent, EventKind};
pub use filters::{filter_equipment, filter_options, EquipmentFilter, FilterOptions, SortField, SortOrder};
pub use stats::{derive_stats, DashboardStats};
pub use time::{summarize_time, TimeSummary};

/// Everything the dashboard page shows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DashboardOverview {
    pub stats: DashboardStats,
    pub urgent_interventions: Vec<UrgentIntervention>,
    pub stock_alerts: Vec<StockAlert>,
    pub upcoming_tasks: Vec<MaintenanceTask>,
    pub calendar: Vec<CalendarEvent>,
}

impl DashboardOverview {
    pub fn derive(
        equipment: &[Equipment],
        parts: &[Part],
        tasks: &[MaintenanceTask],
        interventions: &[Intervention],
    ) -> Self {
        let upcoming = upcoming_tasks(tasks);
        Self {
            stats: derive_stats(equipment, parts, tasks, interventions),
            urgent_interventions: derive_urgent_interventions(interventions),
            stock_alerts: derive_stock_alerts(parts),
            calendar: create_calendar_events(tasks, interventions, &upcoming),
            upcoming_tasks: upcoming,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    //! Row builders shared by the adapter tests

    use super::*;
    use crate::models::{
        EquipmentStatus, InterventionStatus, MaintenanceType, Priority, TaskStatus, TimeEntry,
        TimeEntryStatus, TimeEntryTaskType, WearUnit,
    };
    use chrono::{DateTime, Utc};
    use sqlx::types::Json;
    use uuid::Uuid;

    pub fn equipment(id: i32, status: EquipmentStatus) -> Equipment {
        let now = Utc::now();
        Equipment {
            id,
            name: format!("Equipment {}", id),
            equipment_type: None,
            category: None,
            manufacturer: None,
            model: None,
            year: None,
            serial_number: None,
            purchase_date: None,
            status,
            location: None,
            wear_unit: WearUnit::Hours,
            wear_value: 0.0,
            last_wear_update: None,
            notes: None,
            owner_id: Uuid::nil(),
            farm_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn part(id: i32, quantity: i32, reorder_threshold: Option<i32>) -> Part {
        let now = Utc::now();
        Part {
            id,
            name: format!("Part {}", id),
            part_number: None,
            category: None,
            manufacturer: None,
            supplier: None,
            compatible_with: vec![],
            quantity,
            reorder_threshold,
            unit_price: None,
            location: None,
            last_ordered: None,
            owner_id: Uuid::nil(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn task(id: i32, status: TaskStatus, due_date: Option<DateTime<Utc>>) -> MaintenanceTask {
        let now = Utc::now();
        MaintenanceTask {
            id,
            title: format!("Task {}", id),
            equipment_id: 1,
            equipment: "Tractor".to_string(),
            task_type: MaintenanceType::Preventive,
            priority: Priority::Medium,
            status,
            due_date,
            estimated_duration: None,
            actual_duration: None,
            assigned_to: None,
            notes: None,
            completed_date: None,
            plan_id: None,
            owner_id: Uuid::nil(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn intervention(id: i32, status: InterventionStatus, priority: Priority) -> Intervention {
        let now = Utc::now();
        Intervention {
            id,
            title: format!("Intervention {}", id),
            description: None,
            equipment_id: None,
            equipment: None,
            status,
            priority,
            date: now,
            duration: None,
            scheduled_duration: None,
            technician: None,
            location: None,
            coordinates: None,
            parts_used: Json(vec![]),
            notes: None,
            owner_id: Uuid::nil(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn time_entry(
        task_type: TimeEntryTaskType,
        equipment_id: Option<i32>,
        start_time: DateTime<Utc>,
    ) -> TimeEntry {
        TimeEntry {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            equipment_id,
            intervention_id: None,
            task_type,
            custom_task_type: None,
            title: None,
            notes: None,
            location: None,
            coordinates: None,
            start_time,
            end_time: None,
            duration: None,
            status: TimeEntryStatus::Active,
            created_at: start_time,
            updated_at: start_time,
        }
    }

    #[test]
    fn test_overview_is_deterministic() {
        let equipment = vec![equipment(1, EquipmentStatus::Operational)];
        let parts = vec![part(1, 1, None)];
        let tasks = vec![task(1, TaskStatus::Scheduled, Some(Utc::now()))];
        let interventions = vec![intervention(1, InterventionStatus::InProgress, Priority::Low)];

        let a = DashboardOverview::derive(&equipment, &parts, &tasks, &interventions);
        let b = DashboardOverview::derive(&equipment, &parts, &tasks, &interventions);
        assert_eq!(a, b);
        assert_eq!(a.stock_alerts.len(), 1);
        assert_eq!(a.urgent_interventions.len(), 1);
        // one maintenance event plus the same task as upcoming, one intervention
        assert_eq!(a.calendar.len(), 3);
    }
}
