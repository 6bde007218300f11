//! Headline counters of the dashboard

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{
    Equipment, EquipmentStatus, Intervention, InterventionStatus, MaintenanceTask, Part, TaskStatus,
};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DashboardStats {
    pub total_equipment: usize,
    pub operational_equipment: usize,
    pub maintenance_equipment: usize,
    pub repair_equipment: usize,
    pub inactive_equipment: usize,
    pub total_parts: usize,
    pub low_stock_parts: usize,
    pub scheduled_tasks: usize,
    pub in_progress_tasks: usize,
    pub completed_tasks: usize,
    pub open_interventions: usize,
    pub urgent_interventions: usize,
}

pub fn derive_stats(
    equipment: &[Equipment],
    parts: &[Part],
    tasks: &[MaintenanceTask],
    interventions: &[Intervention],
) -> DashboardStats {
    let equipment_with = |status: EquipmentStatus| equipment.iter().filter(|e| e.status == status).count();
    let tasks_with = |status: TaskStatus| tasks.iter().filter(|t| t.status == status).count();

    DashboardStats {
        total_equipment: equipment.len(),
        operational_equipment: equipment_with(EquipmentStatus::Operational),
        maintenance_equipment: equipment_with(EquipmentStatus::Maintenance),
        repair_equipment: equipment_with(EquipmentStatus::Repair),
        inactive_equipment: equipment_with(EquipmentStatus::Inactive),
        total_parts: parts.len(),
        low_stock_parts: parts.iter().filter(|p| p.is_low_stock()).count(),
        scheduled_tasks: tasks_with(TaskStatus::Scheduled),
        in_progress_tasks: tasks_with(TaskStatus::InProgress),
        completed_tasks: tasks_with(TaskStatus::Completed),
        open_interventions: interventions.iter().filter(|i| i.status.is_open()).count(),
        urgent_interventions: interventions.iter().filter(|i| super::alerts::is_urgent(i)).count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::tests::{equipment, intervention, part, task};
    use crate::models::Priority;

    #[test]
    fn test_empty_inputs() {
        assert_eq!(derive_stats(&[], &[], &[], &[]), DashboardStats::default());
    }

    #[test]
    fn test_counts() {
        let equipment = vec![
            equipment(1, EquipmentStatus::Operational),
            equipment(2, EquipmentStatus::Operational),
            equipment(3, EquipmentStatus::Repair),
        ];
        let parts = vec![part(1, 2, None), part(2, 50, Some(10))];
        let tasks = vec![
            task(1, TaskStatus::Scheduled, None),
            task(2, TaskStatus::InProgress, None),
            task(3, TaskStatus::Completed, None),
        ];
        let interventions = vec![
            intervention(1, InterventionStatus::Scheduled, Priority::Low),
            intervention(2, InterventionStatus::InProgress, Priority::Low),
            intervention(3, InterventionStatus::Completed, Priority::High),
        ];

        let stats = derive_stats(&equipment, &parts, &tasks, &interventions);
        assert_eq!(stats.total_equipment, 3);
        assert_eq!(stats.operational_equipment, 2);
        assert_eq!(stats.repair_equipment, 1);
        assert_eq!(stats.low_stock_parts, 1);
        assert_eq!(stats.scheduled_tasks, 1);
        assert_eq!(stats.in_progress_tasks, 1);
        assert_eq!(stats.completed_tasks, 1);
        assert_eq!(stats.open_interventions, 2);
        assert_eq!(stats.urgent_interventions, 2);
    }
}
