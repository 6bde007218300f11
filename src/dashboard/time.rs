//! Time tracking report

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{TimeEntry, TimeEntryStatus, TimeEntryTaskType};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TaskTypeHours {
    pub task_type: TimeEntryTaskType,
    pub hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct EquipmentHours {
    /// None groups entries not tied to an equipment
    pub equipment_id: Option<i32>,
    pub hours: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TimeSummary {
    pub entries: usize,
    pub open_sessions: usize,
    pub total_hours: f64,
    pub by_task_type: Vec<TaskTypeHours>,
    pub by_equipment: Vec<EquipmentHours>,
}

fn round_hours(hours: f64) -> f64 {
    (hours * 100.0).round() / 100.0
}

/// Hours per task type and per equipment. Completed entries count their recorded
/// duration, open ones the time elapsed until `now`.
pub fn summarize_time(entries: &[TimeEntry], now: DateTime<Utc>) -> TimeSummary {
    let mut by_task_type: Vec<TaskTypeHours> = Vec::new();
    let mut by_equipment: BTreeMap<Option<i32>, f64> = BTreeMap::new();
    let mut total = 0.0;

    for entry in entries {
        let hours = entry.duration.unwrap_or_else(|| entry.elapsed_hours(now));
        total += hours;
        *by_equipment.entry(entry.equipment_id).or_default() += hours;

        match by_task_type.iter_mut().find(|t| t.task_type == entry.task_type) {
            Some(bucket) => bucket.hours += hours,
            None => by_task_type.push(TaskTypeHours {
                task_type: entry.task_type,
                hours,
            }),
        }
    }

    for bucket in &mut by_task_type {
        bucket.hours = round_hours(bucket.hours);
    }

    TimeSummary {
        entries: entries.len(),
        open_sessions: entries
            .iter()
            .filter(|e| e.status != TimeEntryStatus::Completed)
            .count(),
        total_hours: round_hours(total),
        by_task_type,
        by_equipment: by_equipment
            .into_iter()
            .map(|(equipment_id, hours)| EquipmentHours {
                equipment_id,
                hours: round_hours(hours),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::tests::time_entry;
    use chrono::Duration;

    #[test]
    fn test_summary_mixes_closed_and_open_entries() {
        let now = Utc::now();
        let mut closed = time_entry(TimeEntryTaskType::Repair, Some(1), now - Duration::hours(5));
        closed.status = TimeEntryStatus::Completed;
        closed.duration = Some(2.0);
        let open = time_entry(TimeEntryTaskType::Repair, Some(1), now - Duration::minutes(30));
        let other = time_entry(TimeEntryTaskType::Inspection, None, now - Duration::hours(1));

        let summary = summarize_time(&[closed, open, other], now);
        assert_eq!(summary.entries, 3);
        assert_eq!(summary.open_sessions, 2);
        assert_eq!(summary.total_hours, 3.5);
        assert_eq!(summary.by_task_type[0].task_type, TimeEntryTaskType::Repair);
        assert_eq!(summary.by_task_type[0].hours, 2.5);
        assert_eq!(summary.by_equipment[0].equipment_id, None);
        assert_eq!(summary.by_equipment[1].hours, 2.5);
    }

    #[test]
    fn test_empty_summary() {
        assert_eq!(summarize_time(&[], Utc::now()), TimeSummary::default());
    }
}
