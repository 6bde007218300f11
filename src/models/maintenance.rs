//! Maintenance tasks and recurring maintenance plans

use chrono::{DateTime, Duration, Months, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::enums::{MaintenanceFrequency, MaintenanceType, MaintenanceUnit, Priority, TaskStatus};

/// Upper bound on tasks generated from a plan in a single request
pub const MAX_GENERATED_TASKS: usize = 366;

/// Maintenance task record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct MaintenanceTask {
    pub id: i32,
    pub title: String,
    pub equipment_id: i32,
    /// Equipment name at the time the task was created
    pub equipment: String,
    pub task_type: MaintenanceType,
    pub priority: Priority,
    pub status: TaskStatus,
    pub due_date: Option<DateTime<Utc>>,
    /// Hours
    pub estimated_duration: Option<f64>,
    /// Hours
    pub actual_duration: Option<f64>,
    pub assigned_to: Option<String>,
    pub notes: Option<String>,
    pub completed_date: Option<DateTime<Utc>>,
    pub plan_id: Option<i32>,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TaskStatus {
    /// Tasks only move forward: scheduled -> in_progress -> completed.
    /// Scheduled tasks may also be completed directly.
    pub fn can_transition_to(&self, next: TaskStatus) -> bool {
        matches!(
            (self, next),
            (TaskStatus::Scheduled, TaskStatus::InProgress)
                | (TaskStatus::Scheduled, TaskStatus::Completed)
                | (TaskStatus::InProgress, TaskStatus::Completed)
        )
    }
}

/// Create maintenance task request
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateTask {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    pub equipment_id: i32,
    pub task_type: MaintenanceType,
    pub priority: Option<Priority>,
    pub due_date: Option<DateTime<Utc>>,
    #[validate(range(min = 0.0, max = 1000.0))]
    pub estimated_duration: Option<f64>,
    pub assigned_to: Option<String>,
    pub notes: Option<String>,
}

/// Update maintenance task request (status changes go through the transition endpoint)
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateTask {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    pub task_type: Option<MaintenanceType>,
    pub priority: Option<Priority>,
    pub due_date: Option<DateTime<Utc>>,
    #[validate(range(min = 0.0, max = 1000.0))]
    pub estimated_duration: Option<f64>,
    pub assigned_to: Option<String>,
    pub notes: Option<String>,
}

/// Move a task to its next status
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
pub struct TaskTransition {
    pub status: TaskStatus,
    /// Hours actually spent, recorded on completion
    #[validate(range(min = 0.0, max = 1000.0))]
    pub actual_duration: Option<f64>,
}

/// Query parameters for listing tasks
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct TaskQuery {
    pub status: Option<TaskStatus>,
    pub equipment_id: Option<i32>,
    pub priority: Option<Priority>,
}

/// Recurring maintenance plan record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct MaintenancePlan {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub equipment_id: i32,
    pub equipment_name: String,
    pub frequency: MaintenanceFrequency,
    pub interval: i32,
    pub unit: MaintenanceUnit,
    pub next_due_date: DateTime<Utc>,
    pub last_performed_date: Option<DateTime<Utc>>,
    pub task_type: MaintenanceType,
    /// Wear counter threshold for hour-based plans
    pub engine_hours: Option<f64>,
    pub active: bool,
    pub priority: Priority,
    pub assigned_to: Option<String>,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

enum Step {
    Days(i64),
    Months(u32),
    /// Driven by the wear counter, no calendar recurrence
    Wear,
}

impl MaintenancePlan {
    /// Named frequencies multiply their own period by `interval`;
    /// `custom` uses `interval` x `unit`.
    fn step(&self) -> Step {
        let n = self.interval.max(1);
        match self.frequency {
            MaintenanceFrequency::Daily => Step::Days(n as i64),
            MaintenanceFrequency::Weekly => Step::Days(7 * n as i64),
            MaintenanceFrequency::Monthly => Step::Months(n as u32),
            MaintenanceFrequency::Quarterly => Step::Months(3 * n as u32),
            MaintenanceFrequency::Yearly => Step::Months(12 * n as u32),
            MaintenanceFrequency::Custom => match self.unit {
                MaintenanceUnit::Days => Step::Days(n as i64),
                MaintenanceUnit::Weeks => Step::Days(7 * n as i64),
                MaintenanceUnit::Months => Step::Months(n as u32),
                MaintenanceUnit::Hours => Step::Wear,
            },
        }
    }

    /// Due date that follows `date` in this plan's recurrence
    pub fn next_after(&self, date: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self.step() {
            Step::Days(days) => date.checked_add_signed(Duration::days(days)),
            Step::Months(months) => date.checked_add_months(Months::new(months)),
            Step::Wear => None,
        }
    }

    /// Due dates from `next_due_date` up to and including `until`.
    /// Wear-driven plans yield only their next due date.
    pub fn schedule_dates(&self, until: DateTime<Utc>) -> Vec<DateTime<Utc>> {
        let mut dates = Vec::new();
        let mut current = Some(self.next_due_date);

        while let Some(date) = current {
            if date > until || dates.len() >= MAX_GENERATED_TASKS {
                break;
            }
            dates.push(date);
            current = self.next_after(date);
        }

        dates
    }
}

/// Create maintenance plan request
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreatePlan {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    pub description: Option<String>,
    pub equipment_id: i32,
    pub frequency: MaintenanceFrequency,
    #[validate(range(min = 1, max = 1000))]
    pub interval: i32,
    pub unit: MaintenanceUnit,
    pub next_due_date: DateTime<Utc>,
    pub task_type: MaintenanceType,
    #[validate(range(min = 0.0))]
    pub engine_hours: Option<f64>,
    pub priority: Option<Priority>,
    pub assigned_to: Option<String>,
}

/// Update maintenance plan request
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdatePlan {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub frequency: Option<MaintenanceFrequency>,
    #[validate(range(min = 1, max = 1000))]
    pub interval: Option<i32>,
    pub unit: Option<MaintenanceUnit>,
    pub next_due_date: Option<DateTime<Utc>>,
    pub last_performed_date: Option<DateTime<Utc>>,
    pub task_type: Option<MaintenanceType>,
    pub engine_hours: Option<f64>,
    pub active: Option<bool>,
    pub priority: Option<Priority>,
    pub assigned_to: Option<String>,
}

/// Generate tasks for a plan up to a date
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ScheduleRequest {
    pub until: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn plan(frequency: MaintenanceFrequency, interval: i32, unit: MaintenanceUnit) -> MaintenancePlan {
        let start = Utc.with_ymd_and_hms(2024, 1, 31, 8, 0, 0).unwrap();
        MaintenancePlan {
            id: 1,
            title: "Oil change".to_string(),
            description: None,
            equipment_id: 1,
            equipment_name: "Tractor".to_string(),
            frequency,
            interval,
            unit,
            next_due_date: start,
            last_performed_date: None,
            task_type: MaintenanceType::Preventive,
            engine_hours: None,
            active: true,
            priority: Priority::Medium,
            assigned_to: None,
            owner_id: Uuid::nil(),
            created_at: start,
            updated_at: start,
        }
    }

    #[test]
    fn test_task_transitions() {
        assert!(TaskStatus::Scheduled.can_transition_to(TaskStatus::InProgress));
        assert!(TaskStatus::InProgress.can_transition_to(TaskStatus::Completed));
        assert!(!TaskStatus::Completed.can_transition_to(TaskStatus::Scheduled));
        assert!(!TaskStatus::InProgress.can_transition_to(TaskStatus::Scheduled));
        assert!(!TaskStatus::Completed.can_transition_to(TaskStatus::Completed));
    }

    #[test]
    fn test_weekly_schedule() {
        let p = plan(MaintenanceFrequency::Weekly, 2, MaintenanceUnit::Weeks);
        let until = p.next_due_date + Duration::days(30);
        let dates = p.schedule_dates(until);
        assert_eq!(dates.len(), 3);
        assert_eq!(dates[1] - dates[0], Duration::days(14));
    }

    #[test]
    fn test_monthly_schedule_clamps_month_end() {
        let p = plan(MaintenanceFrequency::Monthly, 1, MaintenanceUnit::Months);
        let until = Utc.with_ymd_and_hms(2024, 3, 31, 23, 0, 0).unwrap();
        let dates = p.schedule_dates(until);
        assert_eq!(dates.len(), 3);
        assert_eq!(dates[1], Utc.with_ymd_and_hms(2024, 2, 29, 8, 0, 0).unwrap());
    }

    #[test]
    fn test_wear_plan_yields_single_date() {
        let p = plan(MaintenanceFrequency::Custom, 250, MaintenanceUnit::Hours);
        let dates = p.schedule_dates(p.next_due_date + Duration::days(365));
        assert_eq!(dates, vec![p.next_due_date]);
    }

    #[test]
    fn test_schedule_before_due_is_empty() {
        let p = plan(MaintenanceFrequency::Daily, 1, MaintenanceUnit::Days);
        assert!(p.schedule_dates(p.next_due_date - Duration::days(1)).is_empty());
    }

    #[test]
    fn test_schedule_is_bounded() {
        let p = plan(MaintenanceFrequency::Daily, 1, MaintenanceUnit::Days);
        let dates = p.schedule_dates(p.next_due_date + Duration::days(5000));
        assert_eq!(dates.len(), MAX_GENERATED_TASKS);
    }

    #[test]
    fn test_task_duration_is_bounded() {
        let mut update = UpdateTask {
            estimated_duration: Some(1e10),
            ..Default::default()
        };
        assert!(update.validate().is_err());

        update.estimated_duration = Some(2.5);
        assert!(update.validate().is_ok());
    }
}
