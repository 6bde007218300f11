//! Maintenance tasks and recurring plans

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::realtime::ChangeFeed;
use crate::{
    error::{AppError, AppResult},
    models::{
        maintenance::{
            CreatePlan, CreateTask, MaintenancePlan, MaintenanceTask, TaskQuery, TaskTransition,
            UpdatePlan, UpdateTask,
        },
        realtime::Table,
    },
    repository::Repository,
};

/// Result of expanding a plan into tasks
#[derive(Debug, Clone, serde::Serialize, utoipa::ToSchema)]
pub struct ScheduleResult {
    pub plan: MaintenancePlan,
    pub tasks: Vec<MaintenanceTask>,
}

#[derive(Clone)]
pub struct MaintenanceService {
    repository: Repository,
    feed: ChangeFeed,
}

impl MaintenanceService {
    pub fn new(repository: Repository, feed: ChangeFeed) -> Self {
        Self { repository, feed }
    }

    // ---- Tasks ----

    pub async fn list_tasks(&self, owner_id: Uuid, query: &TaskQuery) -> AppResult<Vec<MaintenanceTask>> {
        self.repository.maintenance.list_tasks(owner_id, query).await
    }

    pub async fn get_task(&self, owner_id: Uuid, id: i32) -> AppResult<MaintenanceTask> {
        self.repository.maintenance.get_task(owner_id, id).await
    }

    pub async fn create_task(&self, owner_id: Uuid, data: &CreateTask) -> AppResult<MaintenanceTask> {
        let equipment = self.repository.equipment.get(owner_id, data.equipment_id).await?;
        let task = self
            .repository
            .maintenance
            .create_task(owner_id, data, &equipment.name)
            .await?;
        tracing::info!("Maintenance task {} created for {}", task.id, equipment.name);
        self.feed.inserted(Table::MaintenanceTasks, owner_id, &task);
        Ok(task)
    }

    pub async fn update_task(&self, owner_id: Uuid, id: i32, data: &UpdateTask) -> AppResult<MaintenanceTask> {
        let old = self.repository.maintenance.get_task(owner_id, id).await?;
        let task = self.repository.maintenance.update_task(owner_id, id, data).await?;
        self.feed.updated(Table::MaintenanceTasks, owner_id, Some(&old), &task);
        Ok(task)
    }

    /// Move a task forward (scheduled -> in_progress -> completed)
    pub async fn transition_task(
        &self,
        owner_id: Uuid,
        id: i32,
        data: &TaskTransition,
    ) -> AppResult<MaintenanceTask> {
        let old = self.repository.maintenance.get_task(owner_id, id).await?;
        if !old.status.can_transition_to(data.status) {
            return Err(AppError::BusinessRule(format!(
                "Task {} cannot go from {} to {}",
                id, old.status, data.status
            )));
        }

        let task = self
            .repository
            .maintenance
            .set_task_status(owner_id, id, data.status, data.actual_duration)
            .await?;
        tracing::info!("Maintenance task {}: {} -> {}", id, old.status, task.status);
        self.feed.updated(Table::MaintenanceTasks, owner_id, Some(&old), &task);
        Ok(task)
    }

    pub async fn delete_task(&self, owner_id: Uuid, id: i32) -> AppResult<()> {
        let task = self.repository.maintenance.delete_task(owner_id, id).await?;
        self.feed.deleted(Table::MaintenanceTasks, owner_id, &task);
        Ok(())
    }

    // ---- Plans ----

    pub async fn list_plans(&self, owner_id: Uuid) -> AppResult<Vec<MaintenancePlan>> {
        self.repository.maintenance.list_plans(owner_id).await
    }

    pub async fn get_plan(&self, owner_id: Uuid, id: i32) -> AppResult<MaintenancePlan> {
        self.repository.maintenance.get_plan(owner_id, id).await
    }

    pub async fn create_plan(&self, owner_id: Uuid, data: &CreatePlan) -> AppResult<MaintenancePlan> {
        let equipment = self.repository.equipment.get(owner_id, data.equipment_id).await?;
        let plan = self
            .repository
            .maintenance
            .create_plan(owner_id, data, &equipment.name)
            .await?;
        tracing::info!("Maintenance plan {} created for {}", plan.id, equipment.name);
        self.feed.inserted(Table::MaintenancePlans, owner_id, &plan);
        Ok(plan)
    }

    pub async fn update_plan(&self, owner_id: Uuid, id: i32, data: &UpdatePlan) -> AppResult<MaintenancePlan> {
        let old = self.repository.maintenance.get_plan(owner_id, id).await?;
        let plan = self.repository.maintenance.update_plan(owner_id, id, data).await?;
        self.feed.updated(Table::MaintenancePlans, owner_id, Some(&old), &plan);
        Ok(plan)
    }

    pub async fn delete_plan(&self, owner_id: Uuid, id: i32) -> AppResult<()> {
        let plan = self.repository.maintenance.delete_plan(owner_id, id).await?;
        self.feed.deleted(Table::MaintenancePlans, owner_id, &plan);
        Ok(())
    }

    /// Create the plan's tasks due up to `until` and move its next due date past them
    pub async fn schedule_plan(
        &self,
        owner_id: Uuid,
        id: i32,
        until: DateTime<Utc>,
    ) -> AppResult<ScheduleResult> {
        let plan = self.repository.maintenance.get_plan(owner_id, id).await?;
        if !plan.active {
            return Err(AppError::BusinessRule(format!("Maintenance plan {} is inactive", id)));
        }

        if plan.next_after(plan.next_due_date).is_none() {
            return Err(AppError::BusinessRule(format!(
                "Maintenance plan {} follows the wear counter and has no calendar recurrence",
                id
            )));
        }

        let dates = plan.schedule_dates(until);
        let Some(last) = dates.last().copied() else {
            return Ok(ScheduleResult { plan, tasks: Vec::new() });
        };
        let next_due_date = plan.next_after(last).unwrap_or(last);

        let (updated, tasks) = self
            .repository
            .maintenance
            .schedule_plan(&plan, &dates, next_due_date)
            .await?;

        tracing::info!("Maintenance plan {} generated {} tasks", id, tasks.len());
        for task in &tasks {
            self.feed.inserted(Table::MaintenanceTasks, owner_id, task);
        }
        self.feed.updated(Table::MaintenancePlans, owner_id, Some(&plan), &updated);

        Ok(ScheduleResult { plan: updated, tasks })
    }
}
