//! Maintenance tasks and plans repository

use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use super::missing_row_error;
use crate::{
    error::AppResult,
    models::{
        enums::{Priority, TaskStatus},
        maintenance::{
            CreatePlan, CreateTask, MaintenancePlan, MaintenanceTask, TaskQuery, UpdatePlan,
            UpdateTask,
        },
    },
};

#[derive(Clone)]
pub struct MaintenanceRepository {
    pool: Pool<Postgres>,
}

impl MaintenanceRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    // ---- Tasks ----

    /// List tasks of an owner, earliest due first (undated last)
    pub async fn list_tasks(&self, owner_id: Uuid, query: &TaskQuery) -> AppResult<Vec<MaintenanceTask>> {
        let mut conditions = vec!["owner_id = $1".to_string()];
        let mut idx = 2;

        if query.status.is_some() {
            conditions.push(format!("status = ${}", idx));
            idx += 1;
        }
        if query.equipment_id.is_some() {
            conditions.push(format!("equipment_id = ${}", idx));
            idx += 1;
        }
        if query.priority.is_some() {
            conditions.push(format!("priority = ${}", idx));
        }

        let sql = format!(
            "SELECT * FROM maintenance_tasks WHERE {} ORDER BY due_date ASC NULLS LAST, id",
            conditions.join(" AND ")
        );

        let mut builder = sqlx::query_as::<_, MaintenanceTask>(&sql).bind(owner_id);
        if let Some(status) = query.status {
            builder = builder.bind(status);
        }
        if let Some(equipment_id) = query.equipment_id {
            builder = builder.bind(equipment_id);
        }
        if let Some(priority) = query.priority {
            builder = builder.bind(priority);
        }

        let rows = builder.fetch_all(&self.pool).await?;
        Ok(rows)
    }

    pub async fn get_task(&self, owner_id: Uuid, id: i32) -> AppResult<MaintenanceTask> {
        let row = sqlx::query_as::<_, MaintenanceTask>(
            "SELECT * FROM maintenance_tasks WHERE id = $1 AND owner_id = $2",
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(task) => Ok(task),
            None => Err(missing_row_error(&self.pool, "maintenance_tasks", "owner_id", id).await),
        }
    }

    pub async fn create_task(
        &self,
        owner_id: Uuid,
        data: &CreateTask,
        equipment_name: &str,
    ) -> AppResult<MaintenanceTask> {
        let row = sqlx::query_as::<_, MaintenanceTask>(
            r#"
            INSERT INTO maintenance_tasks (
                title, equipment_id, equipment, task_type, priority, status,
                due_date, estimated_duration, assigned_to, notes, owner_id
            )
            VALUES ($1, $2, $3, $4, $5, 'scheduled', $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(&data.title)
        .bind(data.equipment_id)
        .bind(equipment_name)
        .bind(data.task_type)
        .bind(data.priority.unwrap_or(Priority::Medium))
        .bind(data.due_date)
        .bind(data.estimated_duration)
        .bind(&data.assigned_to)
        .bind(&data.notes)
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn update_task(&self, owner_id: Uuid, id: i32, data: &UpdateTask) -> AppResult<MaintenanceTask> {
        let mut sets = vec!["updated_at = NOW()".to_string()];
        let mut idx = 1;

        push_set!(sets, idx,
            data.title => "title",
            data.task_type => "task_type",
            data.priority => "priority",
            data.due_date => "due_date",
            data.estimated_duration => "estimated_duration",
            data.assigned_to => "assigned_to",
            data.notes => "notes",
        );

        let query = format!(
            "UPDATE maintenance_tasks SET {} WHERE id = ${} AND owner_id = ${} RETURNING *",
            sets.join(", "),
            idx,
            idx + 1
        );

        let mut builder = sqlx::query_as::<_, MaintenanceTask>(&query);
        bind_set!(builder,
            data.title,
            data.task_type,
            data.priority,
            data.due_date,
            data.estimated_duration,
            data.assigned_to,
            data.notes,
        );

        let row = builder
            .bind(id)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(task) => Ok(task),
            None => Err(missing_row_error(&self.pool, "maintenance_tasks", "owner_id", id).await),
        }
    }

    /// Set a task's status; completion stamps `completed_date`
    pub async fn set_task_status(
        &self,
        owner_id: Uuid,
        id: i32,
        status: TaskStatus,
        actual_duration: Option<f64>,
    ) -> AppResult<MaintenanceTask> {
        let completed_date = (status == TaskStatus::Completed).then(Utc::now);

        let row = sqlx::query_as::<_, MaintenanceTask>(
            r#"
            UPDATE maintenance_tasks
            SET status = $1,
                actual_duration = COALESCE($2, actual_duration),
                completed_date = COALESCE($3, completed_date),
                updated_at = NOW()
            WHERE id = $4 AND owner_id = $5
            RETURNING *
            "#,
        )
        .bind(status)
        .bind(actual_duration)
        .bind(completed_date)
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(task) => Ok(task),
            None => Err(missing_row_error(&self.pool, "maintenance_tasks", "owner_id", id).await),
        }
    }

    pub async fn delete_task(&self, owner_id: Uuid, id: i32) -> AppResult<MaintenanceTask> {
        let row = sqlx::query_as::<_, MaintenanceTask>(
            "DELETE FROM maintenance_tasks WHERE id = $1 AND owner_id = $2 RETURNING *",
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(task) => Ok(task),
            None => Err(missing_row_error(&self.pool, "maintenance_tasks", "owner_id", id).await),
        }
    }

    // ---- Plans ----

    pub async fn list_plans(&self, owner_id: Uuid) -> AppResult<Vec<MaintenancePlan>> {
        let rows = sqlx::query_as::<_, MaintenancePlan>(
            "SELECT * FROM maintenance_plans WHERE owner_id = $1 ORDER BY next_due_date",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn get_plan(&self, owner_id: Uuid, id: i32) -> AppResult<MaintenancePlan> {
        let row = sqlx::query_as::<_, MaintenancePlan>(
            "SELECT * FROM maintenance_plans WHERE id = $1 AND owner_id = $2",
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(plan) => Ok(plan),
            None => Err(missing_row_error(&self.pool, "maintenance_plans", "owner_id", id).await),
        }
    }

    pub async fn create_plan(
        &self,
        owner_id: Uuid,
        data: &CreatePlan,
        equipment_name: &str,
    ) -> AppResult<MaintenancePlan> {
        let row = sqlx::query_as::<_, MaintenancePlan>(
            r#"
            INSERT INTO maintenance_plans (
                title, description, equipment_id, equipment_name, frequency, "interval",
                unit, next_due_date, task_type, engine_hours, priority, assigned_to, owner_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING *
            "#,
        )
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.equipment_id)
        .bind(equipment_name)
        .bind(data.frequency)
        .bind(data.interval)
        .bind(data.unit)
        .bind(data.next_due_date)
        .bind(data.task_type)
        .bind(data.engine_hours)
        .bind(data.priority.unwrap_or(Priority::Medium))
        .bind(&data.assigned_to)
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn update_plan(&self, owner_id: Uuid, id: i32, data: &UpdatePlan) -> AppResult<MaintenancePlan> {
        let mut sets = vec!["updated_at = NOW()".to_string()];
        let mut idx = 1;

        push_set!(sets, idx,
            data.title => "title",
            data.description => "description",
            data.frequency => "frequency",
            data.interval => "\"interval\"",
            data.unit => "unit",
            data.next_due_date => "next_due_date",
            data.last_performed_date => "last_performed_date",
            data.task_type => "task_type",
            data.engine_hours => "engine_hours",
            data.active => "active",
            data.priority => "priority",
            data.assigned_to => "assigned_to",
        );

        let query = format!(
            "UPDATE maintenance_plans SET {} WHERE id = ${} AND owner_id = ${} RETURNING *",
            sets.join(", "),
            idx,
            idx + 1
        );

        let mut builder = sqlx::query_as::<_, MaintenancePlan>(&query);
        bind_set!(builder,
            data.title,
            data.description,
            data.frequency,
            data.interval,
            data.unit,
            data.next_due_date,
            data.last_performed_date,
            data.task_type,
            data.engine_hours,
            data.active,
            data.priority,
            data.assigned_to,
        );

        let row = builder
            .bind(id)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(plan) => Ok(plan),
            None => Err(missing_row_error(&self.pool, "maintenance_plans", "owner_id", id).await),
        }
    }

    pub async fn delete_plan(&self, owner_id: Uuid, id: i32) -> AppResult<MaintenancePlan> {
        let row = sqlx::query_as::<_, MaintenancePlan>(
            "DELETE FROM maintenance_plans WHERE id = $1 AND owner_id = $2 RETURNING *",
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(plan) => Ok(plan),
            None => Err(missing_row_error(&self.pool, "maintenance_plans", "owner_id", id).await),
        }
    }

    /// Insert one scheduled task per date and move the plan's next due date,
    /// in a single transaction
    pub async fn schedule_plan(
        &self,
        plan: &MaintenancePlan,
        dates: &[DateTime<Utc>],
        next_due_date: DateTime<Utc>,
    ) -> AppResult<(MaintenancePlan, Vec<MaintenanceTask>)> {
        let mut tx = self.pool.begin().await?;
        let mut tasks = Vec::with_capacity(dates.len());

        for date in dates {
            let task = sqlx::query_as::<_, MaintenanceTask>(
                r#"
                INSERT INTO maintenance_tasks (
                    title, equipment_id, equipment, task_type, priority, status,
                    due_date, assigned_to, notes, plan_id, owner_id
                )
                VALUES ($1, $2, $3, $4, $5, 'scheduled', $6, $7, $8, $9, $10)
                RETURNING *
                "#,
            )
            .bind(&plan.title)
            .bind(plan.equipment_id)
            .bind(&plan.equipment_name)
            .bind(plan.task_type)
            .bind(plan.priority)
            .bind(date)
            .bind(&plan.assigned_to)
            .bind(&plan.description)
            .bind(plan.id)
            .bind(plan.owner_id)
            .fetch_one(&mut *tx)
            .await?;
            tasks.push(task);
        }

        let updated = sqlx::query_as::<_, MaintenancePlan>(
            r#"
            UPDATE maintenance_plans SET next_due_date = $1, updated_at = NOW()
            WHERE id = $2 AND owner_id = $3
            RETURNING *
            "#,
        )
        .bind(next_due_date)
        .bind(plan.id)
        .bind(plan.owner_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok((updated, tasks))
    }
}
