//! Time entries repository

use chrono::{DateTime, Utc};
use sqlx::{types::Json, Pool, Postgres};
use uuid::Uuid;

use super::missing_row_error;
use crate::{
    error::AppResult,
    models::{
        enums::TimeEntryStatus,
        time_entry::{StartTimeEntry, TimeEntry, TimeEntryQuery},
    },
};

#[derive(Clone)]
pub struct TimeEntriesRepository {
    pool: Pool<Postgres>,
}

impl TimeEntriesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List a user's entries, most recent start first
    pub async fn list(&self, user_id: Uuid, query: &TimeEntryQuery) -> AppResult<Vec<TimeEntry>> {
        let mut conditions = vec!["user_id = $1".to_string()];
        let mut idx = 2;

        if query.from.is_some() {
            conditions.push(format!("start_time >= ${}", idx));
            idx += 1;
        }
        if query.to.is_some() {
            conditions.push(format!("start_time <= ${}", idx));
            idx += 1;
        }
        if query.equipment_id.is_some() {
            conditions.push(format!("equipment_id = ${}", idx));
            idx += 1;
        }
        if query.intervention_id.is_some() {
            conditions.push(format!("intervention_id = ${}", idx));
            idx += 1;
        }
        if query.task_type.is_some() {
            conditions.push(format!("task_type = ${}", idx));
            idx += 1;
        }
        if query.status.is_some() {
            conditions.push(format!("status = ${}", idx));
        }

        let sql = format!(
            "SELECT * FROM time_entries WHERE {} ORDER BY start_time DESC",
            conditions.join(" AND ")
        );

        let mut builder = sqlx::query_as::<_, TimeEntry>(&sql).bind(user_id);
        if let Some(from) = query.from {
            builder = builder.bind(from);
        }
        if let Some(to) = query.to {
            builder = builder.bind(to);
        }
        if let Some(equipment_id) = query.equipment_id {
            builder = builder.bind(equipment_id);
        }
        if let Some(intervention_id) = query.intervention_id {
            builder = builder.bind(intervention_id);
        }
        if let Some(task_type) = query.task_type {
            builder = builder.bind(task_type);
        }
        if let Some(status) = query.status {
            builder = builder.bind(status);
        }

        let rows = builder.fetch_all(&self.pool).await?;
        Ok(rows)
    }

    pub async fn get(&self, user_id: Uuid, id: Uuid) -> AppResult<TimeEntry> {
        let row = sqlx::query_as::<_, TimeEntry>(
            "SELECT * FROM time_entries WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(entry) => Ok(entry),
            None => Err(missing_row_error(&self.pool, "time_entries", "user_id", id).await),
        }
    }

    /// The user's latest session that is still running or paused
    pub async fn current(&self, user_id: Uuid) -> AppResult<Option<TimeEntry>> {
        let row = sqlx::query_as::<_, TimeEntry>(
            r#"
            SELECT * FROM time_entries
            WHERE user_id = $1 AND status IN ('active', 'paused')
            ORDER BY start_time DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn create(
        &self,
        user_id: Uuid,
        data: &StartTimeEntry,
        start_time: DateTime<Utc>,
    ) -> AppResult<TimeEntry> {
        let row = sqlx::query_as::<_, TimeEntry>(
            r#"
            INSERT INTO time_entries (
                id, user_id, equipment_id, intervention_id, task_type, custom_task_type,
                title, notes, location, coordinates, start_time, status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(data.equipment_id)
        .bind(data.intervention_id)
        .bind(data.task_type)
        .bind(&data.custom_task_type)
        .bind(&data.title)
        .bind(&data.notes)
        .bind(&data.location)
        .bind(data.coordinates.map(Json))
        .bind(start_time)
        .bind(TimeEntryStatus::Active)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Change only the status (pause/resume); start_time is left alone
    pub async fn set_status(&self, user_id: Uuid, id: Uuid, status: TimeEntryStatus) -> AppResult<TimeEntry> {
        let row = sqlx::query_as::<_, TimeEntry>(
            r#"
            UPDATE time_entries SET status = $1, updated_at = NOW()
            WHERE id = $2 AND user_id = $3
            RETURNING *
            "#,
        )
        .bind(status)
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(entry) => Ok(entry),
            None => Err(missing_row_error(&self.pool, "time_entries", "user_id", id).await),
        }
    }

    pub async fn complete(
        &self,
        user_id: Uuid,
        id: Uuid,
        end_time: DateTime<Utc>,
        duration: f64,
        notes: Option<&str>,
    ) -> AppResult<TimeEntry> {
        let row = sqlx::query_as::<_, TimeEntry>(
            r#"
            UPDATE time_entries
            SET status = $1, end_time = $2, duration = $3,
                notes = COALESCE($4, notes), updated_at = NOW()
            WHERE id = $5 AND user_id = $6
            RETURNING *
            "#,
        )
        .bind(TimeEntryStatus::Completed)
        .bind(end_time)
        .bind(duration)
        .bind(notes)
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(entry) => Ok(entry),
            None => Err(missing_row_error(&self.pool, "time_entries", "user_id", id).await),
        }
    }

    pub async fn delete(&self, user_id: Uuid, id: Uuid) -> AppResult<TimeEntry> {
        let row = sqlx::query_as::<_, TimeEntry>(
            "DELETE FROM time_entries WHERE id = $1 AND user_id = $2 RETURNING *",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(entry) => Ok(entry),
            None => Err(missing_row_error(&self.pool, "time_entries", "user_id", id).await),
        }
    }
}
