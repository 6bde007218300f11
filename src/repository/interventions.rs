//! Interventions repository

use sqlx::{types::Json, Pool, Postgres};
use uuid::Uuid;

use super::missing_row_error;
use crate::{
    error::{AppError, AppResult},
    models::{
        enums::{InterventionStatus, Priority},
        intervention::{
            CreateIntervention, Intervention, InterventionQuery, InterventionReport,
            UpdateIntervention,
        },
        part::Part,
    },
};

#[derive(Clone)]
pub struct InterventionsRepository {
    pool: Pool<Postgres>,
}

impl InterventionsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List interventions of an owner, most recent first
    pub async fn list(&self, owner_id: Uuid, query: &InterventionQuery) -> AppResult<Vec<Intervention>> {
        let mut conditions = vec!["owner_id = $1".to_string()];
        let mut idx = 2;

        if query.status.is_some() {
            conditions.push(format!("status = ${}", idx));
            idx += 1;
        }
        if query.priority.is_some() {
            conditions.push(format!("priority = ${}", idx));
            idx += 1;
        }
        if query.equipment_id.is_some() {
            conditions.push(format!("equipment_id = ${}", idx));
            idx += 1;
        }
        if query.from.is_some() {
            conditions.push(format!("date >= ${}", idx));
            idx += 1;
        }
        if query.to.is_some() {
            conditions.push(format!("date <= ${}", idx));
        }

        let sql = format!(
            "SELECT * FROM interventions WHERE {} ORDER BY date DESC, id DESC",
            conditions.join(" AND ")
        );

        let mut builder = sqlx::query_as::<_, Intervention>(&sql).bind(owner_id);
        if let Some(status) = query.status {
            builder = builder.bind(status);
        }
        if let Some(priority) = query.priority {
            builder = builder.bind(priority);
        }
        if let Some(equipment_id) = query.equipment_id {
            builder = builder.bind(equipment_id);
        }
        if let Some(from) = query.from {
            builder = builder.bind(from);
        }
        if let Some(to) = query.to {
            builder = builder.bind(to);
        }

        let rows = builder.fetch_all(&self.pool).await?;
        Ok(rows)
    }

    pub async fn get(&self, owner_id: Uuid, id: i32) -> AppResult<Intervention> {
        let row = sqlx::query_as::<_, Intervention>(
            "SELECT * FROM interventions WHERE id = $1 AND owner_id = $2",
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(intervention) => Ok(intervention),
            None => Err(missing_row_error(&self.pool, "interventions", "owner_id", id).await),
        }
    }

    pub async fn create(
        &self,
        owner_id: Uuid,
        data: &CreateIntervention,
        equipment_name: Option<&str>,
    ) -> AppResult<Intervention> {
        let row = sqlx::query_as::<_, Intervention>(
            r#"
            INSERT INTO interventions (
                title, description, equipment_id, equipment, status, priority, date,
                scheduled_duration, technician, location, coordinates, notes, owner_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING *
            "#,
        )
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.equipment_id)
        .bind(equipment_name)
        .bind(InterventionStatus::Scheduled)
        .bind(data.priority.unwrap_or(Priority::Medium))
        .bind(data.date)
        .bind(data.scheduled_duration)
        .bind(&data.technician)
        .bind(&data.location)
        .bind(data.coordinates.map(Json))
        .bind(&data.notes)
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn update(&self, owner_id: Uuid, id: i32, data: &UpdateIntervention) -> AppResult<Intervention> {
        let coordinates = data.coordinates.map(Json);
        let mut sets = vec!["updated_at = NOW()".to_string()];
        let mut idx = 1;

        push_set!(sets, idx,
            data.title => "title",
            data.description => "description",
            data.status => "status",
            data.priority => "priority",
            data.date => "date",
            data.scheduled_duration => "scheduled_duration",
            data.technician => "technician",
            data.location => "location",
            coordinates => "coordinates",
            data.notes => "notes",
        );

        let query = format!(
            "UPDATE interventions SET {} WHERE id = ${} AND owner_id = ${} RETURNING *",
            sets.join(", "),
            idx,
            idx + 1
        );

        let mut builder = sqlx::query_as::<_, Intervention>(&query);
        bind_set!(builder,
            data.title,
            data.description,
            data.status,
            data.priority,
            data.date,
            data.scheduled_duration,
            data.technician,
            data.location,
            coordinates,
            data.notes,
        );

        let row = builder
            .bind(id)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(intervention) => Ok(intervention),
            None => Err(missing_row_error(&self.pool, "interventions", "owner_id", id).await),
        }
    }

    /// Close an intervention and take the consumed parts out of stock.
    /// Either every part is decremented and the intervention completed, or nothing changes.
    pub async fn complete(
        &self,
        owner_id: Uuid,
        id: i32,
        report: &InterventionReport,
    ) -> AppResult<(Intervention, Vec<Part>)> {
        let mut tx = self.pool.begin().await?;
        let mut parts = Vec::with_capacity(report.parts_used.len());

        for usage in &report.parts_used {
            let part = sqlx::query_as::<_, Part>(
                r#"
                UPDATE parts SET quantity = quantity - $1, updated_at = NOW()
                WHERE id = $2 AND owner_id = $3 AND quantity >= $1
                RETURNING *
                "#,
            )
            .bind(usage.quantity)
            .bind(usage.part_id)
            .bind(owner_id)
            .fetch_optional(&mut *tx)
            .await?;

            match part {
                Some(part) => parts.push(part),
                None => {
                    tx.rollback().await?;
                    let available = sqlx::query_scalar::<_, i32>(
                        "SELECT quantity FROM parts WHERE id = $1 AND owner_id = $2",
                    )
                    .bind(usage.part_id)
                    .bind(owner_id)
                    .fetch_optional(&self.pool)
                    .await?;
                    return Err(match available {
                        Some(available) => AppError::BusinessRule(format!(
                            "Insufficient stock for {}: {} available, {} used",
                            usage.name, available, usage.quantity
                        )),
                        None => missing_row_error(&self.pool, "parts", "owner_id", usage.part_id).await,
                    });
                }
            }
        }

        let intervention = sqlx::query_as::<_, Intervention>(
            r#"
            UPDATE interventions
            SET status = $1, duration = $2, notes = COALESCE($3, notes),
                parts_used = $4, updated_at = NOW()
            WHERE id = $5 AND owner_id = $6
            RETURNING *
            "#,
        )
        .bind(InterventionStatus::Completed)
        .bind(report.duration)
        .bind(&report.notes)
        .bind(Json(&report.parts_used))
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&mut *tx)
        .await?;

        match intervention {
            Some(intervention) => {
                tx.commit().await?;
                Ok((intervention, parts))
            }
            None => {
                tx.rollback().await?;
                Err(missing_row_error(&self.pool, "interventions", "owner_id", id).await)
            }
        }
    }

    pub async fn delete(&self, owner_id: Uuid, id: i32) -> AppResult<Intervention> {
        let row = sqlx::query_as::<_, Intervention>(
            "DELETE FROM interventions WHERE id = $1 AND owner_id = $2 RETURNING *",
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(intervention) => Ok(intervention),
            None => Err(missing_row_error(&self.pool, "interventions", "owner_id", id).await),
        }
    }
}
