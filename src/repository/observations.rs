//! Field observations repository

use sqlx::{Pool, Postgres};
use uuid::Uuid;

use super::missing_row_error;
use crate::{
    error::AppResult,
    models::{
        enums::Priority,
        observation::{CreateObservation, FieldObservation},
    },
};

#[derive(Clone)]
pub struct ObservationsRepository {
    pool: Pool<Postgres>,
}

impl ObservationsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Observations recorded by a user, newest first
    pub async fn list(&self, observer_id: Uuid, equipment_id: Option<i32>) -> AppResult<Vec<FieldObservation>> {
        let rows = sqlx::query_as::<_, FieldObservation>(
            r#"
            SELECT * FROM field_observations
            WHERE observer_id = $1 AND ($2::INTEGER IS NULL OR equipment_id = $2)
            ORDER BY created_at DESC
            "#,
        )
        .bind(observer_id)
        .bind(equipment_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn create(
        &self,
        observer_id: Uuid,
        data: &CreateObservation,
        equipment_name: &str,
    ) -> AppResult<FieldObservation> {
        let row = sqlx::query_as::<_, FieldObservation>(
            r#"
            INSERT INTO field_observations (
                equipment_id, equipment, observation_type, urgency_level, priority,
                description, photos, location, observer_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(data.equipment_id)
        .bind(equipment_name)
        .bind(&data.observation_type)
        .bind(data.urgency_level)
        .bind(Priority::from(data.urgency_level))
        .bind(&data.description)
        .bind(&data.photos)
        .bind(&data.location)
        .bind(observer_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn delete(&self, observer_id: Uuid, id: i32) -> AppResult<FieldObservation> {
        let row = sqlx::query_as::<_, FieldObservation>(
            "DELETE FROM field_observations WHERE id = $1 AND observer_id = $2 RETURNING *",
        )
        .bind(id)
        .bind(observer_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(observation) => Ok(observation),
            None => Err(missing_row_error(&self.pool, "field_observations", "observer_id", id).await),
        }
    }
}
