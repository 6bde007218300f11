//! Fuel logs repository

use sqlx::{Pool, Postgres};
use uuid::Uuid;

use super::missing_row_error;
use crate::{
    error::AppResult,
    models::fuel_log::{CreateFuelLog, FuelLog, UpdateFuelLog},
};

#[derive(Clone)]
pub struct FuelLogsRepository {
    pool: Pool<Postgres>,
}

impl FuelLogsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Fill-ups of one equipment, latest date first
    pub async fn list(&self, owner_id: Uuid, equipment_id: i32) -> AppResult<Vec<FuelLog>> {
        let rows = sqlx::query_as::<_, FuelLog>(
            r#"
            SELECT * FROM fuel_logs
            WHERE owner_id = $1 AND equipment_id = $2
            ORDER BY date DESC, id DESC
            "#,
        )
        .bind(owner_id)
        .bind(equipment_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn get(&self, owner_id: Uuid, id: i32) -> AppResult<FuelLog> {
        let row = sqlx::query_as::<_, FuelLog>("SELECT * FROM fuel_logs WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(log) => Ok(log),
            None => Err(missing_row_error(&self.pool, "fuel_logs", "owner_id", id).await),
        }
    }

    pub async fn create(&self, owner_id: Uuid, equipment_id: i32, data: &CreateFuelLog) -> AppResult<FuelLog> {
        let row = sqlx::query_as::<_, FuelLog>(
            r#"
            INSERT INTO fuel_logs (
                equipment_id, date, fuel_quantity_liters, price_per_liter,
                hours_at_fillup, notes, owner_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(equipment_id)
        .bind(data.date)
        .bind(data.fuel_quantity_liters)
        .bind(data.price_per_liter)
        .bind(data.hours_at_fillup)
        .bind(&data.notes)
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn update(&self, owner_id: Uuid, id: i32, data: &UpdateFuelLog) -> AppResult<FuelLog> {
        let mut sets: Vec<String> = Vec::new();
        let mut idx = 1;

        push_set!(sets, idx,
            data.date => "date",
            data.fuel_quantity_liters => "fuel_quantity_liters",
            data.price_per_liter => "price_per_liter",
            data.hours_at_fillup => "hours_at_fillup",
            data.notes => "notes",
        );

        if sets.is_empty() {
            return self.get(owner_id, id).await;
        }

        let query = format!(
            "UPDATE fuel_logs SET {} WHERE id = ${} AND owner_id = ${} RETURNING *",
            sets.join(", "),
            idx,
            idx + 1
        );

        let mut builder = sqlx::query_as::<_, FuelLog>(&query);
        bind_set!(builder,
            data.date,
            data.fuel_quantity_liters,
            data.price_per_liter,
            data.hours_at_fillup,
            data.notes,
        );

        let row = builder
            .bind(id)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(log) => Ok(log),
            None => Err(missing_row_error(&self.pool, "fuel_logs", "owner_id", id).await),
        }
    }

    pub async fn delete(&self, owner_id: Uuid, id: i32) -> AppResult<FuelLog> {
        let row = sqlx::query_as::<_, FuelLog>(
            "DELETE FROM fuel_logs WHERE id = $1 AND owner_id = $2 RETURNING *",
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(log) => Ok(log),
            None => Err(missing_row_error(&self.pool, "fuel_logs", "owner_id", id).await),
        }
    }
}
