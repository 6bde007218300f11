//! Equipment repository

use chrono::Utc;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use super::missing_row_error;
use crate::{
    error::AppResult,
    models::{
        enums::{EquipmentStatus, WearUnit},
        equipment::{CreateEquipment, Equipment, UpdateEquipment},
    },
};

#[derive(Clone)]
pub struct EquipmentRepository {
    pool: Pool<Postgres>,
}

impl EquipmentRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// All equipment of an owner, by name
    pub async fn list(&self, owner_id: Uuid) -> AppResult<Vec<Equipment>> {
        let rows = sqlx::query_as::<_, Equipment>(
            "SELECT * FROM equipment WHERE owner_id = $1 ORDER BY name",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn get(&self, owner_id: Uuid, id: i32) -> AppResult<Equipment> {
        let row = sqlx::query_as::<_, Equipment>(
            "SELECT * FROM equipment WHERE id = $1 AND owner_id = $2",
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(equipment) => Ok(equipment),
            None => Err(missing_row_error(&self.pool, "equipment", "owner_id", id).await),
        }
    }

    pub async fn create(&self, owner_id: Uuid, data: &CreateEquipment) -> AppResult<Equipment> {
        let wear_value = data.wear_value.unwrap_or(0.0);
        let last_wear_update = data.wear_value.map(|_| Utc::now());

        let row = sqlx::query_as::<_, Equipment>(
            r#"
            INSERT INTO equipment (
                name, equipment_type, category, manufacturer, model, year,
                serial_number, purchase_date, status, location, wear_unit,
                wear_value, last_wear_update, notes, owner_id, farm_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            RETURNING *
            "#,
        )
        .bind(&data.name)
        .bind(&data.equipment_type)
        .bind(&data.category)
        .bind(&data.manufacturer)
        .bind(&data.model)
        .bind(data.year)
        .bind(&data.serial_number)
        .bind(data.purchase_date)
        .bind(data.status.unwrap_or(EquipmentStatus::Operational))
        .bind(&data.location)
        .bind(data.wear_unit.unwrap_or(WearUnit::Hours))
        .bind(wear_value)
        .bind(last_wear_update)
        .bind(&data.notes)
        .bind(owner_id)
        .bind(data.farm_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn update(&self, owner_id: Uuid, id: i32, data: &UpdateEquipment) -> AppResult<Equipment> {
        let mut sets = vec!["updated_at = NOW()".to_string()];
        let mut idx = 1;

        push_set!(sets, idx,
            data.name => "name",
            data.equipment_type => "equipment_type",
            data.category => "category",
            data.manufacturer => "manufacturer",
            data.model => "model",
            data.year => "year",
            data.serial_number => "serial_number",
            data.purchase_date => "purchase_date",
            data.status => "status",
            data.location => "location",
            data.notes => "notes",
        );

        let query = format!(
            "UPDATE equipment SET {} WHERE id = ${} AND owner_id = ${} RETURNING *",
            sets.join(", "),
            idx,
            idx + 1
        );

        let mut builder = sqlx::query_as::<_, Equipment>(&query);
        bind_set!(builder,
            data.name,
            data.equipment_type,
            data.category,
            data.manufacturer,
            data.model,
            data.year,
            data.serial_number,
            data.purchase_date,
            data.status,
            data.location,
            data.notes,
        );

        let row = builder
            .bind(id)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(equipment) => Ok(equipment),
            None => Err(missing_row_error(&self.pool, "equipment", "owner_id", id).await),
        }
    }

    /// Record a wear counter reading
    pub async fn update_wear(
        &self,
        owner_id: Uuid,
        id: i32,
        value: f64,
        unit: WearUnit,
    ) -> AppResult<Equipment> {
        let row = sqlx::query_as::<_, Equipment>(
            r#"
            UPDATE equipment
            SET wear_value = $1, wear_unit = $2, last_wear_update = NOW(), updated_at = NOW()
            WHERE id = $3 AND owner_id = $4
            RETURNING *
            "#,
        )
        .bind(value)
        .bind(unit)
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(equipment) => Ok(equipment),
            None => Err(missing_row_error(&self.pool, "equipment", "owner_id", id).await),
        }
    }

    /// Delete equipment, returning the removed row
    pub async fn delete(&self, owner_id: Uuid, id: i32) -> AppResult<Equipment> {
        let row = sqlx::query_as::<_, Equipment>(
            "DELETE FROM equipment WHERE id = $1 AND owner_id = $2 RETURNING *",
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(equipment) => Ok(equipment),
            None => Err(missing_row_error(&self.pool, "equipment", "owner_id", id).await),
        }
    }
}
