//! Parts inventory repository

use sqlx::{Pool, Postgres};
use uuid::Uuid;

use super::missing_row_error;
use crate::{
    error::{AppError, AppResult},
    models::part::{CreatePart, Part, PartQuery, UpdatePart, DEFAULT_REORDER_POINT},
};

#[derive(Clone)]
pub struct PartsRepository {
    pool: Pool<Postgres>,
}

impl PartsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List parts of an owner with optional filters
    pub async fn list(&self, owner_id: Uuid, query: &PartQuery) -> AppResult<Vec<Part>> {
        let mut conditions = vec!["owner_id = $1".to_string()];
        let mut idx = 2;

        if query.search.is_some() {
            conditions.push(format!("(name ILIKE ${} OR part_number ILIKE ${})", idx, idx));
            idx += 1;
        }
        if query.category.is_some() {
            conditions.push(format!("category = ${}", idx));
            idx += 1;
        }
        if query.compatible_with.is_some() {
            conditions.push(format!("${} = ANY(compatible_with)", idx));
        }
        if query.low_stock == Some(true) {
            conditions.push(format!(
                "quantity <= COALESCE(reorder_threshold, {})",
                DEFAULT_REORDER_POINT
            ));
        }

        let sql = format!(
            "SELECT * FROM parts WHERE {} ORDER BY name",
            conditions.join(" AND ")
        );

        let mut builder = sqlx::query_as::<_, Part>(&sql).bind(owner_id);
        if let Some(ref search) = query.search {
            builder = builder.bind(format!("%{}%", search));
        }
        if let Some(ref category) = query.category {
            builder = builder.bind(category);
        }
        if let Some(ref compatible) = query.compatible_with {
            builder = builder.bind(compatible);
        }

        let rows = builder.fetch_all(&self.pool).await?;
        Ok(rows)
    }

    pub async fn get(&self, owner_id: Uuid, id: i32) -> AppResult<Part> {
        let row = sqlx::query_as::<_, Part>("SELECT * FROM parts WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(part) => Ok(part),
            None => Err(missing_row_error(&self.pool, "parts", "owner_id", id).await),
        }
    }

    pub async fn create(&self, owner_id: Uuid, data: &CreatePart) -> AppResult<Part> {
        let row = sqlx::query_as::<_, Part>(
            r#"
            INSERT INTO parts (
                name, part_number, category, manufacturer, supplier, compatible_with,
                quantity, reorder_threshold, unit_price, location, owner_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(&data.name)
        .bind(&data.part_number)
        .bind(&data.category)
        .bind(&data.manufacturer)
        .bind(&data.supplier)
        .bind(&data.compatible_with)
        .bind(data.quantity)
        .bind(data.reorder_threshold)
        .bind(data.unit_price)
        .bind(&data.location)
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn update(&self, owner_id: Uuid, id: i32, data: &UpdatePart) -> AppResult<Part> {
        let mut sets = vec!["updated_at = NOW()".to_string()];
        let mut idx = 1;

        push_set!(sets, idx,
            data.name => "name",
            data.part_number => "part_number",
            data.category => "category",
            data.manufacturer => "manufacturer",
            data.supplier => "supplier",
            data.compatible_with => "compatible_with",
            data.quantity => "quantity",
            data.reorder_threshold => "reorder_threshold",
            data.unit_price => "unit_price",
            data.location => "location",
        );

        let query = format!(
            "UPDATE parts SET {} WHERE id = ${} AND owner_id = ${} RETURNING *",
            sets.join(", "),
            idx,
            idx + 1
        );

        let mut builder = sqlx::query_as::<_, Part>(&query);
        bind_set!(builder,
            data.name,
            data.part_number,
            data.category,
            data.manufacturer,
            data.supplier,
            data.compatible_with,
            data.quantity,
            data.reorder_threshold,
            data.unit_price,
            data.location,
        );

        let row = builder
            .bind(id)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(part) => Ok(part),
            None => Err(missing_row_error(&self.pool, "parts", "owner_id", id).await),
        }
    }

    /// Apply a stock movement; the quantity never goes below zero
    pub async fn adjust_stock(
        &self,
        owner_id: Uuid,
        id: i32,
        delta: i32,
        reordered: bool,
    ) -> AppResult<Part> {
        let row = sqlx::query_as::<_, Part>(
            r#"
            UPDATE parts
            SET quantity = quantity + $1,
                last_ordered = CASE WHEN $2 THEN NOW() ELSE last_ordered END,
                updated_at = NOW()
            WHERE id = $3 AND owner_id = $4 AND quantity + $1 >= 0
            RETURNING *
            "#,
        )
        .bind(delta)
        .bind(reordered)
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(part) => Ok(part),
            None => {
                let part = self.get(owner_id, id).await?;
                Err(AppError::BusinessRule(format!(
                    "Insufficient stock for part {}: {} available, {} requested",
                    id,
                    part.quantity,
                    -delta
                )))
            }
        }
    }

    /// Delete a part, returning the removed row
    pub async fn delete(&self, owner_id: Uuid, id: i32) -> AppResult<Part> {
        let row = sqlx::query_as::<_, Part>(
            "DELETE FROM parts WHERE id = $1 AND owner_id = $2 RETURNING *",
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(part) => Ok(part),
            None => Err(missing_row_error(&self.pool, "parts", "owner_id", id).await),
        }
    }
}
