//! Storage locations repository

use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::location::{normalize_location_name, CreateLocation, StorageLocation},
};

#[derive(Clone)]
pub struct LocationsRepository {
    pool: Pool<Postgres>,
}

impl LocationsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn list(&self, owner_id: Uuid) -> AppResult<Vec<StorageLocation>> {
        let rows = sqlx::query_as::<_, StorageLocation>(
            "SELECT * FROM storage_locations WHERE owner_id = $1 ORDER BY name",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn find_by_name(&self, owner_id: Uuid, name: &str) -> AppResult<Option<StorageLocation>> {
        let row = sqlx::query_as::<_, StorageLocation>(
            "SELECT * FROM storage_locations WHERE owner_id = $1 AND LOWER(TRIM(name)) = $2",
        )
        .bind(owner_id)
        .bind(normalize_location_name(name))
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Insert unless a location with the same name exists; `None` when it does
    pub async fn insert_new(&self, owner_id: Uuid, data: &CreateLocation) -> AppResult<Option<StorageLocation>> {
        let row = sqlx::query_as::<_, StorageLocation>(
            r#"
            INSERT INTO storage_locations (name, description, owner_id)
            VALUES ($1, $2, $3)
            ON CONFLICT DO NOTHING
            RETURNING *
            "#,
        )
        .bind(data.name.trim())
        .bind(&data.description)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }
}
