//! Equipment QR codes repository

use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{error::AppResult, models::qrcode::EquipmentQrCode};

#[derive(Clone)]
pub struct QrCodesRepository {
    pool: Pool<Postgres>,
}

impl QrCodesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Active code of an equipment, if one was issued
    pub async fn active_for_equipment(&self, equipment_id: i32) -> AppResult<Option<EquipmentQrCode>> {
        let row = sqlx::query_as::<_, EquipmentQrCode>(
            r#"
            SELECT * FROM equipment_qrcodes
            WHERE equipment_id = $1 AND active
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(equipment_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn create(&self, id: Uuid, equipment_id: i32, hash: &str) -> AppResult<EquipmentQrCode> {
        let row = sqlx::query_as::<_, EquipmentQrCode>(
            r#"
            INSERT INTO equipment_qrcodes (id, equipment_id, qr_code_hash, active)
            VALUES ($1, $2, $3, TRUE)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(equipment_id)
        .bind(hash)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Look up an active code by hash and stamp the scan time
    pub async fn record_scan(&self, hash: &str) -> AppResult<Option<EquipmentQrCode>> {
        let row = sqlx::query_as::<_, EquipmentQrCode>(
            r#"
            UPDATE equipment_qrcodes SET last_scanned = NOW()
            WHERE qr_code_hash = $1 AND active
            RETURNING *
            "#,
        )
        .bind(hash)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Deactivate every code of an equipment
    pub async fn deactivate(&self, equipment_id: i32) -> AppResult<u64> {
        let result = sqlx::query("UPDATE equipment_qrcodes SET active = FALSE WHERE equipment_id = $1 AND active")
            .bind(equipment_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
