//! QR codes printed on equipment

use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::qrcode::{equipment_route, qr_code_hash, EquipmentQrCode},
    repository::Repository,
};

#[derive(Clone)]
pub struct QrCodeService {
    repository: Repository,
}

impl QrCodeService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Return the equipment's active code, issuing one if needed
    pub async fn issue(&self, owner_id: Uuid, equipment_id: i32) -> AppResult<EquipmentQrCode> {
        self.repository.equipment.get(owner_id, equipment_id).await?;

        if let Some(code) = self.repository.qrcodes.active_for_equipment(equipment_id).await? {
            return Ok(code);
        }

        let id = Uuid::new_v4();
        let hash = qr_code_hash(equipment_id, id);
        let code = self.repository.qrcodes.create(id, equipment_id, &hash).await?;
        tracing::info!("QR code {} issued for equipment {}", code.qr_code_hash, equipment_id);
        Ok(code)
    }

    /// Revoke the equipment's codes so printed labels stop resolving
    pub async fn revoke(&self, owner_id: Uuid, equipment_id: i32) -> AppResult<u64> {
        self.repository.equipment.get(owner_id, equipment_id).await?;
        self.repository.qrcodes.deactivate(equipment_id).await
    }

    /// Route a scanned code leads to
    pub async fn resolve(&self, hash: &str) -> AppResult<String> {
        let code = self
            .repository
            .qrcodes
            .record_scan(hash.trim())
            .await?
            .ok_or_else(|| AppError::NotFound(format!("QR code {} not found", hash)))?;

        tracing::debug!("QR code {} scanned for equipment {}", code.qr_code_hash, code.equipment_id);
        Ok(equipment_route(code.equipment_id))
    }
}
