//! Equipment QR codes

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Length of the hash printed in the QR code
pub const QR_HASH_LEN: usize = 16;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct EquipmentQrCode {
    pub id: Uuid,
    pub equipment_id: i32,
    pub qr_code_hash: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub last_scanned: Option<DateTime<Utc>>,
}

/// Hash encoded in the QR code for a given equipment and code id
pub fn qr_code_hash(equipment_id: i32, code_id: Uuid) -> String {
    let digest = Sha256::digest(format!("{}:{}", equipment_id, code_id).as_bytes());
    let mut hash = hex::encode(digest);
    hash.truncate(QR_HASH_LEN);
    hash
}

/// Client route a scanned code leads to
pub fn equipment_route(equipment_id: i32) -> String {
    format!("/equipment/{}", equipment_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_stable_and_short() {
        let id = Uuid::new_v4();
        let a = qr_code_hash(7, id);
        assert_eq!(a.len(), QR_HASH_LEN);
        assert_eq!(a, qr_code_hash(7, id));
        assert_ne!(a, qr_code_hash(8, id));
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_equipment_route() {
        assert_eq!(equipment_route(42), "/equipment/42");
    }
}
