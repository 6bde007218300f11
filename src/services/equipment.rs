//! Equipment service

use uuid::Uuid;

use super::realtime::ChangeFeed;
use crate::{
    dashboard::{filter_equipment, filter_options, EquipmentFilter, FilterOptions},
    error::{AppError, AppResult},
    models::{
        equipment::{CreateEquipment, Equipment, EquipmentQuery, UpdateEquipment, UpdateWear},
        realtime::Table,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct EquipmentService {
    repository: Repository,
    feed: ChangeFeed,
}

impl EquipmentService {
    pub fn new(repository: Repository, feed: ChangeFeed) -> Self {
        Self { repository, feed }
    }

    /// List equipment with search, category, multi-select filters and sort
    pub async fn list(&self, owner_id: Uuid, query: &EquipmentQuery) -> AppResult<Vec<Equipment>> {
        let rows = self.repository.equipment.list(owner_id).await?;
        let filter = EquipmentFilter::from_query(query);
        Ok(filter_equipment(&rows, &filter))
    }

    /// Values available for the list filters
    pub async fn filter_options(&self, owner_id: Uuid) -> AppResult<FilterOptions> {
        let rows = self.repository.equipment.list(owner_id).await?;
        Ok(filter_options(&rows))
    }

    pub async fn get_by_id(&self, owner_id: Uuid, id: i32) -> AppResult<Equipment> {
        self.repository.equipment.get(owner_id, id).await
    }

    pub async fn create(&self, owner_id: Uuid, data: &CreateEquipment) -> AppResult<Equipment> {
        let equipment = self.repository.equipment.create(owner_id, data).await?;
        tracing::info!("Equipment {} created: {}", equipment.id, equipment.name);
        self.feed.inserted(Table::Equipment, owner_id, &equipment);
        Ok(equipment)
    }

    pub async fn update(&self, owner_id: Uuid, id: i32, data: &UpdateEquipment) -> AppResult<Equipment> {
        let old = self.repository.equipment.get(owner_id, id).await?;
        let equipment = self.repository.equipment.update(owner_id, id, data).await?;
        self.feed.updated(Table::Equipment, owner_id, Some(&old), &equipment);
        Ok(equipment)
    }

    /// Record a wear reading. Readings only go up, unless the unit changes.
    pub async fn update_wear(&self, owner_id: Uuid, id: i32, data: &UpdateWear) -> AppResult<Equipment> {
        if !data.value.is_finite() || data.value < 0.0 {
            return Err(AppError::Validation("Wear value must be a positive number".to_string()));
        }

        let old = self.repository.equipment.get(owner_id, id).await?;
        let unit = data.unit.unwrap_or(old.wear_unit);
        if unit == old.wear_unit && data.value < old.wear_value {
            return Err(AppError::BusinessRule(format!(
                "Wear reading {} {} is below the current value {}",
                data.value, unit, old.wear_value
            )));
        }

        let equipment = self.repository.equipment.update_wear(owner_id, id, data.value, unit).await?;
        tracing::debug!("Equipment {} wear set to {} {}", id, data.value, unit);
        self.feed.updated(Table::Equipment, owner_id, Some(&old), &equipment);
        Ok(equipment)
    }

    pub async fn delete(&self, owner_id: Uuid, id: i32) -> AppResult<()> {
        let equipment = self.repository.equipment.delete(owner_id, id).await?;
        tracing::info!("Equipment {} deleted", id);
        self.feed.deleted(Table::Equipment, owner_id, &equipment);
        Ok(())
    }
}
