//! Parts inventory service

use uuid::Uuid;

use super::realtime::ChangeFeed;
use crate::{
    error::{AppError, AppResult},
    models::{
        part::{compatible_parts, AdjustStock, CreatePart, Part, PartQuery, UpdatePart},
        realtime::Table,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct PartsService {
    repository: Repository,
    feed: ChangeFeed,
}

impl PartsService {
    pub fn new(repository: Repository, feed: ChangeFeed) -> Self {
        Self { repository, feed }
    }

    pub async fn list(&self, owner_id: Uuid, query: &PartQuery) -> AppResult<Vec<Part>> {
        self.repository.parts.list(owner_id, query).await
    }

    pub async fn get_by_id(&self, owner_id: Uuid, id: i32) -> AppResult<Part> {
        self.repository.parts.get(owner_id, id).await
    }

    /// Parts whose compatibility list names the equipment by id, type or model
    pub async fn for_equipment(&self, owner_id: Uuid, equipment_id: i32) -> AppResult<Vec<Part>> {
        let equipment = self.repository.equipment.get(owner_id, equipment_id).await?;
        let parts = self.repository.parts.list(owner_id, &PartQuery::default()).await?;
        Ok(compatible_parts(&equipment, &parts))
    }

    pub async fn create(&self, owner_id: Uuid, data: &CreatePart) -> AppResult<Part> {
        let part = self.repository.parts.create(owner_id, data).await?;
        tracing::info!("Part {} created: {}", part.id, part.name);
        self.feed.inserted(Table::Parts, owner_id, &part);
        Ok(part)
    }

    pub async fn update(&self, owner_id: Uuid, id: i32, data: &UpdatePart) -> AppResult<Part> {
        let old = self.repository.parts.get(owner_id, id).await?;
        let part = self.repository.parts.update(owner_id, id, data).await?;
        self.feed.updated(Table::Parts, owner_id, Some(&old), &part);
        Ok(part)
    }

    /// Receive or consume stock
    pub async fn adjust_stock(&self, owner_id: Uuid, id: i32, data: &AdjustStock) -> AppResult<Part> {
        if data.delta == 0 && !data.reordered {
            return Err(AppError::Validation("Stock adjustment must not be zero".to_string()));
        }

        let old = self.repository.parts.get(owner_id, id).await?;
        let part = self
            .repository
            .parts
            .adjust_stock(owner_id, id, data.delta, data.reordered)
            .await?;

        if part.is_low_stock() && !old.is_low_stock() {
            tracing::warn!(
                "Part {} ({}) reached its reorder point: {} left",
                part.id,
                part.name,
                part.quantity
            );
        }
        self.feed.updated(Table::Parts, owner_id, Some(&old), &part);
        Ok(part)
    }

    pub async fn delete(&self, owner_id: Uuid, id: i32) -> AppResult<()> {
        let part = self.repository.parts.delete(owner_id, id).await?;
        tracing::info!("Part {} deleted", id);
        self.feed.deleted(Table::Parts, owner_id, &part);
        Ok(())
    }
}
