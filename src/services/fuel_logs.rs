//! Fuel logs service

use uuid::Uuid;

use super::realtime::ChangeFeed;
use crate::{
    error::AppResult,
    models::{
        fuel_log::{summarize_fuel, CreateFuelLog, FuelLog, FuelSummary, UpdateFuelLog},
        realtime::Table,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct FuelLogsService {
    repository: Repository,
    feed: ChangeFeed,
}

impl FuelLogsService {
    pub fn new(repository: Repository, feed: ChangeFeed) -> Self {
        Self { repository, feed }
    }

    /// Fill-ups of an equipment the caller owns
    pub async fn list(&self, owner_id: Uuid, equipment_id: i32) -> AppResult<Vec<FuelLog>> {
        self.repository.equipment.get(owner_id, equipment_id).await?;
        self.repository.fuel_logs.list(owner_id, equipment_id).await
    }

    pub async fn summary(&self, owner_id: Uuid, equipment_id: i32) -> AppResult<FuelSummary> {
        let logs = self.list(owner_id, equipment_id).await?;
        Ok(summarize_fuel(equipment_id, &logs))
    }

    pub async fn create(&self, owner_id: Uuid, equipment_id: i32, data: &CreateFuelLog) -> AppResult<FuelLog> {
        let equipment = self.repository.equipment.get(owner_id, equipment_id).await?;
        let log = self.repository.fuel_logs.create(owner_id, equipment_id, data).await?;
        tracing::info!(
            "Fuel log {} on {}: {} l",
            log.id,
            equipment.name,
            log.fuel_quantity_liters
        );
        self.feed.inserted(Table::FuelLogs, owner_id, &log);
        Ok(log)
    }

    pub async fn update(&self, owner_id: Uuid, id: i32, data: &UpdateFuelLog) -> AppResult<FuelLog> {
        let old = self.repository.fuel_logs.get(owner_id, id).await?;
        let log = self.repository.fuel_logs.update(owner_id, id, data).await?;
        self.feed.updated(Table::FuelLogs, owner_id, Some(&old), &log);
        Ok(log)
    }

    pub async fn delete(&self, owner_id: Uuid, id: i32) -> AppResult<()> {
        let log = self.repository.fuel_logs.delete(owner_id, id).await?;
        self.feed.deleted(Table::FuelLogs, owner_id, &log);
        Ok(())
    }
}
