//! Field observations service

use uuid::Uuid;

use super::realtime::ChangeFeed;
use crate::{
    error::AppResult,
    models::{
        observation::{CreateObservation, FieldObservation},
        realtime::Table,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct ObservationsService {
    repository: Repository,
    feed: ChangeFeed,
}

impl ObservationsService {
    pub fn new(repository: Repository, feed: ChangeFeed) -> Self {
        Self { repository, feed }
    }

    pub async fn list(&self, observer_id: Uuid, equipment_id: Option<i32>) -> AppResult<Vec<FieldObservation>> {
        self.repository.observations.list(observer_id, equipment_id).await
    }

    /// Record an observation; its priority follows the urgency level
    pub async fn create(&self, observer_id: Uuid, data: &CreateObservation) -> AppResult<FieldObservation> {
        let equipment = self.repository.equipment.get(observer_id, data.equipment_id).await?;
        let observation = self
            .repository
            .observations
            .create(observer_id, data, &equipment.name)
            .await?;
        tracing::info!(
            "Observation {} on {} ({})",
            observation.id,
            equipment.name,
            observation.urgency_level
        );
        self.feed.inserted(Table::FieldObservations, observer_id, &observation);
        Ok(observation)
    }

    pub async fn delete(&self, observer_id: Uuid, id: i32) -> AppResult<()> {
        let observation = self.repository.observations.delete(observer_id, id).await?;
        self.feed.deleted(Table::FieldObservations, observer_id, &observation);
        Ok(())
    }
}
