//! Field interventions service

use uuid::Uuid;

use super::realtime::ChangeFeed;
use crate::{
    error::{AppError, AppResult},
    models::{
        intervention::{
            CreateIntervention, Intervention, InterventionQuery, InterventionReport,
            UpdateIntervention,
        },
        realtime::Table,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct InterventionsService {
    repository: Repository,
    feed: ChangeFeed,
}

impl InterventionsService {
    pub fn new(repository: Repository, feed: ChangeFeed) -> Self {
        Self { repository, feed }
    }

    pub async fn list(&self, owner_id: Uuid, query: &InterventionQuery) -> AppResult<Vec<Intervention>> {
        self.repository.interventions.list(owner_id, query).await
    }

    pub async fn get_by_id(&self, owner_id: Uuid, id: i32) -> AppResult<Intervention> {
        self.repository.interventions.get(owner_id, id).await
    }

    pub async fn create(&self, owner_id: Uuid, data: &CreateIntervention) -> AppResult<Intervention> {
        let equipment_name = match data.equipment_id {
            Some(equipment_id) => Some(self.repository.equipment.get(owner_id, equipment_id).await?.name),
            None => None,
        };

        let intervention = self
            .repository
            .interventions
            .create(owner_id, data, equipment_name.as_deref())
            .await?;
        tracing::info!("Intervention {} created: {}", intervention.id, intervention.title);
        self.feed.inserted(Table::Interventions, owner_id, &intervention);
        Ok(intervention)
    }

    pub async fn update(&self, owner_id: Uuid, id: i32, data: &UpdateIntervention) -> AppResult<Intervention> {
        let old = self.repository.interventions.get(owner_id, id).await?;
        let intervention = self.repository.interventions.update(owner_id, id, data).await?;
        self.feed.updated(Table::Interventions, owner_id, Some(&old), &intervention);
        Ok(intervention)
    }

    /// Close an open intervention with its report; consumed parts leave the stock
    pub async fn complete(&self, owner_id: Uuid, id: i32, report: &InterventionReport) -> AppResult<Intervention> {
        if let Some(usage) = report.parts_used.iter().find(|u| u.quantity <= 0) {
            return Err(AppError::Validation(format!(
                "Quantity used for {} must be positive",
                usage.name
            )));
        }

        let old = self.repository.interventions.get(owner_id, id).await?;
        if !old.status.is_open() {
            return Err(AppError::BusinessRule(format!(
                "Intervention {} is already {}",
                id, old.status
            )));
        }

        let (intervention, parts) = self.repository.interventions.complete(owner_id, id, report).await?;
        tracing::info!(
            "Intervention {} completed in {}h, {} parts consumed",
            id,
            report.duration,
            parts.len()
        );

        for part in &parts {
            self.feed.updated(Table::Parts, owner_id, None, part);
        }
        self.feed.updated(Table::Interventions, owner_id, Some(&old), &intervention);
        Ok(intervention)
    }

    pub async fn delete(&self, owner_id: Uuid, id: i32) -> AppResult<()> {
        let intervention = self.repository.interventions.delete(owner_id, id).await?;
        self.feed.deleted(Table::Interventions, owner_id, &intervention);
        Ok(())
    }
}
