//! Dashboard service: fetches the owner's rows and runs the derivation adapters

use uuid::Uuid;

use crate::{
    dashboard::DashboardOverview,
    error::AppResult,
    models::{intervention::InterventionQuery, maintenance::TaskQuery, part::PartQuery},
    repository::Repository,
};

#[derive(Clone)]
pub struct DashboardService {
    repository: Repository,
}

impl DashboardService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn overview(&self, owner_id: Uuid) -> AppResult<DashboardOverview> {
        let part_query = PartQuery::default();
        let task_query = TaskQuery::default();
        let intervention_query = InterventionQuery::default();

        let (equipment, parts, tasks, interventions) = tokio::try_join!(
            self.repository.equipment.list(owner_id),
            self.repository.parts.list(owner_id, &part_query),
            self.repository.maintenance.list_tasks(owner_id, &task_query),
            self.repository.interventions.list(owner_id, &intervention_query),
        )?;

        tracing::debug!(
            "Dashboard for {}: {} equipment, {} parts, {} tasks, {} interventions",
            owner_id,
            equipment.len(),
            parts.len(),
            tasks.len(),
            interventions.len()
        );

        Ok(DashboardOverview::derive(&equipment, &parts, &tasks, &interventions))
    }
}
