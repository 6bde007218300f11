//! Business logic services

pub mod dashboard;
pub mod equipment;
pub mod fuel_logs;
pub mod interventions;
pub mod llm;
pub mod locations;
pub mod maintenance;
pub mod observations;
pub mod parts;
pub mod parts_lookup;
pub mod qrcodes;
pub mod realtime;
pub mod redis;
pub mod time_tracking;

use crate::{config::AppConfig, error::{AppError, AppResult}, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub repository: Repository,
    pub feed: realtime::ChangeFeed,
    pub equipment: equipment::EquipmentService,
    pub fuel_logs: fuel_logs::FuelLogsService,
    pub locations: locations::LocationsService,
    pub parts: parts::PartsService,
    pub parts_lookup: parts_lookup::PartsLookupService,
    pub maintenance: maintenance::MaintenanceService,
    pub interventions: interventions::InterventionsService,
    pub observations: observations::ObservationsService,
    pub time_tracking: time_tracking::TimeTrackingService,
    pub qrcodes: qrcodes::QrCodeService,
    pub dashboard: dashboard::DashboardService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(
        repository: Repository,
        config: &AppConfig,
        redis: Option<redis::RedisService>,
    ) -> AppResult<Self> {
        let feed = realtime::ChangeFeed::new(config.realtime.channel_capacity);
        let llm = llm::LlmClient::new(&config.llm)
            .map_err(|e| AppError::Internal(format!("Failed to create LLM client: {}", e)))?;

        Ok(Self {
            equipment: equipment::EquipmentService::new(repository.clone(), feed.clone()),
            fuel_logs: fuel_logs::FuelLogsService::new(repository.clone(), feed.clone()),
            locations: locations::LocationsService::new(repository.clone(), feed.clone()),
            parts: parts::PartsService::new(repository.clone(), feed.clone()),
            parts_lookup: parts_lookup::PartsLookupService::new(llm, redis, config.llm.cache_ttl_seconds),
            maintenance: maintenance::MaintenanceService::new(repository.clone(), feed.clone()),
            interventions: interventions::InterventionsService::new(repository.clone(), feed.clone()),
            observations: observations::ObservationsService::new(repository.clone(), feed.clone()),
            time_tracking: time_tracking::TimeTrackingService::new(repository.clone(), feed.clone()),
            qrcodes: qrcodes::QrCodeService::new(repository.clone()),
            dashboard: dashboard::DashboardService::new(repository.clone()),
            feed,
            repository,
        })
    }
}
