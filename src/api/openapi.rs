//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{
    dashboard, equipment, fuel_logs, health, interventions, locations, maintenance, observations,
    parts, realtime, scan, time_entries,
};
use crate::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "OptiField API",
        version = "1.0.0",
        description = "Farm equipment maintenance REST API with realtime change streams"
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Dashboard
        dashboard::get_dashboard,
        // Equipment
        equipment::list_equipment,
        equipment::equipment_filter_options,
        equipment::get_equipment,
        equipment::create_equipment,
        equipment::update_equipment,
        equipment::update_wear,
        equipment::delete_equipment,
        equipment::issue_qrcode,
        equipment::revoke_qrcode,
        equipment::equipment_parts,
        // Fuel logs
        fuel_logs::list_fuel_logs,
        fuel_logs::fuel_summary,
        fuel_logs::create_fuel_log,
        fuel_logs::update_fuel_log,
        fuel_logs::delete_fuel_log,
        // Storage locations
        locations::list_locations,
        locations::add_location,
        // Parts
        parts::list_parts,
        parts::get_part,
        parts::create_part,
        parts::update_part,
        parts::adjust_stock,
        parts::delete_part,
        parts::lookup_part,
        // Maintenance
        maintenance::list_tasks,
        maintenance::get_task,
        maintenance::create_task,
        maintenance::update_task,
        maintenance::transition_task,
        maintenance::delete_task,
        maintenance::list_plans,
        maintenance::get_plan,
        maintenance::create_plan,
        maintenance::update_plan,
        maintenance::delete_plan,
        maintenance::schedule_plan,
        // Interventions
        interventions::list_interventions,
        interventions::get_intervention,
        interventions::create_intervention,
        interventions::update_intervention,
        interventions::complete_intervention,
        interventions::delete_intervention,
        // Observations
        observations::list_observations,
        observations::create_observation,
        observations::delete_observation,
        // Time tracking
        time_entries::list_time_entries,
        time_entries::current_time_entry,
        time_entries::time_summary,
        time_entries::get_time_entry,
        time_entries::start_time_entry,
        time_entries::pause_time_entry,
        time_entries::resume_time_entry,
        time_entries::stop_time_entry,
        time_entries::delete_time_entry,
        // Realtime
        realtime::subscribe,
        // Scan
        scan::scan,
    ),
    components(
        schemas(
            // Enums
            models::EquipmentStatus,
            models::WearUnit,
            models::Priority,
            models::MaintenanceType,
            models::TaskStatus,
            models::MaintenanceFrequency,
            models::MaintenanceUnit,
            models::InterventionStatus,
            models::TimeEntryStatus,
            models::TimeEntryTaskType,
            models::UrgencyLevel,
            // Equipment
            models::equipment::Equipment,
            models::equipment::CreateEquipment,
            models::equipment::UpdateEquipment,
            models::equipment::UpdateWear,
            models::qrcode::EquipmentQrCode,
            models::fuel_log::FuelLog,
            models::fuel_log::CreateFuelLog,
            models::fuel_log::UpdateFuelLog,
            models::fuel_log::FuelSummary,
            models::location::StorageLocation,
            models::location::CreateLocation,
            // Parts
            models::part::Part,
            models::part::CreatePart,
            models::part::UpdatePart,
            models::part::AdjustStock,
            models::part::PartLookupRequest,
            models::part::PartLookupResponse,
            models::part::PartTechnicalInfo,
            models::part::LookupSource,
            // Maintenance
            models::maintenance::MaintenanceTask,
            models::maintenance::CreateTask,
            models::maintenance::UpdateTask,
            models::maintenance::TaskTransition,
            models::maintenance::MaintenancePlan,
            models::maintenance::CreatePlan,
            models::maintenance::UpdatePlan,
            models::maintenance::ScheduleRequest,
            crate::services::maintenance::ScheduleResult,
            // Interventions
            models::intervention::Intervention,
            models::intervention::CreateIntervention,
            models::intervention::UpdateIntervention,
            models::intervention::InterventionReport,
            models::intervention::PartUsage,
            models::intervention::Coordinates,
            // Observations
            models::observation::FieldObservation,
            models::observation::CreateObservation,
            // Time tracking
            models::time_entry::TimeEntry,
            models::time_entry::StartTimeEntry,
            models::time_entry::StopTimeEntry,
            models::time_entry::TimeAction,
            // Realtime
            models::realtime::ChangeEvent,
            models::realtime::ChangeKind,
            models::realtime::Table,
            // Dashboard
            crate::dashboard::DashboardOverview,
            crate::dashboard::DashboardStats,
            crate::dashboard::UrgentIntervention,
            crate::dashboard::StockAlert,
            crate::dashboard::CalendarEvent,
            crate::dashboard::EventKind,
            crate::dashboard::FilterOptions,
            crate::dashboard::TimeSummary,
            crate::dashboard::time::TaskTypeHours,
            crate::dashboard::time::EquipmentHours,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "dashboard", description = "Derived dashboard data"),
        (name = "equipment", description = "Equipment fleet and QR codes"),
        (name = "fuel_logs", description = "Fuel fill-ups per equipment"),
        (name = "locations", description = "Parts storage locations"),
        (name = "parts", description = "Parts inventory and technical lookup"),
        (name = "maintenance", description = "Maintenance tasks and recurring plans"),
        (name = "interventions", description = "Field interventions"),
        (name = "observations", description = "Field observations"),
        (name = "time_entries", description = "Time tracking"),
        (name = "realtime", description = "Row change streams"),
        (name = "scan", description = "QR code resolution")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
