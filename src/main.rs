//! OptiField Server - Farm Equipment Management
//!
//! REST API server with realtime change streams.

use anyhow::Context;
use axum::{
    routing::{delete, get, post, put},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use optifield::{
    api,
    config::AppConfig,
    logging,
    repository::Repository,
    services::{redis::RedisService, Services},
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;

    let _log_guard = logging::init(&config.logging);

    tracing::info!("Starting OptiField Server v{}", env!("CARGO_PKG_VERSION"));

    // Create database connection pool
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await
        .context("Failed to connect to database")?;

    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;

    tracing::info!("Database migrations completed");

    // Redis only caches parts lookups, the server runs without it
    let redis = match RedisService::new(&config.redis.url).await {
        Ok(redis) => {
            tracing::info!("Connected to Redis");
            Some(redis)
        }
        Err(e) => {
            tracing::warn!("Redis unavailable, parts lookups will not be cached: {}", e);
            None
        }
    };

    let repository = Repository::new(pool);
    let services = Services::new(repository, &config, redis).context("Failed to create services")?;

    let addr = SocketAddr::new(
        config.server.host.parse().context("Invalid host address")?,
        config.server.port,
    );

    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    };

    let app = create_router(state);

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes
fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        // Health check
        .route("/health", get(api::health::health_check))
        .route("/ready", get(api::health::readiness_check))
        // Dashboard
        .route("/dashboard", get(api::dashboard::get_dashboard))
        // Equipment
        .route("/equipment", get(api::equipment::list_equipment))
        .route("/equipment", post(api::equipment::create_equipment))
        .route("/equipment/filters", get(api::equipment::equipment_filter_options))
        .route("/equipment/:id", get(api::equipment::get_equipment))
        .route("/equipment/:id", put(api::equipment::update_equipment))
        .route("/equipment/:id", delete(api::equipment::delete_equipment))
        .route("/equipment/:id/wear", put(api::equipment::update_wear))
        .route("/equipment/:id/qrcode", post(api::equipment::issue_qrcode))
        .route("/equipment/:id/qrcode", delete(api::equipment::revoke_qrcode))
        .route("/equipment/:id/parts", get(api::equipment::equipment_parts))
        .route("/equipment/:id/fuel-logs", get(api::fuel_logs::list_fuel_logs))
        .route("/equipment/:id/fuel-logs", post(api::fuel_logs::create_fuel_log))
        .route("/equipment/:id/fuel-logs/summary", get(api::fuel_logs::fuel_summary))
        .route("/fuel-logs/:id", put(api::fuel_logs::update_fuel_log))
        .route("/fuel-logs/:id", delete(api::fuel_logs::delete_fuel_log))
        // Storage locations
        .route("/locations", get(api::locations::list_locations))
        .route("/locations", post(api::locations::add_location))
        // Parts
        .route("/parts", get(api::parts::list_parts))
        .route("/parts", post(api::parts::create_part))
        .route("/parts/lookup", post(api::parts::lookup_part))
        .route("/parts/:id", get(api::parts::get_part))
        .route("/parts/:id", put(api::parts::update_part))
        .route("/parts/:id", delete(api::parts::delete_part))
        .route("/parts/:id/stock", post(api::parts::adjust_stock))
        // Maintenance
        .route("/maintenance/tasks", get(api::maintenance::list_tasks))
        .route("/maintenance/tasks", post(api::maintenance::create_task))
        .route("/maintenance/tasks/:id", get(api::maintenance::get_task))
        .route("/maintenance/tasks/:id", put(api::maintenance::update_task))
        .route("/maintenance/tasks/:id", delete(api::maintenance::delete_task))
        .route("/maintenance/tasks/:id/status", post(api::maintenance::transition_task))
        .route("/maintenance/plans", get(api::maintenance::list_plans))
        .route("/maintenance/plans", post(api::maintenance::create_plan))
        .route("/maintenance/plans/:id", get(api::maintenance::get_plan))
        .route("/maintenance/plans/:id", put(api::maintenance::update_plan))
        .route("/maintenance/plans/:id", delete(api::maintenance::delete_plan))
        .route("/maintenance/plans/:id/schedule", post(api::maintenance::schedule_plan))
        // Interventions
        .route("/interventions", get(api::interventions::list_interventions))
        .route("/interventions", post(api::interventions::create_intervention))
        .route("/interventions/:id", get(api::interventions::get_intervention))
        .route("/interventions/:id", put(api::interventions::update_intervention))
        .route("/interventions/:id", delete(api::interventions::delete_intervention))
        .route("/interventions/:id/complete", post(api::interventions::complete_intervention))
        // Observations
        .route("/observations", get(api::observations::list_observations))
        .route("/observations", post(api::observations::create_observation))
        .route("/observations/:id", delete(api::observations::delete_observation))
        // Time tracking
        .route("/time-entries", get(api::time_entries::list_time_entries))
        .route("/time-entries", post(api::time_entries::start_time_entry))
        .route("/time-entries/current", get(api::time_entries::current_time_entry))
        .route("/time-entries/summary", get(api::time_entries::time_summary))
        .route("/time-entries/:id", get(api::time_entries::get_time_entry))
        .route("/time-entries/:id", delete(api::time_entries::delete_time_entry))
        .route("/time-entries/:id/pause", post(api::time_entries::pause_time_entry))
        .route("/time-entries/:id/resume", post(api::time_entries::resume_time_entry))
        .route("/time-entries/:id/stop", post(api::time_entries::stop_time_entry))
        // Realtime
        .route("/realtime/:table", get(api::realtime::subscribe))
        // QR scan
        .route("/scan/:hash", get(api::scan::scan))
        .with_state(state.clone());

    // Printed QR codes point at the short root path
    let scan = Router::new()
        .route("/scan/:hash", get(api::scan::scan))
        .with_state(state);

    let openapi = api::openapi::create_openapi_router();

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(scan)
        .merge(openapi)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
