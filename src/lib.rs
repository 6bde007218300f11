//! OptiField farm equipment management
//!
//! REST API server with realtime change streams, plus the sync client used by
//! the field application: optimistic mutations, realtime subscriptions with
//! reconnection, time tracking and local drafts.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod logging;
pub mod models;
pub mod repository;
pub mod services;
pub mod sync;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
