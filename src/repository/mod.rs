//! Repository layer for database operations
//!
//! Every query is scoped to the caller's owner id. A row that exists but
//! belongs to someone else is reported as an authorization failure, the way a
//! row-level policy rejection would be.

use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::error::AppError;

/// Appends `column = $n` for every field that is set
macro_rules! push_set {
    ($sets:ident, $idx:ident, $( $field:expr => $column:literal ),+ $(,)?) => {
        $(
            if $field.is_some() {
                $sets.push(format!("{} = ${}", $column, $idx));
                $idx += 1;
            }
        )+
    };
}

/// Binds every field that is set, in the same order as `push_set!`
macro_rules! bind_set {
    ($builder:ident, $( $field:expr ),+ $(,)?) => {
        $(
            if let Some(ref val) = $field {
                $builder = $builder.bind(val);
            }
        )+
    };
}

pub mod equipment;
pub mod fuel_logs;
pub mod interventions;
pub mod locations;
pub mod maintenance;
pub mod observations;
pub mod parts;
pub mod qrcodes;
pub mod time_entries;

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub equipment: equipment::EquipmentRepository,
    pub fuel_logs: fuel_logs::FuelLogsRepository,
    pub locations: locations::LocationsRepository,
    pub parts: parts::PartsRepository,
    pub maintenance: maintenance::MaintenanceRepository,
    pub interventions: interventions::InterventionsRepository,
    pub observations: observations::ObservationsRepository,
    pub time_entries: time_entries::TimeEntriesRepository,
    pub qrcodes: qrcodes::QrCodesRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            equipment: equipment::EquipmentRepository::new(pool.clone()),
            fuel_logs: fuel_logs::FuelLogsRepository::new(pool.clone()),
            locations: locations::LocationsRepository::new(pool.clone()),
            parts: parts::PartsRepository::new(pool.clone()),
            maintenance: maintenance::MaintenanceRepository::new(pool.clone()),
            interventions: interventions::InterventionsRepository::new(pool.clone()),
            observations: observations::ObservationsRepository::new(pool.clone()),
            time_entries: time_entries::TimeEntriesRepository::new(pool.clone()),
            qrcodes: qrcodes::QrCodesRepository::new(pool.clone()),
            pool,
        }
    }

    /// Check database connectivity
    pub async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Explains why a scoped lookup matched nothing: missing row or foreign owner
pub(crate) async fn missing_row_error<I>(
    pool: &Pool<Postgres>,
    table: &str,
    owner_column: &str,
    id: I,
) -> AppError
where
    I: for<'q> sqlx::Encode<'q, Postgres> + sqlx::Type<Postgres> + std::fmt::Display + Send + Clone + 'static,
{
    let query = format!("SELECT {} FROM {} WHERE id = $1", owner_column, table);
    match sqlx::query_scalar::<_, Uuid>(&query)
        .bind(id.clone())
        .fetch_optional(pool)
        .await
    {
        Ok(Some(_)) => AppError::Authorization(format!(
            "Insufficient permissions on {} {}",
            table, id
        )),
        Ok(None) => AppError::NotFound(format!("{} {} not found", table, id)),
        Err(e) => e.into(),
    }
}
