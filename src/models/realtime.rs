//! Row change events shared by the change feed and the sync client

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

/// Tables that publish change events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    Equipment,
    Parts,
    MaintenanceTasks,
    MaintenancePlans,
    Interventions,
    FieldObservations,
    TimeEntries,
    FuelLogs,
    StorageLocations,
}

impl Table {
    pub fn as_str(&self) -> &'static str {
        match self {
            Table::Equipment => "equipment",
            Table::Parts => "parts",
            Table::MaintenanceTasks => "maintenance_tasks",
            Table::MaintenancePlans => "maintenance_plans",
            Table::Interventions => "interventions",
            Table::FieldObservations => "field_observations",
            Table::TimeEntries => "time_entries",
            Table::FuelLogs => "fuel_logs",
            Table::StorageLocations => "storage_locations",
        }
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Table {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "equipment" => Ok(Table::Equipment),
            "parts" => Ok(Table::Parts),
            "maintenance_tasks" => Ok(Table::MaintenanceTasks),
            "maintenance_plans" => Ok(Table::MaintenancePlans),
            "interventions" => Ok(Table::Interventions),
            "field_observations" => Ok(Table::FieldObservations),
            "time_entries" => Ok(Table::TimeEntries),
            "fuel_logs" => Ok(Table::FuelLogs),
            "storage_locations" => Ok(Table::StorageLocations),
            _ => Err(format!("Unknown table: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

impl ChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::Insert => "insert",
            ChangeKind::Update => "update",
            ChangeKind::Delete => "delete",
        }
    }
}

impl std::str::FromStr for ChangeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "insert" => Ok(ChangeKind::Insert),
            "update" => Ok(ChangeKind::Update),
            "delete" => Ok(ChangeKind::Delete),
            _ => Err(format!("Unknown event type: {}", s)),
        }
    }
}

/// A committed row change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ChangeEvent {
    pub table: Table,
    pub event_type: ChangeKind,
    pub schema: String,
    pub owner_id: Uuid,
    /// Row before the change (update, delete)
    #[schema(value_type = Option<Object>)]
    pub old: Option<Value>,
    /// Row after the change (insert, update)
    #[schema(value_type = Option<Object>)]
    pub new: Option<Value>,
    pub commit_timestamp: DateTime<Utc>,
}

impl ChangeEvent {
    /// Row id from the new or old snapshot
    pub fn row_id(&self) -> Option<&Value> {
        self.new
            .as_ref()
            .or(self.old.as_ref())
            .and_then(|row| row.get("id"))
    }
}

/// Column filter in `column=eq.value` form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowFilter {
    pub column: String,
    pub value: String,
}

impl RowFilter {
    pub fn parse(filter: &str) -> Result<Self, String> {
        let (column, rest) = filter
            .split_once('=')
            .ok_or_else(|| format!("Invalid filter '{}': expected column=eq.value", filter))?;
        let value = rest
            .strip_prefix("eq.")
            .ok_or_else(|| format!("Invalid filter '{}': only eq is supported", filter))?;
        if column.is_empty() {
            return Err(format!("Invalid filter '{}': empty column", filter));
        }
        Ok(Self {
            column: column.to_string(),
            value: value.to_string(),
        })
    }

    fn matches_row(&self, row: &Value) -> bool {
        match row.get(&self.column) {
            Some(Value::String(s)) => s == &self.value,
            Some(Value::Null) | None => self.value == "null",
            Some(other) => other.to_string() == self.value,
        }
    }

    /// Deletes are matched against the old row, everything else against the new row
    pub fn matches(&self, event: &ChangeEvent) -> bool {
        let row = match event.event_type {
            ChangeKind::Delete => event.old.as_ref(),
            _ => event.new.as_ref(),
        };
        row.map(|r| self.matches_row(r)).unwrap_or(false)
    }
}

impl std::fmt::Display for RowFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}=eq.{}", self.column, self.value)
    }
}

/// Query parameters of the realtime endpoint
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct SubscriptionQuery {
    /// Comma-separated event types (insert, update, delete); all when absent or "*"
    pub events: Option<String>,
    /// Optional `column=eq.value` filter
    pub filter: Option<String>,
}

impl SubscriptionQuery {
    /// Parsed event kinds; empty means every kind
    pub fn kinds(&self) -> Result<Vec<ChangeKind>, String> {
        match self.events.as_deref().map(str::trim) {
            None | Some("") | Some("*") => Ok(Vec::new()),
            Some(list) => list.split(',').map(str::parse).collect(),
        }
    }

    pub fn row_filter(&self) -> Result<Option<RowFilter>, String> {
        self.filter.as_deref().map(RowFilter::parse).transpose()
    }
}
