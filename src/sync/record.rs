//! Entities the client caches and mutates

use serde::{de::DeserializeOwned, Serialize};

use crate::models::{Equipment, Intervention, MaintenanceTask, Part, Table};

/// Cache key of the dashboard overview
pub const DASHBOARD_KEY: &str = "dashboard";

pub trait Record: Clone + std::fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static {
    const TABLE: Table;
    /// REST collection path below the API root
    const PATH: &'static str;

    fn id(&self) -> i32;

    /// Key of the cached list query; realtime invalidation uses the same name
    fn list_key() -> String {
        Self::TABLE.as_str().to_string()
    }

    fn detail_key(id: i32) -> String {
        format!("{}:{}", Self::TABLE, id)
    }

    /// Name of a field that differs from `previous` but is not accepted by the
    /// update endpoint
    fn read_only_change(&self, _previous: &Self) -> Option<&'static str> {
        None
    }

    /// Queries derived from this entity that must be refetched after a write
    fn related_keys(id: i32) -> Vec<String> {
        vec![Self::detail_key(id), DASHBOARD_KEY.to_string()]
    }
}

impl Record for Equipment {
    const TABLE: Table = Table::Equipment;
    const PATH: &'static str = "/equipment";

    fn id(&self) -> i32 {
        self.id
    }

    fn read_only_change(&self, previous: &Self) -> Option<&'static str> {
        if self.wear_value != previous.wear_value {
            Some("wear_value")
        } else if self.wear_unit != previous.wear_unit {
            Some("wear_unit")
        } else {
            None
        }
    }
}

impl Record for Part {
    const TABLE: Table = Table::Parts;
    const PATH: &'static str = "/parts";

    fn id(&self) -> i32 {
        self.id
    }
}

impl Record for MaintenanceTask {
    const TABLE: Table = Table::MaintenanceTasks;
    const PATH: &'static str = "/maintenance/tasks";

    fn id(&self) -> i32 {
        self.id
    }

    fn read_only_change(&self, previous: &Self) -> Option<&'static str> {
        (self.status != previous.status).then_some("status")
    }

    fn related_keys(id: i32) -> Vec<String> {
        vec![
            Self::detail_key(id),
            DASHBOARD_KEY.to_string(),
            Table::MaintenancePlans.as_str().to_string(),
        ]
    }
}

impl Record for Intervention {
    const TABLE: Table = Table::Interventions;
    const PATH: &'static str = "/interventions";

    fn id(&self) -> i32 {
        self.id
    }

    fn related_keys(id: i32) -> Vec<String> {
        vec![
            Self::detail_key(id),
            DASHBOARD_KEY.to_string(),
            Table::Parts.as_str().to_string(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::tests::task;
    use crate::models::TaskStatus;

    #[test]
    fn test_keys() {
        assert_eq!(Part::list_key(), "parts");
        assert_eq!(Part::detail_key(3), "parts:3");
        assert_eq!(MaintenanceTask::list_key(), "maintenance_tasks");
        assert!(Intervention::related_keys(1).contains(&"parts".to_string()));
    }

    #[test]
    fn test_task_status_is_read_only() {
        let before = task(1, TaskStatus::Scheduled, None);
        let mut after = before.clone();
        after.notes = Some("check belts".into());
        assert_eq!(after.read_only_change(&before), None);

        after.status = TaskStatus::InProgress;
        assert_eq!(after.read_only_change(&before), Some("status"));
    }
}
