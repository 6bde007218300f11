//! Storage locations service

use uuid::Uuid;

use super::realtime::ChangeFeed;
use crate::{
    error::{AppError, AppResult},
    models::{
        location::{CreateLocation, StorageLocation},
        realtime::Table,
    },
    repository::Repository,
};

/// Outcome of adding a location
#[derive(Debug, Clone, PartialEq)]
pub enum AddedLocation {
    Created(StorageLocation),
    /// A location with the same name was already there
    Existing(StorageLocation),
}

impl AddedLocation {
    pub fn into_inner(self) -> StorageLocation {
        match self {
            AddedLocation::Created(l) | AddedLocation::Existing(l) => l,
        }
    }
}

#[derive(Clone)]
pub struct LocationsService {
    repository: Repository,
    feed: ChangeFeed,
}

impl LocationsService {
    pub fn new(repository: Repository, feed: ChangeFeed) -> Self {
        Self { repository, feed }
    }

    pub async fn list(&self, owner_id: Uuid) -> AppResult<Vec<StorageLocation>> {
        self.repository.locations.list(owner_id).await
    }

    /// Add a location, or return the one already carrying that name
    pub async fn add(&self, owner_id: Uuid, data: &CreateLocation) -> AppResult<AddedLocation> {
        if let Some(existing) = self.repository.locations.find_by_name(owner_id, &data.name).await? {
            return Ok(AddedLocation::Existing(existing));
        }

        match self.repository.locations.insert_new(owner_id, data).await? {
            Some(location) => {
                tracing::info!("Storage location {} added: {}", location.id, location.name);
                self.feed.inserted(Table::StorageLocations, owner_id, &location);
                Ok(AddedLocation::Created(location))
            }
            // Lost a race with a concurrent insert of the same name
            None => self
                .repository
                .locations
                .find_by_name(owner_id, &data.name)
                .await?
                .map(AddedLocation::Existing)
                .ok_or_else(|| AppError::Conflict(format!("Storage location {} is being created", data.name))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_added_location_unwraps_either_way() {
        let location = StorageLocation {
            id: 3,
            name: "Shed A".into(),
            description: None,
            owner_id: Uuid::nil(),
            created_at: Utc::now(),
        };
        assert_eq!(AddedLocation::Created(location.clone()).into_inner(), location);
        assert_eq!(AddedLocation::Existing(location.clone()).into_inner().id, 3);
    }
}
