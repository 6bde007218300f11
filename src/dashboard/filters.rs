//! Equipment list filtering and sorting

use std::cmp::Ordering;
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};
use utoipa::ToSchema;

use crate::models::{equipment::EquipmentQuery, Equipment, EquipmentStatus};

/// Category value that keeps every row
pub const CATEGORY_ALL: &str = "all";
/// Category value that keeps rows without a type
pub const CATEGORY_OTHER: &str = "other";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    Name,
    Year,
    Manufacturer,
    Status,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Search, category tab, multi-select filters and sort of the equipment list.
/// The default value keeps the input untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct EquipmentFilter {
    pub search: String,
    pub category: Option<String>,
    pub status: Vec<EquipmentStatus>,
    pub equipment_type: Vec<String>,
    pub manufacturer: Vec<String>,
    pub year: Vec<i32>,
    pub sort_by: Option<SortField>,
    pub sort_order: SortOrder,
}

impl EquipmentFilter {
    /// Build a filter from the list endpoint's query string, ignoring unparsable values
    pub fn from_query(query: &EquipmentQuery) -> Self {
        fn split(list: &Option<String>) -> Vec<String> {
            list.as_deref()
                .map(|s| {
                    s.split(',')
                        .map(str::trim)
                        .filter(|v| !v.is_empty())
                        .map(String::from)
                        .collect()
                })
                .unwrap_or_default()
        }

        Self {
            search: query.search.clone().unwrap_or_default(),
            category: query.category.clone(),
            status: split(&query.status).iter().filter_map(|s| s.parse().ok()).collect(),
            equipment_type: split(&query.equipment_type),
            manufacturer: split(&query.manufacturer),
            year: split(&query.year).iter().filter_map(|y| y.parse().ok()).collect(),
            sort_by: query.sort_by.as_deref().and_then(|s| match s {
                "name" => Some(SortField::Name),
                "year" => Some(SortField::Year),
                "manufacturer" => Some(SortField::Manufacturer),
                "status" => Some(SortField::Status),
                _ => None,
            }),
            sort_order: match query.sort_order.as_deref() {
                Some("desc") => SortOrder::Desc,
                _ => SortOrder::Asc,
            },
        }
    }

    fn matches(&self, equipment: &Equipment, needle: &str) -> bool {
        if !needle.is_empty() {
            let found = [
                Some(equipment.name.as_str()),
                equipment.model.as_deref(),
                equipment.manufacturer.as_deref(),
                equipment.equipment_type.as_deref(),
                equipment.serial_number.as_deref(),
            ]
            .into_iter()
            .flatten()
            .any(|field| fold(field).contains(needle));
            if !found {
                return false;
            }
        }

        match self.category.as_deref().map(str::trim) {
            None | Some("") | Some(CATEGORY_ALL) => {}
            Some(CATEGORY_OTHER) => {
                if equipment.equipment_type.as_deref().is_some_and(|t| !t.trim().is_empty()) {
                    return false;
                }
            }
            Some(category) => {
                let same = equipment
                    .equipment_type
                    .as_deref()
                    .is_some_and(|t| t.eq_ignore_ascii_case(category));
                if !same {
                    return false;
                }
            }
        }

        if !self.status.is_empty() && !self.status.contains(&equipment.status) {
            return false;
        }
        if !self.equipment_type.is_empty() && !contains_opt(&self.equipment_type, &equipment.equipment_type) {
            return false;
        }
        if !self.manufacturer.is_empty() && !contains_opt(&self.manufacturer, &equipment.manufacturer) {
            return false;
        }
        if !self.year.is_empty() && !equipment.year.is_some_and(|y| self.year.contains(&y)) {
            return false;
        }

        true
    }
}

fn contains_opt(values: &[String], field: &Option<String>) -> bool {
    field.as_ref().is_some_and(|f| values.iter().any(|v| v == f))
}

/// Lowercase and strip diacritics so "Éclair" matches "eclair"
pub fn fold(s: &str) -> String {
    s.nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
}

fn compare(a: &Equipment, b: &Equipment, field: SortField) -> Ordering {
    match field {
        SortField::Name => fold(&a.name).cmp(&fold(&b.name)),
        // undated equipment sorts first ascending
        SortField::Year => a.year.cmp(&b.year),
        SortField::Manufacturer => {
            let key = |e: &Equipment| e.manufacturer.as_deref().map(fold).unwrap_or_default();
            key(a).cmp(&key(b))
        }
        SortField::Status => a.status.as_str().cmp(b.status.as_str()),
    }
}

/// Apply a filter to an equipment list. Sorting is stable: rows with equal keys keep
/// their input order in both directions.
pub fn filter_equipment(equipment: &[Equipment], filter: &EquipmentFilter) -> Vec<Equipment> {
    let needle = fold(filter.search.trim());

    let mut rows: Vec<Equipment> = equipment
        .iter()
        .filter(|e| filter.matches(e, &needle))
        .cloned()
        .collect();

    if let Some(field) = filter.sort_by {
        rows.sort_by(|a, b| {
            let ordering = compare(a, b, field);
            match filter.sort_order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        });
    }

    rows
}

/// Values offered by the multi-select filters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FilterOptions {
    pub statuses: Vec<EquipmentStatus>,
    pub types: Vec<String>,
    pub manufacturers: Vec<String>,
    /// Most recent first
    pub years: Vec<i32>,
}

pub fn filter_options(equipment: &[Equipment]) -> FilterOptions {
    let statuses = EquipmentStatus::ALL
        .iter()
        .copied()
        .filter(|s| equipment.iter().any(|e| e.status == *s))
        .collect();

    let types: BTreeSet<String> = equipment
        .iter()
        .filter_map(|e| e.equipment_type.clone())
        .filter(|t| !t.trim().is_empty())
        .collect();

    let manufacturers: BTreeSet<String> = equipment
        .iter()
        .filter_map(|e| e.manufacturer.clone())
        .filter(|m| !m.trim().is_empty())
        .collect();

    let years: BTreeSet<i32> = equipment.iter().filter_map(|e| e.year).collect();

    FilterOptions {
        statuses,
        types: types.into_iter().collect(),
        manufacturers: manufacturers.into_iter().collect(),
        years: years.into_iter().rev().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WearUnit;
    use chrono::Utc;
    use uuid::Uuid;

    fn equipment(id: i32, name: &str, status: EquipmentStatus) -> Equipment {
        let now = Utc::now();
        Equipment {
            id,
            name: name.to_string(),
            equipment_type: None,
            category: None,
            manufacturer: None,
            model: None,
            year: None,
            serial_number: None,
            purchase_date: None,
            status,
            location: None,
            wear_unit: WearUnit::Hours,
            wear_value: 0.0,
            last_wear_update: None,
            notes: None,
            owner_id: Uuid::nil(),
            farm_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn fleet() -> Vec<Equipment> {
        let mut tractor = equipment(1, "Tracteur Fendt", EquipmentStatus::Operational);
        tractor.equipment_type = Some("tractor".into());
        tractor.manufacturer = Some("Fendt".into());
        tractor.year = Some(2019);

        let mut harvester = equipment(2, "Moissonneuse", EquipmentStatus::Repair);
        harvester.equipment_type = Some("harvester".into());
        harvester.manufacturer = Some("Claas".into());
        harvester.model = Some("Lexion 8900".into());
        harvester.year = Some(2021);

        let mut sprayer = equipment(3, "Pulvérisateur", EquipmentStatus::Operational);
        sprayer.manufacturer = Some("Amazone".into());
        sprayer.serial_number = Some("AMZ-0042".into());
        sprayer.year = Some(2019);

        vec![tractor, harvester, sprayer]
    }

    fn names(rows: &[Equipment]) -> Vec<&str> {
        rows.iter().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn test_empty_filter_is_identity() {
        let rows = fleet();
        assert_eq!(filter_equipment(&rows, &EquipmentFilter::default()), rows);
    }

    #[test]
    fn test_sort_by_name() {
        let rows = vec![
            equipment(1, "B", EquipmentStatus::Operational),
            equipment(2, "A", EquipmentStatus::Repair),
        ];
        let filter = EquipmentFilter {
            sort_by: Some(SortField::Name),
            ..Default::default()
        };
        let sorted = filter_equipment(&rows, &filter);
        assert_eq!(names(&sorted), vec!["A", "B"]);
    }

    #[test]
    fn test_sort_is_stable_both_directions() {
        let rows = fleet();
        for sort_order in [SortOrder::Asc, SortOrder::Desc] {
            let filter = EquipmentFilter {
                sort_by: Some(SortField::Year),
                sort_order,
                ..Default::default()
            };
            let sorted = filter_equipment(&rows, &filter);
            let ids_2019: Vec<i32> = sorted.iter().filter(|e| e.year == Some(2019)).map(|e| e.id).collect();
            assert_eq!(ids_2019, vec![1, 3]);
        }
    }

    #[test]
    fn test_search_is_accent_and_case_insensitive() {
        let filter = EquipmentFilter {
            search: "PULVERISATEUR".into(),
            ..Default::default()
        };
        assert_eq!(names(&filter_equipment(&fleet(), &filter)), vec!["Pulvérisateur"]);

        let filter = EquipmentFilter {
            search: "lexion".into(),
            ..Default::default()
        };
        assert_eq!(names(&filter_equipment(&fleet(), &filter)), vec!["Moissonneuse"]);

        let filter = EquipmentFilter {
            search: "amz-00".into(),
            ..Default::default()
        };
        assert_eq!(filter_equipment(&fleet(), &filter).len(), 1);
    }

    #[test]
    fn test_category_tabs() {
        let by = |category: &str| {
            let filter = EquipmentFilter {
                category: Some(category.into()),
                ..Default::default()
            };
            filter_equipment(&fleet(), &filter).iter().map(|e| e.id).collect::<Vec<_>>()
        };
        assert_eq!(by("all"), vec![1, 2, 3]);
        assert_eq!(by("other"), vec![3]);
        assert_eq!(by("Tractor"), vec![1]);
    }

    #[test]
    fn test_multi_select_filters() {
        let filter = EquipmentFilter {
            status: vec![EquipmentStatus::Operational],
            year: vec![2019, 2021],
            ..Default::default()
        };
        let ids: Vec<i32> = filter_equipment(&fleet(), &filter).iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![1, 3]);

        let filter = EquipmentFilter {
            manufacturer: vec!["Claas".into(), "Fendt".into()],
            sort_by: Some(SortField::Manufacturer),
            sort_order: SortOrder::Desc,
            ..Default::default()
        };
        let ids: Vec<i32> = filter_equipment(&fleet(), &filter).iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_from_query() {
        let query = EquipmentQuery {
            status: Some("operational, repair,bogus".into()),
            year: Some("2019,abc".into()),
            sort_by: Some("year".into()),
            sort_order: Some("desc".into()),
            ..Default::default()
        };
        let filter = EquipmentFilter::from_query(&query);
        assert_eq!(filter.status, vec![EquipmentStatus::Operational, EquipmentStatus::Repair]);
        assert_eq!(filter.year, vec![2019]);
        assert_eq!(filter.sort_by, Some(SortField::Year));
        assert_eq!(filter.sort_order, SortOrder::Desc);
    }

    #[test]
    fn test_filter_options() {
        let options = filter_options(&fleet());
        assert_eq!(options.statuses, vec![EquipmentStatus::Operational, EquipmentStatus::Repair]);
        assert_eq!(options.types, vec!["harvester", "tractor"]);
        assert_eq!(options.manufacturers, vec!["Amazone", "Claas", "Fendt"]);
        assert_eq!(options.years, vec![2021, 2019]);
    }
}
