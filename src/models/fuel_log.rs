//! Fuel fill-ups recorded per equipment

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct FuelLog {
    pub id: i32,
    pub equipment_id: i32,
    pub date: NaiveDate,
    pub fuel_quantity_liters: f64,
    pub price_per_liter: Option<f64>,
    /// Engine hours read at the pump
    pub hours_at_fillup: Option<f64>,
    pub notes: Option<String>,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl FuelLog {
    pub fn cost(&self) -> Option<f64> {
        self.price_per_liter.map(|p| p * self.fuel_quantity_liters)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateFuelLog {
    pub date: NaiveDate,
    #[validate(range(exclusive_min = 0.0, max = 100000.0))]
    pub fuel_quantity_liters: f64,
    #[validate(range(min = 0.0, max = 1000.0))]
    pub price_per_liter: Option<f64>,
    #[validate(range(min = 0.0))]
    pub hours_at_fillup: Option<f64>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateFuelLog {
    pub date: Option<NaiveDate>,
    #[validate(range(exclusive_min = 0.0, max = 100000.0))]
    pub fuel_quantity_liters: Option<f64>,
    #[validate(range(min = 0.0, max = 1000.0))]
    pub price_per_liter: Option<f64>,
    #[validate(range(min = 0.0))]
    pub hours_at_fillup: Option<f64>,
    pub notes: Option<String>,
}

/// Totals over an equipment's fill-ups
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FuelSummary {
    pub equipment_id: i32,
    pub fill_count: usize,
    pub total_liters: f64,
    /// Sum over fill-ups with a known price
    pub total_cost: f64,
    /// Liters per engine hour, when at least two fill-ups carry an hour reading
    pub liters_per_hour: Option<f64>,
}

/// Consumption is measured between the first and last hour readings; the fuel
/// of the first fill-up was burnt before that window and is left out.
pub fn summarize_fuel(equipment_id: i32, logs: &[FuelLog]) -> FuelSummary {
    let total_liters = logs.iter().map(|l| l.fuel_quantity_liters).sum();
    let total_cost = logs.iter().filter_map(FuelLog::cost).sum();

    let mut metered: Vec<&FuelLog> = logs.iter().filter(|l| l.hours_at_fillup.is_some()).collect();
    metered.sort_by(|a, b| {
        a.hours_at_fillup
            .partial_cmp(&b.hours_at_fillup)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let liters_per_hour = match (metered.first(), metered.last()) {
        (Some(first), Some(last)) if metered.len() >= 2 => {
            let hours = last.hours_at_fillup.unwrap_or(0.0) - first.hours_at_fillup.unwrap_or(0.0);
            let burnt: f64 = metered[1..].iter().map(|l| l.fuel_quantity_liters).sum();
            (hours > 0.0).then(|| burnt / hours)
        }
        _ => None,
    };

    FuelSummary {
        equipment_id,
        fill_count: logs.len(),
        total_liters,
        total_cost,
        liters_per_hour,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log(id: i32, liters: f64, price: Option<f64>, hours: Option<f64>) -> FuelLog {
        FuelLog {
            id,
            equipment_id: 1,
            date: NaiveDate::from_ymd_opt(2024, 5, id as u32).unwrap(),
            fuel_quantity_liters: liters,
            price_per_liter: price,
            hours_at_fillup: hours,
            notes: None,
            owner_id: Uuid::nil(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_summary_totals_and_consumption() {
        let logs = vec![
            log(3, 90.0, Some(1.5), Some(1120.0)),
            log(1, 100.0, Some(1.6), Some(1000.0)),
            log(2, 60.0, None, Some(1060.0)),
        ];
        let summary = summarize_fuel(1, &logs);

        assert_eq!(summary.fill_count, 3);
        assert_eq!(summary.total_liters, 250.0);
        assert!((summary.total_cost - 295.0).abs() < 1e-9);
        assert_eq!(summary.liters_per_hour, Some(150.0 / 120.0));
    }

    #[test]
    fn test_consumption_needs_two_readings() {
        let logs = vec![log(1, 100.0, None, Some(1000.0)), log(2, 50.0, None, None)];
        assert_eq!(summarize_fuel(1, &logs).liters_per_hour, None);

        let same_hours = vec![log(1, 10.0, None, Some(5.0)), log(2, 10.0, None, Some(5.0))];
        assert_eq!(summarize_fuel(1, &same_hours).liters_per_hour, None);

        assert_eq!(summarize_fuel(1, &[]).total_liters, 0.0);
    }

    #[test]
    fn test_quantity_must_be_positive() {
        let data = CreateFuelLog {
            date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            fuel_quantity_liters: 0.0,
            price_per_liter: None,
            hours_at_fillup: None,
            notes: None,
        };
        assert!(data.validate().is_err());
    }
}
