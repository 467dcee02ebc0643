//! Production data: batches, the batch cost ledger, and husbandry logs.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    BatchId, FarmId, FeedingLogId, HealthLogId, SpeciesId, TankId, WaterLogId, WaterQualityStatus,
};

/// Stage assigned to a batch created without one.
pub const DEFAULT_BATCH_STAGE: &str = "Fry";

/// A production batch, read together with its species, tank and farm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Batch {
    pub batch_id: BatchId,
    pub species_id: SpeciesId,
    pub tank_id: TankId,
    pub birth_date: NaiveDate,
    pub initial_quantity: i32,
    pub current_quantity: i32,
    pub stage: String,
    pub estimated_harvest_date: Option<NaiveDate>,
    pub common_name: String,
    pub scientific_name: Option<String>,
    pub tank_name: String,
    pub tank_type: Option<String>,
    pub farm_id: FarmId,
    pub farm_name: String,
    pub location: Option<String>,
}

/// Fields of a new batch. The current quantity starts at the initial quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBatch {
    pub species_id: SpeciesId,
    pub tank_id: TankId,
    pub birth_date: NaiveDate,
    pub initial_quantity: i32,
    pub stage: Option<String>,
    pub estimated_harvest_date: Option<NaiveDate>,
}

/// Full replacement of a batch's writable fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchUpdate {
    pub species_id: SpeciesId,
    pub tank_id: TankId,
    pub birth_date: NaiveDate,
    pub initial_quantity: i32,
    pub current_quantity: i32,
    pub stage: String,
    pub estimated_harvest_date: Option<NaiveDate>,
}

/// Accumulated costs of a batch.
///
/// Every component is nullable in storage. The ledger total treats a
/// missing component as zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchFinancials {
    pub batch_id: BatchId,
    pub total_feed_cost: Option<Decimal>,
    pub total_labor_cost: Option<Decimal>,
    pub water_electricity_cost: Option<Decimal>,
    pub medication_cost: Option<Decimal>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl BatchFinancials {
    /// Ledger of a batch with no recorded costs.
    pub fn empty(batch_id: BatchId) -> Self {
        Self {
            batch_id,
            total_feed_cost: Some(Decimal::ZERO),
            total_labor_cost: Some(Decimal::ZERO),
            water_electricity_cost: Some(Decimal::ZERO),
            medication_cost: Some(Decimal::ZERO),
            updated_at: None,
        }
    }

    /// Sum of the four cost components, each coalesced to zero.
    pub fn total_cost(&self) -> Decimal {
        [
            self.total_feed_cost,
            self.total_labor_cost,
            self.water_electricity_cost,
            self.medication_cost,
        ]
        .into_iter()
        .map(|component| component.unwrap_or(Decimal::ZERO))
        .sum()
    }
}

/// Replacement values for a batch ledger. Omitted components are stored as NULL.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialsInput {
    pub total_feed_cost: Option<Decimal>,
    pub total_labor_cost: Option<Decimal>,
    pub water_electricity_cost: Option<Decimal>,
    pub medication_cost: Option<Decimal>,
}

/// A water-quality reading for a tank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterLog {
    pub log_id: WaterLogId,
    pub tank_id: TankId,
    pub ph_level: Option<Decimal>,
    pub temperature: Option<Decimal>,
    pub dissolved_oxygen: Option<Decimal>,
    pub ammonia_level: Option<Decimal>,
    pub measured_by_user_id: Option<i32>,
    pub measured_at: DateTime<Utc>,
    pub status: WaterQualityStatus,
    pub tank_name: String,
    pub farm_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewWaterLog {
    pub tank_id: TankId,
    pub ph_level: Option<Decimal>,
    pub temperature: Option<Decimal>,
    pub dissolved_oxygen: Option<Decimal>,
    pub ammonia_level: Option<Decimal>,
    pub measured_by_user_id: Option<i32>,
}

/// Latest tank reading compared against one live batch's species targets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterCompliance {
    pub tank_id: TankId,
    pub batch_id: BatchId,
    pub species_name: String,
    pub measured_at: DateTime<Utc>,
    pub temperature: Option<Decimal>,
    pub ideal_temp_min: Option<Decimal>,
    pub ideal_temp_max: Option<Decimal>,
    pub temperature_compliant: bool,
    pub ph_level: Option<Decimal>,
    pub ideal_ph_min: Option<Decimal>,
    pub ideal_ph_max: Option<Decimal>,
    pub ph_compliant: bool,
}

/// A feeding event for a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedingLog {
    pub feeding_id: FeedingLogId,
    pub batch_id: BatchId,
    pub food_type: String,
    pub amount_grams: Decimal,
    pub cost_per_kg: Decimal,
    pub recorded_by: Option<i32>,
    pub notes: Option<String>,
    pub feed_time: DateTime<Utc>,
    pub common_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewFeedingLog {
    pub batch_id: BatchId,
    pub food_type: String,
    pub amount_grams: Decimal,
    pub cost_per_kg: Decimal,
    pub recorded_by: Option<i32>,
    pub notes: Option<String>,
}

impl NewFeedingLog {
    /// Cost of this feeding: grams converted to kilograms times the unit price.
    /// `None` when the product does not fit a `Decimal`.
    pub fn cost(&self) -> Option<Decimal> {
        (self.amount_grams / Decimal::ONE_THOUSAND).checked_mul(self.cost_per_kg)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedingSummary {
    pub batch_id: BatchId,
    pub total_feedings: i64,
    pub total_grams: Decimal,
    pub total_cost: Decimal,
    pub first_feeding: Option<DateTime<Utc>>,
    pub last_feeding: Option<DateTime<Utc>>,
}

impl FeedingSummary {
    pub fn empty(batch_id: BatchId) -> Self {
        Self {
            batch_id,
            total_feedings: 0,
            total_grams: Decimal::ZERO,
            total_cost: Decimal::ZERO,
            first_feeding: None,
            last_feeding: None,
        }
    }
}

/// A health observation for a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthLog {
    pub health_log_id: HealthLogId,
    pub batch_id: BatchId,
    pub condition_notes: Option<String>,
    pub treatment_applied: Option<String>,
    pub mortality_count: i32,
    pub recorded_by: Option<i32>,
    pub log_date: NaiveDate,
    pub common_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewHealthLog {
    pub batch_id: BatchId,
    pub condition_notes: Option<String>,
    pub treatment_applied: Option<String>,
    pub mortality_count: Option<i32>,
    pub recorded_by: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthSummary {
    pub batch_id: BatchId,
    pub total_health_logs: i64,
    pub total_deaths: i64,
    pub disease_events: i64,
    pub first_log: Option<NaiveDate>,
    pub last_log: Option<NaiveDate>,
}

impl HealthSummary {
    pub fn empty(batch_id: BatchId) -> Self {
        Self {
            batch_id,
            total_health_logs: 0,
            total_deaths: 0,
            disease_events: 0,
            first_log: None,
            last_log: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ledger_total_coalesces_missing_components() {
        let ledger = BatchFinancials {
            batch_id: BatchId::new(5),
            total_feed_cost: Some(Decimal::from(10)),
            total_labor_cost: Some(Decimal::from(5)),
            water_electricity_cost: Some(Decimal::ZERO),
            medication_cost: None,
            updated_at: None,
        };
        assert_eq!(ledger.total_cost(), Decimal::from(15));
    }

    #[test]
    fn empty_ledger_totals_zero() {
        assert_eq!(
            BatchFinancials::empty(BatchId::new(1)).total_cost(),
            Decimal::ZERO
        );
    }

    #[test]
    fn all_null_ledger_totals_zero() {
        let ledger = BatchFinancials {
            batch_id: BatchId::new(1),
            total_feed_cost: None,
            total_labor_cost: None,
            water_electricity_cost: None,
            medication_cost: None,
            updated_at: None,
        };
        assert_eq!(ledger.total_cost(), Decimal::ZERO);
    }

    #[test]
    fn feeding_cost_converts_grams_to_kilograms() {
        let log = NewFeedingLog {
            batch_id: BatchId::new(1),
            food_type: "pellet".to_string(),
            amount_grams: Decimal::from(2000),
            cost_per_kg: Decimal::new(350, 2),
            recorded_by: None,
            notes: None,
        };
        assert_eq!(log.cost(), Some(Decimal::new(700, 2)));
    }
}
