//! Reference data: species, farms, tanks and customers.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{CustomerId, FarmId, SpeciesId, TankId};

/// A farmed species and its husbandry targets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Species {
    pub species_id: SpeciesId,
    pub common_name: String,
    pub scientific_name: Option<String>,
    pub description: Option<String>,
    /// Target margin in percent applied by the pricing views.
    pub target_profit_margin: Option<Decimal>,
    pub ideal_temp_min: Option<Decimal>,
    pub ideal_temp_max: Option<Decimal>,
    pub ideal_ph_min: Option<Decimal>,
    pub ideal_ph_max: Option<Decimal>,
}

/// Writable fields of a species, used for both create and full update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpeciesInput {
    pub common_name: String,
    pub scientific_name: Option<String>,
    pub description: Option<String>,
    pub target_profit_margin: Option<Decimal>,
    pub ideal_temp_min: Option<Decimal>,
    pub ideal_temp_max: Option<Decimal>,
    pub ideal_ph_min: Option<Decimal>,
    pub ideal_ph_max: Option<Decimal>,
}

/// A farm site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Farm {
    pub farm_id: FarmId,
    pub farm_name: String,
    pub location: Option<String>,
    pub license_number: Option<String>,
    pub manager_name: Option<String>,
    pub phone: Option<String>,
    pub total_capacity_liters: Option<Decimal>,
    pub established_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FarmInput {
    pub farm_name: String,
    pub location: Option<String>,
    pub license_number: Option<String>,
    pub manager_name: Option<String>,
    pub phone: Option<String>,
    pub total_capacity_liters: Option<Decimal>,
    pub established_date: Option<NaiveDate>,
}

/// A tank, read together with the name of its farm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tank {
    pub tank_id: TankId,
    pub farm_id: FarmId,
    pub tank_name: String,
    pub tank_type: Option<String>,
    pub volume_liters: Option<Decimal>,
    pub is_active: bool,
    pub farm_name: String,
}

/// Writable fields of a tank. `is_active` defaults to `true` on create.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TankInput {
    pub farm_id: FarmId,
    pub tank_name: String,
    pub tank_type: Option<String>,
    pub volume_liters: Option<Decimal>,
    pub is_active: Option<bool>,
}

/// An importing customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub customer_id: CustomerId,
    pub company_name: String,
    pub contact_person: Option<String>,
    pub contact_email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub country_code: Option<String>,
    pub import_license_no: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomerInput {
    pub company_name: String,
    pub contact_person: Option<String>,
    pub contact_email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub country_code: Option<String>,
    pub import_license_no: Option<String>,
}

/// Per-farm production summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FarmPerformance {
    pub farm_id: FarmId,
    pub farm_name: String,
    pub tank_count: i64,
    pub active_batches: i64,
    pub current_stock: i64,
    pub initial_stock: i64,
    pub mortality_rate: Decimal,
    pub total_cost: Decimal,
}
