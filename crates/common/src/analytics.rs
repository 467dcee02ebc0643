//! Derived views: alerts, mortality, traceability and pricing.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    AlertId, AlertSeverity, AlertStatus, BatchId, CustomerId, FarmId, OrderId, ShipmentDetailId,
    ShipmentId, ShipmentStatus, SpeciesId, TankId,
};

/// Alert type raised by abnormal water readings.
pub const ALERT_TYPE_WATER_QUALITY: &str = "water_quality";
/// Alert type raised by mass mortality events.
pub const ALERT_TYPE_BIOSECURITY: &str = "biosecurity";

/// An operational alert, read with the names of what it concerns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub alert_id: AlertId,
    pub tank_id: Option<TankId>,
    pub batch_id: Option<BatchId>,
    pub alert_type: String,
    pub severity: AlertSeverity,
    pub message: String,
    pub status: AlertStatus,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub resolved_by: Option<i32>,
    pub tank_name: Option<String>,
    pub farm_id: Option<FarmId>,
    pub farm_name: Option<String>,
    pub species_name: Option<String>,
}

/// Mortality aggregated over every batch of a species.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MortalityAnalysis {
    pub species_id: SpeciesId,
    pub common_name: String,
    pub batch_count: i64,
    pub total_initial: i64,
    pub total_current: i64,
    pub mortality_rate: Decimal,
}

/// A batch whose mortality rate reached the requested threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighRiskBatch {
    pub batch_id: BatchId,
    pub species_name: String,
    pub farm_name: String,
    pub tank_name: String,
    pub stage: String,
    pub initial_quantity: i32,
    pub current_quantity: i32,
    pub mortality_rate: Decimal,
}

/// Origin and history of one batch, from hatching to shipment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchTraceability {
    pub batch_id: BatchId,
    pub species_name: String,
    pub scientific_name: Option<String>,
    pub farm_name: String,
    pub tank_name: String,
    pub birth_date: NaiveDate,
    pub stage: String,
    pub initial_quantity: i32,
    pub current_quantity: i32,
    pub total_feedings: i64,
    pub total_feed_grams: Decimal,
    pub total_health_logs: i64,
    pub total_deaths: i64,
    pub ledger_total: Decimal,
    pub shipment_count: i64,
    pub total_shipped: i64,
}

/// One shipped box traced back to its farm of origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceabilityRecord {
    pub shipment_id: ShipmentId,
    pub shipment_date: NaiveDate,
    pub airway_bill_no: Option<String>,
    pub shipment_status: ShipmentStatus,
    pub order_id: OrderId,
    pub customer_id: CustomerId,
    pub customer_name: String,
    pub country_code: Option<String>,
    pub detail_id: ShipmentDetailId,
    pub box_label_id: Option<String>,
    pub quantity_shipped: i32,
    pub batch_cost_at_shipment: Decimal,
    pub batch_id: BatchId,
    pub species_name: String,
    pub birth_date: NaiveDate,
    pub farm_name: String,
    pub tank_name: String,
}

/// Cost-based pricing of a batch that still has live stock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingOverview {
    pub batch_id: BatchId,
    pub farm_id: FarmId,
    pub farm_name: String,
    pub species_id: SpeciesId,
    pub species: String,
    pub stage: String,
    pub current_quantity: i32,
    pub total_cost: Decimal,
    pub cost_per_unit: Decimal,
    pub target_profit_margin: Decimal,
    pub suggested_unit_price: Decimal,
}

/// Unit selling price of a batch including logistics costs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SellingPrice {
    pub batch_id: BatchId,
    /// `None` when the batch has no live stock to price.
    pub selling_price: Option<Decimal>,
    pub transport_cost: Decimal,
    pub packaging_cost: Decimal,
}
