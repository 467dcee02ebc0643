//! Optional list filters, as accepted on query strings.
//!
//! Each filter turns into a [`ListQuery`]: an absent field adds no
//! predicate, present fields are ANDed together.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use common::{
    Alert, AlertSeverity, AlertStatus, Batch, BatchId, CustomerId, FarmId, FeedingLog, HealthLog,
    OrderId, OrderStatus, OrderSummary, PricingOverview, ShipmentId, ShipmentStatus,
    ShipmentSummary, SpeciesId, Tank, TankId, TraceabilityRecord, WaterLog, WaterQualityStatus,
};
use serde::Deserialize;

use crate::query::{Comparison, Fields, ListQuery, Predicate, Value};

/// Row cap applied to log and alert lists.
pub const LOG_LIST_LIMIT: i64 = 100;

fn day_start(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Adds a whole-day range over a timestamp column. The end day is inclusive.
fn timestamp_range(
    query: ListQuery,
    field: &'static str,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> ListQuery {
    let query = query.and_if(field, Comparison::Gte, start.map(day_start));
    match end.and_then(|d| d.succ_opt()) {
        Some(next) => query.and(Predicate::lt(field, day_start(next))),
        None => query,
    }
}

/// Adds an inclusive range over a date column.
fn date_range(
    query: ListQuery,
    field: &'static str,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> ListQuery {
    query
        .and_if(field, Comparison::Gte, start)
        .and_if(field, Comparison::Lte, end)
}

fn id<T: Into<i32>>(value: Option<T>) -> Option<i32> {
    value.map(Into::into)
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TankFilter {
    pub farm_id: Option<FarmId>,
}

impl TankFilter {
    pub fn to_query(&self) -> ListQuery {
        ListQuery::new().and_if("farm_id", Comparison::Eq, id(self.farm_id))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BatchFilter {
    pub farm_id: Option<FarmId>,
    pub species_id: Option<SpeciesId>,
    pub stage: Option<String>,
}

impl BatchFilter {
    pub fn to_query(&self) -> ListQuery {
        ListQuery::new()
            .and_if("farm_id", Comparison::Eq, id(self.farm_id))
            .and_if("species_id", Comparison::Eq, id(self.species_id))
            .and_if("stage", Comparison::Eq, self.stage.clone())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WaterLogFilter {
    pub tank_id: Option<TankId>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: Option<WaterQualityStatus>,
}

impl WaterLogFilter {
    pub fn to_query(&self) -> ListQuery {
        let query = ListQuery::new().and_if("tank_id", Comparison::Eq, id(self.tank_id));
        timestamp_range(query, "measured_at", self.start_date, self.end_date)
            .and_if("status", Comparison::Eq, self.status.map(|s| s.as_str()))
            .limit(LOG_LIST_LIMIT)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedingLogFilter {
    pub batch_id: Option<BatchId>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl FeedingLogFilter {
    pub fn to_query(&self) -> ListQuery {
        let query = ListQuery::new().and_if("batch_id", Comparison::Eq, id(self.batch_id));
        timestamp_range(query, "feed_time", self.start_date, self.end_date).limit(LOG_LIST_LIMIT)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HealthLogFilter {
    pub batch_id: Option<BatchId>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl HealthLogFilter {
    pub fn to_query(&self) -> ListQuery {
        let query = ListQuery::new().and_if("batch_id", Comparison::Eq, id(self.batch_id));
        date_range(query, "log_date", self.start_date, self.end_date).limit(LOG_LIST_LIMIT)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderFilter {
    pub customer_id: Option<CustomerId>,
    pub status: Option<OrderStatus>,
}

impl OrderFilter {
    pub fn to_query(&self) -> ListQuery {
        ListQuery::new()
            .and_if("customer_id", Comparison::Eq, id(self.customer_id))
            .and_if("status", Comparison::Eq, self.status.map(|s| s.as_str()))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShipmentFilter {
    pub order_id: Option<OrderId>,
    pub status: Option<ShipmentStatus>,
}

impl ShipmentFilter {
    pub fn to_query(&self) -> ListQuery {
        ListQuery::new()
            .and_if("order_id", Comparison::Eq, id(self.order_id))
            .and_if("status", Comparison::Eq, self.status.map(|s| s.as_str()))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AlertFilter {
    pub status: Option<AlertStatus>,
    pub severity: Option<AlertSeverity>,
    pub farm_id: Option<FarmId>,
}

impl AlertFilter {
    pub fn to_query(&self) -> ListQuery {
        ListQuery::new()
            .and_if("status", Comparison::Eq, self.status.map(|s| s.as_str()))
            .and_if("severity", Comparison::Eq, self.severity.map(|s| s.as_str()))
            .and_if("farm_id", Comparison::Eq, id(self.farm_id))
            .limit(LOG_LIST_LIMIT)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TraceabilityFilter {
    pub shipment_id: Option<ShipmentId>,
    pub customer_id: Option<CustomerId>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl TraceabilityFilter {
    /// Filter selecting every traced box of one shipment.
    pub fn for_shipment(shipment_id: ShipmentId) -> Self {
        Self {
            shipment_id: Some(shipment_id),
            ..Default::default()
        }
    }

    pub fn to_query(&self) -> ListQuery {
        let query = ListQuery::new()
            .and_if("shipment_id", Comparison::Eq, id(self.shipment_id))
            .and_if("customer_id", Comparison::Eq, id(self.customer_id));
        date_range(query, "shipment_date", self.start_date, self.end_date)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PricingFilter {
    pub farm_id: Option<FarmId>,
    pub species_id: Option<SpeciesId>,
}

impl PricingFilter {
    pub fn to_query(&self) -> ListQuery {
        ListQuery::new()
            .and_if("farm_id", Comparison::Eq, id(self.farm_id))
            .and_if("species_id", Comparison::Eq, id(self.species_id))
    }
}

impl Fields for Tank {
    fn field(&self, name: &str) -> Option<Value> {
        match name {
            "farm_id" => Some(self.farm_id.as_i32().into()),
            _ => None,
        }
    }
}

impl Fields for Batch {
    fn field(&self, name: &str) -> Option<Value> {
        match name {
            "farm_id" => Some(self.farm_id.as_i32().into()),
            "species_id" => Some(self.species_id.as_i32().into()),
            "stage" => Some(self.stage.as_str().into()),
            _ => None,
        }
    }
}

impl Fields for WaterLog {
    fn field(&self, name: &str) -> Option<Value> {
        match name {
            "tank_id" => Some(self.tank_id.as_i32().into()),
            "measured_at" => Some(self.measured_at.into()),
            "status" => Some(self.status.as_str().into()),
            _ => None,
        }
    }
}

impl Fields for FeedingLog {
    fn field(&self, name: &str) -> Option<Value> {
        match name {
            "batch_id" => Some(self.batch_id.as_i32().into()),
            "feed_time" => Some(self.feed_time.into()),
            _ => None,
        }
    }
}

impl Fields for HealthLog {
    fn field(&self, name: &str) -> Option<Value> {
        match name {
            "batch_id" => Some(self.batch_id.as_i32().into()),
            "log_date" => Some(self.log_date.into()),
            _ => None,
        }
    }
}

impl Fields for OrderSummary {
    fn field(&self, name: &str) -> Option<Value> {
        match name {
            "customer_id" => Some(self.order.customer_id.as_i32().into()),
            "status" => Some(self.order.status.as_str().into()),
            _ => None,
        }
    }
}

impl Fields for ShipmentSummary {
    fn field(&self, name: &str) -> Option<Value> {
        match name {
            "order_id" => Some(self.shipment.order_id.as_i32().into()),
            "status" => Some(self.shipment.status.as_str().into()),
            _ => None,
        }
    }
}

impl Fields for Alert {
    fn field(&self, name: &str) -> Option<Value> {
        match name {
            "status" => Some(self.status.as_str().into()),
            "severity" => Some(self.severity.as_str().into()),
            "farm_id" => self.farm_id.map(|id| id.as_i32().into()),
            _ => None,
        }
    }
}

impl Fields for TraceabilityRecord {
    fn field(&self, name: &str) -> Option<Value> {
        match name {
            "shipment_id" => Some(self.shipment_id.as_i32().into()),
            "customer_id" => Some(self.customer_id.as_i32().into()),
            "shipment_date" => Some(self.shipment_date.into()),
            _ => None,
        }
    }
}

impl Fields for PricingOverview {
    fn field(&self, name: &str) -> Option<Value> {
        match name {
            "farm_id" => Some(self.farm_id.as_i32().into()),
            "species_id" => Some(self.species_id.as_i32().into()),
            _ => None,
        }
    }
}
