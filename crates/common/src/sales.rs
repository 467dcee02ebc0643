//! Sales aggregates: orders with their items, shipments with their details.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    BatchId, CustomerId, OrderId, OrderItemId, OrderStatus, ShipmentDetailId, ShipmentId,
    ShipmentStatus, SpeciesId,
};

/// Currency used when an order does not name one.
pub const DEFAULT_CURRENCY: &str = "USD";

/// The stored order row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: OrderId,
    pub customer_id: CustomerId,
    pub order_date: NaiveDate,
    pub status: OrderStatus,
    /// Sum of the order's line totals, maintained by the store.
    pub total_value: Decimal,
    pub currency_code: String,
    pub delivery_address: Option<String>,
    pub created_by: Option<i32>,
    pub notes: Option<String>,
}

/// An order as listed, with its customer's name and country.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderSummary {
    #[serde(flatten)]
    pub order: Order,
    pub company_name: String,
    pub country_code: Option<String>,
}

/// One line of an order, labelled with its species.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub item_id: OrderItemId,
    pub species_id: SpeciesId,
    pub species_name: String,
    pub scientific_name: Option<String>,
    pub quantity_requested: i32,
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

/// An order together with its customer contact and its items ordered by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderAggregate {
    #[serde(flatten)]
    pub order: Order,
    pub company_name: String,
    pub contact_person: Option<String>,
    pub contact_email: Option<String>,
    pub country_code: Option<String>,
    pub address: Option<String>,
    pub items: Vec<OrderItem>,
}

/// Request to create an order and all of its items in one transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewOrder {
    pub customer_id: CustomerId,
    pub delivery_address: Option<String>,
    pub currency_code: Option<String>,
    pub created_by: Option<i32>,
    pub notes: Option<String>,
    #[serde(default)]
    pub items: Vec<NewOrderItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewOrderItem {
    pub species_id: SpeciesId,
    pub quantity_requested: i32,
    pub unit_price: Decimal,
}

/// The stored shipment row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shipment {
    pub shipment_id: ShipmentId,
    pub order_id: OrderId,
    pub shipment_date: NaiveDate,
    pub airway_bill_no: Option<String>,
    pub driver_name: Option<String>,
    pub vehicle_number: Option<String>,
    pub transport_cost: Decimal,
    pub packaging_cost: Decimal,
    pub status: ShipmentStatus,
    pub actual_delivery_date: Option<NaiveDate>,
}

/// A shipment as listed, with the ordering customer's name and country.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipmentSummary {
    #[serde(flatten)]
    pub shipment: Shipment,
    pub customer_id: CustomerId,
    pub company_name: String,
    pub country_code: Option<String>,
}

/// One batch allocation of a shipment.
///
/// `batch_cost_at_shipment` is the batch ledger total captured when the
/// row was written. It is never recomputed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipmentDetail {
    pub detail_id: ShipmentDetailId,
    pub batch_id: BatchId,
    pub species_name: String,
    pub farm_name: String,
    pub tank_name: String,
    pub birth_date: NaiveDate,
    pub quantity_shipped: i32,
    pub box_label_id: Option<String>,
    pub batch_cost_at_shipment: Decimal,
}

/// A shipment together with its customer and its details ordered by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipmentAggregate {
    #[serde(flatten)]
    pub shipment: Shipment,
    pub customer_id: CustomerId,
    pub company_name: String,
    pub contact_person: Option<String>,
    pub country_code: Option<String>,
    pub address: Option<String>,
    pub details: Vec<ShipmentDetail>,
}

/// Request to create a shipment and its batch allocations in one transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewShipment {
    pub order_id: OrderId,
    pub airway_bill_no: Option<String>,
    pub driver_name: Option<String>,
    pub vehicle_number: Option<String>,
    pub transport_cost: Option<Decimal>,
    pub packaging_cost: Option<Decimal>,
    #[serde(default)]
    pub details: Vec<NewShipmentDetail>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewShipmentDetail {
    pub batch_id: BatchId,
    pub quantity_shipped: i32,
    pub box_label_id: Option<String>,
}
