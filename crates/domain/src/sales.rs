//! Orders and shipments.
//!
//! Both are created as one aggregate: the parent row and every child row
//! commit together or not at all. The checks here run before the store
//! opens its transaction, so a rejected request never touches the database.

use std::time::Instant;

use chrono::NaiveDate;
use common::{
    NewOrder, NewShipment, Order, OrderAggregate, OrderId, OrderStatus, OrderSummary, Shipment,
    ShipmentAggregate, ShipmentId, ShipmentStatus, ShipmentSummary, TraceabilityRecord,
};
use store::{
    AnalyticsStore, AquacultureStore, OrderFilter, SalesStore, ShipmentFilter, StoreError,
    TraceabilityFilter,
};

use crate::error::{DomainError, Result};
use crate::validate;

fn check_order(input: &NewOrder) -> Result<()> {
    for item in &input.items {
        validate::positive("quantity_requested", item.quantity_requested)?;
        validate::non_negative_amount("unit_price", Some(item.unit_price))?;
    }
    Ok(())
}

fn check_shipment(input: &NewShipment) -> Result<()> {
    validate::non_negative_amount("transport_cost", input.transport_cost)?;
    validate::non_negative_amount("packaging_cost", input.packaging_cost)?;
    for detail in &input.details {
        validate::positive("quantity_shipped", detail.quantity_shipped)?;
    }
    Ok(())
}

/// Records the outcome of one aggregate creation.
fn record_creation<T>(
    aggregate: &'static str,
    started: Instant,
    result: &std::result::Result<T, StoreError>,
) {
    metrics::histogram!("aggregate_creation_duration_seconds", "aggregate" => aggregate)
        .record(started.elapsed().as_secs_f64());
    if result.is_err() {
        metrics::counter!("aggregate_creation_failures_total", "aggregate" => aggregate)
            .increment(1);
    }
}

/// Service for the sales side: orders, shipments and shipment traceability.
#[derive(Clone)]
pub struct SalesService<S: AquacultureStore> {
    store: S,
}

impl<S: AquacultureStore> SalesService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    #[tracing::instrument(skip(self))]
    pub async fn list_orders(&self, filter: OrderFilter) -> Result<Vec<OrderSummary>> {
        Ok(self.store.list_orders(&filter).await?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_order(&self, id: OrderId) -> Result<Option<OrderAggregate>> {
        Ok(self.store.get_order(id).await?)
    }

    /// Creates an order with all of its items.
    #[tracing::instrument(skip(self, input), fields(customer_id = %input.customer_id, items = input.items.len()))]
    pub async fn create_order(&self, input: NewOrder) -> Result<OrderAggregate> {
        check_order(&input)?;

        let started = Instant::now();
        let result = self.store.create_order(input).await;
        record_creation("order", started, &result);

        let order = result?;
        metrics::counter!("orders_created_total").increment(1);
        tracing::info!(order_id = %order.order.order_id, total = %order.order.total_value, "order created");
        Ok(order)
    }

    #[tracing::instrument(skip(self))]
    pub async fn update_order_status(&self, id: OrderId, status: &str) -> Result<Order> {
        let status: OrderStatus = validate::status(status)?;
        let order = self
            .store
            .update_order_status(id, status)
            .await?
            .ok_or(DomainError::not_found("Order", id))?;
        metrics::counter!("status_updates_total", "entity" => "order").increment(1);
        Ok(order)
    }

    /// Deletes an order and its items. Orders that were shipped stay.
    #[tracing::instrument(skip(self))]
    pub async fn delete_order(&self, id: OrderId) -> Result<()> {
        if !self.store.delete_order(id).await? {
            return Err(DomainError::not_found("Order", id));
        }
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub async fn list_shipments(&self, filter: ShipmentFilter) -> Result<Vec<ShipmentSummary>> {
        Ok(self.store.list_shipments(&filter).await?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_shipment(&self, id: ShipmentId) -> Result<Option<ShipmentAggregate>> {
        Ok(self.store.get_shipment(id).await?)
    }

    /// Creates a shipment with its batch allocations. Each allocation
    /// records the batch's ledger total as it stands at this moment.
    #[tracing::instrument(skip(self, input), fields(order_id = %input.order_id, details = input.details.len()))]
    pub async fn create_shipment(&self, input: NewShipment) -> Result<ShipmentAggregate> {
        check_shipment(&input)?;

        let started = Instant::now();
        let result = self.store.create_shipment(input).await;
        record_creation("shipment", started, &result);

        let shipment = result?;
        metrics::counter!("shipments_created_total").increment(1);
        tracing::info!(shipment_id = %shipment.shipment.shipment_id, "shipment created");
        Ok(shipment)
    }

    /// Sets the shipment status and replaces its delivery date.
    #[tracing::instrument(skip(self))]
    pub async fn update_shipment_status(
        &self,
        id: ShipmentId,
        status: &str,
        actual_delivery_date: Option<NaiveDate>,
    ) -> Result<Shipment> {
        let status: ShipmentStatus = validate::status(status)?;
        let shipment = self
            .store
            .update_shipment_status(id, status, actual_delivery_date)
            .await?
            .ok_or(DomainError::not_found("Shipment", id))?;
        metrics::counter!("status_updates_total", "entity" => "shipment").increment(1);
        Ok(shipment)
    }

    /// Every traced box of one shipment.
    #[tracing::instrument(skip(self))]
    pub async fn shipment_traceability(&self, id: ShipmentId) -> Result<Vec<TraceabilityRecord>> {
        Ok(self
            .store
            .traceability_report(&TraceabilityFilter::for_shipment(id))
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use common::{BatchId, CustomerId, NewOrderItem, NewShipmentDetail, SpeciesId};
    use rust_decimal::Decimal;
    use store::InMemoryStore;

    use super::*;

    fn order_with(quantity: i32, unit_price: Decimal) -> NewOrder {
        NewOrder {
            customer_id: CustomerId::new(1),
            delivery_address: None,
            currency_code: None,
            created_by: None,
            notes: None,
            items: vec![NewOrderItem {
                species_id: SpeciesId::new(1),
                quantity_requested: quantity,
                unit_price,
            }],
        }
    }

    #[test]
    fn order_items_need_positive_quantities() {
        assert!(check_order(&order_with(5, Decimal::ONE)).is_ok());
        assert!(check_order(&order_with(0, Decimal::ONE)).is_err());
        assert!(check_order(&order_with(5, Decimal::NEGATIVE_ONE)).is_err());
    }

    #[test]
    fn shipment_costs_must_not_be_negative() {
        let shipment = NewShipment {
            order_id: OrderId::new(1),
            airway_bill_no: None,
            driver_name: None,
            vehicle_number: None,
            transport_cost: Some(Decimal::new(-50, 1)),
            packaging_cost: None,
            details: vec![NewShipmentDetail {
                batch_id: BatchId::new(1),
                quantity_shipped: 10,
                box_label_id: None,
            }],
        };
        let err = check_shipment(&shipment).unwrap_err();
        assert_eq!(err.to_string(), "transport_cost must not be negative");
    }

    #[tokio::test]
    async fn unknown_order_status_never_reaches_the_store() {
        let service = SalesService::new(InMemoryStore::new());
        let err = service
            .update_order_status(OrderId::new(1), "lost")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid order status 'lost'");
    }

    #[tokio::test]
    async fn status_update_of_missing_shipment_is_not_found() {
        let service = SalesService::new(InMemoryStore::new());
        let err = service
            .update_shipment_status(ShipmentId::new(4), "delivered", None)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { entity: "Shipment", id: 4 }));
    }
}
