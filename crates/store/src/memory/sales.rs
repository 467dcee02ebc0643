use std::cmp::Reverse;

use async_trait::async_trait;
use chrono::NaiveDate;
use common::{
    DEFAULT_CURRENCY, NewOrder, NewShipment, Order, OrderAggregate, OrderId, OrderStatus,
    OrderSummary, Shipment, ShipmentAggregate, ShipmentDetailId, ShipmentId, ShipmentStatus,
    ShipmentSummary,
};
use rust_decimal::Decimal;

use super::{
    InMemoryStore,
    tables::{ShipmentDetailRow, Tables, check_failed, missing_parent, restricted, today},
};
use crate::{
    OrderFilter, Result, SHIPMENT_DETAIL_BATCH_FK, ShipmentFilter, StoreError, store::SalesStore,
};

impl Tables {
    fn insert_order(&mut self, input: NewOrder) -> Result<OrderId> {
        if !self.customers.contains_key(&input.customer_id) {
            return Err(missing_parent(
                "customer_order",
                "customer_order_customer_id_fkey",
            ));
        }

        let order_id = OrderId::new(self.next_id("customer_order"));
        self.orders.insert(
            order_id,
            Order {
                order_id,
                customer_id: input.customer_id,
                order_date: today(),
                status: OrderStatus::Pending,
                total_value: Decimal::ZERO,
                currency_code: input
                    .currency_code
                    .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
                delivery_address: input.delivery_address,
                created_by: input.created_by,
                notes: input.notes,
            },
        );

        for item in input.items {
            self.insert_order_item(
                order_id,
                item.species_id,
                item.quantity_requested,
                item.unit_price,
            )?;
        }
        Ok(order_id)
    }

    fn insert_shipment(&mut self, input: NewShipment) -> Result<ShipmentId> {
        if !self.orders.contains_key(&input.order_id) {
            return Err(missing_parent("shipment", "shipment_order_id_fkey"));
        }

        let shipment_id = ShipmentId::new(self.next_id("shipment"));
        self.shipments.insert(
            shipment_id,
            Shipment {
                shipment_id,
                order_id: input.order_id,
                shipment_date: today(),
                airway_bill_no: input.airway_bill_no,
                driver_name: input.driver_name,
                vehicle_number: input.vehicle_number,
                transport_cost: input.transport_cost.unwrap_or(Decimal::ZERO),
                packaging_cost: input.packaging_cost.unwrap_or(Decimal::ZERO),
                status: ShipmentStatus::Preparing,
                actual_delivery_date: None,
            },
        );

        for detail in input.details {
            if detail.quantity_shipped <= 0 {
                return Err(check_failed(
                    "shipment_detail",
                    "shipment_detail_quantity_shipped_check",
                ));
            }
            self.require_batch(detail.batch_id, "shipment_detail", SHIPMENT_DETAIL_BATCH_FK)?;

            let detail_id = ShipmentDetailId::new(self.next_id("shipment_detail"));
            let snapshot = self.ledger_total(detail.batch_id);
            self.shipment_details.insert(
                detail_id,
                ShipmentDetailRow {
                    detail_id,
                    shipment_id,
                    batch_id: detail.batch_id,
                    quantity_shipped: detail.quantity_shipped,
                    box_label_id: detail.box_label_id,
                    batch_cost_at_shipment: snapshot,
                },
            );
        }
        Ok(shipment_id)
    }
}

/// Reports a rejected creation the same way the database backend does.
/// The draft tables are discarded, so nothing of the aggregate remains.
fn abort(aggregate: &'static str, err: StoreError) -> StoreError {
    tracing::warn!(aggregate, error = %err, "discarding rejected creation");
    StoreError::aborted(aggregate, err)
}

#[async_trait]
impl SalesStore for InMemoryStore {
    async fn list_orders(&self, filter: &OrderFilter) -> Result<Vec<OrderSummary>> {
        let query = filter.to_query();
        Ok(self
            .read(|t| {
                let mut orders: Vec<_> = t
                    .orders
                    .values()
                    .filter_map(|o| t.order_summary(o))
                    .collect();
                orders.sort_by_key(|o| (Reverse(o.order.order_date), Reverse(o.order.order_id)));
                query.apply(orders)
            })
            .await)
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<OrderAggregate>> {
        Ok(self.read(|t| t.order_aggregate(id)).await)
    }

    async fn create_order(&self, input: NewOrder) -> Result<OrderAggregate> {
        self.write(|t| {
            let order_id = t.insert_order(input).map_err(|e| abort("order", e))?;
            t.order_aggregate(order_id).ok_or(StoreError::NotFound {
                entity: "order",
                id: order_id.as_i32(),
            })
        })
        .await
    }

    async fn update_order_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Option<Order>> {
        self.write(|t| {
            Ok(t.orders.get_mut(&id).map(|order| {
                order.status = status;
                order.clone()
            }))
        })
        .await
    }

    async fn delete_order(&self, id: OrderId) -> Result<bool> {
        self.write(|t| {
            if !t.orders.contains_key(&id) {
                return Ok(false);
            }
            if t.shipments.values().any(|s| s.order_id == id) {
                return Err(restricted(
                    "customer_order",
                    "shipment_order_id_fkey",
                    "shipment",
                ));
            }
            t.orders.remove(&id);
            t.order_items.retain(|_, item| item.order_id != id);
            Ok(true)
        })
        .await
    }

    async fn list_shipments(&self, filter: &ShipmentFilter) -> Result<Vec<ShipmentSummary>> {
        let query = filter.to_query();
        Ok(self
            .read(|t| {
                let mut shipments: Vec<_> = t
                    .shipments
                    .values()
                    .filter_map(|s| t.shipment_summary(s))
                    .collect();
                shipments.sort_by_key(|s| {
                    (
                        Reverse(s.shipment.shipment_date),
                        Reverse(s.shipment.shipment_id),
                    )
                });
                query.apply(shipments)
            })
            .await)
    }

    async fn get_shipment(&self, id: ShipmentId) -> Result<Option<ShipmentAggregate>> {
        Ok(self.read(|t| t.shipment_aggregate(id)).await)
    }

    async fn create_shipment(&self, input: NewShipment) -> Result<ShipmentAggregate> {
        self.write(|t| {
            let shipment_id = t
                .insert_shipment(input)
                .map_err(|e| abort("shipment", e))?;
            t.shipment_aggregate(shipment_id).ok_or(StoreError::NotFound {
                entity: "shipment",
                id: shipment_id.as_i32(),
            })
        })
        .await
    }

    async fn update_shipment_status(
        &self,
        id: ShipmentId,
        status: ShipmentStatus,
        actual_delivery_date: Option<NaiveDate>,
    ) -> Result<Option<Shipment>> {
        self.write(|t| {
            Ok(t.shipments.get_mut(&id).map(|shipment| {
                shipment.status = status;
                shipment.actual_delivery_date = actual_delivery_date;
                shipment.clone()
            }))
        })
        .await
    }
}
