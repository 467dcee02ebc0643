use async_trait::async_trait;
use chrono::NaiveDate;
use common::{
    BatchId, CustomerId, DEFAULT_CURRENCY, NewOrder, NewShipment, Order, OrderAggregate, OrderId,
    OrderStatus, OrderSummary, Shipment, ShipmentAggregate, ShipmentId, ShipmentStatus,
    ShipmentSummary,
};
use rust_decimal::Decimal;
use sqlx::{Postgres, Row, Transaction, postgres::PgRow};

use super::{PostgresStore, rows};
use crate::{OrderFilter, Result, ShipmentFilter, StoreError, store::SalesStore};

const ORDER_LIST: &str = "SELECT o.*, c.company_name, c.country_code \
     FROM customer_order o JOIN customer c ON c.customer_id = o.customer_id";

const SHIPMENT_LIST: &str = "SELECT s.*, o.customer_id, c.company_name, c.country_code \
     FROM shipment s \
     JOIN customer_order o ON o.order_id = s.order_id \
     JOIN customer c ON c.customer_id = o.customer_id";

fn order_summary(row: &PgRow) -> Result<OrderSummary> {
    Ok(OrderSummary {
        order: rows::order(row)?,
        company_name: row.try_get("company_name")?,
        country_code: row.try_get("country_code")?,
    })
}

fn shipment_summary(row: &PgRow) -> Result<ShipmentSummary> {
    Ok(ShipmentSummary {
        shipment: rows::shipment(row)?,
        customer_id: CustomerId::new(row.try_get("customer_id")?),
        company_name: row.try_get("company_name")?,
        country_code: row.try_get("country_code")?,
    })
}

/// Inserts the order row, then each item in input order.
///
/// The order starts at a zero total; the item trigger keeps it in step with
/// the line totals.
async fn insert_order(tx: &mut Transaction<'_, Postgres>, input: &NewOrder) -> Result<OrderId> {
    let order_id: i32 = sqlx::query_scalar(
        r#"
        INSERT INTO customer_order (customer_id, order_date, status, total_value, currency_code,
                                    delivery_address, created_by, notes)
        VALUES ($1, CURRENT_DATE, 'pending', 0, COALESCE($2, $3), $4, $5, $6)
        RETURNING order_id
        "#,
    )
    .bind(input.customer_id.as_i32())
    .bind(&input.currency_code)
    .bind(DEFAULT_CURRENCY)
    .bind(&input.delivery_address)
    .bind(input.created_by)
    .bind(&input.notes)
    .fetch_one(&mut **tx)
    .await?;

    for item in &input.items {
        sqlx::query(
            r#"
            INSERT INTO order_item (order_id, species_id, quantity_requested, unit_price)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(order_id)
        .bind(item.species_id.as_i32())
        .bind(item.quantity_requested)
        .bind(item.unit_price)
        .execute(&mut **tx)
        .await?;
    }

    Ok(OrderId::new(order_id))
}

/// Current ledger total of a batch, each component coalesced to zero.
/// A batch without a ledger row costs nothing yet.
async fn ledger_total(tx: &mut Transaction<'_, Postgres>, batch_id: BatchId) -> Result<Decimal> {
    let total: Option<Decimal> = sqlx::query_scalar(
        r#"
        SELECT COALESCE(total_feed_cost, 0) + COALESCE(total_labor_cost, 0)
             + COALESCE(water_electricity_cost, 0) + COALESCE(medication_cost, 0)
          FROM batch_financials
         WHERE batch_id = $1
        "#,
    )
    .bind(batch_id.as_i32())
    .fetch_optional(&mut **tx)
    .await?;

    Ok(total.unwrap_or(Decimal::ZERO))
}

/// Inserts the shipment row, then each detail with its batch cost snapshot.
async fn insert_shipment(
    tx: &mut Transaction<'_, Postgres>,
    input: &NewShipment,
) -> Result<ShipmentId> {
    let shipment_id: i32 = sqlx::query_scalar(
        r#"
        INSERT INTO shipment (order_id, shipment_date, airway_bill_no, driver_name, vehicle_number,
                              transport_cost, packaging_cost, status)
        VALUES ($1, CURRENT_DATE, $2, $3, $4, COALESCE($5, 0), COALESCE($6, 0), 'preparing')
        RETURNING shipment_id
        "#,
    )
    .bind(input.order_id.as_i32())
    .bind(&input.airway_bill_no)
    .bind(&input.driver_name)
    .bind(&input.vehicle_number)
    .bind(input.transport_cost)
    .bind(input.packaging_cost)
    .fetch_one(&mut **tx)
    .await?;

    for detail in &input.details {
        let snapshot = ledger_total(tx, detail.batch_id).await?;

        sqlx::query(
            r#"
            INSERT INTO shipment_detail (shipment_id, batch_id, quantity_shipped, box_label_id,
                                         batch_cost_at_shipment)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(shipment_id)
        .bind(detail.batch_id.as_i32())
        .bind(detail.quantity_shipped)
        .bind(&detail.box_label_id)
        .bind(snapshot)
        .execute(&mut **tx)
        .await?;
    }

    Ok(ShipmentId::new(shipment_id))
}

/// Commits on success. On failure rolls back explicitly and reports the
/// creation as aborted; dropping `tx` would also roll back.
async fn finish<T>(
    tx: Transaction<'_, Postgres>,
    aggregate: &'static str,
    outcome: Result<T>,
) -> Result<T> {
    match outcome {
        Ok(value) => {
            tx.commit()
                .await
                .map_err(|e| StoreError::aborted(aggregate, e.into()))?;
            Ok(value)
        }
        Err(err) => {
            tracing::warn!(aggregate, error = %err, "rolling back creation transaction");
            if let Err(rollback) = tx.rollback().await {
                tracing::warn!(aggregate, error = %rollback, "rollback failed");
            }
            Err(StoreError::aborted(aggregate, err))
        }
    }
}

#[async_trait]
impl SalesStore for PostgresStore {
    async fn list_orders(&self, filter: &OrderFilter) -> Result<Vec<OrderSummary>> {
        self.fetch_list(
            ORDER_LIST,
            "order_date DESC, order_id DESC",
            &filter.to_query(),
            order_summary,
        )
        .await
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<OrderAggregate>> {
        let Some(row) = sqlx::query(
            r#"
            SELECT o.*, c.company_name, c.contact_person, c.contact_email, c.country_code,
                   c.address
              FROM customer_order o
              JOIN customer c ON c.customer_id = o.customer_id
             WHERE o.order_id = $1
            "#,
        )
        .bind(id.as_i32())
        .fetch_optional(&self.pool)
        .await?
        else {
            return Ok(None);
        };

        let items = sqlx::query(
            r#"
            SELECT oi.*, s.common_name AS species_name, s.scientific_name
              FROM order_item oi
              JOIN species s ON s.species_id = oi.species_id
             WHERE oi.order_id = $1
             ORDER BY oi.item_id
            "#,
        )
        .bind(id.as_i32())
        .fetch_all(&self.pool)
        .await?
        .iter()
        .map(rows::order_item)
        .collect::<Result<Vec<_>>>()?;

        Ok(Some(OrderAggregate {
            order: rows::order(&row)?,
            company_name: row.try_get("company_name")?,
            contact_person: row.try_get("contact_person")?,
            contact_email: row.try_get("contact_email")?,
            country_code: row.try_get("country_code")?,
            address: row.try_get("address")?,
            items,
        }))
    }

    async fn create_order(&self, input: NewOrder) -> Result<OrderAggregate> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StoreError::aborted("order", e.into()))?;
        let outcome = insert_order(&mut tx, &input).await;
        let order_id = finish(tx, "order", outcome).await?;

        self.get_order(order_id)
            .await?
            .ok_or(StoreError::NotFound {
                entity: "order",
                id: order_id.as_i32(),
            })
    }

    async fn update_order_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Option<Order>> {
        let row = sqlx::query("UPDATE customer_order SET status = $2 WHERE order_id = $1 RETURNING *")
            .bind(id.as_i32())
            .bind(status.as_str())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(rows::order).transpose()
    }

    async fn delete_order(&self, id: OrderId) -> Result<bool> {
        self.delete_by_id("DELETE FROM customer_order WHERE order_id = $1", id.as_i32())
            .await
    }

    async fn list_shipments(&self, filter: &ShipmentFilter) -> Result<Vec<ShipmentSummary>> {
        self.fetch_list(
            SHIPMENT_LIST,
            "shipment_date DESC, shipment_id DESC",
            &filter.to_query(),
            shipment_summary,
        )
        .await
    }

    async fn get_shipment(&self, id: ShipmentId) -> Result<Option<ShipmentAggregate>> {
        let Some(row) = sqlx::query(
            r#"
            SELECT s.*, o.customer_id, c.company_name, c.contact_person, c.country_code, c.address
              FROM shipment s
              JOIN customer_order o ON o.order_id = s.order_id
              JOIN customer c ON c.customer_id = o.customer_id
             WHERE s.shipment_id = $1
            "#,
        )
        .bind(id.as_i32())
        .fetch_optional(&self.pool)
        .await?
        else {
            return Ok(None);
        };

        let details = sqlx::query(
            r#"
            SELECT sd.*, sp.common_name AS species_name, f.farm_name, t.tank_name, b.birth_date
              FROM shipment_detail sd
              JOIN batch b ON b.batch_id = sd.batch_id
              JOIN species sp ON sp.species_id = b.species_id
              JOIN tank t ON t.tank_id = b.tank_id
              JOIN farm f ON f.farm_id = t.farm_id
             WHERE sd.shipment_id = $1
             ORDER BY sd.detail_id
            "#,
        )
        .bind(id.as_i32())
        .fetch_all(&self.pool)
        .await?
        .iter()
        .map(rows::shipment_detail)
        .collect::<Result<Vec<_>>>()?;

        Ok(Some(ShipmentAggregate {
            shipment: rows::shipment(&row)?,
            customer_id: CustomerId::new(row.try_get("customer_id")?),
            company_name: row.try_get("company_name")?,
            contact_person: row.try_get("contact_person")?,
            country_code: row.try_get("country_code")?,
            address: row.try_get("address")?,
            details,
        }))
    }

    async fn create_shipment(&self, input: NewShipment) -> Result<ShipmentAggregate> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StoreError::aborted("shipment", e.into()))?;
        let outcome = insert_shipment(&mut tx, &input).await;
        let shipment_id = finish(tx, "shipment", outcome).await?;

        self.get_shipment(shipment_id)
            .await?
            .ok_or(StoreError::NotFound {
                entity: "shipment",
                id: shipment_id.as_i32(),
            })
    }

    async fn update_shipment_status(
        &self,
        id: ShipmentId,
        status: ShipmentStatus,
        actual_delivery_date: Option<NaiveDate>,
    ) -> Result<Option<Shipment>> {
        let row = sqlx::query(
            r#"
            UPDATE shipment
               SET status = $2, actual_delivery_date = $3
             WHERE shipment_id = $1
            RETURNING *
            "#,
        )
        .bind(id.as_i32())
        .bind(status.as_str())
        .bind(actual_delivery_date)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(rows::shipment).transpose()
    }
}
