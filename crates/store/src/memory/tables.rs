//! Table rows, joins and write rules of the in-memory store.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, NaiveDate, Utc};
use common::{
    ALERT_TYPE_BIOSECURITY, ALERT_TYPE_WATER_QUALITY, Alert, AlertId, AlertSeverity, AlertStatus,
    Batch, BatchFinancials, BatchId, Customer, CustomerId, Farm, FarmId, FeedingLog, FeedingLogId,
    HealthLog, HealthLogId, NewFeedingLog, NewHealthLog, NewWaterLog, Order, OrderAggregate,
    OrderId, OrderItem, OrderItemId, OrderSummary, Shipment, ShipmentAggregate, ShipmentDetail,
    ShipmentDetailId, ShipmentId, ShipmentSummary, Species, SpeciesId, Tank, TankId, WaterLog,
    WaterLogId, WaterQualityStatus,
};
use rust_decimal::Decimal;

use crate::{Result, StoreError};

#[derive(Debug, Clone)]
pub(super) struct TankRow {
    pub tank_id: TankId,
    pub farm_id: FarmId,
    pub tank_name: String,
    pub tank_type: Option<String>,
    pub volume_liters: Option<Decimal>,
    pub is_active: bool,
}

#[derive(Debug, Clone)]
pub(super) struct BatchRow {
    pub batch_id: BatchId,
    pub species_id: SpeciesId,
    pub tank_id: TankId,
    pub birth_date: NaiveDate,
    pub initial_quantity: i32,
    pub current_quantity: i32,
    pub stage: String,
    pub estimated_harvest_date: Option<NaiveDate>,
}

#[derive(Debug, Clone)]
pub(super) struct WaterLogRow {
    pub log_id: WaterLogId,
    pub tank_id: TankId,
    pub ph_level: Option<Decimal>,
    pub temperature: Option<Decimal>,
    pub dissolved_oxygen: Option<Decimal>,
    pub ammonia_level: Option<Decimal>,
    pub measured_by_user_id: Option<i32>,
    pub measured_at: DateTime<Utc>,
    pub status: WaterQualityStatus,
}

#[derive(Debug, Clone)]
pub(super) struct FeedingLogRow {
    pub feeding_id: FeedingLogId,
    pub batch_id: BatchId,
    pub food_type: String,
    pub amount_grams: Decimal,
    pub cost_per_kg: Decimal,
    pub recorded_by: Option<i32>,
    pub notes: Option<String>,
    pub feed_time: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub(super) struct HealthLogRow {
    pub health_log_id: HealthLogId,
    pub batch_id: BatchId,
    pub condition_notes: Option<String>,
    pub treatment_applied: Option<String>,
    pub mortality_count: i32,
    pub recorded_by: Option<i32>,
    pub log_date: NaiveDate,
}

#[derive(Debug, Clone)]
pub(super) struct AlertRow {
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
}

#[derive(Debug, Clone)]
pub(super) struct OrderItemRow {
    pub item_id: OrderItemId,
    pub order_id: OrderId,
    pub species_id: SpeciesId,
    pub quantity_requested: i32,
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

#[derive(Debug, Clone)]
pub(super) struct ShipmentDetailRow {
    pub detail_id: ShipmentDetailId,
    pub shipment_id: ShipmentId,
    pub batch_id: BatchId,
    pub quantity_shipped: i32,
    pub box_label_id: Option<String>,
    pub batch_cost_at_shipment: Decimal,
}

/// Every table of the schema, keyed by primary key.
#[derive(Debug, Clone, Default)]
pub(super) struct Tables {
    pub species: BTreeMap<SpeciesId, Species>,
    pub farms: BTreeMap<FarmId, Farm>,
    pub tanks: BTreeMap<TankId, TankRow>,
    pub customers: BTreeMap<CustomerId, Customer>,
    pub batches: BTreeMap<BatchId, BatchRow>,
    pub financials: BTreeMap<BatchId, BatchFinancials>,
    pub water_logs: BTreeMap<WaterLogId, WaterLogRow>,
    pub feeding_logs: BTreeMap<FeedingLogId, FeedingLogRow>,
    pub health_logs: BTreeMap<HealthLogId, HealthLogRow>,
    pub alerts: BTreeMap<AlertId, AlertRow>,
    pub orders: BTreeMap<OrderId, Order>,
    pub order_items: BTreeMap<OrderItemId, OrderItemRow>,
    pub shipments: BTreeMap<ShipmentId, Shipment>,
    pub shipment_details: BTreeMap<ShipmentDetailId, ShipmentDetailRow>,
    sequences: HashMap<&'static str, i32>,
}

/// Error for an insert or update whose parent row is missing.
pub(super) fn missing_parent(table: &str, constraint: &str) -> StoreError {
    StoreError::foreign_key(
        constraint,
        format!("insert or update on table \"{table}\" violates foreign key constraint \"{constraint}\""),
    )
}

/// Error for a delete blocked by a restricting child row.
pub(super) fn restricted(table: &str, constraint: &str, child: &str) -> StoreError {
    StoreError::foreign_key(
        constraint,
        format!(
            "update or delete on table \"{table}\" violates foreign key constraint \
             \"{constraint}\" on table \"{child}\""
        ),
    )
}

/// Error for a row rejected by a check constraint.
pub(super) fn check_failed(table: &str, constraint: &str) -> StoreError {
    StoreError::check(
        constraint,
        format!("new row for relation \"{table}\" violates check constraint \"{constraint}\""),
    )
}

/// A computed amount that no longer fits a `Decimal`.
pub(super) fn numeric_overflow(table: &str, constraint: &str) -> StoreError {
    StoreError::check(
        constraint,
        format!("numeric value out of range for relation \"{table}\""),
    )
}

pub(super) fn today() -> NaiveDate {
    Utc::now().date_naive()
}

fn outside(value: Option<Decimal>, min: Option<Decimal>, max: Option<Decimal>) -> bool {
    match value {
        Some(v) => min.is_some_and(|m| v < m) || max.is_some_and(|m| v > m),
        None => false,
    }
}

/// True unless the value is known to fall outside a known bound.
pub(super) fn within(value: Option<Decimal>, min: Option<Decimal>, max: Option<Decimal>) -> bool {
    !outside(value, min, max)
}

impl Tables {
    /// Next value of the table's serial sequence.
    pub fn next_id(&mut self, table: &'static str) -> i32 {
        let next = self.sequences.entry(table).or_insert(0);
        *next += 1;
        *next
    }

    pub fn require_farm(&self, id: FarmId, table: &str, constraint: &str) -> Result<()> {
        if self.farms.contains_key(&id) {
            Ok(())
        } else {
            Err(missing_parent(table, constraint))
        }
    }

    pub fn require_species(&self, id: SpeciesId, table: &str, constraint: &str) -> Result<()> {
        if self.species.contains_key(&id) {
            Ok(())
        } else {
            Err(missing_parent(table, constraint))
        }
    }

    pub fn require_tank(&self, id: TankId, table: &str, constraint: &str) -> Result<()> {
        if self.tanks.contains_key(&id) {
            Ok(())
        } else {
            Err(missing_parent(table, constraint))
        }
    }

    pub fn require_batch(&self, id: BatchId, table: &str, constraint: &str) -> Result<()> {
        if self.batches.contains_key(&id) {
            Ok(())
        } else {
            Err(missing_parent(table, constraint))
        }
    }

    /// Batch ledger total with every component coalesced to zero.
    pub fn ledger_total(&self, batch_id: BatchId) -> Decimal {
        self.financials
            .get(&batch_id)
            .map(BatchFinancials::total_cost)
            .unwrap_or(Decimal::ZERO)
    }

    pub fn tank_view(&self, row: &TankRow) -> Option<Tank> {
        let farm = self.farms.get(&row.farm_id)?;
        Some(Tank {
            tank_id: row.tank_id,
            farm_id: row.farm_id,
            tank_name: row.tank_name.clone(),
            tank_type: row.tank_type.clone(),
            volume_liters: row.volume_liters,
            is_active: row.is_active,
            farm_name: farm.farm_name.clone(),
        })
    }

    pub fn batch_view(&self, row: &BatchRow) -> Option<Batch> {
        let species = self.species.get(&row.species_id)?;
        let tank = self.tanks.get(&row.tank_id)?;
        let farm = self.farms.get(&tank.farm_id)?;
        Some(Batch {
            batch_id: row.batch_id,
            species_id: row.species_id,
            tank_id: row.tank_id,
            birth_date: row.birth_date,
            initial_quantity: row.initial_quantity,
            current_quantity: row.current_quantity,
            stage: row.stage.clone(),
            estimated_harvest_date: row.estimated_harvest_date,
            common_name: species.common_name.clone(),
            scientific_name: species.scientific_name.clone(),
            tank_name: tank.tank_name.clone(),
            tank_type: tank.tank_type.clone(),
            farm_id: farm.farm_id,
            farm_name: farm.farm_name.clone(),
            location: farm.location.clone(),
        })
    }

    /// Species of the given batch.
    pub fn batch_species(&self, batch_id: BatchId) -> Option<&Species> {
        let batch = self.batches.get(&batch_id)?;
        self.species.get(&batch.species_id)
    }

    pub fn water_log_view(&self, row: &WaterLogRow) -> Option<WaterLog> {
        let tank = self.tanks.get(&row.tank_id)?;
        let farm = self.farms.get(&tank.farm_id)?;
        Some(WaterLog {
            log_id: row.log_id,
            tank_id: row.tank_id,
            ph_level: row.ph_level,
            temperature: row.temperature,
            dissolved_oxygen: row.dissolved_oxygen,
            ammonia_level: row.ammonia_level,
            measured_by_user_id: row.measured_by_user_id,
            measured_at: row.measured_at,
            status: row.status,
            tank_name: tank.tank_name.clone(),
            farm_name: farm.farm_name.clone(),
        })
    }

    pub fn feeding_log_view(&self, row: &FeedingLogRow) -> Option<FeedingLog> {
        let species = self.batch_species(row.batch_id)?;
        Some(FeedingLog {
            feeding_id: row.feeding_id,
            batch_id: row.batch_id,
            food_type: row.food_type.clone(),
            amount_grams: row.amount_grams,
            cost_per_kg: row.cost_per_kg,
            recorded_by: row.recorded_by,
            notes: row.notes.clone(),
            feed_time: row.feed_time,
            common_name: species.common_name.clone(),
        })
    }

    pub fn health_log_view(&self, row: &HealthLogRow) -> Option<HealthLog> {
        let species = self.batch_species(row.batch_id)?;
        Some(HealthLog {
            health_log_id: row.health_log_id,
            batch_id: row.batch_id,
            condition_notes: row.condition_notes.clone(),
            treatment_applied: row.treatment_applied.clone(),
            mortality_count: row.mortality_count,
            recorded_by: row.recorded_by,
            log_date: row.log_date,
            common_name: species.common_name.clone(),
        })
    }

    /// An alert with the tank, farm and species it concerns. The tank falls
    /// back to the batch's tank when the alert names only a batch.
    pub fn alert_view(&self, row: &AlertRow) -> Alert {
        let batch = row.batch_id.and_then(|id| self.batches.get(&id));
        let tank = row
            .tank_id
            .or(batch.map(|b| b.tank_id))
            .and_then(|id| self.tanks.get(&id));
        let farm = tank.and_then(|t| self.farms.get(&t.farm_id));
        let species = batch.and_then(|b| self.species.get(&b.species_id));

        Alert {
            alert_id: row.alert_id,
            tank_id: row.tank_id,
            batch_id: row.batch_id,
            alert_type: row.alert_type.clone(),
            severity: row.severity,
            message: row.message.clone(),
            status: row.status,
            created_at: row.created_at,
            resolved_at: row.resolved_at,
            resolved_by: row.resolved_by,
            tank_name: tank.map(|t| t.tank_name.clone()),
            farm_id: farm.map(|f| f.farm_id),
            farm_name: farm.map(|f| f.farm_name.clone()),
            species_name: species.map(|s| s.common_name.clone()),
        }
    }

    pub fn order_summary(&self, order: &Order) -> Option<OrderSummary> {
        let customer = self.customers.get(&order.customer_id)?;
        Some(OrderSummary {
            order: order.clone(),
            company_name: customer.company_name.clone(),
            country_code: customer.country_code.clone(),
        })
    }

    pub fn order_aggregate(&self, id: OrderId) -> Option<OrderAggregate> {
        let order = self.orders.get(&id)?;
        let customer = self.customers.get(&order.customer_id)?;
        let items = self
            .order_items
            .values()
            .filter(|item| item.order_id == id)
            .filter_map(|item| {
                let species = self.species.get(&item.species_id)?;
                Some(OrderItem {
                    item_id: item.item_id,
                    species_id: item.species_id,
                    species_name: species.common_name.clone(),
                    scientific_name: species.scientific_name.clone(),
                    quantity_requested: item.quantity_requested,
                    unit_price: item.unit_price,
                    line_total: item.line_total,
                })
            })
            .collect();

        Some(OrderAggregate {
            order: order.clone(),
            company_name: customer.company_name.clone(),
            contact_person: customer.contact_person.clone(),
            contact_email: customer.contact_email.clone(),
            country_code: customer.country_code.clone(),
            address: customer.address.clone(),
            items,
        })
    }

    /// The customer who placed the order a shipment belongs to.
    pub fn shipment_customer(&self, shipment: &Shipment) -> Option<&Customer> {
        let order = self.orders.get(&shipment.order_id)?;
        self.customers.get(&order.customer_id)
    }

    pub fn shipment_summary(&self, shipment: &Shipment) -> Option<ShipmentSummary> {
        let customer = self.shipment_customer(shipment)?;
        Some(ShipmentSummary {
            shipment: shipment.clone(),
            customer_id: customer.customer_id,
            company_name: customer.company_name.clone(),
            country_code: customer.country_code.clone(),
        })
    }

    pub fn shipment_detail_view(&self, row: &ShipmentDetailRow) -> Option<ShipmentDetail> {
        let batch = self.batches.get(&row.batch_id)?;
        let species = self.species.get(&batch.species_id)?;
        let tank = self.tanks.get(&batch.tank_id)?;
        let farm = self.farms.get(&tank.farm_id)?;
        Some(ShipmentDetail {
            detail_id: row.detail_id,
            batch_id: row.batch_id,
            species_name: species.common_name.clone(),
            farm_name: farm.farm_name.clone(),
            tank_name: tank.tank_name.clone(),
            birth_date: batch.birth_date,
            quantity_shipped: row.quantity_shipped,
            box_label_id: row.box_label_id.clone(),
            batch_cost_at_shipment: row.batch_cost_at_shipment,
        })
    }

    pub fn shipment_aggregate(&self, id: ShipmentId) -> Option<ShipmentAggregate> {
        let shipment = self.shipments.get(&id)?;
        let customer = self.shipment_customer(shipment)?;
        let details = self
            .shipment_details
            .values()
            .filter(|detail| detail.shipment_id == id)
            .filter_map(|detail| self.shipment_detail_view(detail))
            .collect();

        Some(ShipmentAggregate {
            shipment: shipment.clone(),
            customer_id: customer.customer_id,
            company_name: customer.company_name.clone(),
            contact_person: customer.contact_person.clone(),
            country_code: customer.country_code.clone(),
            address: customer.address.clone(),
            details,
        })
    }

    fn insert_alert(
        &mut self,
        tank_id: Option<TankId>,
        batch_id: Option<BatchId>,
        alert_type: &str,
        severity: AlertSeverity,
        message: String,
    ) {
        let alert_id = AlertId::new(self.next_id("alert"));
        self.alerts.insert(
            alert_id,
            AlertRow {
                alert_id,
                tank_id,
                batch_id,
                alert_type: alert_type.to_string(),
                severity,
                message,
                status: AlertStatus::Active,
                created_at: Utc::now(),
                resolved_at: None,
                resolved_by: None,
            },
        );
    }

    /// Inserts an order item and brings the order total up to date.
    pub fn insert_order_item(
        &mut self,
        order_id: OrderId,
        species_id: SpeciesId,
        quantity_requested: i32,
        unit_price: Decimal,
    ) -> Result<()> {
        if !self.orders.contains_key(&order_id) {
            return Err(missing_parent("order_item", "order_item_order_id_fkey"));
        }
        self.require_species(species_id, "order_item", "order_item_species_id_fkey")?;
        if quantity_requested <= 0 {
            return Err(check_failed(
                "order_item",
                "order_item_quantity_requested_check",
            ));
        }
        if unit_price < Decimal::ZERO {
            return Err(check_failed("order_item", "order_item_unit_price_check"));
        }

        let line_total = Decimal::from(quantity_requested)
            .checked_mul(unit_price)
            .ok_or_else(|| numeric_overflow("order_item", "order_item_line_total_check"))?;
        let total = self
            .order_items
            .values()
            .filter(|item| item.order_id == order_id)
            .try_fold(line_total, |sum, item| sum.checked_add(item.line_total))
            .ok_or_else(|| numeric_overflow("customer_order", "customer_order_total_value_check"))?;

        let item_id = OrderItemId::new(self.next_id("order_item"));
        self.order_items.insert(
            item_id,
            OrderItemRow {
                item_id,
                order_id,
                species_id,
                quantity_requested,
                unit_price,
                line_total,
            },
        );
        if let Some(order) = self.orders.get_mut(&order_id) {
            order.total_value = total;
        }
        Ok(())
    }

    /// Inserts a feeding log and accrues its cost into the batch ledger.
    pub fn insert_feeding_log(&mut self, input: NewFeedingLog) -> Result<FeedingLogId> {
        self.require_batch(input.batch_id, "feeding_log", "feeding_log_batch_id_fkey")?;
        if input.amount_grams < Decimal::ZERO {
            return Err(check_failed("feeding_log", "feeding_log_amount_grams_check"));
        }
        if input.cost_per_kg < Decimal::ZERO {
            return Err(check_failed("feeding_log", "feeding_log_cost_per_kg_check"));
        }

        let now = Utc::now();
        let accrued = input
            .cost()
            .and_then(|cost| {
                self.financials
                    .get(&input.batch_id)
                    .and_then(|ledger| ledger.total_feed_cost)
                    .unwrap_or(Decimal::ZERO)
                    .checked_add(cost)
            })
            .ok_or_else(|| numeric_overflow("batch_financials", "batch_financials_total_feed_cost_check"))?;
        let ledger = self
            .financials
            .entry(input.batch_id)
            .or_insert_with(|| BatchFinancials::empty(input.batch_id));
        ledger.total_feed_cost = Some(accrued);
        ledger.updated_at = Some(now);

        let feeding_id = FeedingLogId::new(self.next_id("feeding_log"));
        self.feeding_logs.insert(
            feeding_id,
            FeedingLogRow {
                feeding_id,
                batch_id: input.batch_id,
                food_type: input.food_type,
                amount_grams: input.amount_grams,
                cost_per_kg: input.cost_per_kg,
                recorded_by: input.recorded_by,
                notes: input.notes,
                feed_time: now,
            },
        );
        Ok(feeding_id)
    }

    /// Inserts a health log. Deaths lower the batch's live stock; losing a
    /// tenth or more of it at once raises a biosecurity alert.
    pub fn insert_health_log(&mut self, input: NewHealthLog) -> Result<HealthLogId> {
        let mortality_count = input.mortality_count.unwrap_or(0);
        if mortality_count < 0 {
            return Err(check_failed("health_log", "health_log_mortality_count_check"));
        }
        self.require_batch(input.batch_id, "health_log", "health_log_batch_id_fkey")?;
        let health_log_id = HealthLogId::new(self.next_id("health_log"));

        if mortality_count > 0
            && let Some(batch) = self.batches.get_mut(&input.batch_id)
        {
            let stock = batch.current_quantity;
            let tank_id = batch.tank_id;
            batch.current_quantity = (stock - mortality_count).max(0);

            if i64::from(mortality_count) * 10 >= i64::from(stock) {
                self.insert_alert(
                    Some(tank_id),
                    Some(input.batch_id),
                    ALERT_TYPE_BIOSECURITY,
                    AlertSeverity::High,
                    format!(
                        "Mass mortality: {mortality_count} of {stock} fish lost in batch {}",
                        input.batch_id
                    ),
                );
            }
        }

        self.health_logs.insert(
            health_log_id,
            HealthLogRow {
                health_log_id,
                batch_id: input.batch_id,
                condition_notes: input.condition_notes,
                treatment_applied: input.treatment_applied,
                mortality_count,
                recorded_by: input.recorded_by,
                log_date: today(),
            },
        );
        Ok(health_log_id)
    }

    /// Classifies a reading against the tank's live stock.
    fn classify(&self, input: &NewWaterLog) -> WaterQualityStatus {
        let low_oxygen = input
            .dissolved_oxygen
            .is_some_and(|v| v < Decimal::new(40, 1));
        let high_ammonia = input.ammonia_level.is_some_and(|v| v > Decimal::new(5, 1));
        if low_oxygen || high_ammonia {
            return WaterQualityStatus::Critical;
        }

        let out_of_range = self
            .batches
            .values()
            .filter(|b| b.tank_id == input.tank_id && b.current_quantity > 0)
            .filter_map(|b| self.species.get(&b.species_id))
            .any(|s| {
                outside(input.temperature, s.ideal_temp_min, s.ideal_temp_max)
                    || outside(input.ph_level, s.ideal_ph_min, s.ideal_ph_max)
            });

        if out_of_range {
            WaterQualityStatus::Warning
        } else {
            WaterQualityStatus::Normal
        }
    }

    /// Inserts a classified water reading, raising an alert when abnormal.
    pub fn insert_water_log(&mut self, input: NewWaterLog) -> Result<WaterLogId> {
        self.require_tank(input.tank_id, "water_log", "water_log_tank_id_fkey")?;

        let status = self.classify(&input);
        let log_id = WaterLogId::new(self.next_id("water_log"));
        self.water_logs.insert(
            log_id,
            WaterLogRow {
                log_id,
                tank_id: input.tank_id,
                ph_level: input.ph_level,
                temperature: input.temperature,
                dissolved_oxygen: input.dissolved_oxygen,
                ammonia_level: input.ammonia_level,
                measured_by_user_id: input.measured_by_user_id,
                measured_at: Utc::now(),
                status,
            },
        );

        let severity = match status {
            WaterQualityStatus::Normal => None,
            WaterQualityStatus::Warning => Some(AlertSeverity::Medium),
            WaterQualityStatus::Critical => Some(AlertSeverity::Critical),
        };
        if let Some(severity) = severity {
            self.insert_alert(
                Some(input.tank_id),
                None,
                ALERT_TYPE_WATER_QUALITY,
                severity,
                format!("Water quality {status} in tank {}", input.tank_id),
            );
        }
        Ok(log_id)
    }

    /// Removes a batch and everything that cascades from it.
    pub fn cascade_batch(&mut self, id: BatchId) {
        self.batches.remove(&id);
        self.financials.remove(&id);
        self.feeding_logs.retain(|_, log| log.batch_id != id);
        self.health_logs.retain(|_, log| log.batch_id != id);
        self.alerts.retain(|_, alert| alert.batch_id != Some(id));
    }

    /// Removes a tank and everything that cascades from it.
    pub fn cascade_tank(&mut self, id: TankId) {
        self.tanks.remove(&id);
        self.water_logs.retain(|_, log| log.tank_id != id);
        self.alerts.retain(|_, alert| alert.tank_id != Some(id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_that_are_not_set_never_fail() {
        let v = Some(Decimal::from(30));
        assert!(within(v, None, None));
        assert!(within(None, Some(Decimal::from(20)), Some(Decimal::from(25))));
        assert!(!within(v, Some(Decimal::from(20)), Some(Decimal::from(25))));
        assert!(within(v, Some(Decimal::from(20)), None));
    }

    #[test]
    fn sequences_are_per_table() {
        let mut tables = Tables::default();
        assert_eq!(tables.next_id("farm"), 1);
        assert_eq!(tables.next_id("farm"), 2);
        assert_eq!(tables.next_id("tank"), 1);
    }
}
