use std::{cmp::Reverse, collections::BTreeSet};

use async_trait::async_trait;
use chrono::Utc;
use common::{
    ALERT_TYPE_BIOSECURITY, Alert, AlertId, AlertStatus, BatchId, BatchTraceability,
    HighRiskBatch, MortalityAnalysis, PricingOverview, SellingPrice, TraceabilityRecord,
    mortality_rate, round2,
};
use rust_decimal::Decimal;

use super::{
    InMemoryStore,
    tables::{Tables, numeric_overflow},
};
use crate::{AlertFilter, PricingFilter, Result, TraceabilityFilter, store::AnalyticsStore};

/// Price multiplier for a target margin given in percent.
fn markup(margin: Decimal) -> Decimal {
    Decimal::ONE + margin / Decimal::ONE_HUNDRED
}

impl Tables {
    fn batch_mortality(&self) -> Vec<HighRiskBatch> {
        self.batches
            .values()
            .filter_map(|b| {
                let species = self.species.get(&b.species_id)?;
                let tank = self.tanks.get(&b.tank_id)?;
                let farm = self.farms.get(&tank.farm_id)?;
                Some(HighRiskBatch {
                    batch_id: b.batch_id,
                    species_name: species.common_name.clone(),
                    farm_name: farm.farm_name.clone(),
                    tank_name: tank.tank_name.clone(),
                    stage: b.stage.clone(),
                    initial_quantity: b.initial_quantity,
                    current_quantity: b.current_quantity,
                    mortality_rate: mortality_rate(
                        i64::from(b.initial_quantity),
                        i64::from(b.current_quantity),
                    ),
                })
            })
            .collect()
    }

    fn pricing(&self, batch_id: BatchId) -> Option<PricingOverview> {
        let batch = self.batches.get(&batch_id)?;
        if batch.current_quantity <= 0 {
            return None;
        }
        let species = self.species.get(&batch.species_id)?;
        let tank = self.tanks.get(&batch.tank_id)?;
        let farm = self.farms.get(&tank.farm_id)?;

        let total_cost = self.ledger_total(batch_id);
        let unit_cost = total_cost / Decimal::from(batch.current_quantity);
        let margin = species.target_profit_margin.unwrap_or(Decimal::ZERO);

        Some(PricingOverview {
            batch_id,
            farm_id: farm.farm_id,
            farm_name: farm.farm_name.clone(),
            species_id: species.species_id,
            species: species.common_name.clone(),
            stage: batch.stage.clone(),
            current_quantity: batch.current_quantity,
            total_cost,
            cost_per_unit: round2(unit_cost),
            target_profit_margin: margin,
            suggested_unit_price: round2(unit_cost * markup(margin)),
        })
    }

    fn traceability_records(&self) -> Vec<TraceabilityRecord> {
        self.shipment_details
            .values()
            .filter_map(|detail| {
                let shipment = self.shipments.get(&detail.shipment_id)?;
                let order = self.orders.get(&shipment.order_id)?;
                let customer = self.customers.get(&order.customer_id)?;
                let batch = self.batches.get(&detail.batch_id)?;
                let species = self.species.get(&batch.species_id)?;
                let tank = self.tanks.get(&batch.tank_id)?;
                let farm = self.farms.get(&tank.farm_id)?;
                Some(TraceabilityRecord {
                    shipment_id: shipment.shipment_id,
                    shipment_date: shipment.shipment_date,
                    airway_bill_no: shipment.airway_bill_no.clone(),
                    shipment_status: shipment.status,
                    order_id: order.order_id,
                    customer_id: customer.customer_id,
                    customer_name: customer.company_name.clone(),
                    country_code: customer.country_code.clone(),
                    detail_id: detail.detail_id,
                    box_label_id: detail.box_label_id.clone(),
                    quantity_shipped: detail.quantity_shipped,
                    batch_cost_at_shipment: detail.batch_cost_at_shipment,
                    batch_id: batch.batch_id,
                    species_name: species.common_name.clone(),
                    birth_date: batch.birth_date,
                    farm_name: farm.farm_name.clone(),
                    tank_name: tank.tank_name.clone(),
                })
            })
            .collect()
    }
}

#[async_trait]
impl AnalyticsStore for InMemoryStore {
    async fn list_alerts(&self, filter: &AlertFilter) -> Result<Vec<Alert>> {
        let query = filter.to_query();
        Ok(self
            .read(|t| {
                let mut alerts: Vec<_> = t.alerts.values().map(|a| t.alert_view(a)).collect();
                alerts.sort_by_key(|a| (Reverse(a.created_at), Reverse(a.alert_id)));
                query.apply(alerts)
            })
            .await)
    }

    async fn active_biosecurity_alerts(&self) -> Result<Vec<Alert>> {
        Ok(self
            .read(|t| {
                let mut alerts: Vec<_> = t
                    .alerts
                    .values()
                    .filter(|a| {
                        a.alert_type == ALERT_TYPE_BIOSECURITY && a.status != AlertStatus::Resolved
                    })
                    .map(|a| t.alert_view(a))
                    .collect();
                alerts.sort_by_key(|a| {
                    (a.severity.rank(), Reverse(a.created_at), Reverse(a.alert_id))
                });
                alerts
            })
            .await)
    }

    async fn update_alert_status(
        &self,
        id: AlertId,
        status: AlertStatus,
        resolved_by: Option<i32>,
    ) -> Result<Option<Alert>> {
        self.write(|t| {
            let Some(alert) = t.alerts.get_mut(&id) else {
                return Ok(None);
            };
            alert.status = status;
            if status == AlertStatus::Resolved {
                alert.resolved_at = Some(Utc::now());
                alert.resolved_by = resolved_by;
            }
            let row = alert.clone();
            Ok(Some(t.alert_view(&row)))
        })
        .await
    }

    async fn mortality_analysis(&self) -> Result<Vec<MortalityAnalysis>> {
        Ok(self
            .read(|t| {
                let mut analysis: Vec<_> = t
                    .species
                    .values()
                    .map(|species| {
                        let batches: Vec<_> = t
                            .batches
                            .values()
                            .filter(|b| b.species_id == species.species_id)
                            .collect();
                        let total_initial: i64 =
                            batches.iter().map(|b| i64::from(b.initial_quantity)).sum();
                        let total_current: i64 =
                            batches.iter().map(|b| i64::from(b.current_quantity)).sum();
                        MortalityAnalysis {
                            species_id: species.species_id,
                            common_name: species.common_name.clone(),
                            batch_count: batches.len() as i64,
                            total_initial,
                            total_current,
                            mortality_rate: mortality_rate(total_initial, total_current),
                        }
                    })
                    .collect();
                analysis.sort_by_key(|m| (Reverse(m.mortality_rate), m.species_id));
                analysis
            })
            .await)
    }

    async fn high_risk_batches(&self, threshold: Decimal) -> Result<Vec<HighRiskBatch>> {
        Ok(self
            .read(|t| {
                let mut batches: Vec<_> = t
                    .batch_mortality()
                    .into_iter()
                    .filter(|b| b.mortality_rate >= threshold)
                    .collect();
                batches.sort_by_key(|b| (Reverse(b.mortality_rate), b.batch_id));
                batches
            })
            .await)
    }

    async fn batch_traceability(&self, id: BatchId) -> Result<Option<BatchTraceability>> {
        Ok(self
            .read(|t| {
                let batch = t.batches.get(&id)?;
                let species = t.species.get(&batch.species_id)?;
                let tank = t.tanks.get(&batch.tank_id)?;
                let farm = t.farms.get(&tank.farm_id)?;

                let feedings: Vec<_> = t
                    .feeding_logs
                    .values()
                    .filter(|l| l.batch_id == id)
                    .collect();
                let health: Vec<_> = t
                    .health_logs
                    .values()
                    .filter(|l| l.batch_id == id)
                    .collect();
                let details: Vec<_> = t
                    .shipment_details
                    .values()
                    .filter(|d| d.batch_id == id)
                    .collect();
                let shipments: BTreeSet<_> = details.iter().map(|d| d.shipment_id).collect();

                Some(BatchTraceability {
                    batch_id: id,
                    species_name: species.common_name.clone(),
                    scientific_name: species.scientific_name.clone(),
                    farm_name: farm.farm_name.clone(),
                    tank_name: tank.tank_name.clone(),
                    birth_date: batch.birth_date,
                    stage: batch.stage.clone(),
                    initial_quantity: batch.initial_quantity,
                    current_quantity: batch.current_quantity,
                    total_feedings: feedings.len() as i64,
                    total_feed_grams: feedings.iter().map(|l| l.amount_grams).sum(),
                    total_health_logs: health.len() as i64,
                    total_deaths: health.iter().map(|l| i64::from(l.mortality_count)).sum(),
                    ledger_total: t.ledger_total(id),
                    shipment_count: shipments.len() as i64,
                    total_shipped: details.iter().map(|d| i64::from(d.quantity_shipped)).sum(),
                })
            })
            .await)
    }

    async fn traceability_report(
        &self,
        filter: &TraceabilityFilter,
    ) -> Result<Vec<TraceabilityRecord>> {
        let query = filter.to_query();
        Ok(self
            .read(|t| {
                let mut records = t.traceability_records();
                records.sort_by_key(|r| {
                    (
                        Reverse(r.shipment_date),
                        Reverse(r.shipment_id),
                        r.detail_id,
                    )
                });
                query.apply(records)
            })
            .await)
    }

    async fn pricing_overview(&self, filter: &PricingFilter) -> Result<Vec<PricingOverview>> {
        let query = filter.to_query();
        Ok(self
            .read(|t| {
                // BTreeMap keys are already in batch_id order.
                let overview: Vec<_> = t.batches.keys().filter_map(|id| t.pricing(*id)).collect();
                query.apply(overview)
            })
            .await)
    }

    async fn batch_pricing(&self, id: BatchId) -> Result<Option<PricingOverview>> {
        Ok(self.read(|t| t.pricing(id)).await)
    }

    async fn selling_price(
        &self,
        id: BatchId,
        transport_cost: Decimal,
        packaging_cost: Decimal,
    ) -> Result<Option<SellingPrice>> {
        self.read(|t| -> Result<Option<SellingPrice>> {
            let Some(batch) = t.batches.get(&id) else {
                return Ok(None);
            };
            let selling_price = if batch.current_quantity == 0 {
                None
            } else {
                let margin = t
                    .species
                    .get(&batch.species_id)
                    .and_then(|s| s.target_profit_margin)
                    .unwrap_or(Decimal::ZERO);
                let price = t
                    .ledger_total(id)
                    .checked_add(transport_cost)
                    .and_then(|cost| cost.checked_add(packaging_cost))
                    .and_then(|cost| cost.checked_div(Decimal::from(batch.current_quantity)))
                    .and_then(|unit| unit.checked_mul(markup(margin)))
                    .ok_or_else(|| numeric_overflow("batch", "batch_selling_price_check"))?;
                Some(round2(price))
            };
            Ok(Some(SellingPrice {
                batch_id: id,
                selling_price,
                transport_cost,
                packaging_cost,
            }))
        })
        .await
    }
}
