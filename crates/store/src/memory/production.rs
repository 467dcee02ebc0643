use std::cmp::Reverse;

use async_trait::async_trait;
use chrono::Utc;
use common::{
    Batch, BatchFinancials, BatchId, BatchUpdate, DEFAULT_BATCH_STAGE, FeedingLog,
    FeedingSummary, FinancialsInput, HealthLog, HealthSummary, NewBatch, NewFeedingLog,
    NewHealthLog, NewWaterLog, TankId, WaterCompliance, WaterLog, round2,
};
use rust_decimal::Decimal;

use super::{
    InMemoryStore,
    tables::{BatchRow, Tables, check_failed, restricted, within},
};
use crate::{
    BatchFilter, FeedingLogFilter, HealthLogFilter, Result, SHIPMENT_DETAIL_BATCH_FK,
    StoreError, WaterLogFilter, store::ProductionStore,
};

fn check_quantities(initial: i32, current: i32) -> Result<()> {
    if initial < 0 {
        return Err(check_failed("batch", "batch_initial_quantity_check"));
    }
    if current < 0 {
        return Err(check_failed("batch", "batch_current_quantity_check"));
    }
    Ok(())
}

fn stored<T>(view: Option<T>, entity: &'static str, id: i32) -> Result<T> {
    view.ok_or(StoreError::NotFound { entity, id })
}

impl Tables {
    fn compliance(&self, tank_id: TankId) -> Vec<WaterCompliance> {
        let Some(latest) = self
            .water_logs
            .values()
            .filter(|log| log.tank_id == tank_id)
            .max_by_key(|log| (log.measured_at, log.log_id))
        else {
            return Vec::new();
        };

        self.batches
            .values()
            .filter(|b| b.tank_id == tank_id && b.current_quantity > 0)
            .filter_map(|b| {
                let species = self.species.get(&b.species_id)?;
                Some(WaterCompliance {
                    tank_id,
                    batch_id: b.batch_id,
                    species_name: species.common_name.clone(),
                    measured_at: latest.measured_at,
                    temperature: latest.temperature,
                    ideal_temp_min: species.ideal_temp_min,
                    ideal_temp_max: species.ideal_temp_max,
                    temperature_compliant: within(
                        latest.temperature,
                        species.ideal_temp_min,
                        species.ideal_temp_max,
                    ),
                    ph_level: latest.ph_level,
                    ideal_ph_min: species.ideal_ph_min,
                    ideal_ph_max: species.ideal_ph_max,
                    ph_compliant: within(
                        latest.ph_level,
                        species.ideal_ph_min,
                        species.ideal_ph_max,
                    ),
                })
            })
            .collect()
    }
}

#[async_trait]
impl ProductionStore for InMemoryStore {
    async fn list_batches(&self, filter: &BatchFilter) -> Result<Vec<Batch>> {
        let query = filter.to_query();
        Ok(self
            .read(|t| {
                let mut batches: Vec<_> =
                    t.batches.values().filter_map(|b| t.batch_view(b)).collect();
                batches.sort_by_key(|b| (Reverse(b.birth_date), Reverse(b.batch_id)));
                query.apply(batches)
            })
            .await)
    }

    async fn get_batch(&self, id: BatchId) -> Result<Option<Batch>> {
        Ok(self
            .read(|t| t.batches.get(&id).and_then(|b| t.batch_view(b)))
            .await)
    }

    async fn create_batch(&self, input: NewBatch) -> Result<Batch> {
        self.write(|t| {
            t.require_species(input.species_id, "batch", "batch_species_id_fkey")?;
            t.require_tank(input.tank_id, "batch", "batch_tank_id_fkey")?;
            check_quantities(input.initial_quantity, input.initial_quantity)?;

            let batch_id = BatchId::new(t.next_id("batch"));
            let row = BatchRow {
                batch_id,
                species_id: input.species_id,
                tank_id: input.tank_id,
                birth_date: input.birth_date,
                initial_quantity: input.initial_quantity,
                current_quantity: input.initial_quantity,
                stage: input
                    .stage
                    .unwrap_or_else(|| DEFAULT_BATCH_STAGE.to_string()),
                estimated_harvest_date: input.estimated_harvest_date,
            };
            let batch = t.batch_view(&row);
            t.batches.insert(batch_id, row);
            stored(batch, "batch", batch_id.as_i32())
        })
        .await
    }

    async fn update_batch(&self, id: BatchId, input: BatchUpdate) -> Result<Option<Batch>> {
        self.write(|t| {
            if !t.batches.contains_key(&id) {
                return Ok(None);
            }
            t.require_species(input.species_id, "batch", "batch_species_id_fkey")?;
            t.require_tank(input.tank_id, "batch", "batch_tank_id_fkey")?;
            check_quantities(input.initial_quantity, input.current_quantity)?;

            let row = BatchRow {
                batch_id: id,
                species_id: input.species_id,
                tank_id: input.tank_id,
                birth_date: input.birth_date,
                initial_quantity: input.initial_quantity,
                current_quantity: input.current_quantity,
                stage: input.stage,
                estimated_harvest_date: input.estimated_harvest_date,
            };
            let batch = t.batch_view(&row);
            t.batches.insert(id, row);
            Ok(batch)
        })
        .await
    }

    async fn delete_batch(&self, id: BatchId) -> Result<bool> {
        self.write(|t| {
            if !t.batches.contains_key(&id) {
                return Ok(false);
            }
            if t.shipment_details.values().any(|d| d.batch_id == id) {
                return Err(restricted(
                    "batch",
                    SHIPMENT_DETAIL_BATCH_FK,
                    "shipment_detail",
                ));
            }
            t.cascade_batch(id);
            Ok(true)
        })
        .await
    }

    async fn get_financials(&self, id: BatchId) -> Result<Option<BatchFinancials>> {
        Ok(self.read(|t| t.financials.get(&id).cloned()).await)
    }

    async fn upsert_financials(
        &self,
        id: BatchId,
        input: FinancialsInput,
    ) -> Result<BatchFinancials> {
        self.write(|t| {
            t.require_batch(id, "batch_financials", "batch_financials_batch_id_fkey")?;
            let ledger = BatchFinancials {
                batch_id: id,
                total_feed_cost: input.total_feed_cost,
                total_labor_cost: input.total_labor_cost,
                water_electricity_cost: input.water_electricity_cost,
                medication_cost: input.medication_cost,
                updated_at: Some(Utc::now()),
            };
            t.financials.insert(id, ledger.clone());
            Ok(ledger)
        })
        .await
    }

    async fn list_water_logs(&self, filter: &WaterLogFilter) -> Result<Vec<WaterLog>> {
        let query = filter.to_query();
        Ok(self
            .read(|t| {
                let mut logs: Vec<_> = t
                    .water_logs
                    .values()
                    .filter_map(|l| t.water_log_view(l))
                    .collect();
                logs.sort_by_key(|l| (Reverse(l.measured_at), Reverse(l.log_id)));
                query.apply(logs)
            })
            .await)
    }

    async fn create_water_log(&self, input: NewWaterLog) -> Result<WaterLog> {
        self.write(|t| {
            let id = t.insert_water_log(input)?;
            let view = t.water_logs.get(&id).and_then(|l| t.water_log_view(l));
            stored(view, "water log", id.as_i32())
        })
        .await
    }

    async fn water_compliance(&self, tank_id: TankId) -> Result<Vec<WaterCompliance>> {
        Ok(self.read(|t| t.compliance(tank_id)).await)
    }

    async fn list_feeding_logs(&self, filter: &FeedingLogFilter) -> Result<Vec<FeedingLog>> {
        let query = filter.to_query();
        Ok(self
            .read(|t| {
                let mut logs: Vec<_> = t
                    .feeding_logs
                    .values()
                    .filter_map(|l| t.feeding_log_view(l))
                    .collect();
                logs.sort_by_key(|l| (Reverse(l.feed_time), Reverse(l.feeding_id)));
                query.apply(logs)
            })
            .await)
    }

    async fn create_feeding_log(&self, input: NewFeedingLog) -> Result<FeedingLog> {
        self.write(|t| {
            let id = t.insert_feeding_log(input)?;
            let view = t.feeding_logs.get(&id).and_then(|l| t.feeding_log_view(l));
            stored(view, "feeding log", id.as_i32())
        })
        .await
    }

    async fn feeding_summary(&self, batch_id: BatchId) -> Result<FeedingSummary> {
        Ok(self
            .read(|t| {
                let logs: Vec<_> = t
                    .feeding_logs
                    .values()
                    .filter(|l| l.batch_id == batch_id)
                    .collect();
                if logs.is_empty() {
                    return FeedingSummary::empty(batch_id);
                }
                FeedingSummary {
                    batch_id,
                    total_feedings: logs.len() as i64,
                    total_grams: logs.iter().map(|l| l.amount_grams).sum(),
                    total_cost: round2(
                        logs.iter()
                            .map(|l| l.amount_grams / Decimal::ONE_THOUSAND * l.cost_per_kg)
                            .sum(),
                    ),
                    first_feeding: logs.iter().map(|l| l.feed_time).min(),
                    last_feeding: logs.iter().map(|l| l.feed_time).max(),
                }
            })
            .await)
    }

    async fn list_health_logs(&self, filter: &HealthLogFilter) -> Result<Vec<HealthLog>> {
        let query = filter.to_query();
        Ok(self
            .read(|t| {
                let mut logs: Vec<_> = t
                    .health_logs
                    .values()
                    .filter_map(|l| t.health_log_view(l))
                    .collect();
                logs.sort_by_key(|l| (Reverse(l.log_date), Reverse(l.health_log_id)));
                query.apply(logs)
            })
            .await)
    }

    async fn create_health_log(&self, input: NewHealthLog) -> Result<HealthLog> {
        self.write(|t| {
            let id = t.insert_health_log(input)?;
            let view = t.health_logs.get(&id).and_then(|l| t.health_log_view(l));
            stored(view, "health log", id.as_i32())
        })
        .await
    }

    async fn health_summary(&self, batch_id: BatchId) -> Result<HealthSummary> {
        Ok(self
            .read(|t| {
                let logs: Vec<_> = t
                    .health_logs
                    .values()
                    .filter(|l| l.batch_id == batch_id)
                    .collect();
                if logs.is_empty() {
                    return HealthSummary::empty(batch_id);
                }
                HealthSummary {
                    batch_id,
                    total_health_logs: logs.len() as i64,
                    total_deaths: logs.iter().map(|l| i64::from(l.mortality_count)).sum(),
                    disease_events: logs
                        .iter()
                        .filter(|l| l.condition_notes.as_deref().is_some_and(|n| !n.is_empty()))
                        .count() as i64,
                    first_log: logs.iter().map(|l| l.log_date).min(),
                    last_log: logs.iter().map(|l| l.log_date).max(),
                }
            })
            .await)
    }
}
