//! Batches, the batch cost ledger and husbandry logs.

use common::{
    Batch, BatchFinancials, BatchId, BatchUpdate, FeedingLog, FeedingSummary, FinancialsInput,
    HealthLog, HealthSummary, NewBatch, NewFeedingLog, NewHealthLog, NewWaterLog, TankId,
    WaterCompliance, WaterLog,
};
use store::{
    AquacultureStore, BatchFilter, FeedingLogFilter, HealthLogFilter, ProductionStore,
    WaterLogFilter,
};

use crate::error::{DomainError, Result};
use crate::validate;

/// Service for production batches and the logs recorded against them.
///
/// Feeding and health logs have side effects the store applies on insert:
/// feed cost accrues into the batch ledger, and deaths lower the live stock.
#[derive(Clone)]
pub struct ProductionService<S: AquacultureStore> {
    store: S,
}

impl<S: AquacultureStore> ProductionService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    #[tracing::instrument(skip(self))]
    pub async fn list_batches(&self, filter: BatchFilter) -> Result<Vec<Batch>> {
        Ok(self.store.list_batches(&filter).await?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_batch(&self, id: BatchId) -> Result<Option<Batch>> {
        Ok(self.store.get_batch(id).await?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn create_batch(&self, input: NewBatch) -> Result<Batch> {
        validate::non_negative("initial_quantity", input.initial_quantity)?;
        if let Some(stage) = &input.stage {
            validate::required("stage", stage)?;
        }
        Ok(self.store.create_batch(input).await?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn update_batch(&self, id: BatchId, input: BatchUpdate) -> Result<Batch> {
        validate::non_negative("initial_quantity", input.initial_quantity)?;
        validate::non_negative("current_quantity", input.current_quantity)?;
        validate::required("stage", &input.stage)?;
        self.store
            .update_batch(id, input)
            .await?
            .ok_or(DomainError::not_found("Batch", id))
    }

    /// Deletes a batch with its logs and ledger. A batch that shipments were
    /// cut from stays, and the store reports the restricting foreign key.
    #[tracing::instrument(skip(self))]
    pub async fn delete_batch(&self, id: BatchId) -> Result<()> {
        if !self.store.delete_batch(id).await? {
            return Err(DomainError::not_found("Batch", id));
        }
        Ok(())
    }

    /// The batch ledger, or an all-zero ledger when none was recorded yet.
    #[tracing::instrument(skip(self))]
    pub async fn get_financials(&self, id: BatchId) -> Result<BatchFinancials> {
        Ok(self
            .store
            .get_financials(id)
            .await?
            .unwrap_or_else(|| BatchFinancials::empty(id)))
    }

    #[tracing::instrument(skip(self))]
    pub async fn upsert_financials(
        &self,
        id: BatchId,
        input: FinancialsInput,
    ) -> Result<BatchFinancials> {
        validate::non_negative_amount("total_feed_cost", input.total_feed_cost)?;
        validate::non_negative_amount("total_labor_cost", input.total_labor_cost)?;
        validate::non_negative_amount("water_electricity_cost", input.water_electricity_cost)?;
        validate::non_negative_amount("medication_cost", input.medication_cost)?;

        if self.store.get_batch(id).await?.is_none() {
            return Err(DomainError::not_found("Batch", id));
        }
        Ok(self.store.upsert_financials(id, input).await?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn list_water_logs(&self, filter: WaterLogFilter) -> Result<Vec<WaterLog>> {
        Ok(self.store.list_water_logs(&filter).await?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn create_water_log(&self, input: NewWaterLog) -> Result<WaterLog> {
        validate::non_negative_amount("dissolved_oxygen", input.dissolved_oxygen)?;
        validate::non_negative_amount("ammonia_level", input.ammonia_level)?;
        let log = self.store.create_water_log(input).await?;
        if log.status != common::WaterQualityStatus::Normal {
            tracing::warn!(tank_id = %log.tank_id, status = %log.status, "abnormal water reading");
        }
        Ok(log)
    }

    #[tracing::instrument(skip(self))]
    pub async fn water_compliance(&self, tank_id: TankId) -> Result<Vec<WaterCompliance>> {
        Ok(self.store.water_compliance(tank_id).await?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn list_feeding_logs(&self, filter: FeedingLogFilter) -> Result<Vec<FeedingLog>> {
        Ok(self.store.list_feeding_logs(&filter).await?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn create_feeding_log(&self, input: NewFeedingLog) -> Result<FeedingLog> {
        validate::required("food_type", &input.food_type)?;
        validate::non_negative_amount("amount_grams", Some(input.amount_grams))?;
        validate::non_negative_amount("cost_per_kg", Some(input.cost_per_kg))?;
        Ok(self.store.create_feeding_log(input).await?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn feeding_summary(&self, batch_id: BatchId) -> Result<FeedingSummary> {
        Ok(self.store.feeding_summary(batch_id).await?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn list_health_logs(&self, filter: HealthLogFilter) -> Result<Vec<HealthLog>> {
        Ok(self.store.list_health_logs(&filter).await?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn create_health_log(&self, input: NewHealthLog) -> Result<HealthLog> {
        if let Some(count) = input.mortality_count {
            validate::non_negative("mortality_count", count)?;
        }
        Ok(self.store.create_health_log(input).await?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn health_summary(&self, batch_id: BatchId) -> Result<HealthSummary> {
        Ok(self.store.health_summary(batch_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use store::InMemoryStore;

    use super::*;

    #[tokio::test]
    async fn missing_ledger_reads_as_zero() {
        let service = ProductionService::new(InMemoryStore::new());
        let ledger = service.get_financials(BatchId::new(8)).await.unwrap();
        assert_eq!(ledger.batch_id, BatchId::new(8));
        assert_eq!(ledger.total_cost(), Decimal::ZERO);
    }

    #[tokio::test]
    async fn ledger_of_unknown_batch_is_not_found() {
        let service = ProductionService::new(InMemoryStore::new());
        let err = service
            .upsert_financials(BatchId::new(8), FinancialsInput::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { entity: "Batch", id: 8 }));
    }

    #[tokio::test]
    async fn negative_costs_are_rejected() {
        let service = ProductionService::new(InMemoryStore::new());
        let err = service
            .upsert_financials(
                BatchId::new(1),
                FinancialsInput {
                    medication_cost: Some(Decimal::from(-3)),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "medication_cost must not be negative");
    }

    #[tokio::test]
    async fn negative_mortality_is_rejected() {
        let service = ProductionService::new(InMemoryStore::new());
        let err = service
            .create_health_log(NewHealthLog {
                batch_id: BatchId::new(1),
                condition_notes: None,
                treatment_applied: None,
                mortality_count: Some(-1),
                recorded_by: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }
}
