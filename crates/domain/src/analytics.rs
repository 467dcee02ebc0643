//! Alerts, mortality, traceability and pricing reads.

use common::{
    Alert, AlertId, AlertStatus, BatchId, BatchTraceability, HighRiskBatch, MortalityAnalysis,
    PricingOverview, SellingPrice, TraceabilityRecord,
};
use rust_decimal::Decimal;
use store::{AlertFilter, AnalyticsStore, AquacultureStore, PricingFilter, TraceabilityFilter};

use crate::error::{DomainError, Result};
use crate::validate;

/// Mortality percentage above which a batch is reported as high risk
/// when the caller names no threshold.
pub const DEFAULT_HIGH_RISK_THRESHOLD: Decimal = Decimal::from_parts(20, 0, 0, false, 0);

/// Service for the derived views over production and sales data.
#[derive(Clone)]
pub struct AnalyticsService<S: AquacultureStore> {
    store: S,
}

impl<S: AquacultureStore> AnalyticsService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    #[tracing::instrument(skip(self))]
    pub async fn list_alerts(&self, filter: AlertFilter) -> Result<Vec<Alert>> {
        Ok(self.store.list_alerts(&filter).await?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn biosecurity_alerts(&self) -> Result<Vec<Alert>> {
        Ok(self.store.active_biosecurity_alerts().await?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn update_alert_status(
        &self,
        id: AlertId,
        status: &str,
        resolved_by: Option<i32>,
    ) -> Result<Alert> {
        let status: AlertStatus = validate::status(status)?;
        let alert = self
            .store
            .update_alert_status(id, status, resolved_by)
            .await?
            .ok_or(DomainError::not_found("Alert", id))?;
        metrics::counter!("status_updates_total", "entity" => "alert").increment(1);
        Ok(alert)
    }

    #[tracing::instrument(skip(self))]
    pub async fn mortality_analysis(&self) -> Result<Vec<MortalityAnalysis>> {
        Ok(self.store.mortality_analysis().await?)
    }

    /// Batches at or above `threshold` percent mortality, worst first.
    #[tracing::instrument(skip(self))]
    pub async fn high_risk_batches(&self, threshold: Option<Decimal>) -> Result<Vec<HighRiskBatch>> {
        let threshold = threshold.unwrap_or(DEFAULT_HIGH_RISK_THRESHOLD);
        if threshold < Decimal::ZERO || threshold > Decimal::ONE_HUNDRED {
            return Err(DomainError::validation(
                "threshold must be between 0 and 100",
            ));
        }
        Ok(self.store.high_risk_batches(threshold).await?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn batch_traceability(&self, id: BatchId) -> Result<Option<BatchTraceability>> {
        Ok(self.store.batch_traceability(id).await?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn traceability_report(
        &self,
        filter: TraceabilityFilter,
    ) -> Result<Vec<TraceabilityRecord>> {
        Ok(self.store.traceability_report(&filter).await?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn pricing_overview(&self, filter: PricingFilter) -> Result<Vec<PricingOverview>> {
        Ok(self.store.pricing_overview(&filter).await?)
    }

    /// Pricing row of one batch. `None` when the batch is missing or sold out.
    #[tracing::instrument(skip(self))]
    pub async fn batch_pricing(&self, id: BatchId) -> Result<Option<PricingOverview>> {
        Ok(self.store.batch_pricing(id).await?)
    }

    /// Unit selling price with logistics costs spread over the live stock.
    /// Absent costs count as zero.
    #[tracing::instrument(skip(self))]
    pub async fn selling_price(
        &self,
        id: BatchId,
        transport_cost: Option<Decimal>,
        packaging_cost: Option<Decimal>,
    ) -> Result<Option<SellingPrice>> {
        validate::non_negative_amount("transport_cost", transport_cost)?;
        validate::non_negative_amount("packaging_cost", packaging_cost)?;
        Ok(self
            .store
            .selling_price(
                id,
                transport_cost.unwrap_or_default(),
                packaging_cost.unwrap_or_default(),
            )
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use store::InMemoryStore;

    use super::*;

    fn service() -> AnalyticsService<InMemoryStore> {
        AnalyticsService::new(InMemoryStore::new())
    }

    #[test]
    fn default_threshold_is_twenty_percent() {
        assert_eq!(DEFAULT_HIGH_RISK_THRESHOLD, Decimal::from(20));
    }

    #[tokio::test]
    async fn threshold_outside_percentage_range_is_rejected() {
        let service = service();
        for bad in [Decimal::from(-1), Decimal::from(101)] {
            let err = service.high_risk_batches(Some(bad)).await.unwrap_err();
            assert!(matches!(err, DomainError::Validation(_)));
        }
        assert!(service.high_risk_batches(None).await.unwrap().is_empty());
        assert!(
            service
                .high_risk_batches(Some(Decimal::ONE_HUNDRED))
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn unknown_alert_status_is_rejected() {
        let err = service()
            .update_alert_status(AlertId::new(1), "ignored", None)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid alert status 'ignored'");
    }

    #[tokio::test]
    async fn negative_transport_cost_is_rejected() {
        let err = service()
            .selling_price(BatchId::new(1), Some(Decimal::NEGATIVE_ONE), None)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn selling_price_of_missing_batch_is_none() {
        let price = service()
            .selling_price(BatchId::new(9), None, None)
            .await
            .unwrap();
        assert!(price.is_none());
    }
}
