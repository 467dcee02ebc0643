use async_trait::async_trait;
use common::{
    Alert, AlertId, AlertStatus, BatchId, BatchTraceability, HighRiskBatch, MortalityAnalysis,
    PricingOverview, SellingPrice, TraceabilityRecord,
};
use rust_decimal::Decimal;

use super::{PostgresStore, rows};
use crate::{AlertFilter, PricingFilter, Result, TraceabilityFilter, store::AnalyticsStore};

#[async_trait]
impl AnalyticsStore for PostgresStore {
    async fn list_alerts(&self, filter: &AlertFilter) -> Result<Vec<Alert>> {
        self.fetch_list(
            "SELECT * FROM v_alert_details",
            "created_at DESC, alert_id DESC",
            &filter.to_query(),
            rows::alert,
        )
        .await
    }

    async fn active_biosecurity_alerts(&self) -> Result<Vec<Alert>> {
        self.fetch_all(
            r#"
            SELECT *
              FROM v_active_biosecurity_alerts
             ORDER BY CASE severity
                          WHEN 'critical' THEN 0
                          WHEN 'high' THEN 1
                          WHEN 'medium' THEN 2
                          ELSE 3
                      END,
                      created_at DESC,
                      alert_id DESC
            "#,
            rows::alert,
        )
        .await
    }

    async fn update_alert_status(
        &self,
        id: AlertId,
        status: AlertStatus,
        resolved_by: Option<i32>,
    ) -> Result<Option<Alert>> {
        let updated = sqlx::query(
            r#"
            UPDATE alert
               SET status = $2,
                   resolved_at = CASE WHEN $2 = 'resolved' THEN now() ELSE resolved_at END,
                   resolved_by = CASE WHEN $2 = 'resolved' THEN $3 ELSE resolved_by END
             WHERE alert_id = $1
            "#,
        )
        .bind(id.as_i32())
        .bind(status.as_str())
        .bind(resolved_by)
        .execute(&self.pool)
        .await?;

        if updated.rows_affected() == 0 {
            return Ok(None);
        }

        self.fetch_by_id(
            "SELECT * FROM v_alert_details WHERE alert_id = $1",
            id.as_i32(),
            rows::alert,
        )
        .await
    }

    async fn mortality_analysis(&self) -> Result<Vec<MortalityAnalysis>> {
        self.fetch_all(
            "SELECT * FROM v_species_mortality_analysis ORDER BY mortality_rate DESC, species_id",
            rows::mortality_analysis,
        )
        .await
    }

    async fn high_risk_batches(&self, threshold: Decimal) -> Result<Vec<HighRiskBatch>> {
        let records = sqlx::query("SELECT * FROM get_high_risk_batches($1)")
            .bind(threshold)
            .fetch_all(&self.pool)
            .await?;
        records.iter().map(rows::high_risk_batch).collect()
    }

    async fn batch_traceability(&self, id: BatchId) -> Result<Option<BatchTraceability>> {
        self.fetch_by_id(
            "SELECT * FROM get_batch_traceability($1)",
            id.as_i32(),
            rows::batch_traceability,
        )
        .await
    }

    async fn traceability_report(
        &self,
        filter: &TraceabilityFilter,
    ) -> Result<Vec<TraceabilityRecord>> {
        self.fetch_list(
            "SELECT * FROM v_traceability_report",
            "shipment_date DESC, shipment_id DESC, detail_id",
            &filter.to_query(),
            rows::traceability_record,
        )
        .await
    }

    async fn pricing_overview(&self, filter: &PricingFilter) -> Result<Vec<PricingOverview>> {
        self.fetch_list(
            "SELECT * FROM v_batch_pricing_overview",
            "batch_id",
            &filter.to_query(),
            rows::pricing_overview,
        )
        .await
    }

    async fn batch_pricing(&self, id: BatchId) -> Result<Option<PricingOverview>> {
        self.fetch_by_id(
            "SELECT * FROM v_batch_pricing_overview WHERE batch_id = $1",
            id.as_i32(),
            rows::pricing_overview,
        )
        .await
    }

    async fn selling_price(
        &self,
        id: BatchId,
        transport_cost: Decimal,
        packaging_cost: Decimal,
    ) -> Result<Option<SellingPrice>> {
        let row = sqlx::query(
            r#"
            SELECT calculate_selling_price($1, $2, $3) AS selling_price
              FROM batch
             WHERE batch_id = $1
            "#,
        )
        .bind(id.as_i32())
        .bind(transport_cost)
        .bind(packaging_cost)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(Some(SellingPrice {
            batch_id: id,
            selling_price: rows::optional_decimal(&row, "selling_price")?,
            transport_cost,
            packaging_cost,
        }))
    }
}
