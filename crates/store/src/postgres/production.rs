use async_trait::async_trait;
use common::{
    Batch, BatchFinancials, BatchId, BatchUpdate, DEFAULT_BATCH_STAGE, FeedingLog,
    FeedingSummary, FinancialsInput, HealthLog, HealthSummary, NewBatch, NewFeedingLog,
    NewHealthLog, NewWaterLog, TankId, WaterCompliance, WaterLog,
};

use super::{PostgresStore, rows};
use crate::{
    BatchFilter, FeedingLogFilter, HealthLogFilter, Result, WaterLogFilter,
    store::ProductionStore,
};

fn batch_select(source: &str) -> String {
    format!(
        "SELECT b.batch_id, b.species_id, b.tank_id, b.birth_date, b.initial_quantity, \
         b.current_quantity, b.stage, b.estimated_harvest_date, \
         s.common_name, s.scientific_name, t.tank_name, t.tank_type, \
         f.farm_id, f.farm_name, f.location \
         FROM {source} b \
         JOIN species s ON s.species_id = b.species_id \
         JOIN tank t ON t.tank_id = b.tank_id \
         JOIN farm f ON f.farm_id = t.farm_id"
    )
}

fn water_log_select(source: &str) -> String {
    format!(
        "SELECT w.log_id, w.tank_id, w.ph_level, w.temperature, w.dissolved_oxygen, \
         w.ammonia_level, w.measured_by_user_id, w.measured_at, w.status, \
         t.tank_name, f.farm_name \
         FROM {source} w \
         JOIN tank t ON t.tank_id = w.tank_id \
         JOIN farm f ON f.farm_id = t.farm_id"
    )
}

fn feeding_log_select(source: &str) -> String {
    format!(
        "SELECT fl.feeding_id, fl.batch_id, fl.food_type, fl.amount_grams, fl.cost_per_kg, \
         fl.recorded_by, fl.notes, fl.feed_time, s.common_name \
         FROM {source} fl \
         JOIN batch b ON b.batch_id = fl.batch_id \
         JOIN species s ON s.species_id = b.species_id"
    )
}

fn health_log_select(source: &str) -> String {
    format!(
        "SELECT hl.health_log_id, hl.batch_id, hl.condition_notes, hl.treatment_applied, \
         hl.mortality_count, hl.recorded_by, hl.log_date, s.common_name \
         FROM {source} hl \
         JOIN batch b ON b.batch_id = hl.batch_id \
         JOIN species s ON s.species_id = b.species_id"
    )
}

#[async_trait]
impl ProductionStore for PostgresStore {
    async fn list_batches(&self, filter: &BatchFilter) -> Result<Vec<Batch>> {
        self.fetch_list(
            &batch_select("batch"),
            "birth_date DESC, batch_id DESC",
            &filter.to_query(),
            rows::batch,
        )
        .await
    }

    async fn get_batch(&self, id: BatchId) -> Result<Option<Batch>> {
        let sql = format!("{} WHERE b.batch_id = $1", batch_select("batch"));
        self.fetch_by_id(&sql, id.as_i32(), rows::batch).await
    }

    async fn create_batch(&self, input: NewBatch) -> Result<Batch> {
        let sql = format!(
            "WITH inserted AS (
                INSERT INTO batch (species_id, tank_id, birth_date, initial_quantity,
                                   current_quantity, stage, estimated_harvest_date)
                VALUES ($1, $2, $3, $4, $4, COALESCE($5, $6), $7)
                RETURNING *
            ) {}",
            batch_select("inserted")
        );
        let row = sqlx::query(&sql)
            .bind(input.species_id.as_i32())
            .bind(input.tank_id.as_i32())
            .bind(input.birth_date)
            .bind(input.initial_quantity)
            .bind(&input.stage)
            .bind(DEFAULT_BATCH_STAGE)
            .bind(input.estimated_harvest_date)
            .fetch_one(&self.pool)
            .await?;

        rows::batch(&row)
    }

    async fn update_batch(&self, id: BatchId, input: BatchUpdate) -> Result<Option<Batch>> {
        let sql = format!(
            "WITH updated AS (
                UPDATE batch
                   SET species_id = $2, tank_id = $3, birth_date = $4, initial_quantity = $5,
                       current_quantity = $6, stage = $7, estimated_harvest_date = $8
                 WHERE batch_id = $1
                RETURNING *
            ) {}",
            batch_select("updated")
        );
        let row = sqlx::query(&sql)
            .bind(id.as_i32())
            .bind(input.species_id.as_i32())
            .bind(input.tank_id.as_i32())
            .bind(input.birth_date)
            .bind(input.initial_quantity)
            .bind(input.current_quantity)
            .bind(&input.stage)
            .bind(input.estimated_harvest_date)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(rows::batch).transpose()
    }

    async fn delete_batch(&self, id: BatchId) -> Result<bool> {
        self.delete_by_id("DELETE FROM batch WHERE batch_id = $1", id.as_i32())
            .await
    }

    async fn get_financials(&self, id: BatchId) -> Result<Option<BatchFinancials>> {
        self.fetch_by_id(
            "SELECT * FROM batch_financials WHERE batch_id = $1",
            id.as_i32(),
            rows::financials,
        )
        .await
    }

    async fn upsert_financials(
        &self,
        id: BatchId,
        input: FinancialsInput,
    ) -> Result<BatchFinancials> {
        let row = sqlx::query(
            r#"
            INSERT INTO batch_financials
                (batch_id, total_feed_cost, total_labor_cost, water_electricity_cost,
                 medication_cost, updated_at)
            VALUES ($1, $2, $3, $4, $5, now())
            ON CONFLICT (batch_id) DO UPDATE SET
                total_feed_cost = EXCLUDED.total_feed_cost,
                total_labor_cost = EXCLUDED.total_labor_cost,
                water_electricity_cost = EXCLUDED.water_electricity_cost,
                medication_cost = EXCLUDED.medication_cost,
                updated_at = EXCLUDED.updated_at
            RETURNING *
            "#,
        )
        .bind(id.as_i32())
        .bind(input.total_feed_cost)
        .bind(input.total_labor_cost)
        .bind(input.water_electricity_cost)
        .bind(input.medication_cost)
        .fetch_one(&self.pool)
        .await?;

        rows::financials(&row)
    }

    async fn list_water_logs(&self, filter: &WaterLogFilter) -> Result<Vec<WaterLog>> {
        self.fetch_list(
            &water_log_select("water_log"),
            "measured_at DESC, log_id DESC",
            &filter.to_query(),
            rows::water_log,
        )
        .await
    }

    async fn create_water_log(&self, input: NewWaterLog) -> Result<WaterLog> {
        // Status is assigned by the classify trigger.
        let sql = format!(
            "WITH inserted AS (
                INSERT INTO water_log (tank_id, ph_level, temperature, dissolved_oxygen,
                                       ammonia_level, measured_by_user_id)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING *
            ) {}",
            water_log_select("inserted")
        );
        let row = sqlx::query(&sql)
            .bind(input.tank_id.as_i32())
            .bind(input.ph_level)
            .bind(input.temperature)
            .bind(input.dissolved_oxygen)
            .bind(input.ammonia_level)
            .bind(input.measured_by_user_id)
            .fetch_one(&self.pool)
            .await?;

        rows::water_log(&row)
    }

    async fn water_compliance(&self, tank_id: TankId) -> Result<Vec<WaterCompliance>> {
        let records = sqlx::query("SELECT * FROM check_water_quality_compliance($1)")
            .bind(tank_id.as_i32())
            .fetch_all(&self.pool)
            .await?;
        records.iter().map(rows::water_compliance).collect()
    }

    async fn list_feeding_logs(&self, filter: &FeedingLogFilter) -> Result<Vec<FeedingLog>> {
        self.fetch_list(
            &feeding_log_select("feeding_log"),
            "feed_time DESC, feeding_id DESC",
            &filter.to_query(),
            rows::feeding_log,
        )
        .await
    }

    async fn create_feeding_log(&self, input: NewFeedingLog) -> Result<FeedingLog> {
        let sql = format!(
            "WITH inserted AS (
                INSERT INTO feeding_log (batch_id, food_type, amount_grams, cost_per_kg,
                                         recorded_by, notes)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING *
            ) {}",
            feeding_log_select("inserted")
        );
        let row = sqlx::query(&sql)
            .bind(input.batch_id.as_i32())
            .bind(&input.food_type)
            .bind(input.amount_grams)
            .bind(input.cost_per_kg)
            .bind(input.recorded_by)
            .bind(&input.notes)
            .fetch_one(&self.pool)
            .await?;

        rows::feeding_log(&row)
    }

    async fn feeding_summary(&self, batch_id: BatchId) -> Result<FeedingSummary> {
        let row = sqlx::query(
            r#"
            SELECT COUNT(*) AS total_feedings,
                   COALESCE(SUM(amount_grams), 0) AS total_grams,
                   ROUND(COALESCE(SUM(amount_grams / 1000 * cost_per_kg), 0), 2) AS total_cost,
                   MIN(feed_time) AS first_feeding,
                   MAX(feed_time) AS last_feeding
              FROM feeding_log
             WHERE batch_id = $1
            "#,
        )
        .bind(batch_id.as_i32())
        .fetch_one(&self.pool)
        .await?;

        rows::feeding_summary(batch_id, &row)
    }

    async fn list_health_logs(&self, filter: &HealthLogFilter) -> Result<Vec<HealthLog>> {
        self.fetch_list(
            &health_log_select("health_log"),
            "log_date DESC, health_log_id DESC",
            &filter.to_query(),
            rows::health_log,
        )
        .await
    }

    async fn create_health_log(&self, input: NewHealthLog) -> Result<HealthLog> {
        let sql = format!(
            "WITH inserted AS (
                INSERT INTO health_log (batch_id, condition_notes, treatment_applied,
                                        mortality_count, recorded_by)
                VALUES ($1, $2, $3, COALESCE($4, 0), $5)
                RETURNING *
            ) {}",
            health_log_select("inserted")
        );
        let row = sqlx::query(&sql)
            .bind(input.batch_id.as_i32())
            .bind(&input.condition_notes)
            .bind(&input.treatment_applied)
            .bind(input.mortality_count)
            .bind(input.recorded_by)
            .fetch_one(&self.pool)
            .await?;

        rows::health_log(&row)
    }

    async fn health_summary(&self, batch_id: BatchId) -> Result<HealthSummary> {
        let row = sqlx::query(
            r#"
            SELECT COUNT(*) AS total_health_logs,
                   COALESCE(SUM(mortality_count), 0)::BIGINT AS total_deaths,
                   COUNT(*) FILTER (WHERE COALESCE(condition_notes, '') <> '') AS disease_events,
                   MIN(log_date) AS first_log,
                   MAX(log_date) AS last_log
              FROM health_log
             WHERE batch_id = $1
            "#,
        )
        .bind(batch_id.as_i32())
        .fetch_one(&self.pool)
        .await?;

        rows::health_summary(batch_id, &row)
    }
}
