use async_trait::async_trait;
use chrono::NaiveDate;
use common::{
    Alert, AlertId, AlertStatus, Batch, BatchFinancials, BatchId, BatchTraceability, BatchUpdate,
    Customer, CustomerId, CustomerInput, Farm, FarmId, FarmInput, FarmPerformance, FeedingLog,
    FeedingSummary, FinancialsInput, HealthLog, HealthSummary, HighRiskBatch, MortalityAnalysis,
    NewBatch, NewFeedingLog, NewHealthLog, NewOrder, NewShipment, NewWaterLog, Order,
    OrderAggregate, OrderId, OrderStatus, OrderSummary, PricingOverview, SellingPrice, Shipment,
    ShipmentAggregate, ShipmentId, ShipmentStatus, ShipmentSummary, Species, SpeciesId,
    SpeciesInput, Tank, TankId, TankInput, TraceabilityRecord, WaterCompliance, WaterLog,
};
use rust_decimal::Decimal;

use crate::{
    AlertFilter, BatchFilter, FeedingLogFilter, HealthLogFilter, OrderFilter, PricingFilter,
    Result, ShipmentFilter, TankFilter, TraceabilityFilter, WaterLogFilter,
};

/// Reference data: species, farms, tanks and customers.
///
/// Updates replace every writable field and return `None` when the row does
/// not exist. Deletes return `false` when there was nothing to delete, and
/// fail with a foreign-key violation when other rows still depend on the
/// target.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn list_species(&self) -> Result<Vec<Species>>;
    async fn get_species(&self, id: SpeciesId) -> Result<Option<Species>>;
    async fn create_species(&self, input: SpeciesInput) -> Result<Species>;
    async fn update_species(&self, id: SpeciesId, input: SpeciesInput) -> Result<Option<Species>>;
    async fn delete_species(&self, id: SpeciesId) -> Result<bool>;

    async fn list_farms(&self) -> Result<Vec<Farm>>;
    async fn get_farm(&self, id: FarmId) -> Result<Option<Farm>>;
    async fn create_farm(&self, input: FarmInput) -> Result<Farm>;
    async fn update_farm(&self, id: FarmId, input: FarmInput) -> Result<Option<Farm>>;
    async fn delete_farm(&self, id: FarmId) -> Result<bool>;

    /// Per-farm stock, mortality and cost summary, ordered by farm name.
    async fn farm_performance(&self) -> Result<Vec<FarmPerformance>>;

    async fn list_tanks(&self, filter: &TankFilter) -> Result<Vec<Tank>>;
    async fn get_tank(&self, id: TankId) -> Result<Option<Tank>>;
    async fn create_tank(&self, input: TankInput) -> Result<Tank>;
    async fn update_tank(&self, id: TankId, input: TankInput) -> Result<Option<Tank>>;
    async fn delete_tank(&self, id: TankId) -> Result<bool>;

    async fn list_customers(&self) -> Result<Vec<Customer>>;
    async fn get_customer(&self, id: CustomerId) -> Result<Option<Customer>>;
    async fn create_customer(&self, input: CustomerInput) -> Result<Customer>;
    async fn update_customer(
        &self,
        id: CustomerId,
        input: CustomerInput,
    ) -> Result<Option<Customer>>;
    async fn delete_customer(&self, id: CustomerId) -> Result<bool>;
}

/// Batches, their cost ledger, and the husbandry logs recorded against them.
///
/// Log inserts fire the store rules: feeding accrues feed cost into the
/// ledger, mortality lowers live stock and may raise a biosecurity alert,
/// and water readings are classified and may raise a water-quality alert.
#[async_trait]
pub trait ProductionStore: Send + Sync {
    async fn list_batches(&self, filter: &BatchFilter) -> Result<Vec<Batch>>;
    async fn get_batch(&self, id: BatchId) -> Result<Option<Batch>>;
    async fn create_batch(&self, input: NewBatch) -> Result<Batch>;
    async fn update_batch(&self, id: BatchId, input: BatchUpdate) -> Result<Option<Batch>>;
    /// Fails with [`crate::SHIPMENT_DETAIL_BATCH_FK`] when shipments reference the batch.
    async fn delete_batch(&self, id: BatchId) -> Result<bool>;

    /// The batch's ledger row, if one has been written.
    async fn get_financials(&self, id: BatchId) -> Result<Option<BatchFinancials>>;
    /// Replaces the four ledger components, creating the row when missing.
    async fn upsert_financials(
        &self,
        id: BatchId,
        input: FinancialsInput,
    ) -> Result<BatchFinancials>;

    async fn list_water_logs(&self, filter: &WaterLogFilter) -> Result<Vec<WaterLog>>;
    async fn create_water_log(&self, input: NewWaterLog) -> Result<WaterLog>;
    /// Latest reading of the tank against each live batch's species targets.
    async fn water_compliance(&self, tank_id: TankId) -> Result<Vec<WaterCompliance>>;

    async fn list_feeding_logs(&self, filter: &FeedingLogFilter) -> Result<Vec<FeedingLog>>;
    async fn create_feeding_log(&self, input: NewFeedingLog) -> Result<FeedingLog>;
    async fn feeding_summary(&self, batch_id: BatchId) -> Result<FeedingSummary>;

    async fn list_health_logs(&self, filter: &HealthLogFilter) -> Result<Vec<HealthLog>>;
    async fn create_health_log(&self, input: NewHealthLog) -> Result<HealthLog>;
    async fn health_summary(&self, batch_id: BatchId) -> Result<HealthSummary>;
}

/// Orders and shipments.
///
/// Both aggregates are created in a single transaction together with their
/// children. Any failure rolls everything back and is reported as
/// [`crate::StoreError::TransactionAborted`].
#[async_trait]
pub trait SalesStore: Send + Sync {
    async fn list_orders(&self, filter: &OrderFilter) -> Result<Vec<OrderSummary>>;
    async fn get_order(&self, id: OrderId) -> Result<Option<OrderAggregate>>;
    async fn create_order(&self, input: NewOrder) -> Result<OrderAggregate>;
    async fn update_order_status(&self, id: OrderId, status: OrderStatus)
    -> Result<Option<Order>>;
    async fn delete_order(&self, id: OrderId) -> Result<bool>;

    async fn list_shipments(&self, filter: &ShipmentFilter) -> Result<Vec<ShipmentSummary>>;
    async fn get_shipment(&self, id: ShipmentId) -> Result<Option<ShipmentAggregate>>;
    /// Each detail snapshots its batch's ledger total at insertion time.
    async fn create_shipment(&self, input: NewShipment) -> Result<ShipmentAggregate>;
    async fn update_shipment_status(
        &self,
        id: ShipmentId,
        status: ShipmentStatus,
        actual_delivery_date: Option<NaiveDate>,
    ) -> Result<Option<Shipment>>;
}

/// Alerts and the derived analytics views.
#[async_trait]
pub trait AnalyticsStore: Send + Sync {
    async fn list_alerts(&self, filter: &AlertFilter) -> Result<Vec<Alert>>;
    /// Unresolved biosecurity alerts, most severe first.
    async fn active_biosecurity_alerts(&self) -> Result<Vec<Alert>>;
    /// Resolving stamps `resolved_at` and `resolved_by`.
    async fn update_alert_status(
        &self,
        id: AlertId,
        status: AlertStatus,
        resolved_by: Option<i32>,
    ) -> Result<Option<Alert>>;

    async fn mortality_analysis(&self) -> Result<Vec<MortalityAnalysis>>;
    async fn high_risk_batches(&self, threshold: Decimal) -> Result<Vec<HighRiskBatch>>;

    async fn batch_traceability(&self, id: BatchId) -> Result<Option<BatchTraceability>>;
    async fn traceability_report(
        &self,
        filter: &TraceabilityFilter,
    ) -> Result<Vec<TraceabilityRecord>>;

    async fn pricing_overview(&self, filter: &PricingFilter) -> Result<Vec<PricingOverview>>;
    /// `None` when the batch is missing or has no live stock.
    async fn batch_pricing(&self, id: BatchId) -> Result<Option<PricingOverview>>;
    /// `None` when the batch is missing.
    async fn selling_price(
        &self,
        id: BatchId,
        transport_cost: Decimal,
        packaging_cost: Decimal,
    ) -> Result<Option<SellingPrice>>;
}

/// Everything the services need from a store.
pub trait AquacultureStore:
    CatalogStore + ProductionStore + SalesStore + AnalyticsStore + Clone + 'static
{
}

impl<T> AquacultureStore for T where
    T: CatalogStore + ProductionStore + SalesStore + AnalyticsStore + Clone + 'static
{
}
