//! Shared types for the aquaculture management system.
//!
//! Identifiers, status vocabularies and the record shapes that flow between
//! the store, the domain services and the HTTP layer.

pub mod analytics;
pub mod catalog;
pub mod production;
pub mod sales;
pub mod status;
pub mod types;

pub use analytics::{
    ALERT_TYPE_BIOSECURITY, ALERT_TYPE_WATER_QUALITY, Alert, BatchTraceability, HighRiskBatch,
    MortalityAnalysis, PricingOverview, SellingPrice, TraceabilityRecord,
};
pub use catalog::{
    Customer, CustomerInput, Farm, FarmInput, FarmPerformance, Species, SpeciesInput, Tank,
    TankInput,
};
pub use production::{
    Batch, BatchFinancials, BatchUpdate, DEFAULT_BATCH_STAGE, FeedingLog, FeedingSummary,
    FinancialsInput, HealthLog, HealthSummary, NewBatch, NewFeedingLog, NewHealthLog, NewWaterLog,
    WaterCompliance, WaterLog,
};
pub use sales::{
    DEFAULT_CURRENCY, NewOrder, NewOrderItem, NewShipment, NewShipmentDetail, Order,
    OrderAggregate, OrderItem, OrderSummary, Shipment, ShipmentAggregate, ShipmentDetail,
    ShipmentSummary,
};
pub use status::{
    AlertSeverity, AlertStatus, OrderStatus, ParseStatusError, ShipmentStatus, WaterQualityStatus,
};
pub use types::{
    AlertId, BatchId, CustomerId, FarmId, FeedingLogId, HealthLogId, OrderId, OrderItemId,
    ShipmentDetailId, ShipmentId, SpeciesId, TankId, WaterLogId, mortality_rate, round2,
};
