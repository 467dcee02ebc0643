//! Persistence for the aquaculture management system.
//!
//! The store is reached through the traits in [`store`]. Two backends
//! implement them: [`PostgresStore`] over a `PgPool`, and [`InMemoryStore`]
//! which reproduces the database rules for tests and database-less runs.

pub mod error;
pub mod filter;
pub mod memory;
pub mod postgres;
pub mod query;
pub mod store;

pub use error::{ConstraintKind, Result, SHIPMENT_DETAIL_BATCH_FK, StoreError};
pub use filter::{
    AlertFilter, BatchFilter, FeedingLogFilter, HealthLogFilter, OrderFilter, PricingFilter,
    ShipmentFilter, TankFilter, TraceabilityFilter, WaterLogFilter,
};
pub use memory::InMemoryStore;
pub use postgres::PostgresStore;
pub use query::{Comparison, Fields, ListQuery, Predicate, Value};
pub use store::{AnalyticsStore, AquacultureStore, CatalogStore, ProductionStore, SalesStore};
