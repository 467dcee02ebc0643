//! Domain layer for the aquaculture management system.
//!
//! Each service wraps a store and owns the checks that must pass before
//! the store is touched:
//! - [`CatalogService`] for species, farms, tanks and customers
//! - [`ProductionService`] for batches, the cost ledger and husbandry logs
//! - [`SalesService`] for orders and shipments created as whole aggregates
//! - [`AnalyticsService`] for alerts, mortality, traceability and pricing

pub mod analytics;
pub mod catalog;
pub mod error;
pub mod production;
pub mod sales;
pub mod validate;

pub use analytics::{AnalyticsService, DEFAULT_HIGH_RISK_THRESHOLD};
pub use catalog::CatalogService;
pub use error::{DomainError, Result};
pub use production::ProductionService;
pub use sales::SalesService;
