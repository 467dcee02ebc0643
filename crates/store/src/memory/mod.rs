//! In-memory store for tests and database-less runs.
//!
//! Reproduces the database behaviour the services rely on: foreign-key
//! policies, the write rules the PostgreSQL triggers implement, and the
//! analytics views.

mod analytics;
mod catalog;
mod production;
mod sales;
mod tables;

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::Result;
use tables::Tables;

/// In-memory store implementation.
///
/// All tables sit behind one lock. Every write runs against a copy of the
/// tables that replaces the live copy only when the whole write succeeded,
/// so readers never observe a partial aggregate.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears every table and restarts the identifier sequences.
    pub async fn clear(&self) {
        *self.tables.write().await = Tables::default();
    }

    async fn read<T>(&self, f: impl FnOnce(&Tables) -> T) -> T {
        let tables = self.tables.read().await;
        f(&tables)
    }

    async fn write<T>(&self, f: impl FnOnce(&mut Tables) -> Result<T>) -> Result<T> {
        let mut live = self.tables.write().await;
        let mut draft = live.clone();
        let value = f(&mut draft)?;
        *live = draft;
        Ok(value)
    }
}
