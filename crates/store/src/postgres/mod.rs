//! PostgreSQL-backed store.
//!
//! The schema, the write rules (triggers) and the analytics views live in
//! the workspace `migrations/` directory. This backend maps rows to records
//! and runs the two creation transactions.

mod analytics;
mod catalog;
mod production;
mod rows;
mod sales;

use sqlx::{
    PgPool, Postgres,
    postgres::{PgArguments, PgRow},
    query::Query,
};

use crate::{ListQuery, Result, Value};

/// PostgreSQL-backed store implementation.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a store over an already configured pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the embedded database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Runs a filtered list query over `base` and maps every row.
    async fn fetch_list<T>(
        &self,
        base: &str,
        order_by: &str,
        query: &ListQuery,
        map: fn(&PgRow) -> Result<T>,
    ) -> Result<Vec<T>> {
        let sql = query.render(base, order_by);
        let rows = bind_values(sqlx::query(&sql), query)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(map).collect()
    }

    async fn fetch_all<T>(&self, sql: &str, map: fn(&PgRow) -> Result<T>) -> Result<Vec<T>> {
        let rows = sqlx::query(sql).fetch_all(&self.pool).await?;
        rows.iter().map(map).collect()
    }

    async fn fetch_by_id<T>(
        &self,
        sql: &str,
        id: i32,
        map: fn(&PgRow) -> Result<T>,
    ) -> Result<Option<T>> {
        let row = sqlx::query(sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(map).transpose()
    }

    async fn delete_by_id(&self, sql: &str, id: i32) -> Result<bool> {
        let result = sqlx::query(sql).bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }
}

/// Binds predicate values in placeholder order, then the row cap.
fn bind_values<'q>(
    mut sql: Query<'q, Postgres, PgArguments>,
    query: &ListQuery,
) -> Query<'q, Postgres, PgArguments> {
    for predicate in &query.predicates {
        sql = match &predicate.value {
            Value::Int(v) => sql.bind(*v),
            Value::Text(v) => sql.bind(v.clone()),
            Value::Date(v) => sql.bind(*v),
            Value::Timestamp(v) => sql.bind(*v),
            Value::Decimal(v) => sql.bind(*v),
        };
    }
    if let Some(limit) = query.limit {
        sql = sql.bind(limit);
    }
    sql
}
