//! Predicate lists for filtered reads.
//!
//! A [`ListQuery`] is a conjunction of [`Predicate`]s plus an optional row
//! cap. The PostgreSQL backend renders it into one parameterised statement
//! over a derived table; the in-memory backend evaluates it against records
//! through [`Fields`].

use std::cmp::Ordering;
use std::fmt::Write;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

/// A typed value compared against a column.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i32),
    Text(String),
    Date(NaiveDate),
    Timestamp(DateTime<Utc>),
    Decimal(Decimal),
}

impl Value {
    fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a.partial_cmp(b),
            (Value::Text(a), Value::Text(b)) => a.partial_cmp(b),
            (Value::Date(a), Value::Date(b)) => a.partial_cmp(b),
            (Value::Timestamp(a), Value::Timestamp(b)) => a.partial_cmp(b),
            (Value::Decimal(a), Value::Decimal(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<NaiveDate> for Value {
    fn from(value: NaiveDate) -> Self {
        Value::Date(value)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Value::Timestamp(value)
    }
}

impl From<Decimal> for Value {
    fn from(value: Decimal) -> Self {
        Value::Decimal(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Eq,
    Gte,
    Lt,
    Lte,
}

impl Comparison {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Comparison::Eq => "=",
            Comparison::Gte => ">=",
            Comparison::Lt => "<",
            Comparison::Lte => "<=",
        }
    }

    fn accepts(&self, ordering: Ordering) -> bool {
        match self {
            Comparison::Eq => ordering == Ordering::Equal,
            Comparison::Gte => ordering != Ordering::Less,
            Comparison::Lt => ordering == Ordering::Less,
            Comparison::Lte => ordering != Ordering::Greater,
        }
    }
}

/// One `field <comparison> value` condition.
///
/// `field` is always a compile-time column name, never caller input.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub field: &'static str,
    pub comparison: Comparison,
    pub value: Value,
}

impl Predicate {
    pub fn new(field: &'static str, comparison: Comparison, value: impl Into<Value>) -> Self {
        Self {
            field,
            comparison,
            value: value.into(),
        }
    }

    pub fn eq(field: &'static str, value: impl Into<Value>) -> Self {
        Self::new(field, Comparison::Eq, value)
    }

    pub fn gte(field: &'static str, value: impl Into<Value>) -> Self {
        Self::new(field, Comparison::Gte, value)
    }

    pub fn lt(field: &'static str, value: impl Into<Value>) -> Self {
        Self::new(field, Comparison::Lt, value)
    }

    pub fn lte(field: &'static str, value: impl Into<Value>) -> Self {
        Self::new(field, Comparison::Lte, value)
    }

    /// Evaluates the predicate against a record. A missing field never matches,
    /// the same as a NULL column in SQL.
    pub fn matches<T: Fields + ?Sized>(&self, record: &T) -> bool {
        record
            .field(self.field)
            .and_then(|actual| actual.compare(&self.value))
            .is_some_and(|ordering| self.comparison.accepts(ordering))
    }
}

/// Exposes a record's filterable columns by name.
pub trait Fields {
    fn field(&self, name: &str) -> Option<Value>;
}

/// A conjunction of predicates with an optional row cap.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListQuery {
    pub predicates: Vec<Predicate>,
    pub limit: Option<i64>,
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a predicate.
    pub fn and(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    /// Adds a predicate when the optional filter value is present.
    pub fn and_if<V: Into<Value>>(
        self,
        field: &'static str,
        comparison: Comparison,
        value: Option<V>,
    ) -> Self {
        match value {
            Some(value) => self.and(Predicate::new(field, comparison, value)),
            None => self,
        }
    }

    /// Caps the number of rows returned.
    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// True when every predicate accepts the record.
    pub fn matches<T: Fields + ?Sized>(&self, record: &T) -> bool {
        self.predicates.iter().all(|p| p.matches(record))
    }

    /// Renders the query over `base` as a derived table.
    ///
    /// Placeholders are numbered in predicate order, followed by the limit,
    /// which is the order the values must be bound in.
    pub fn render(&self, base: &str, order_by: &str) -> String {
        let mut sql = format!("SELECT * FROM ({base}) AS q");
        for (index, predicate) in self.predicates.iter().enumerate() {
            let keyword = if index == 0 { "WHERE" } else { "AND" };
            let _ = write!(
                sql,
                " {keyword} {} {} ${}",
                predicate.field,
                predicate.comparison.as_sql(),
                index + 1
            );
        }
        let _ = write!(sql, " ORDER BY {order_by}");
        if self.limit.is_some() {
            let _ = write!(sql, " LIMIT ${}", self.predicates.len() + 1);
        }
        sql
    }

    /// Applies the query to records already sorted in list order.
    pub fn apply<T: Fields>(&self, records: impl IntoIterator<Item = T>) -> Vec<T> {
        let filtered = records.into_iter().filter(|r| self.matches(r));
        match self.limit {
            Some(limit) => filtered.take(usize::try_from(limit).unwrap_or(0)).collect(),
            None => filtered.collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Reading {
        tank_id: i32,
        status: Option<&'static str>,
        day: NaiveDate,
    }

    impl Fields for Reading {
        fn field(&self, name: &str) -> Option<Value> {
            match name {
                "tank_id" => Some(Value::Int(self.tank_id)),
                "status" => self.status.map(Value::from),
                "day" => Some(Value::Date(self.day)),
                _ => None,
            }
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[test]
    fn empty_query_renders_without_where_clause() {
        let sql = ListQuery::new().render("SELECT * FROM species", "common_name");
        assert_eq!(
            sql,
            "SELECT * FROM (SELECT * FROM species) AS q ORDER BY common_name"
        );
    }

    #[test]
    fn predicates_render_numbered_placeholders_then_limit() {
        let query = ListQuery::new()
            .and(Predicate::eq("tank_id", 3))
            .and(Predicate::gte("day", day(1)))
            .and(Predicate::lte("day", day(9)))
            .limit(100);

        let sql = query.render("SELECT * FROM water_log", "day DESC");
        assert_eq!(
            sql,
            "SELECT * FROM (SELECT * FROM water_log) AS q WHERE tank_id = $1 \
             AND day >= $2 AND day <= $3 ORDER BY day DESC LIMIT $4"
        );
    }

    #[test]
    fn and_if_skips_absent_values() {
        let query = ListQuery::new()
            .and_if("tank_id", Comparison::Eq, None::<i32>)
            .and_if("status", Comparison::Eq, Some("warning"));
        assert_eq!(query.predicates, vec![Predicate::eq("status", "warning")]);
    }

    #[test]
    fn matching_is_the_conjunction_of_predicates() {
        let reading = Reading {
            tank_id: 3,
            status: Some("warning"),
            day: day(5),
        };

        assert!(ListQuery::new().matches(&reading));
        assert!(
            ListQuery::new()
                .and(Predicate::eq("tank_id", 3))
                .and(Predicate::lte("day", day(5)))
                .matches(&reading)
        );
        assert!(
            !ListQuery::new()
                .and(Predicate::eq("tank_id", 3))
                .and(Predicate::lt("day", day(5)))
                .matches(&reading)
        );
    }

    #[test]
    fn missing_field_or_mismatched_type_never_matches() {
        let reading = Reading {
            tank_id: 3,
            status: None,
            day: day(5),
        };
        assert!(!Predicate::eq("status", "normal").matches(&reading));
        assert!(!Predicate::eq("tank_id", "3").matches(&reading));
        assert!(!Predicate::eq("unknown", 1).matches(&reading));
    }

    #[test]
    fn apply_filters_then_caps() {
        let readings = (1..=5).map(|d| Reading {
            tank_id: if d % 2 == 0 { 2 } else { 1 },
            status: Some("normal"),
            day: day(d),
        });

        let kept = ListQuery::new()
            .and(Predicate::eq("tank_id", 1))
            .limit(2)
            .apply(readings);
        let days: Vec<_> = kept.iter().map(|r| r.day).collect();
        assert_eq!(days, vec![day(1), day(3)]);
    }
}
