use std::fmt;

use sqlx::error::ErrorKind;
use thiserror::Error;

/// Foreign key that pins a batch to the shipments cut from it.
pub const SHIPMENT_DETAIL_BATCH_FK: &str = "shipment_detail_batch_id_fkey";

/// Which integrity rule a write broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    ForeignKey,
    Unique,
    Check,
    NotNull,
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ConstraintKind::ForeignKey => "foreign key",
            ConstraintKind::Unique => "unique",
            ConstraintKind::Check => "check",
            ConstraintKind::NotNull => "not-null",
        })
    }
}

/// Errors that can occur when interacting with the store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The addressed row does not exist.
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i32 },

    /// A write was rejected by an integrity constraint.
    #[error("{kind} constraint violated: {message}")]
    ConstraintViolation {
        kind: ConstraintKind,
        constraint: Option<String>,
        message: String,
    },

    /// A multi-row creation was rolled back.
    #[error("failed to create {aggregate}: {source}")]
    TransactionAborted {
        aggregate: &'static str,
        #[source]
        source: Box<StoreError>,
    },

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl StoreError {
    /// Builds a foreign-key violation for the named constraint.
    pub fn foreign_key(constraint: &str, message: impl Into<String>) -> Self {
        StoreError::ConstraintViolation {
            kind: ConstraintKind::ForeignKey,
            constraint: Some(constraint.to_string()),
            message: message.into(),
        }
    }

    /// Builds a check-constraint violation for the named constraint.
    pub fn check(constraint: &str, message: impl Into<String>) -> Self {
        StoreError::ConstraintViolation {
            kind: ConstraintKind::Check,
            constraint: Some(constraint.to_string()),
            message: message.into(),
        }
    }

    /// Returns the violated constraint's name, if this is a constraint violation.
    pub fn constraint(&self) -> Option<&str> {
        match self {
            StoreError::ConstraintViolation { constraint, .. } => constraint.as_deref(),
            _ => None,
        }
    }

    pub(crate) fn aborted(aggregate: &'static str, source: StoreError) -> Self {
        StoreError::TransactionAborted {
            aggregate,
            source: Box::new(source),
        }
    }

    pub(crate) fn decode(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        StoreError::Database(sqlx::Error::Decode(Box::new(source)))
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            let kind = match db_err.kind() {
                ErrorKind::ForeignKeyViolation => Some(ConstraintKind::ForeignKey),
                ErrorKind::UniqueViolation => Some(ConstraintKind::Unique),
                ErrorKind::CheckViolation => Some(ConstraintKind::Check),
                ErrorKind::NotNullViolation => Some(ConstraintKind::NotNull),
                _ => None,
            };
            if let Some(kind) = kind {
                return StoreError::ConstraintViolation {
                    kind,
                    constraint: db_err.constraint().map(str::to_string),
                    message: db_err.message().to_string(),
                };
            }
        }
        StoreError::Database(err)
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn foreign_key_violation_carries_constraint_name() {
        let err = StoreError::foreign_key(SHIPMENT_DETAIL_BATCH_FK, "batch is still referenced");
        assert_eq!(err.constraint(), Some(SHIPMENT_DETAIL_BATCH_FK));
        assert!(matches!(
            err,
            StoreError::ConstraintViolation {
                kind: ConstraintKind::ForeignKey,
                ..
            }
        ));
    }

    #[test]
    fn non_database_sqlx_errors_stay_database_errors() {
        let err = StoreError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, StoreError::Database(sqlx::Error::RowNotFound)));
        assert_eq!(err.constraint(), None);
    }

    #[test]
    fn aborted_transaction_keeps_its_cause() {
        let cause = StoreError::foreign_key("order_item_species_id_fkey", "no such species");
        let err = StoreError::aborted("order", cause);
        let source = std::error::Error::source(&err).map(ToString::to_string);
        assert_eq!(
            source.as_deref(),
            Some("foreign key constraint violated: no such species")
        );
        assert!(err.to_string().starts_with("failed to create order"));
    }
}
