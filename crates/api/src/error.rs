//! API error types with HTTP response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domain::DomainError;
use store::{SHIPMENT_DETAIL_BATCH_FK, StoreError};
use thiserror::Error;

/// Message for deleting a batch that shipments were cut from.
pub const BATCH_IN_SHIPMENT_HISTORY: &str =
    "Cannot delete batch: it is referenced by shipment history (traceability)";

/// API-level error type that maps to HTTP responses.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found.
    #[error("{0}")]
    NotFound(String),
    /// Error raised by a domain service.
    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl ApiError {
    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }
}

/// Source chain of a server error, carried on the response so that
/// [`expose_error_detail`] can add it to the body outside production.
#[derive(Debug, Clone)]
pub struct ErrorDetail {
    pub message: String,
    pub chain: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            ApiError::Domain(err) => domain_error_to_response(err),
        };

        let body = serde_json::json!({ "error": message });
        let mut response = (status, Json(body)).into_response();

        if status.is_server_error() {
            let chain = source_chain(&self);
            tracing::error!(error = %chain, "internal server error");
            metrics::counter!("http_server_errors_total").increment(1);
            response
                .extensions_mut()
                .insert(ErrorDetail { message, chain });
        }
        response
    }
}

fn domain_error_to_response(err: &DomainError) -> (StatusCode, String) {
    match err {
        DomainError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
        DomainError::NotFound { .. } => (StatusCode::NOT_FOUND, err.to_string()),
        DomainError::Store(store_err) => store_error_to_response(store_err),
    }
}

fn store_error_to_response(err: &StoreError) -> (StatusCode, String) {
    match err {
        StoreError::NotFound { entity, .. } => {
            (StatusCode::NOT_FOUND, format!("{entity} not found"))
        }
        StoreError::ConstraintViolation {
            constraint,
            message,
            ..
        } => match constraint.as_deref() {
            Some(SHIPMENT_DETAIL_BATCH_FK) => {
                (StatusCode::BAD_REQUEST, BATCH_IN_SHIPMENT_HISTORY.to_string())
            }
            Some(name) => (
                StatusCode::BAD_REQUEST,
                format!("Constraint {name} violated: {message}"),
            ),
            None => (StatusCode::BAD_REQUEST, message.clone()),
        },
        StoreError::TransactionAborted { aggregate, .. } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to create {aggregate}"),
        ),
        StoreError::Database(_) | StoreError::Migration(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error".to_string(),
        ),
    }
}

fn source_chain(err: &dyn std::error::Error) -> String {
    let mut chain = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        chain.push_str(": ");
        chain.push_str(&cause.to_string());
        source = cause.source();
    }
    chain
}

/// Response mapper that appends the error source chain to 500 bodies.
pub async fn expose_error_detail(mut response: Response) -> Response {
    match response.extensions_mut().remove::<ErrorDetail>() {
        Some(detail) => {
            let status = response.status();
            let body = serde_json::json!({ "error": detail.message, "detail": detail.chain });
            (status, Json(body)).into_response()
        }
        None => response,
    }
}
