//! Request checks applied before the store is touched.

use std::str::FromStr;

use common::ParseStatusError;
use rust_decimal::Decimal;

use crate::error::{DomainError, Result};

/// Largest money or measurement value accepted on input (10^12).
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(3_567_587_328, 232, 0, false, 0);

/// Rejects an empty or whitespace-only required field.
pub fn required(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(DomainError::validation(format!("{field} is required")));
    }
    Ok(())
}

pub fn non_negative(field: &str, value: i32) -> Result<()> {
    if value < 0 {
        return Err(DomainError::validation(format!(
            "{field} must not be negative"
        )));
    }
    Ok(())
}

pub fn positive(field: &str, value: i32) -> Result<()> {
    if value <= 0 {
        return Err(DomainError::validation(format!(
            "{field} must be greater than zero"
        )));
    }
    Ok(())
}

/// Rejects a negative amount or one above [`MAX_AMOUNT`]. An absent amount passes.
pub fn non_negative_amount(field: &str, value: Option<Decimal>) -> Result<()> {
    match value {
        Some(v) if v < Decimal::ZERO => Err(DomainError::validation(format!(
            "{field} must not be negative"
        ))),
        Some(v) if v > MAX_AMOUNT => Err(DomainError::validation(format!(
            "{field} must not exceed {MAX_AMOUNT}"
        ))),
        _ => Ok(()),
    }
}

/// Parses a status string against its vocabulary.
pub fn status<T>(value: &str) -> Result<T>
where
    T: FromStr<Err = ParseStatusError>,
{
    value
        .parse()
        .map_err(|e: ParseStatusError| DomainError::validation(capitalize(&e.to_string())))
}

fn capitalize(message: &str) -> String {
    let mut chars = message.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use common::{OrderStatus, ShipmentStatus};

    use super::*;

    #[test]
    fn blank_required_fields_are_rejected() {
        assert!(required("common_name", "Tilapia").is_ok());
        let err = required("common_name", "   ").unwrap_err();
        assert_eq!(err.to_string(), "common_name is required");
    }

    #[test]
    fn zero_passes_as_non_negative_amount() {
        assert!(non_negative_amount("cost", Some(Decimal::ZERO)).is_ok());
        assert!(non_negative_amount("cost", None).is_ok());
        assert!(non_negative_amount("cost", Some(Decimal::new(-1, 2))).is_err());
    }

    #[test]
    fn oversized_amounts_are_rejected() {
        assert!(non_negative_amount("unit_price", Some(MAX_AMOUNT)).is_ok());
        let err = non_negative_amount("unit_price", Some(Decimal::MAX)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "unit_price must not exceed 1000000000000"
        );
    }

    #[test]
    fn quantities_are_checked() {
        assert!(positive("quantity_shipped", 0).is_err());
        assert!(positive("quantity_shipped", 1).is_ok());
        assert!(non_negative("initial_quantity", 0).is_ok());
        assert!(non_negative("initial_quantity", -5).is_err());
    }

    #[test]
    fn unknown_status_is_a_validation_error() {
        let parsed: OrderStatus = status("confirmed").unwrap();
        assert_eq!(parsed, OrderStatus::Confirmed);

        let err = status::<ShipmentStatus>("teleported").unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(err.to_string(), "Invalid shipment status 'teleported'");
    }
}
