use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Declares a typed wrapper around a database serial identifier.
///
/// Each entity gets its own type so a `BatchId` can never be passed where
/// a `TankId` is expected.
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(i32);

        impl $name {
            /// Wraps a raw database identifier.
            pub const fn new(value: i32) -> Self {
                Self(value)
            }

            /// Returns the raw database identifier.
            pub const fn as_i32(&self) -> i32 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i32> for $name {
            fn from(value: i32) -> Self {
                Self(value)
            }
        }

        impl From<$name> for i32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id!(
    /// Identifier of a farmed species.
    SpeciesId
);
define_id!(
    /// Identifier of a farm site.
    FarmId
);
define_id!(
    /// Identifier of a tank within a farm.
    TankId
);
define_id!(
    /// Identifier of a production batch.
    BatchId
);
define_id!(
    /// Identifier of a customer.
    CustomerId
);
define_id!(
    /// Identifier of a customer order.
    OrderId
);
define_id!(OrderItemId);
define_id!(
    /// Identifier of a shipment.
    ShipmentId
);
define_id!(ShipmentDetailId);
define_id!(WaterLogId);
define_id!(FeedingLogId);
define_id!(HealthLogId);
define_id!(
    /// Identifier of an operational alert.
    AlertId
);

/// Rounds a monetary or percentage value to two decimal places.
///
/// Uses half-away-from-zero rounding, the same rule as PostgreSQL's
/// `ROUND(numeric, 2)`, so both store backends agree.
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Mortality as a percentage of the initial stock, rounded to two places.
///
/// An empty initial stock has a mortality rate of zero.
pub fn mortality_rate(initial: i64, current: i64) -> Decimal {
    if initial <= 0 {
        return Decimal::ZERO;
    }
    round2(Decimal::from(initial - current) / Decimal::from(initial) * Decimal::ONE_HUNDRED)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_serialize_as_plain_integers() {
        let id = BatchId::new(5);
        assert_eq!(serde_json::to_string(&id).unwrap(), "5");

        let parsed: OrderId = serde_json::from_str("42").unwrap();
        assert_eq!(parsed.as_i32(), 42);
    }

    #[test]
    fn ids_of_different_entities_compare_by_value() {
        let a = TankId::from(3);
        let b = TankId::new(3);
        assert_eq!(a, b);
        assert_eq!(i32::from(a), 3);
        assert_eq!(a.to_string(), "3");
    }

    #[test]
    fn round2_rounds_midpoints_away_from_zero() {
        assert_eq!(round2(Decimal::new(1005, 3)), Decimal::new(101, 2));
        assert_eq!(round2(Decimal::new(1015, 3)), Decimal::new(102, 2));
        assert_eq!(round2(Decimal::new(-1005, 3)), Decimal::new(-101, 2));
    }

    #[test]
    fn mortality_rate_of_partial_loss() {
        assert_eq!(mortality_rate(1000, 750), Decimal::new(2500, 2));
        assert_eq!(mortality_rate(3, 2), Decimal::new(3333, 2));
    }

    #[test]
    fn mortality_rate_of_empty_stock_is_zero() {
        assert_eq!(mortality_rate(0, 0), Decimal::ZERO);
    }
}
