//! Status vocabularies persisted as text columns.
//!
//! Each enum mirrors the `CHECK` constraint of its column, so parsing a
//! status string is the same membership test the database applies.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned when a string is not a member of a status vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseStatusError {
    pub kind: &'static str,
    pub value: String,
}

impl std::fmt::Display for ParseStatusError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid {} '{}'", self.kind, self.value)
    }
}

impl std::error::Error for ParseStatusError {}

macro_rules! text_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $($variant:ident => $text:literal $(| $alias:literal)*),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $text $(, alias = $alias)*)]
                $variant,
            )+
        }

        impl $name {
            /// Every member of the vocabulary, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Returns the persisted text form.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl FromStr for $name {
            type Err = ParseStatusError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text $(| $alias)* => Ok($name::$variant),)+
                    other => Err(ParseStatusError {
                        kind: $kind,
                        value: other.to_string(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

text_enum!(
    /// Lifecycle status of a customer order.
    OrderStatus, "order status" {
        Pending => "pending",
        Confirmed => "confirmed",
        Shipped => "shipped",
        Delivered => "delivered",
        Cancelled => "cancelled",
    }
);

text_enum!(
    /// Lifecycle status of a shipment.
    ShipmentStatus, "shipment status" {
        Preparing => "preparing",
        InTransit => "in_transit" | "in-transit",
        Delivered => "delivered",
        Cancelled => "cancelled",
    }
);

text_enum!(
    /// Handling status of an alert.
    AlertStatus, "alert status" {
        Active => "active",
        Acknowledged => "acknowledged",
        Resolved => "resolved",
    }
);

text_enum!(
    /// How urgent an alert is.
    AlertSeverity, "alert severity" {
        Low => "low",
        Medium => "medium",
        High => "high",
        Critical => "critical",
    }
);

text_enum!(
    /// Classification of a water-quality reading.
    WaterQualityStatus, "water quality status" {
        Normal => "normal",
        Warning => "warning",
        Critical => "critical",
    }
);

impl AlertSeverity {
    /// Sort rank, most severe first.
    pub fn rank(&self) -> u8 {
        match self {
            AlertSeverity::Critical => 0,
            AlertSeverity::High => 1,
            AlertSeverity::Medium => 2,
            AlertSeverity::Low => 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_status_parses_every_member() {
        for status in OrderStatus::ALL {
            assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), *status);
        }
    }

    #[test]
    fn unknown_status_is_rejected() {
        let err = "lost".parse::<OrderStatus>().unwrap_err();
        assert_eq!(err.kind, "order status");
        assert_eq!(err.to_string(), "invalid order status 'lost'");
    }

    #[test]
    fn shipment_status_accepts_hyphenated_alias() {
        assert_eq!(
            "in-transit".parse::<ShipmentStatus>().unwrap(),
            ShipmentStatus::InTransit
        );
        let json: ShipmentStatus = serde_json::from_str("\"in-transit\"").unwrap();
        assert_eq!(json, ShipmentStatus::InTransit);
        assert_eq!(
            serde_json::to_string(&ShipmentStatus::InTransit).unwrap(),
            "\"in_transit\""
        );
    }

    #[test]
    fn severity_rank_orders_critical_first() {
        let mut severities = AlertSeverity::ALL.to_vec();
        severities.sort_by_key(AlertSeverity::rank);
        assert_eq!(severities.first(), Some(&AlertSeverity::Critical));
        assert_eq!(severities.last(), Some(&AlertSeverity::Low));
    }
}
