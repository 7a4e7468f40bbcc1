//! Status and method enumerations for orders.
//!
//! All of these are closed sum types with snake_case string codings used
//! both in serialized payloads and in database columns. The order status
//! lifecycle is an explicit, exhaustively-matched transition table rather
//! than ad hoc string comparisons.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when parsing a stored enum coding fails.
#[derive(Debug, Error)]
#[error("invalid {kind}: {value}")]
pub struct ParseStatusError {
    /// Which enumeration was being parsed.
    pub kind: &'static str,
    /// The offending value.
    pub value: String,
}

/// Order lifecycle status.
///
/// ```text
/// pending -> processing -> paid -> shipped -> delivered
///    \            |          |
///     `-----------+----------+--> cancelled
/// ```
///
/// `delivered` and `cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    Paid,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Whether an order in this status may still be cancelled.
    ///
    /// Shipped and delivered orders are not cancellable; a cancelled order
    /// is not re-cancellable.
    #[must_use]
    pub const fn is_cancellable(&self) -> bool {
        matches!(self, Self::Pending | Self::Processing | Self::Paid)
    }

    /// Whether this status is terminal.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// The explicit transition table for the order lifecycle.
    #[must_use]
    pub const fn can_transition_to(&self, next: Self) -> bool {
        match self {
            Self::Pending => matches!(next, Self::Processing | Self::Paid | Self::Cancelled),
            Self::Processing => matches!(next, Self::Paid | Self::Cancelled),
            Self::Paid => matches!(next, Self::Shipped | Self::Cancelled),
            Self::Shipped => matches!(next, Self::Delivered),
            Self::Delivered | Self::Cancelled => false,
        }
    }
}

/// Payment status, tracked separately from the order lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Failed,
}

/// How the order is delivered to the customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryMethod {
    Courier,
    Pickup,
    Post,
}

/// How the order is paid for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
    Online,
}

macro_rules! string_coding {
    ($ty:ident, $kind:literal, { $($variant:ident => $code:literal),+ $(,)? }) => {
        impl $ty {
            /// The stored string coding for this value.
            #[must_use]
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $code),+
                }
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $ty {
            type Err = ParseStatusError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($code => Ok(Self::$variant),)+
                    _ => Err(ParseStatusError {
                        kind: $kind,
                        value: s.to_owned(),
                    }),
                }
            }
        }
    };
}

string_coding!(OrderStatus, "order status", {
    Pending => "pending",
    Processing => "processing",
    Paid => "paid",
    Shipped => "shipped",
    Delivered => "delivered",
    Cancelled => "cancelled",
});

string_coding!(PaymentStatus, "payment status", {
    Pending => "pending",
    Paid => "paid",
    Failed => "failed",
});

string_coding!(DeliveryMethod, "delivery method", {
    Courier => "courier",
    Pickup => "pickup",
    Post => "post",
});

string_coding!(PaymentMethod, "payment method", {
    Cash => "cash",
    Card => "card",
    Online => "online",
});

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_cancellable_statuses() {
        assert!(OrderStatus::Pending.is_cancellable());
        assert!(OrderStatus::Processing.is_cancellable());
        assert!(OrderStatus::Paid.is_cancellable());
        assert!(!OrderStatus::Shipped.is_cancellable());
        assert!(!OrderStatus::Delivered.is_cancellable());
        assert!(!OrderStatus::Cancelled.is_cancellable());
    }

    #[test]
    fn test_transition_table() {
        use OrderStatus::*;

        let valid = [
            (Pending, Processing),
            (Pending, Paid),
            (Pending, Cancelled),
            (Processing, Paid),
            (Processing, Cancelled),
            (Paid, Shipped),
            (Paid, Cancelled),
            (Shipped, Delivered),
        ];
        for (from, to) in valid {
            assert!(from.can_transition_to(to), "{from} -> {to} should be legal");
        }

        let invalid = [
            (Shipped, Cancelled),
            (Delivered, Cancelled),
            (Cancelled, Cancelled),
            (Cancelled, Paid),
            (Delivered, Pending),
            (Paid, Pending),
            (Shipped, Paid),
        ];
        for (from, to) in invalid {
            assert!(
                !from.can_transition_to(to),
                "{from} -> {to} should be illegal"
            );
        }
    }

    #[test]
    fn test_string_codings_roundtrip() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Processing,
            OrderStatus::Paid,
            OrderStatus::Shipped,
            OrderStatus::Delivered,
            OrderStatus::Cancelled,
        ] {
            assert_eq!(OrderStatus::from_str(status.as_str()).unwrap(), status);
        }

        assert_eq!(
            DeliveryMethod::from_str("courier").unwrap(),
            DeliveryMethod::Courier
        );
        assert_eq!(PaymentMethod::from_str("online").unwrap(), PaymentMethod::Online);
        assert!(OrderStatus::from_str("shipped_back").is_err());
    }
}
