//! Order types.

use crate::cart::CartLineItem;
use crate::error::CommerceError;
use crate::ids::{AuthorizationId, OrderId, TrackingNumber};
use crate::money::{Currency, Money};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Order status.
///
/// Orders are created `Pending`; the later states exist for display on
/// the tracking page but nothing in the storefront advances them yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Order placed, awaiting processing.
    #[default]
    Pending,
    /// Order being prepared.
    Processing,
    /// Order handed to the carrier.
    Shipped,
    /// Order delivered.
    Delivered,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Processing => "Processing",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Delivered => "Delivered",
        }
    }

    /// Check if order is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered)
    }
}

/// A placed order.
///
/// `items` is a deep copy of the cart taken at checkout; nothing else
/// holds a reference to it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Unique order identifier.
    pub id: OrderId,
    /// Items as they were in the cart when the order was placed.
    pub items: Vec<CartLineItem>,
    /// Amount charged.
    pub total: Money,
    /// Order status.
    pub status: OrderStatus,
    /// When the order was placed.
    pub placed_at: DateTime<Utc>,
    /// Carrier tracking reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracking_number: Option<TrackingNumber>,
    /// Payment authorization reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorization: Option<AuthorizationId>,
}

impl Order {
    /// Create a pending order from a cart snapshot.
    ///
    /// The total is recomputed from the snapshot so it can never disagree
    /// with the items.
    pub fn from_snapshot(
        items: Vec<CartLineItem>,
        authorization: Option<AuthorizationId>,
    ) -> Result<Self, CommerceError> {
        if items.is_empty() {
            return Err(CommerceError::EmptyCart);
        }
        let total = snapshot_total(&items)?;
        Ok(Self {
            id: OrderId::generate(),
            items,
            total,
            status: OrderStatus::Pending,
            placed_at: Utc::now(),
            tracking_number: Some(TrackingNumber::generate()),
            authorization,
        })
    }

    /// Get total item count.
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }

    /// Placement time formatted for the tracking page, e.g. "Jun 10, 2024, 02:30 PM".
    pub fn placed_at_display(&self) -> String {
        self.placed_at.format("%b %-d, %Y, %I:%M %p").to_string()
    }
}

/// Sum a snapshot, rejecting mixed currencies and overflow.
fn snapshot_total(items: &[CartLineItem]) -> Result<Money, CommerceError> {
    let currency = items
        .first()
        .map(|i| i.unit_price.currency)
        .unwrap_or(Currency::USD);
    items.iter().try_fold(Money::zero(currency), |acc, item| {
        if item.unit_price.currency != currency {
            return Err(CommerceError::CurrencyMismatch {
                expected: currency.code().to_string(),
                got: item.unit_price.currency.code().to_string(),
            });
        }
        let line = item
            .unit_price
            .try_multiply(i64::from(item.quantity))
            .ok_or(CommerceError::Overflow)?;
        acc.try_add(&line).ok_or(CommerceError::Overflow)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Product;
    use chrono::TimeZone;

    fn item(id: u32, cents: i64, quantity: u32) -> CartLineItem {
        let product = Product::new(id, format!("Product {id}"), Money::usd(cents), "", "Kit");
        CartLineItem {
            quantity,
            ..CartLineItem::from_product(&product)
        }
    }

    #[test]
    fn test_order_from_snapshot() {
        let order = Order::from_snapshot(vec![item(1, 2999, 1), item(2, 2499, 2)], None).unwrap();
        assert_eq!(order.total, Money::usd(7997));
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.item_count(), 3);
        assert!(order.id.as_str().starts_with("ORDER-"));
        assert!(order
            .tracking_number
            .as_ref()
            .is_some_and(|t| t.as_str().starts_with("TRK")));
    }

    #[test]
    fn test_empty_snapshot_rejected() {
        assert_eq!(Order::from_snapshot(Vec::new(), None), Err(CommerceError::EmptyCart));
    }

    #[test]
    fn test_mixed_currency_snapshot_rejected() {
        let mut euro = item(2, 100, 1);
        euro.unit_price = Money::new(100, Currency::EUR);
        assert!(matches!(
            Order::from_snapshot(vec![item(1, 100, 1), euro], None),
            Err(CommerceError::CurrencyMismatch { .. })
        ));
    }

    #[test]
    fn test_status_strings() {
        assert_eq!(OrderStatus::Pending.as_str(), "pending");
        assert_eq!(OrderStatus::Shipped.display_name(), "Shipped");
        assert!(OrderStatus::Delivered.is_terminal());
        assert!(!OrderStatus::Processing.is_terminal());
        assert_eq!(serde_json::to_string(&OrderStatus::Delivered).unwrap(), r#""delivered""#);
    }

    #[test]
    fn test_placed_at_display() {
        let mut order = Order::from_snapshot(vec![item(1, 100, 1)], None).unwrap();
        order.placed_at = Utc.with_ymd_and_hms(2024, 6, 10, 14, 30, 0).unwrap();
        assert_eq!(order.placed_at_display(), "Jun 10, 2024, 02:30 PM");
    }
}
