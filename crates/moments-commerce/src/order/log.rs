//! Append-only order history.

use crate::ids::OrderId;
use crate::order::Order;

/// Placed orders, newest first.
///
/// Orders are never updated or removed once added.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderLog {
    orders: Vec<Order>,
}

impl OrderLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rehydrate from a persisted newest-first list.
    pub fn from_orders(orders: Vec<Order>) -> Self {
        Self { orders }
    }

    /// Record a newly placed order at the front of the log.
    pub fn add(&mut self, order: Order) {
        tracing::debug!(order_id = %order.id, total = %order.total, "order appended");
        self.orders.insert(0, order);
    }

    /// Orders newest first. Clone the iterator to walk the log again.
    pub fn list(&self) -> impl Iterator<Item = &Order> + Clone + ExactSizeIterator {
        self.orders.iter()
    }

    /// Orders newest first, as a slice for serialization.
    pub fn as_slice(&self) -> &[Order] {
        &self.orders
    }

    /// Look up an order by id.
    pub fn get(&self, id: &OrderId) -> Option<&Order> {
        self.orders.iter().find(|o| &o.id == id)
    }

    /// The most recently placed order.
    pub fn latest(&self) -> Option<&Order> {
        self.orders.first()
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}
