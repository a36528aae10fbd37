//! Cart ledger and line item types.

use crate::catalog::Product;
use crate::error::CommerceError;
use crate::ids::ProductId;
use crate::money::{Currency, Money};
use serde::{Deserialize, Serialize};

/// Maximum quantity allowed per line item.
pub const MAX_QUANTITY_PER_ITEM: u32 = 9999;

/// One product entry in the cart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CartLineItem {
    /// Product identifier; unique within a ledger.
    pub id: ProductId,
    /// Product name (denormalized for display).
    pub name: String,
    /// Price per unit at the time the item was added.
    pub unit_price: Money,
    /// Struck-through price, if the product was marked down.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_price: Option<Money>,
    /// Image URL.
    pub image: String,
    /// Category label.
    pub category: String,
    /// Quantity, always at least 1.
    pub quantity: u32,
}

impl CartLineItem {
    /// Create a line item for `product` with quantity 1.
    pub fn from_product(product: &Product) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            unit_price: product.price,
            original_price: product.original_price,
            image: product.image.clone(),
            category: product.category.clone(),
            quantity: 1,
        }
    }

    /// Unit price times quantity.
    pub fn line_total(&self) -> Money {
        // quantity <= MAX_QUANTITY_PER_ITEM keeps this far from i64 overflow
        Money::new(
            self.unit_price.amount_cents.saturating_mul(i64::from(self.quantity)),
            self.unit_price.currency,
        )
    }

    /// Markdown saved on this line, zero when not on sale.
    pub fn savings(&self) -> Money {
        let per_unit = self
            .original_price
            .and_then(|orig| orig.try_subtract(&self.unit_price))
            .filter(Money::is_positive)
            .unwrap_or(Money::zero(self.unit_price.currency));
        Money::new(
            per_unit.amount_cents.saturating_mul(i64::from(self.quantity)),
            per_unit.currency,
        )
    }
}

/// The shopping cart: line items keyed by product id.
///
/// Totals are derived on every call, never cached. Every effective
/// mutation bumps [`CartLedger::revision`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CartLedger {
    items: Vec<CartLineItem>,
    revision: u64,
}

impl CartLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rehydrate a ledger from persisted line items.
    ///
    /// Duplicate ids are merged and zero quantities dropped so a hand-edited
    /// or stale record cannot break the one-line-per-product invariant.
    pub fn from_items(items: Vec<CartLineItem>) -> Self {
        let mut ledger = Self::new();
        for item in items {
            if item.quantity == 0 {
                continue;
            }
            match ledger.items.iter_mut().find(|i| i.id == item.id) {
                Some(existing) => {
                    existing.quantity = existing
                        .quantity
                        .saturating_add(item.quantity)
                        .min(MAX_QUANTITY_PER_ITEM);
                }
                None => {
                    let quantity = item.quantity.min(MAX_QUANTITY_PER_ITEM);
                    ledger.items.push(CartLineItem { quantity, ..item });
                }
            }
        }
        ledger
    }

    /// Add one unit of `product`.
    ///
    /// Increments the existing line when the product is already in the
    /// cart. Fails only when the product is priced in a different
    /// currency than the items already in the cart.
    pub fn add(&mut self, product: &Product) -> Result<&CartLineItem, CommerceError> {
        if let Some(currency) = self.currency() {
            if currency != product.price.currency {
                return Err(CommerceError::CurrencyMismatch {
                    expected: currency.code().to_string(),
                    got: product.price.currency.code().to_string(),
                });
            }
        }

        match self.items.iter().position(|i| i.id == product.id) {
            Some(idx) => {
                let item = &mut self.items[idx];
                let quantity = item.quantity.saturating_add(1).min(MAX_QUANTITY_PER_ITEM);
                // A line already at the cap is left as is.
                if quantity != item.quantity {
                    item.quantity = quantity;
                    self.revision += 1;
                }
                Ok(&self.items[idx])
            }
            None => {
                self.items.push(CartLineItem::from_product(product));
                self.revision += 1;
                Ok(&self.items[self.items.len() - 1])
            }
        }
    }

    /// Remove a line item. Returns whether anything was removed.
    pub fn remove(&mut self, id: ProductId) -> bool {
        let len_before = self.items.len();
        self.items.retain(|i| i.id != id);
        let removed = self.items.len() < len_before;
        if removed {
            self.revision += 1;
        }
        removed
    }

    /// Overwrite a line's quantity.
    ///
    /// `quantity <= 0` removes the line; values above
    /// [`MAX_QUANTITY_PER_ITEM`] are clamped. Unknown ids are a no-op.
    /// Returns whether the ledger changed.
    pub fn set_quantity(&mut self, id: ProductId, quantity: i64) -> bool {
        if quantity <= 0 {
            return self.remove(id);
        }
        let quantity = u32::try_from(quantity)
            .unwrap_or(MAX_QUANTITY_PER_ITEM)
            .min(MAX_QUANTITY_PER_ITEM);

        match self.items.iter_mut().find(|i| i.id == id) {
            Some(item) if item.quantity != quantity => {
                item.quantity = quantity;
                self.revision += 1;
                true
            }
            _ => false,
        }
    }

    /// Increase a line's quantity by one. Unknown ids are a no-op.
    pub fn increment(&mut self, id: ProductId) -> bool {
        match self.quantity_of(id) {
            Some(q) => self.set_quantity(id, i64::from(q) + 1),
            None => false,
        }
    }

    /// Decrease a line's quantity by one, removing it at zero.
    pub fn decrement(&mut self, id: ProductId) -> bool {
        match self.quantity_of(id) {
            Some(q) => self.set_quantity(id, i64::from(q) - 1),
            None => false,
        }
    }

    /// Empty the ledger.
    pub fn clear(&mut self) {
        if !self.items.is_empty() {
            self.items.clear();
            self.revision += 1;
        }
    }

    /// Sum of quantities.
    pub fn total_items(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }

    /// Sum of unit price times quantity.
    pub fn total_price(&self) -> Money {
        let currency = self.currency().unwrap_or_default();
        let cents = self
            .items
            .iter()
            .fold(0_i64, |acc, i| acc.saturating_add(i.line_total().amount_cents));
        Money::new(cents, currency)
    }

    /// Total markdown across all lines.
    pub fn savings(&self) -> Money {
        let currency = self.currency().unwrap_or_default();
        let cents = self
            .items
            .iter()
            .fold(0_i64, |acc, i| acc.saturating_add(i.savings().amount_cents));
        Money::new(cents, currency)
    }

    /// Currency of the items in the cart, `None` when empty.
    pub fn currency(&self) -> Option<Currency> {
        self.items.first().map(|i| i.unit_price.currency)
    }

    /// Independent copy of the current line items.
    pub fn snapshot(&self) -> Vec<CartLineItem> {
        self.items.clone()
    }

    /// Line items in insertion order.
    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    /// Look up a line by product id.
    pub fn get(&self, id: ProductId) -> Option<&CartLineItem> {
        self.items.iter().find(|i| i.id == id)
    }

    /// Quantity of a product in the cart.
    pub fn quantity_of(&self, id: ProductId) -> Option<u32> {
        self.get(id).map(|i| i.quantity)
    }

    /// Number of distinct products.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Counter identifying the current ledger state.
    pub fn revision(&self) -> u64 {
        self.revision
    }
}
