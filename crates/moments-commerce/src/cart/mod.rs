//! Shopping cart module.
//!
//! Contains the cart ledger and its line items.

mod ledger;

pub use ledger::{CartLedger, CartLineItem, MAX_QUANTITY_PER_ITEM};
