//! Commerce error types.

use thiserror::Error;

use crate::ids::ProductId;

/// Errors that can occur in cart, order and checkout operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommerceError {
    /// Product not found in the catalog.
    #[error("Product not found: {0}")]
    ProductNotFound(ProductId),

    /// Invalid quantity.
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(i64),

    /// Currency mismatch.
    #[error("Currency mismatch: expected {expected}, got {got}")]
    CurrencyMismatch { expected: String, got: String },

    /// Arithmetic overflow.
    #[error("Arithmetic overflow in money calculation")]
    Overflow,

    /// Nothing to check out.
    #[error("Cart is empty")]
    EmptyCart,

    /// Invalid checkout state transition.
    #[error("Invalid checkout transition from {from} to {to}")]
    InvalidCheckoutTransition { from: String, to: String },

    /// Checkout incomplete.
    #[error("Checkout incomplete: missing {0}")]
    CheckoutIncomplete(String),

    /// A payment submission is already being processed.
    #[error("A payment submission is already in flight")]
    SubmissionInFlight,

    /// This cart state has already been turned into an order.
    #[error("Cart revision {0} has already been ordered")]
    DuplicateSubmission(u64),

    /// Card details failed format validation.
    #[error("Invalid card details: {0}")]
    InvalidCard(String),

    /// Catalog or record parsing error.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for CommerceError {
    fn from(e: serde_json::Error) -> Self {
        CommerceError::SerializationError(e.to_string())
    }
}
