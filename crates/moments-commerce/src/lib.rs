//! Storefront commerce domain for Moments.
//!
//! - **Catalog**: the products on sale, read-only
//! - **Cart**: the cart ledger with derived totals
//! - **Order**: placed orders and the append-only order log
//! - **Checkout**: the checkout step machine and the payment boundary
//!
//! # Example
//!
//! ```rust
//! use moments_commerce::prelude::*;
//!
//! let catalog = Catalog::demo();
//! let mut cart = CartLedger::new();
//! cart.add(catalog.require(ProductId::new(1))?)?;
//! cart.add(catalog.require(ProductId::new(2))?)?;
//! cart.add(catalog.require(ProductId::new(2))?)?;
//!
//! assert_eq!(cart.total_price().display(), "$79.97");
//!
//! let order = Order::from_snapshot(cart.snapshot(), None)?;
//! let mut log = OrderLog::new();
//! log.add(order);
//! cart.clear();
//! # Ok::<(), CommerceError>(())
//! ```

pub mod error;
pub mod ids;
pub mod money;

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod order;

pub use error::CommerceError;
pub use ids::*;
pub use money::{Currency, Money};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::CommerceError;
    pub use crate::ids::*;
    pub use crate::money::{Currency, Money};

    pub use crate::cart::{CartLedger, CartLineItem};
    pub use crate::catalog::{Catalog, Product, Section};
    pub use crate::checkout::{
        CardDetails, CheckoutFlow, CheckoutStep, PaymentAuthorization, PaymentError,
        PaymentProcessor, ShippingDetails, SimulatedPaymentProcessor,
    };
    pub use crate::order::{Order, OrderLog, OrderStatus};
}
