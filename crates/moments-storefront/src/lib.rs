//! Storefront core for the Moments craft-kit shop.
//!
//! [`Storefront`] holds one shopper's cart, order history and sign-in
//! session, writing each through to a [`Store`](moments_store::Store)
//! after every change. [`CheckoutWizard`] walks that shopper from cart
//! to placed order.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use moments_auth::{DemoOtpProvider, ProfileDraft};
//! use moments_commerce::checkout::CardDetails;
//! use moments_commerce::ProductId;
//! use moments_store::Store;
//! use moments_storefront::{CheckoutWizard, Storefront, StorefrontConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let mut storefront = Storefront::open(
//!     StorefrontConfig::default(),
//!     Store::in_memory(),
//!     Arc::new(DemoOtpProvider::default()),
//! )?;
//! storefront.add_by_id(ProductId::new(1))?;
//!
//! storefront.request_otp("+15551234567").await?;
//! storefront
//!     .verify_otp("+15551234567", "123456", ProfileDraft::new("Ada", "1 Analytical Way"))
//!     .await?;
//!
//! let mut wizard = CheckoutWizard::start(&storefront)?;
//! wizard.confirm_shipping(&storefront)?;
//! wizard.enter_payment(CardDetails::new("4242 4242 4242 4242", "Ada", "12/28", "123"))?;
//! let order = wizard.submit_payment(&mut storefront).await?;
//! println!("placed {} for {}", order.id, order.total);
//! # Ok(())
//! # }
//! ```

mod checkout;
mod config;
mod context;
mod error;

pub use checkout::CheckoutWizard;
pub use config::{AuthConfig, PaymentConfig, StoreConfig, StoreKind, StorefrontConfig};
pub use context::Storefront;
pub use error::{CheckoutError, StorefrontError};
