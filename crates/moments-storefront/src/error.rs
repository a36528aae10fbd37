//! Storefront and checkout errors.

use std::path::PathBuf;

use moments_auth::AuthError;
use moments_commerce::checkout::PaymentError;
use moments_commerce::CommerceError;
use moments_store::StoreError;
use thiserror::Error;

/// Errors from the storefront context and its configuration.
#[derive(Error, Debug)]
pub enum StorefrontError {
    #[error("failed to read config file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Commerce(#[from] CommerceError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<toml::de::Error> for StorefrontError {
    fn from(e: toml::de::Error) -> Self {
        StorefrontError::Config(e.to_string())
    }
}

impl From<toml::ser::Error> for StorefrontError {
    fn from(e: toml::ser::Error) -> Self {
        StorefrontError::Config(e.to_string())
    }
}

impl From<serde_json::Error> for StorefrontError {
    fn from(e: serde_json::Error) -> Self {
        StorefrontError::Config(e.to_string())
    }
}

/// Errors from the checkout wizard.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckoutError {
    #[error("Cart is empty")]
    EmptyCart,

    #[error("Sign in to continue checkout")]
    NotAuthenticated,

    /// The profile lacks what shipping needs.
    #[error("Profile incomplete: missing {0}")]
    ProfileIncomplete(String),

    #[error("Payment declined: {reason}")]
    PaymentDeclined { reason: String },

    #[error("Payment timed out")]
    PaymentTimeout,

    #[error("Payment processor unavailable: {0}")]
    PaymentUnavailable(String),

    #[error(transparent)]
    Commerce(#[from] CommerceError),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl CheckoutError {
    /// Whether the shopper can retry from the payment step.
    pub fn is_payment_failure(&self) -> bool {
        matches!(
            self,
            CheckoutError::PaymentDeclined { .. }
                | CheckoutError::PaymentTimeout
                | CheckoutError::PaymentUnavailable(_)
        )
    }
}

impl From<PaymentError> for CheckoutError {
    fn from(e: PaymentError) -> Self {
        match e {
            PaymentError::Declined { reason } => CheckoutError::PaymentDeclined { reason },
            PaymentError::Timeout => CheckoutError::PaymentTimeout,
            PaymentError::Unavailable(msg) => CheckoutError::PaymentUnavailable(msg),
        }
    }
}
