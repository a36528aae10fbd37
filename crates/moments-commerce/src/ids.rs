//! Newtype IDs for type-safe identifiers.
//!
//! Product ids are the catalog's integers; everything the storefront
//! mints itself (orders, users, tracking numbers, authorizations) is a
//! prefixed string.

use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Macro to generate string newtype ID structs.
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create an ID from an existing string.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the ID as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume and return the inner string.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(
    /// Identifier of a placed order, e.g. `ORDER-1718000000000-4KQ2`.
    OrderId
);
define_id!(
    /// Identifier of a signed-in user, e.g. `user_1718000000000`.
    UserId
);
define_id!(
    /// Carrier tracking reference, e.g. `TRK9F3KQ2ZD`.
    TrackingNumber
);
define_id!(
    /// Reference returned by the payment processor for a successful charge.
    AuthorizationId
);

impl OrderId {
    /// Generate a time-based order id.
    pub fn generate() -> Self {
        Self(format!(
            "ORDER-{}-{}",
            chrono::Utc::now().timestamp_millis(),
            random_code(4)
        ))
    }
}

impl UserId {
    /// Generate a time-based user id.
    pub fn generate() -> Self {
        Self(format!("user_{}", chrono::Utc::now().timestamp_millis()))
    }
}

impl TrackingNumber {
    /// Generate a fresh tracking number.
    pub fn generate() -> Self {
        Self(format!("TRK{}", random_code(8)))
    }
}

impl AuthorizationId {
    /// Generate an authorization reference.
    pub fn generate() -> Self {
        Self(format!("AUTH-{}", random_code(12)))
    }
}

/// Catalog product identifier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ProductId(u32);

impl ProductId {
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for ProductId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// Uppercase alphanumeric code of `len` characters.
fn random_code(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(|b| char::from(b).to_ascii_uppercase())
        .collect()
}
