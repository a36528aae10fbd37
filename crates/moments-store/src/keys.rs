//! Well-known record keys.

use std::fmt;

/// The records the storefront mirrors to durable storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    /// Cart line items (array).
    Cart,
    /// Placed orders, newest first (array).
    Orders,
    /// The signed-in user (object, absent when signed out).
    User,
}

impl StorageKey {
    /// The key string under which the record is stored.
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageKey::Cart => "moments-cart",
            StorageKey::Orders => "moments-orders",
            StorageKey::User => "moments-user",
        }
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for StorageKey {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}
