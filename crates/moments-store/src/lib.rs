//! Key-Value persistence for the Moments storefront.
//!
//! Mirrors session state (cart, orders, signed-in user) to a key/value
//! backend as JSON, one record per key, and reads it back on startup.
//!
//! # Example
//!
//! ```rust,ignore
//! use moments_store::{StorageKey, Store};
//!
//! let store = Store::open_dir("./.moments")?;
//!
//! // Write-through after a mutation
//! store.persist(StorageKey::Cart.as_str(), &cart_items);
//!
//! // Rehydrate on startup; corrupt or missing records load as empty
//! let items: Vec<CartLineItem> = store.load_or_default(StorageKey::Cart.as_str());
//! ```

mod error;
mod keys;
mod kv;

pub use error::StoreError;
pub use keys::StorageKey;
pub use kv::{FileBackend, MemoryBackend, Store, StoreBackend};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{StorageKey, Store, StoreBackend, StoreError};
}
