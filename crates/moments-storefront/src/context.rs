//! The storefront context.
//!
//! Owns the catalog, cart ledger, order log and sign-in session, and
//! mirrors the cart, orders and user to the store after every change.

use std::sync::Arc;

use moments_auth::{AuthSession, AuthState, OtpProvider, ProfileDraft, User, UserPatch};
use moments_commerce::cart::{CartLedger, CartLineItem};
use moments_commerce::catalog::{Catalog, Product};
use moments_commerce::checkout::PaymentProcessor;
use moments_commerce::order::{Order, OrderLog};
use moments_commerce::{AuthorizationId, CommerceError, ProductId};
use moments_store::{StorageKey, Store};

use crate::config::StorefrontConfig;
use crate::StorefrontError;

/// Everything one shopper's storefront session holds.
///
/// Mutations take `&mut self`, so no two run at once.
pub struct Storefront {
    config: StorefrontConfig,
    store: Store,
    catalog: Catalog,
    cart: CartLedger,
    orders: OrderLog,
    auth: AuthSession,
    payments: Arc<dyn PaymentProcessor>,
    last_ordered_revision: Option<u64>,
}

impl Storefront {
    /// Open a storefront, rehydrating cart, orders and user from `store`.
    ///
    /// Absent or unreadable records start empty.
    pub fn open(
        config: StorefrontConfig,
        store: Store,
        otp_provider: Arc<dyn OtpProvider>,
    ) -> Result<Self, StorefrontError> {
        config.validate()?;
        let catalog = config.load_catalog()?;
        let payments = Arc::new(config.payment_processor());

        let items: Vec<CartLineItem> = store.load_or_default(StorageKey::Cart.as_str());
        let orders: Vec<Order> = store.load_or_default(StorageKey::Orders.as_str());
        let user: Option<User> = store.load_optional(StorageKey::User.as_str());

        tracing::info!(
            cart_items = items.len(),
            orders = orders.len(),
            signed_in = user.is_some(),
            "storefront opened"
        );

        Ok(Self {
            config,
            store,
            catalog,
            cart: CartLedger::from_items(items),
            orders: OrderLog::from_orders(orders),
            auth: AuthSession::restore(otp_provider, user),
            payments,
            last_ordered_revision: None,
        })
    }

    /// Open with the store and providers the config describes.
    pub fn from_config(config: StorefrontConfig) -> Result<Self, StorefrontError> {
        let store = config.open_store()?;
        let otp = Arc::new(config.otp_provider());
        Self::open(config, store, otp)
    }

    /// Replace the payment processor.
    pub fn with_payment_processor(mut self, processor: Arc<dyn PaymentProcessor>) -> Self {
        self.payments = processor;
        self
    }

    /// Replace the product catalog.
    pub fn with_catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn config(&self) -> &StorefrontConfig {
        &self.config
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn cart(&self) -> &CartLedger {
        &self.cart
    }

    pub fn orders(&self) -> &OrderLog {
        &self.orders
    }

    pub fn auth(&self) -> &AuthSession {
        &self.auth
    }

    pub fn user(&self) -> Option<&User> {
        self.auth.user()
    }

    pub(crate) fn payment_processor(&self) -> Arc<dyn PaymentProcessor> {
        Arc::clone(&self.payments)
    }

    /// Cart revision of the most recent order placed in this session.
    pub fn last_ordered_revision(&self) -> Option<u64> {
        self.last_ordered_revision
    }

    // Cart

    /// Add one unit of `product`. Returns the line's new quantity.
    pub fn add_to_cart(&mut self, product: &Product) -> Result<u32, StorefrontError> {
        let revision = self.cart.revision();
        let quantity = self.cart.add(product)?.quantity;
        self.persist_cart_if(self.cart.revision() != revision);
        Ok(quantity)
    }

    /// Add one unit of a catalog product by id.
    pub fn add_by_id(&mut self, id: ProductId) -> Result<u32, StorefrontError> {
        let product = self.catalog.require(id)?.clone();
        self.add_to_cart(&product)
    }

    pub fn remove_from_cart(&mut self, id: ProductId) -> bool {
        let changed = self.cart.remove(id);
        self.persist_cart_if(changed)
    }

    pub fn set_quantity(&mut self, id: ProductId, quantity: i64) -> bool {
        let changed = self.cart.set_quantity(id, quantity);
        self.persist_cart_if(changed)
    }

    pub fn increment(&mut self, id: ProductId) -> bool {
        let changed = self.cart.increment(id);
        self.persist_cart_if(changed)
    }

    pub fn decrement(&mut self, id: ProductId) -> bool {
        let changed = self.cart.decrement(id);
        self.persist_cart_if(changed)
    }

    pub fn clear_cart(&mut self) {
        self.cart.clear();
        self.persist_cart();
    }

    // Sign-in

    pub async fn request_otp(&mut self, phone: &str) -> Result<(), StorefrontError> {
        Ok(self.auth.request_otp(phone).await?)
    }

    pub async fn verify_otp(
        &mut self,
        phone: &str,
        code: &str,
        draft: ProfileDraft,
    ) -> Result<AuthState, StorefrontError> {
        self.auth.verify_otp(phone, code, draft).await?;
        self.persist_user();
        Ok(self.auth.state())
    }

    pub fn complete_profile(
        &mut self,
        name: &str,
        address: &str,
        email: Option<&str>,
    ) -> Result<AuthState, StorefrontError> {
        self.auth.complete_profile(name, address, email)?;
        self.persist_user();
        Ok(self.auth.state())
    }

    pub fn update_user(&mut self, patch: UserPatch) -> Result<AuthState, StorefrontError> {
        self.auth.update_user(patch)?;
        self.persist_user();
        Ok(self.auth.state())
    }

    pub async fn request_email_otp(&mut self, email: &str) -> Result<(), StorefrontError> {
        Ok(self.auth.request_email_otp(email).await?)
    }

    pub async fn verify_email_otp(&mut self, email: &str, code: &str) -> Result<(), StorefrontError> {
        self.auth.verify_email_otp(email, code).await?;
        self.persist_user();
        Ok(())
    }

    /// Abandon an unfinished sign-in or email check.
    pub fn cancel_sign_in(&mut self) {
        self.auth.cancel();
    }

    /// Sign out and drop the stored user. The cart and orders stay.
    pub fn logout(&mut self) -> Option<User> {
        let user = self.auth.logout();
        self.persist_user();
        user
    }

    // Orders

    /// Turn the cart into an order: snapshot, prepend to the log, clear
    /// the cart, persist.
    ///
    /// `for_revision` is the cart revision the payment was taken for. It
    /// must still be current and must not have been ordered already.
    pub fn place_order(
        &mut self,
        for_revision: u64,
        authorization: Option<AuthorizationId>,
    ) -> Result<Order, CommerceError> {
        if self.last_ordered_revision == Some(for_revision) || self.cart.revision() != for_revision
        {
            return Err(CommerceError::DuplicateSubmission(for_revision));
        }

        let order = Order::from_snapshot(self.cart.snapshot(), authorization)?;
        self.orders.add(order.clone());
        self.cart.clear();
        self.last_ordered_revision = Some(for_revision);

        self.store.persist(StorageKey::Orders.as_str(), self.orders.as_slice());
        self.persist_cart();

        tracing::info!(
            order_id = %order.id,
            total = %order.total,
            items = order.item_count(),
            "order placed"
        );
        Ok(order)
    }

    fn persist_cart(&self) {
        self.store.persist(StorageKey::Cart.as_str(), self.cart.items());
    }

    fn persist_cart_if(&self, changed: bool) -> bool {
        if changed {
            self.persist_cart();
        }
        changed
    }

    fn persist_user(&self) {
        match self.auth.user() {
            Some(user) => self.store.persist(StorageKey::User.as_str(), user),
            None => self.store.forget(StorageKey::User.as_str()),
        }
    }
}

impl std::fmt::Debug for Storefront {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storefront")
            .field("cart", &self.cart)
            .field("orders", &self.orders.len())
            .field("auth", &self.auth)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use moments_auth::DemoOtpProvider;
    use moments_commerce::cart::MAX_QUANTITY_PER_ITEM;
    use moments_commerce::Money;
    use std::time::Duration;

    fn storefront(store: Store) -> Storefront {
        Storefront::open(
            StorefrontConfig::default(),
            store,
            Arc::new(DemoOtpProvider::new("123456", Duration::ZERO)),
        )
        .unwrap()
    }

    #[test]
    fn test_cart_ops_persist() {
        let store = Store::in_memory();
        let mut sf = storefront(store.clone());

        assert_eq!(sf.add_by_id(ProductId::new(1)).unwrap(), 1);
        assert_eq!(sf.add_by_id(ProductId::new(1)).unwrap(), 2);
        let stored: Vec<CartLineItem> = store.get("moments-cart").unwrap().unwrap();
        assert_eq!(stored[0].quantity, 2);

        assert!(sf.decrement(ProductId::new(1)));
        assert!(sf.set_quantity(ProductId::new(1), 0));
        assert!(!sf.remove_from_cart(ProductId::new(1)));
        let stored: Vec<CartLineItem> = store.get("moments-cart").unwrap().unwrap();
        assert!(stored.is_empty());
    }

    #[test]
    fn test_add_at_cap_skips_write() {
        let store = Store::in_memory();
        let mut sf = storefront(store.clone());
        sf.add_by_id(ProductId::new(1)).unwrap();
        assert!(sf.set_quantity(ProductId::new(1), i64::from(MAX_QUANTITY_PER_ITEM)));
        let revision = sf.cart().revision();

        // A stale record would be rewritten if the add persisted.
        store.set_raw("moments-cart", "[]").unwrap();
        assert_eq!(sf.add_by_id(ProductId::new(1)).unwrap(), MAX_QUANTITY_PER_ITEM);
        assert_eq!(sf.cart().revision(), revision);
        let stored: Vec<CartLineItem> = store.get("moments-cart").unwrap().unwrap();
        assert!(stored.is_empty());
    }

    #[test]
    fn test_non_usd_without_catalog_rejected() {
        let config = StorefrontConfig {
            currency: "EUR".into(),
            ..StorefrontConfig::default()
        };
        let err = Storefront::open(
            config,
            Store::in_memory(),
            Arc::new(DemoOtpProvider::new("123456", Duration::ZERO)),
        )
        .unwrap_err();
        assert!(matches!(err, StorefrontError::Config(_)));
    }

    #[test]
    fn test_unknown_product() {
        let mut sf = storefront(Store::in_memory());
        let err = sf.add_by_id(ProductId::new(999)).unwrap_err();
        assert!(matches!(
            err,
            StorefrontError::Commerce(CommerceError::ProductNotFound(_))
        ));
        assert!(sf.cart().is_empty());
    }

    #[test]
    fn test_place_order_snapshots_and_clears() {
        let store = Store::in_memory();
        let mut sf = storefront(store.clone());
        sf.add_by_id(ProductId::new(1)).unwrap();
        sf.add_by_id(ProductId::new(2)).unwrap();
        sf.add_by_id(ProductId::new(2)).unwrap();

        let revision = sf.cart().revision();
        let order = sf.place_order(revision, None).unwrap();
        assert_eq!(order.total, Money::usd(7997));
        assert!(sf.cart().is_empty());
        assert_eq!(sf.orders().len(), 1);
        assert_eq!(sf.last_ordered_revision(), Some(revision));

        let stored: Vec<Order> = store.get("moments-orders").unwrap().unwrap();
        assert_eq!(stored, vec![order.clone()]);

        sf.add_by_id(ProductId::new(3)).unwrap();
        assert_eq!(sf.orders().latest().unwrap().items, order.items);
    }

    #[test]
    fn test_place_order_rejects_stale_revision() {
        let mut sf = storefront(Store::in_memory());
        sf.add_by_id(ProductId::new(1)).unwrap();
        let revision = sf.cart().revision();
        sf.place_order(revision, None).unwrap();

        sf.add_by_id(ProductId::new(1)).unwrap();
        assert_eq!(
            sf.place_order(revision, None),
            Err(CommerceError::DuplicateSubmission(revision))
        );
        assert_eq!(sf.orders().len(), 1);
        assert_eq!(sf.cart().len(), 1);
    }

    #[test]
    fn test_place_order_empty_cart() {
        let mut sf = storefront(Store::in_memory());
        let revision = sf.cart().revision();
        assert_eq!(sf.place_order(revision, None), Err(CommerceError::EmptyCart));
    }

    #[tokio::test]
    async fn test_user_persisted_and_forgotten() {
        let store = Store::in_memory();
        let mut sf = storefront(store.clone());

        sf.request_otp("+15551234567").await.unwrap();
        sf.verify_otp("+15551234567", "123456", ProfileDraft::default())
            .await
            .unwrap();
        assert!(store.exists("moments-user").unwrap());

        sf.complete_profile("Ada", "1 Analytical Way", None).unwrap();
        let stored: User = store.get("moments-user").unwrap().unwrap();
        assert_eq!(stored.name, "Ada");

        sf.logout();
        assert!(!store.exists("moments-user").unwrap());
    }
}
