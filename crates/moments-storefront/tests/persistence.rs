//! Reloading storefront state through the store.

use std::sync::Arc;

use moments_auth::{AuthState, DemoOtpProvider, ProfileDraft, ProfileStatus};
use moments_commerce::checkout::CardDetails;
use moments_commerce::{Money, ProductId};
use moments_store::Store;
use moments_storefront::{CheckoutWizard, StoreKind, Storefront, StorefrontConfig};

const PHONE: &str = "+15551234567";

fn open(store: Store) -> Storefront {
    Storefront::open(
        StorefrontConfig::default(),
        store,
        Arc::new(DemoOtpProvider::default()),
    )
    .unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_state_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();

    let placed = {
        let mut sf = open(Store::open_dir(dir.path()).unwrap());
        sf.add_by_id(ProductId::new(1)).unwrap();
        sf.request_otp(PHONE).await.unwrap();
        sf.verify_otp(PHONE, "123456", ProfileDraft::new("Ada", "1 Analytical Way"))
            .await
            .unwrap();

        let mut wizard = CheckoutWizard::start(&sf).unwrap();
        wizard.confirm_shipping(&sf).unwrap();
        wizard
            .enter_payment(CardDetails::new("4242424242424242", "Ada", "01/30", "321"))
            .unwrap();
        let order = wizard.submit_payment(&mut sf).await.unwrap();

        sf.add_by_id(ProductId::new(7)).unwrap();
        sf.add_by_id(ProductId::new(7)).unwrap();
        order
    };

    let sf = open(Store::open_dir(dir.path()).unwrap());
    assert_eq!(sf.orders().len(), 1);
    assert_eq!(sf.orders().latest(), Some(&placed));
    assert_eq!(sf.cart().quantity_of(ProductId::new(7)), Some(2));
    assert_eq!(sf.cart().total_price(), Money::usd(2 * 1299));
    assert_eq!(
        sf.auth().state(),
        AuthState::Authenticated(ProfileStatus::Complete)
    );
    assert_eq!(sf.user().unwrap().phone_number, PHONE);
}

#[tokio::test(start_paused = true)]
async fn test_logout_survives_reopen() {
    let store = Store::in_memory();
    {
        let mut sf = open(store.clone());
        sf.request_otp(PHONE).await.unwrap();
        sf.verify_otp(PHONE, "123456", ProfileDraft::default())
            .await
            .unwrap();
        sf.logout();
    }

    let sf = open(store);
    assert_eq!(sf.auth().state(), AuthState::Anonymous);
}

#[test]
fn test_corrupt_records_load_empty() {
    let store = Store::in_memory();
    store.set_raw("moments-cart", "{not json").unwrap();
    store.set_raw("moments-orders", "[{\"id\": 3}]").unwrap();
    store.set_raw("moments-user", "null").unwrap();

    let mut sf = open(store.clone());
    assert!(sf.cart().is_empty());
    assert!(sf.orders().is_empty());
    assert!(sf.user().is_none());

    // The next write replaces the corrupt record.
    sf.add_by_id(ProductId::new(2)).unwrap();
    let reopened = open(store);
    assert_eq!(reopened.cart().quantity_of(ProductId::new(2)), Some(1));
}

#[test]
fn test_from_config_memory_backend() {
    let config = StorefrontConfig::from_toml(
        r#"
[store]
backend = "memory"
"#,
    )
    .unwrap();
    assert_eq!(config.store.backend, StoreKind::Memory);

    let mut sf = Storefront::from_config(config).unwrap();
    assert_eq!(sf.catalog().len(), 8);
    sf.add_by_id(ProductId::new(8)).unwrap();
    assert_eq!(sf.cart().len(), 1);
}
