//! Integration tests for cart hydration and write-through.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::sync::Arc;

use go_marketplace_cart::{
    CartConfig, CartManager, FileStore, Hydration, KeyValueStore, MemoryStore, PersistenceError,
    PersistenceEvent, decode_cart,
};
use go_marketplace_core::{Price, ProductId};
use go_marketplace_integration_tests::{SlowStore, open_cart, product};

const KEY: &str = "@GoMarketplace:products";

// =============================================================================
// Hydration
// =============================================================================

#[tokio::test]
async fn test_round_trip_through_fresh_manager() {
    let store = MemoryStore::new();
    let first = open_cart(Arc::new(store.clone())).await;
    first.add_to_cart(product("b", "B", Price::from_cents(199)));
    first.add_to_cart(product("a", "A", Price::from_cents(1000)));
    first.add_to_cart(product("c", "C", Price::from_cents(5)));
    first.increment(&ProductId::new("a"));
    first.flush().await;

    let second = open_cart(Arc::new(store)).await;

    assert!(matches!(second.hydration(), Hydration::Restored { items: 3 }));
    assert_eq!(second.cart(), first.cart());
    let ids: Vec<_> = second.products().into_iter().map(|i| i.id.into_inner()).collect();
    assert_eq!(ids, ["b", "a", "c"]);
}

#[tokio::test]
async fn test_hydrates_legacy_layout() {
    let raw = r#"[
        {"id":"p1","title":"Mug","image_url":"https://cdn.example.com/mug.png","price":12.5,"quantity":2},
        {"id":"p2","title":"Tee","image_url":"https://cdn.example.com/tee.png","price":30,"quantity":1}
    ]"#;
    let cart = open_cart(Arc::new(MemoryStore::with_entry(KEY, raw))).await;

    let products = cart.products();
    assert_eq!(products.len(), 2);
    assert_eq!(products[0].price, Price::from_cents(1250));
    assert_eq!(products[0].quantity, 2);
    assert_eq!(cart.summary().total, Price::from_cents(5500));
}

#[tokio::test]
async fn test_malformed_storage_starts_empty() {
    let store = MemoryStore::with_entry(KEY, "{\"oops\": true}");
    let cart = open_cart(Arc::new(store.clone())).await;

    assert!(cart.products().is_empty());
    match cart.hydration() {
        Hydration::Discarded(error) => assert!(matches!(**error, PersistenceError::Decode(_))),
        other => panic!("unexpected hydration: {other:?}"),
    }

    // The cart is still usable and the next write replaces the bad value.
    cart.add_to_cart(product("p1", "T", Price::from_cents(1000)));
    cart.flush().await;

    let stored = store.get(KEY).await.unwrap().unwrap();
    assert_eq!(decode_cart(&stored).unwrap(), cart.cart());
    assert_eq!(cart.cart().len(), 1);

    let reopened = open_cart(Arc::new(store)).await;
    assert!(matches!(reopened.hydration(), Hydration::Restored { items: 1 }));
}

#[tokio::test]
async fn test_zero_quantity_storage_starts_empty() {
    let raw = r#"[{"id":"p1","title":"T","image_url":"u","price":1,"quantity":0}]"#;
    let cart = open_cart(Arc::new(MemoryStore::with_entry(KEY, raw))).await;

    assert!(cart.products().is_empty());
    assert!(cart.hydration().is_discarded());
}

// =============================================================================
// Write-through
// =============================================================================

#[tokio::test]
async fn test_writes_complete_in_issue_order() {
    let store = Arc::new(SlowStore::new(60));
    let cart = open_cart(store.clone()).await;

    cart.add_to_cart(product("p1", "T", Price::from_cents(1000)));
    cart.add_to_cart(product("p2", "T", Price::from_cents(1000)));
    cart.increment(&ProductId::new("p1"));
    cart.decrement(&ProductId::new("p2")).unwrap();
    cart.flush().await;

    let completed = store.completed().await;
    assert_eq!(completed.len(), 4);

    let lengths: Vec<_> = completed
        .iter()
        .map(|raw| decode_cart(raw).unwrap().len())
        .collect();
    assert_eq!(lengths, [1, 2, 2, 1]);

    let stored = store.get(KEY).await.unwrap().unwrap();
    assert_eq!(decode_cart(&stored).unwrap(), cart.cart());
}

#[tokio::test]
async fn test_write_events_follow_revisions() {
    let store = MemoryStore::new();
    let cart = open_cart(Arc::new(store)).await;
    let mut events = cart.persistence_events();

    for n in 0..5 {
        cart.add_to_cart(product(&format!("p{n}"), "T", Price::from_cents(100)));
    }
    cart.flush().await;

    for expected in 1..=5_u64 {
        match events.recv().await.unwrap() {
            PersistenceEvent::Written { revision, .. } => assert_eq!(revision, expected),
            other => panic!("unexpected event: {other:?}"),
        }
    }
    assert_eq!(cart.revision(), 5);
}

#[tokio::test]
async fn test_file_store_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let config = CartConfig {
        store_path: dir.path().join("cart.json"),
        ..CartConfig::default()
    };

    let first = CartManager::open(Arc::new(FileStore::new(&config.store_path)), &config).await;
    first.add_to_cart(product("p1", "T", Price::from_cents(999)));
    first.add_to_cart(product("p1", "T", Price::from_cents(999)));
    first.flush().await;
    drop(first);

    let raw = std::fs::read_to_string(&config.store_path).unwrap();
    let file: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let stored: serde_json::Value = serde_json::from_str(file[KEY].as_str().unwrap()).unwrap();
    assert_eq!(stored[0]["id"], "p1");
    assert_eq!(stored[0]["quantity"], 2);

    let second = CartManager::open(Arc::new(FileStore::new(&config.store_path)), &config).await;
    assert_eq!(second.get(&ProductId::new("p1")).unwrap().quantity, 2);
}

#[tokio::test]
async fn test_failed_write_keeps_memory_state() {
    let store = MemoryStore::new();
    let cart = open_cart(Arc::new(store.clone())).await;
    let mut events = cart.persistence_events();

    store.set_fail_writes(true);
    cart.add_to_cart(product("p1", "T", Price::from_cents(100)));
    cart.flush().await;

    assert!(matches!(
        events.recv().await.unwrap(),
        PersistenceEvent::WriteFailed { .. }
    ));
    assert_eq!(cart.products().len(), 1);
    assert_eq!(store.get(KEY).await.unwrap(), None);
}
