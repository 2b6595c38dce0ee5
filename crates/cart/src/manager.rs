//! Cart state manager.
//!
//! [`CartManager`] is the only thing allowed to change the cart. Every
//! mutator applies its transition and queues the resulting snapshot for
//! persistence under the same lock, so snapshots reach the store in the
//! order the transitions happened.
//!
//! Mutators are synchronous and never wait on storage. Call
//! [`CartManager::flush`] when durability matters (before exiting, in tests).

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use go_marketplace_core::{Cart, CartItem, CartSummary, NewCartItem, ProductId};
use tokio::sync::{broadcast, watch};
use tracing::{debug, instrument, warn};

use crate::config::{CartConfig, MAX_EVENT_CAPACITY};
use crate::error::Result;
use crate::persistence::{self, Hydration, PersistenceEvent, PersistenceQueue};
use crate::store::KeyValueStore;

/// Shared handle to the cart.
///
/// This struct is cheaply cloneable via `Arc`; every clone sees and mutates
/// the same cart. The background writer stops once the last clone is dropped.
#[derive(Clone)]
pub struct CartManager {
    inner: Arc<CartManagerInner>,
}

struct CartManagerInner {
    state: watch::Sender<Cart>,
    /// Bumped inside the state lock, once per persisted mutation.
    revision: AtomicU64,
    queue: PersistenceQueue,
    events: broadcast::Sender<PersistenceEvent>,
    hydration: Hydration,
    storage_key: String,
}

impl std::fmt::Debug for CartManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartManager")
            .field("storage_key", &self.inner.storage_key)
            .field("items", &self.inner.state.borrow().len())
            .field("revision", &self.revision())
            .field("hydration", &self.inner.hydration)
            .finish_non_exhaustive()
    }
}

impl CartManager {
    /// Load the persisted cart and start the persistence writer.
    ///
    /// Hydration finishes before the manager is returned, so no mutation can
    /// be overwritten by a late load. Missing, unreadable or malformed data
    /// starts an empty cart; see [`CartManager::hydration`].
    ///
    /// Must be called from within a tokio runtime.
    #[instrument(skip(store, config), fields(key = %config.storage_key))]
    pub async fn open(store: Arc<dyn KeyValueStore>, config: &CartConfig) -> Self {
        let (cart, hydration) = persistence::hydrate(store.as_ref(), &config.storage_key).await;

        let (events, _) = broadcast::channel(config.event_capacity.clamp(1, MAX_EVENT_CAPACITY));
        let queue = PersistenceQueue::spawn(store, config.storage_key.clone(), events.clone());
        let (state, _) = watch::channel(cart);

        Self {
            inner: Arc::new(CartManagerInner {
                state,
                revision: AtomicU64::new(0),
                queue,
                events,
                hydration,
                storage_key: config.storage_key.clone(),
            }),
        }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Snapshot of the cart lines, in insertion order.
    #[must_use]
    pub fn products(&self) -> Vec<CartItem> {
        self.inner.state.borrow().items().to_vec()
    }

    /// Snapshot of the whole cart.
    #[must_use]
    pub fn cart(&self) -> Cart {
        self.inner.state.borrow().clone()
    }

    /// Look up a single line.
    #[must_use]
    pub fn get(&self, id: &ProductId) -> Option<CartItem> {
        self.inner.state.borrow().get(id).cloned()
    }

    /// Total item count and price.
    #[must_use]
    pub fn summary(&self) -> CartSummary {
        self.inner.state.borrow().summary()
    }

    /// Receive a new cart value after every change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Cart> {
        self.inner.state.subscribe()
    }

    /// Receive the outcome of every background write.
    ///
    /// Only writes finished after subscribing are delivered.
    #[must_use]
    pub fn persistence_events(&self) -> broadcast::Receiver<PersistenceEvent> {
        self.inner.events.subscribe()
    }

    /// How the cart was loaded at startup.
    #[must_use]
    pub fn hydration(&self) -> &Hydration {
        &self.inner.hydration
    }

    /// Number of mutations queued for persistence so far.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.inner.revision.load(Ordering::SeqCst)
    }

    /// Key the cart is persisted under.
    #[must_use]
    pub fn storage_key(&self) -> &str {
        &self.inner.storage_key
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Add one unit of a product and return the line's new quantity.
    ///
    /// A product already in the cart is incremented and keeps its stored
    /// title, image and price.
    #[instrument(skip(self, item), fields(product_id = %item.id))]
    pub fn add_to_cart(&self, item: NewCartItem) -> u32 {
        let mut quantity = 0;
        self.mutate(|cart| {
            quantity = cart.add(item);
            true
        });
        debug!(quantity, "Added to cart");
        quantity
    }

    /// Increment a line and return its new quantity.
    ///
    /// Unknown products are ignored: nothing is created and nothing is
    /// persisted.
    #[instrument(skip(self, id), fields(product_id = %id))]
    pub fn increment(&self, id: &ProductId) -> Option<u32> {
        let mut quantity = None;
        self.mutate(|cart| {
            quantity = cart.increment(id);
            quantity.is_some()
        });

        match quantity {
            Some(quantity) => debug!(quantity, "Incremented"),
            None => debug!("Increment ignored, product not in cart"),
        }
        quantity
    }

    /// Decrement a line, removing it when it would drop below one.
    ///
    /// Returns the remaining quantity, or `None` if the line was removed.
    ///
    /// # Errors
    ///
    /// Returns `CartError::ItemNotFound` if the product is not in the cart.
    /// The cart is left unchanged and nothing is persisted.
    #[instrument(skip(self, id), fields(product_id = %id))]
    pub fn decrement(&self, id: &ProductId) -> Result<Option<u32>> {
        let mut outcome = Ok(None);
        self.mutate(|cart| {
            outcome = cart.decrement(id);
            outcome.is_ok()
        });

        match outcome {
            Ok(Some(quantity)) => debug!(quantity, "Decremented"),
            Ok(None) => debug!("Removed from cart"),
            Err(ref e) => warn!(error = %e, "Decrement of missing product"),
        }
        Ok(outcome?)
    }

    /// Remove every line. An already empty cart is not rewritten.
    #[instrument(skip(self))]
    pub fn clear(&self) {
        let cleared = self.mutate(|cart| {
            if cart.is_empty() {
                return false;
            }
            cart.clear();
            true
        });
        if cleared {
            debug!("Cart cleared");
        }
    }

    /// Wait until every mutation made so far has been written (or has failed).
    pub async fn flush(&self) {
        self.inner.queue.flush().await;
    }

    /// Apply `f` under the state lock; if it reports a change, notify
    /// subscribers and queue the new snapshot.
    fn mutate(&self, f: impl FnOnce(&mut Cart) -> bool) -> bool {
        let inner = &*self.inner;
        inner.state.send_if_modified(|cart| {
            if !f(cart) {
                return false;
            }
            let revision = inner.revision.fetch_add(1, Ordering::SeqCst) + 1;
            inner.queue.enqueue(revision, cart.clone());
            true
        })
    }
}
