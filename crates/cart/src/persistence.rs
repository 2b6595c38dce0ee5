//! Hydration and write-through persistence for the cart.
//!
//! Writes go through a single background task that owns an unbounded FIFO
//! queue. Each mutation enqueues a snapshot of the cart it produced, and the
//! writer awaits every `set` before taking the next one, so the store always
//! ends up holding the most recent snapshot. Failed writes are not retried:
//! they are logged and broadcast, and the next mutation writes the whole cart
//! again.

use std::sync::Arc;

use go_marketplace_core::{Cart, CartItem};
use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::error::PersistenceError;
use crate::store::KeyValueStore;

/// Outcome of loading the persisted cart at startup.
#[derive(Debug, Clone)]
pub enum Hydration {
    /// Nothing was stored; the cart starts empty.
    Empty,
    /// The stored cart was loaded.
    Restored {
        /// Number of lines restored.
        items: usize,
    },
    /// The stored cart could not be read or parsed; the cart starts empty.
    Discarded(Arc<PersistenceError>),
}

impl Hydration {
    /// Whether stored data was thrown away.
    #[must_use]
    pub const fn is_discarded(&self) -> bool {
        matches!(self, Self::Discarded(_))
    }
}

/// Result of a background write, broadcast to subscribers.
#[derive(Debug, Clone)]
pub enum PersistenceEvent {
    /// The snapshot produced by mutation `revision` was stored.
    Written { revision: u64, items: usize },
    /// The snapshot produced by mutation `revision` was dropped.
    WriteFailed {
        revision: u64,
        error: Arc<PersistenceError>,
    },
}

/// Parse a stored cart value.
///
/// # Errors
///
/// Returns `PersistenceError::Decode` if the value is not a list of cart
/// items, or `PersistenceError::Invalid` if the list breaks a cart invariant.
pub fn decode_cart(raw: &str) -> Result<Cart, PersistenceError> {
    let items: Vec<CartItem> = serde_json::from_str(raw).map_err(PersistenceError::Decode)?;
    Ok(Cart::from_items(items)?)
}

/// Serialize a cart for storage.
///
/// # Errors
///
/// Returns `PersistenceError::Encode` if serialization fails.
pub fn encode_cart(cart: &Cart) -> Result<String, PersistenceError> {
    serde_json::to_string(cart.items()).map_err(PersistenceError::Encode)
}

/// Read the cart stored under `key`.
///
/// Never fails: unreadable or malformed data yields an empty cart and a
/// [`Hydration::Discarded`] outcome.
pub(crate) async fn hydrate(store: &dyn KeyValueStore, key: &str) -> (Cart, Hydration) {
    let loaded = match store.get(key).await {
        Ok(Some(raw)) => decode_cart(&raw).map(Some),
        Ok(None) => Ok(None),
        Err(e) => Err(PersistenceError::Read(e)),
    };

    match loaded {
        Ok(Some(cart)) => {
            info!(key, items = cart.len(), "Cart restored from storage");
            let items = cart.len();
            (cart, Hydration::Restored { items })
        }
        Ok(None) => {
            info!(key, "No stored cart, starting empty");
            (Cart::new(), Hydration::Empty)
        }
        Err(e) => {
            warn!(key, error = %e, "Discarding stored cart, starting empty");
            (Cart::new(), Hydration::Discarded(Arc::new(e)))
        }
    }
}

#[derive(Debug)]
enum Command {
    Write { revision: u64, cart: Cart },
    Flush(oneshot::Sender<()>),
}

/// Handle to the single-writer persistence queue.
#[derive(Debug)]
pub(crate) struct PersistenceQueue {
    tx: mpsc::UnboundedSender<Command>,
}

impl PersistenceQueue {
    /// Start the writer task on the current tokio runtime.
    ///
    /// The task exits once the queue handle is dropped and every queued
    /// write has been attempted.
    pub(crate) fn spawn(
        store: Arc<dyn KeyValueStore>,
        key: String,
        events: broadcast::Sender<PersistenceEvent>,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run_writer(store, key, rx, events));
        Self { tx }
    }

    /// Queue a snapshot for writing. Never blocks.
    pub(crate) fn enqueue(&self, revision: u64, cart: Cart) {
        if self.tx.send(Command::Write { revision, cart }).is_err() {
            warn!(revision, "Persistence writer stopped, dropping cart snapshot");
        }
    }

    /// Wait until every write queued before this call has been attempted.
    pub(crate) async fn flush(&self) {
        let (done_tx, done_rx) = oneshot::channel();
        if self.tx.send(Command::Flush(done_tx)).is_err() {
            return;
        }
        // A dropped sender means the writer is gone; nothing left to wait for.
        let _ = done_rx.await;
    }
}

async fn run_writer(
    store: Arc<dyn KeyValueStore>,
    key: String,
    mut rx: mpsc::UnboundedReceiver<Command>,
    events: broadcast::Sender<PersistenceEvent>,
) {
    debug!(key, "Persistence writer started");

    while let Some(command) = rx.recv().await {
        match command {
            Command::Write { revision, cart } => {
                let event = match write(store.as_ref(), &key, &cart).await {
                    Ok(()) => {
                        debug!(revision, items = cart.len(), "Cart persisted");
                        PersistenceEvent::Written {
                            revision,
                            items: cart.len(),
                        }
                    }
                    Err(e) => {
                        warn!(revision, error = %e, "Cart write failed, dropping snapshot");
                        PersistenceEvent::WriteFailed {
                            revision,
                            error: Arc::new(e),
                        }
                    }
                };
                // No subscribers is fine.
                let _ = events.send(event);
            }
            Command::Flush(done) => {
                let _ = done.send(());
            }
        }
    }

    debug!(key, "Persistence writer stopped");
}

async fn write(store: &dyn KeyValueStore, key: &str, cart: &Cart) -> Result<(), PersistenceError> {
    let value = encode_cart(cart)?;
    store.set(key, value).await.map_err(PersistenceError::Write)
}
