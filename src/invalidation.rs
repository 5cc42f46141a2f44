//! "Invalidate view" events emitted after successful mutations.
//!
//! Delivery is fire-and-forget over a broadcast channel. Subscribers (the
//! live-refresh stream on the invoices page) may see an event before or after
//! a concurrent reader finishes rendering.

use tokio::sync::broadcast;
use tracing::debug;

const CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewInvalidated {
    pub path: String,
}

#[derive(Clone)]
pub struct Invalidator {
    tx: broadcast::Sender<ViewInvalidated>,
}

impl Invalidator {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ViewInvalidated> {
        self.tx.subscribe()
    }

    /// Tell every open view of `path` to discard what it shows.
    pub fn invalidate(&self, path: &str) {
        let event = ViewInvalidated {
            path: path.to_string(),
        };
        match self.tx.send(event) {
            Ok(receivers) => debug!(path, receivers, "view invalidated"),
            Err(_) => debug!(path, "view invalidated with no subscribers"),
        }
    }
}

impl Default for Invalidator {
    fn default() -> Self {
        Self::new()
    }
}
