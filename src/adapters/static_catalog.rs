use parking_lot::RwLock;
use tokio::sync::broadcast;
use tracing::debug;

use crate::domain::Candidate;
use crate::ports::{CatalogEvent, CatalogProvider};

/// Catalog fed by the host: each `replace` installs a new snapshot and
/// notifies subscribers.
pub struct StaticCatalog<C> {
    items: RwLock<Vec<C>>,
    event_sender: broadcast::Sender<CatalogEvent>,
}

impl<C: Candidate> StaticCatalog<C> {
    pub fn new(items: Vec<C>) -> Self {
        let (event_sender, _) = broadcast::channel(16);
        Self {
            items: RwLock::new(items),
            event_sender,
        }
    }

    /// Swap in a fresh snapshot.
    pub fn replace(&self, items: Vec<C>) {
        let count = items.len();
        *self.items.write() = items;
        debug!(count, "Catalog snapshot replaced");
        let _ = self.event_sender.send(CatalogEvent::Refreshed);
    }
}

impl<C: Candidate> Default for StaticCatalog<C> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<C: Candidate> CatalogProvider<C> for StaticCatalog<C> {
    fn snapshot(&self) -> Vec<C> {
        self.items.read().clone()
    }

    fn subscribe(&self) -> broadcast::Receiver<CatalogEvent> {
        self.event_sender.subscribe()
    }
}
