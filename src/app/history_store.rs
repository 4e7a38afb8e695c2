use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

use crate::domain::{DomainError, HistoryChange, HistoryEvent, HistoryKind, HistoryList, IdentityKey};
use crate::ports::HistoryPersistence;

/// A persisted, observable history list (pinned or recent).
///
/// Mutations are serialized per store. Each one is persisted before it
/// becomes visible to readers, and the change event is sent after that, so
/// subscribers always observe durable state. A failed save leaves the list as
/// it was.
pub struct HistoryStore {
    kind: HistoryKind,
    slot: String,
    list: RwLock<HistoryList>,
    persistence: Arc<dyn HistoryPersistence>,
    mutation: Mutex<()>,
    event_sender: broadcast::Sender<HistoryEvent>,
}

impl HistoryStore {
    /// Open the store backed by `slot`, restoring whatever was saved there.
    ///
    /// Unreadable history is logged and replaced by an empty list; the next
    /// mutation overwrites it.
    pub async fn open(
        kind: HistoryKind,
        slot: impl Into<String>,
        max_len: Option<usize>,
        persistence: Arc<dyn HistoryPersistence>,
    ) -> Self {
        let slot = slot.into();
        let list = match persistence.load(&slot).await {
            Ok(keys) => HistoryList::from_keys(keys, max_len),
            Err(e) => {
                warn!(slot = %slot, error = %e, "Failed to load history, starting empty");
                HistoryList::new(max_len)
            }
        };
        let (event_sender, _) = broadcast::channel(32);

        info!(slot = %slot, %kind, count = list.len(), ?max_len, "HistoryStore opened");

        Self {
            kind,
            slot,
            list: RwLock::new(list),
            persistence,
            mutation: Mutex::new(()),
            event_sender,
        }
    }

    pub fn kind(&self) -> HistoryKind {
        self.kind
    }

    pub fn slot(&self) -> &str {
        &self.slot
    }

    /// Copy of the keys, most recent first.
    pub fn items(&self) -> Vec<IdentityKey> {
        self.list.read().items()
    }

    pub fn contains(&self, key: &IdentityKey) -> bool {
        self.list.read().contains(key)
    }

    /// Subscribe to change events.
    pub fn subscribe(&self) -> broadcast::Receiver<HistoryEvent> {
        self.event_sender.subscribe()
    }

    /// Move `key` to the front, inserting it if new.
    ///
    /// Re-adding the current front entry is a no-op: nothing is saved and no
    /// event is sent.
    pub async fn add(&self, key: IdentityKey) -> Result<HistoryChange, DomainError> {
        let _guard = self.mutation.lock().await;

        let mut next = self.list.read().clone();
        if next.push_front(key.clone()) == HistoryChange::Unchanged {
            debug!(slot = %self.slot, key = %key, "Key already most recent");
            return Ok(HistoryChange::Unchanged);
        }

        self.commit(next).await?;
        debug!(slot = %self.slot, key = %key, "Key added to history");
        Ok(HistoryChange::Changed)
    }

    /// Remove `key`, returning whether it was present.
    pub async fn remove(&self, key: &IdentityKey) -> Result<bool, DomainError> {
        let _guard = self.mutation.lock().await;

        let mut next = self.list.read().clone();
        if !next.remove(key) {
            return Ok(false);
        }

        self.commit(next).await?;
        debug!(slot = %self.slot, key = %key, "Key removed from history");
        Ok(true)
    }

    async fn commit(&self, next: HistoryList) -> Result<(), DomainError> {
        let items = next.items();
        self.persistence
            .save(&self.slot, &items)
            .await
            .map_err(|e| match e {
                DomainError::Persistence { .. } => e,
                other => DomainError::persistence(&self.slot, other),
            })?;

        *self.list.write() = next;
        let _ = self.event_sender.send(HistoryEvent::Changed {
            kind: self.kind,
            items,
        });
        Ok(())
    }
}
