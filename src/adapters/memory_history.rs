use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::domain::{DomainError, IdentityKey};
use crate::ports::HistoryPersistence;

/// Non-durable history persistence for sessions that should not touch disk.
#[derive(Default)]
pub struct InMemoryHistory {
    slots: RwLock<HashMap<String, Vec<IdentityKey>>>,
}

impl InMemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with pre-populated slots.
    pub fn with_slots<I, S>(slots: I) -> Self
    where
        I: IntoIterator<Item = (S, Vec<IdentityKey>)>,
        S: Into<String>,
    {
        Self {
            slots: RwLock::new(slots.into_iter().map(|(s, k)| (s.into(), k)).collect()),
        }
    }

    /// Current content of a slot.
    pub fn slot(&self, slot: &str) -> Vec<IdentityKey> {
        self.slots.read().get(slot).cloned().unwrap_or_default()
    }
}

#[async_trait]
impl HistoryPersistence for InMemoryHistory {
    async fn load(&self, slot: &str) -> Result<Vec<IdentityKey>, DomainError> {
        Ok(self.slot(slot))
    }

    async fn save(&self, slot: &str, keys: &[IdentityKey]) -> Result<(), DomainError> {
        self.slots.write().insert(slot.to_string(), keys.to_vec());
        Ok(())
    }
}
