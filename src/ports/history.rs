use async_trait::async_trait;

use crate::domain::{DomainError, IdentityKey};

/// Port for durable storage of history lists.
///
/// Each list lives in a named slot (e.g., "ports.recent"). The store only
/// needs to hold an ordered key list per slot.
#[async_trait]
pub trait HistoryPersistence: Send + Sync {
    /// Restore the keys stored in `slot`, or an empty list if none were saved.
    async fn load(&self, slot: &str) -> Result<Vec<IdentityKey>, DomainError>;

    /// Durably replace the keys stored in `slot`.
    async fn save(&self, slot: &str, keys: &[IdentityKey]) -> Result<(), DomainError>;
}
