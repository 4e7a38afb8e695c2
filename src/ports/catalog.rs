use tokio::sync::broadcast;

use crate::domain::Candidate;

/// Notification that the live catalog changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogEvent {
    /// A fresh snapshot is available.
    Refreshed,
}

/// Port for the provider of currently detected boards or ports.
///
/// The picker never mutates the catalog; it reads a snapshot per
/// reconciliation and listens for refresh notifications.
pub trait CatalogProvider<C: Candidate>: Send + Sync {
    /// Candidates currently reported, in provider order.
    fn snapshot(&self) -> Vec<C>;

    /// Subscribe to catalog change notifications.
    fn subscribe(&self) -> broadcast::Receiver<CatalogEvent>;
}
