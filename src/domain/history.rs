use serde::{Deserialize, Serialize};

use super::identity::IdentityKey;

/// Which of the two history lists of an identity domain a store holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryKind {
    /// User-controlled favourites.
    Pinned,
    /// Recently used entries, bounded.
    Recent,
}

impl std::fmt::Display for HistoryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HistoryKind::Pinned => write!(f, "pinned"),
            HistoryKind::Recent => write!(f, "recent"),
        }
    }
}

/// Kind of identity a history list holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentityDomain {
    Boards,
    Ports,
}

impl IdentityDomain {
    /// Persistence slot name, e.g. "ports.recent".
    pub fn slot(&self, kind: HistoryKind) -> String {
        format!("{}.{}", self, kind)
    }
}

impl std::fmt::Display for IdentityDomain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IdentityDomain::Boards => write!(f, "boards"),
            IdentityDomain::Ports => write!(f, "ports"),
        }
    }
}

/// Result of adding a key to a history list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryChange {
    /// The key was already the most recent entry.
    Unchanged,
    /// The key was inserted or moved to the front.
    Changed,
}

/// Events emitted by a history store after a change has been persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum HistoryEvent {
    Changed {
        kind: HistoryKind,
        items: Vec<IdentityKey>,
    },
}

/// Ordered set of keys, most recent first, with an optional length bound.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryList {
    items: Vec<IdentityKey>,
    max_len: Option<usize>,
}

impl HistoryList {
    pub fn new(max_len: Option<usize>) -> Self {
        Self {
            items: Vec::new(),
            max_len,
        }
    }

    /// Build a list from persisted keys, dropping duplicates (first wins)
    /// and anything past the bound.
    pub fn from_keys(keys: impl IntoIterator<Item = IdentityKey>, max_len: Option<usize>) -> Self {
        let mut items: Vec<IdentityKey> = Vec::new();
        for key in keys {
            if !items.contains(&key) {
                items.push(key);
            }
        }
        let mut list = Self { items, max_len };
        list.truncate();
        list
    }

    /// Put `key` at the front. Existing entries are moved, not duplicated.
    pub fn push_front(&mut self, key: IdentityKey) -> HistoryChange {
        match self.items.iter().position(|k| *k == key) {
            Some(0) => HistoryChange::Unchanged,
            Some(index) => {
                let existing = self.items.remove(index);
                self.items.insert(0, existing);
                HistoryChange::Changed
            }
            None => {
                self.items.insert(0, key);
                self.truncate();
                HistoryChange::Changed
            }
        }
    }

    /// Remove `key`, returning whether it was present.
    pub fn remove(&mut self, key: &IdentityKey) -> bool {
        match self.items.iter().position(|k| k == key) {
            Some(index) => {
                self.items.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, key: &IdentityKey) -> bool {
        self.items.contains(key)
    }

    /// Copy of the entries, most recent first.
    pub fn items(&self) -> Vec<IdentityKey> {
        self.items.clone()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn max_len(&self) -> Option<usize> {
        self.max_len
    }

    fn truncate(&mut self) {
        if let Some(max) = self.max_len {
            self.items.truncate(max);
        }
    }
}
