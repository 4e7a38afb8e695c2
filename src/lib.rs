#![forbid(unsafe_code)]

//! Device picker core: matches user-visible names to known boards, keeps
//! pinned and recent history per identity domain, and merges history with
//! the live catalog into an ordered, grouped picker list.

pub mod adapters;
pub mod app;
pub mod domain;
pub mod infrastructure;
pub mod ports;

pub use adapters::{EditDistanceSearch, InMemoryHistory, StaticCatalog, TomlConfigStore, TomlHistoryFile};
pub use app::{ConstraintSet, LatestWins, NameMatcher, PickerController, Reconciler};
pub use domain::{
    AppConfig, Board, Candidate, DomainError, IdentityDomain, IdentityKey, ItemAction, Port,
    Presentation, Section,
};
pub use ports::{AsyncFnConstraint, Constraint, FnConstraint};
