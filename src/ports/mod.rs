pub mod catalog;
pub mod config;
pub mod constraint;
pub mod history;
pub mod search;

pub use catalog::{CatalogEvent, CatalogProvider};
pub use config::ConfigStore;
pub use constraint::{AsyncFnConstraint, Constraint, FnConstraint};
pub use history::HistoryPersistence;
pub use search::{ApproximateSearch, SearchHit};
