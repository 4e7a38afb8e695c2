pub mod config_store;
pub mod edit_distance_search;
pub mod history_file;
pub mod memory_history;
pub mod static_catalog;

pub use config_store::TomlConfigStore;
pub use edit_distance_search::EditDistanceSearch;
pub use history_file::TomlHistoryFile;
pub use memory_history::InMemoryHistory;
pub use static_catalog::StaticCatalog;
