pub mod constraints;
pub mod controller;
pub mod history_store;
pub mod latest;
pub mod matcher;
pub mod reconciler;

pub use constraints::ConstraintSet;
pub use controller::PickerController;
pub use history_store::HistoryStore;
pub use latest::{Generation, LatestWins};
pub use matcher::{Matched, NameMatcher};
pub use reconciler::Reconciler;
