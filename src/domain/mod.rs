pub mod candidate;
pub mod config;
pub mod error;
pub mod history;
pub mod identity;
pub mod matching;
pub mod presentation;

pub use candidate::{Board, Candidate, Port};
pub use config::{AppConfig, HistoryConfig, LoggingConfig, MatchingConfig};
pub use error::DomainError;
pub use history::{HistoryChange, HistoryEvent, HistoryKind, HistoryList, IdentityDomain};
pub use identity::{BoardIdentity, IdentityCodec, IdentityKey, PortIdentity};
pub use matching::{compact, normalize, MatchResult, MatchTier};
pub use presentation::{
    EmptyReason, ItemAction, ItemSource, Presentation, PresentationGroup, PresentationItem,
    Section,
};
