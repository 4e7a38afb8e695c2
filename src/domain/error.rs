use thiserror::Error;

/// Domain-level errors for the device picker.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Failed to persist history '{slot}': {message}")]
    Persistence { slot: String, message: String },

    #[error("Constraint '{name}' failed: {message}")]
    Constraint { name: String, message: String },
}

impl DomainError {
    /// Wrap any error as a persistence failure for the given history slot.
    pub fn persistence(slot: &str, err: impl std::fmt::Display) -> Self {
        DomainError::Persistence {
            slot: slot.to_string(),
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for DomainError {
    fn from(err: std::io::Error) -> Self {
        DomainError::Io(err.to_string())
    }
}

impl From<toml::de::Error> for DomainError {
    fn from(err: toml::de::Error) -> Self {
        DomainError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for DomainError {
    fn from(err: toml::ser::Error) -> Self {
        DomainError::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persistence_error_message() {
        let err = DomainError::persistence("ports.pinned", "disk full");
        assert_eq!(
            err.to_string(),
            "Failed to persist history 'ports.pinned': disk full"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: DomainError = io.into();
        assert!(matches!(err, DomainError::Io(msg) if msg.contains("missing")));
    }
}
