use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use tracing::warn;

use super::error::DomainError;
use super::matching::normalize;

/// Opaque, stable key identifying a board or port.
///
/// Keys are the unit of equality for history membership and are what gets
/// persisted. They never contain transient display data.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentityKey(String);

impl IdentityKey {
    /// Wrap a raw key string, e.g. one restored from persistence.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reversible encoding of a structured identity into an [`IdentityKey`].
///
/// `encode` must be pure and collision-free for distinct identities;
/// `decode` inverts it and returns `None` for anything it did not produce.
pub trait IdentityCodec {
    type Identity;

    fn encode(identity: &Self::Identity) -> IdentityKey;

    fn decode(key: &IdentityKey) -> Option<Self::Identity>;
}

/// Identifying fields of a port: the protocol and the address on it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PortIdentity {
    pub protocol: String,
    pub address: String,
}

impl PortIdentity {
    pub fn new(protocol: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            protocol: protocol.into(),
            address: address.into(),
        }
    }
}

/// Identifying fields of a board.
///
/// A board with a fully-qualified board name is identified by it alone.
/// Boards known only by name are keyed by their normalized name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoardIdentity {
    Fqbn(String),
    Name(String),
}

/// JSON codec: serde emits fields in declaration order and escapes string
/// contents, so distinct identities always produce distinct keys.
pub struct JsonKeyCodec<T>(std::marker::PhantomData<T>);

impl<T> IdentityCodec for JsonKeyCodec<T>
where
    T: Serialize + DeserializeOwned,
{
    type Identity = T;

    /// Identities that JSON cannot represent (e.g. maps with non-string
    /// keys) encode to the empty key, which never decodes.
    fn encode(identity: &T) -> IdentityKey {
        match serde_json::to_string(identity) {
            Ok(raw) => IdentityKey(raw),
            Err(e) => {
                let err = DomainError::from(e);
                warn!(error = %err, "Failed to encode identity key");
                IdentityKey(String::new())
            }
        }
    }

    fn decode(key: &IdentityKey) -> Option<T> {
        serde_json::from_str(key.as_str()).ok()
    }
}

pub type PortKeyCodec = JsonKeyCodec<PortIdentity>;

/// Board keys normalize the name variant so cosmetic renames keep the key.
pub struct BoardKeyCodec;

impl IdentityCodec for BoardKeyCodec {
    type Identity = BoardIdentity;

    fn encode(identity: &BoardIdentity) -> IdentityKey {
        let canonical = match identity {
            BoardIdentity::Fqbn(fqbn) => BoardIdentity::Fqbn(fqbn.trim().to_string()),
            BoardIdentity::Name(name) => BoardIdentity::Name(normalize(name)),
        };
        JsonKeyCodec::<BoardIdentity>::encode(&canonical)
    }

    fn decode(key: &IdentityKey) -> Option<BoardIdentity> {
        match JsonKeyCodec::<BoardIdentity>::decode(key)? {
            BoardIdentity::Fqbn(fqbn) if fqbn.is_empty() => None,
            BoardIdentity::Name(name) if name.is_empty() => None,
            identity => Some(identity),
        }
    }
}
