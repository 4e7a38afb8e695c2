use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::history::IdentityDomain;
use super::identity::{
    BoardIdentity, BoardKeyCodec, IdentityCodec, IdentityKey, PortIdentity, PortKeyCodec,
};

/// An entity the live catalog reports and the picker can present.
///
/// Implementations define how they are keyed, how a stand-in is revived from
/// a key once the entity is gone, and which category they are grouped under.
pub trait Candidate: Clone + Send + Sync + 'static {
    /// History lists this kind of candidate is remembered in.
    const DOMAIN: IdentityDomain;

    /// Human-readable name, possibly empty.
    fn display_name(&self) -> &str;

    /// Grouping label used when listing live candidates.
    fn category(&self) -> String;

    /// Stable key derived from identifying fields only.
    fn identity_key(&self) -> IdentityKey;

    /// Rebuild a minimal, not-detected stand-in from a key.
    fn from_identity_key(key: &IdentityKey) -> Option<Self>;

    /// Whether the catalog currently reports this entity.
    fn is_detected(&self) -> bool;
}

/// A board definition, either installed/detected or remembered by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    /// Human-readable board name (e.g., "Arduino Uno").
    pub name: String,
    /// Fully-qualified board name (`vendor:arch:board[:options]`), if resolved.
    pub fqbn: Option<String>,
    /// Platform the board belongs to (`vendor:arch`). Derived from the FQBN
    /// when not set explicitly.
    pub platform_id: Option<String>,
    #[serde(default = "default_detected")]
    pub detected: bool,
}

fn default_detected() -> bool {
    true
}

impl Board {
    /// A board with a resolved FQBN.
    pub fn new(name: impl Into<String>, fqbn: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fqbn: Some(fqbn.into()),
            platform_id: None,
            detected: true,
        }
    }

    /// A board known only by name, e.g. from a sketch's saved settings.
    pub fn name_only(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fqbn: None,
            platform_id: None,
            detected: true,
        }
    }

    pub fn with_platform(mut self, platform_id: impl Into<String>) -> Self {
        self.platform_id = Some(platform_id.into());
        self
    }

    /// Whether the board carries a usable FQBN.
    pub fn has_fqbn(&self) -> bool {
        self.fqbn.as_deref().is_some_and(|f| !f.trim().is_empty())
    }

    /// Explicit platform id, or the first two FQBN segments.
    pub fn platform(&self) -> Option<String> {
        if let Some(platform) = &self.platform_id {
            return Some(platform.clone());
        }
        let fqbn = self.fqbn.as_deref()?;
        let mut parts = fqbn.split(':');
        match (parts.next(), parts.next()) {
            (Some(vendor), Some(arch)) if !vendor.is_empty() && !arch.is_empty() => {
                Some(format!("{}:{}", vendor, arch))
            }
            _ => None,
        }
    }

    pub fn identity(&self) -> BoardIdentity {
        match &self.fqbn {
            Some(fqbn) if !fqbn.trim().is_empty() => BoardIdentity::Fqbn(fqbn.clone()),
            _ => BoardIdentity::Name(self.name.clone()),
        }
    }
}

impl Candidate for Board {
    const DOMAIN: IdentityDomain = IdentityDomain::Boards;

    fn display_name(&self) -> &str {
        &self.name
    }

    fn category(&self) -> String {
        self.platform().unwrap_or_else(|| "unknown".to_string())
    }

    fn identity_key(&self) -> IdentityKey {
        BoardKeyCodec::encode(&self.identity())
    }

    fn from_identity_key(key: &IdentityKey) -> Option<Self> {
        let board = match BoardKeyCodec::decode(key)? {
            BoardIdentity::Fqbn(fqbn) => Board {
                name: fqbn.clone(),
                fqbn: Some(fqbn),
                platform_id: None,
                detected: false,
            },
            BoardIdentity::Name(name) => Board {
                name,
                fqbn: None,
                platform_id: None,
                detected: false,
            },
        };
        Some(board)
    }

    fn is_detected(&self) -> bool {
        self.detected
    }
}

/// A communication port reported by a discovery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Port {
    /// Protocol the port is reached over (e.g., "serial", "network").
    pub protocol: String,
    /// Address on that protocol (e.g., "/dev/ttyACM0", "192.168.1.7").
    pub address: String,
    /// Display label; the address is shown when empty.
    #[serde(default)]
    pub label: String,
    /// Human-readable protocol name used as the group heading.
    #[serde(default)]
    pub protocol_label: String,
    /// Hardware id reported by the discovery, used for matching only.
    #[serde(default)]
    pub hardware_id: Option<String>,
    /// Discovery-specific properties (vid, pid, serial number, ...).
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
    #[serde(default = "default_detected")]
    pub detected: bool,
}

impl Port {
    pub fn new(protocol: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            protocol: protocol.into(),
            address: address.into(),
            label: String::new(),
            protocol_label: String::new(),
            hardware_id: None,
            properties: BTreeMap::new(),
            detected: true,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_protocol_label(mut self, protocol_label: impl Into<String>) -> Self {
        self.protocol_label = protocol_label.into();
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn identity(&self) -> PortIdentity {
        PortIdentity::new(self.protocol.clone(), self.address.clone())
    }
}

impl Candidate for Port {
    const DOMAIN: IdentityDomain = IdentityDomain::Ports;

    fn display_name(&self) -> &str {
        if self.label.is_empty() {
            &self.address
        } else {
            &self.label
        }
    }

    fn category(&self) -> String {
        if self.protocol_label.is_empty() {
            self.protocol.clone()
        } else {
            self.protocol_label.clone()
        }
    }

    fn identity_key(&self) -> IdentityKey {
        PortKeyCodec::encode(&self.identity())
    }

    fn from_identity_key(key: &IdentityKey) -> Option<Self> {
        let identity = PortKeyCodec::decode(key)?;
        let mut port = Port::new(identity.protocol, identity.address);
        port.detected = false;
        Some(port)
    }

    fn is_detected(&self) -> bool {
        self.detected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_platform_derived_from_fqbn() {
        let board = Board::new("Arduino Uno", "arduino:avr:uno");
        assert_eq!(board.platform().as_deref(), Some("arduino:avr"));
        assert_eq!(board.category(), "arduino:avr");

        let explicit = Board::new("Uno", "arduino:avr:uno").with_platform("custom:avr");
        assert_eq!(explicit.platform().as_deref(), Some("custom:avr"));

        assert_eq!(Board::name_only("Mystery").platform(), None);
        assert_eq!(Board::new("Bad", "arduino").platform(), None);
    }

    #[test]
    fn test_board_key_ignores_display_name() {
        let a = Board::new("Arduino Uno", "arduino:avr:uno");
        let b = Board::new("Genuino Uno", "arduino:avr:uno");
        assert_eq!(a.identity_key(), b.identity_key());
    }

    #[test]
    fn test_blank_fqbn_is_name_only() {
        let mut board = Board::new("Arduino Uno", "  ");
        assert!(!board.has_fqbn());
        assert_eq!(board.identity(), BoardIdentity::Name("Arduino Uno".to_string()));
        board.fqbn = None;
        assert_eq!(board.identity_key(), Board::name_only("arduino uno").identity_key());
    }

    #[test]
    fn test_revived_board_is_not_detected() {
        let key = Board::new("Arduino Mega", "arduino:avr:mega").identity_key();
        let revived = Board::from_identity_key(&key).unwrap();
        assert!(!revived.is_detected());
        assert_eq!(revived.fqbn.as_deref(), Some("arduino:avr:mega"));
        assert_eq!(revived.identity_key(), key);
    }

    #[test]
    fn test_port_display_falls_back_to_address() {
        let port = Port::new("serial", "/dev/ttyACM0");
        assert_eq!(port.display_name(), "/dev/ttyACM0");
        assert_eq!(port.category(), "serial");

        let labelled = port
            .with_label("Arduino Uno (COM3)")
            .with_protocol_label("Serial ports");
        assert_eq!(labelled.display_name(), "Arduino Uno (COM3)");
        assert_eq!(labelled.category(), "Serial ports");
    }

    #[test]
    fn test_port_key_ignores_label_and_properties() {
        let a = Port::new("serial", "/dev/ttyACM0").with_label("Uno");
        let b = Port::new("serial", "/dev/ttyACM0")
            .with_label("Unknown")
            .with_property("vid", "0x2341");
        assert_eq!(a.identity_key(), b.identity_key());
        assert_ne!(a.identity_key(), Port::new("network", "/dev/ttyACM0").identity_key());
    }

    #[test]
    fn test_revived_port_is_not_detected() {
        let key = Port::new("network", "192.168.1.7").identity_key();
        let revived = Port::from_identity_key(&key).unwrap();
        assert!(!revived.is_detected());
        assert_eq!(revived.display_name(), "192.168.1.7");
        assert_eq!(revived.identity_key(), key);
    }
}
