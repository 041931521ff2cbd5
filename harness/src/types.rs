//! Core vocabulary shared between the harness and environment implementations:
//! addresses, signing identities, and snapshot tokens.

use std::fmt;
use std::str::FromStr;

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Number of bytes in an [`Address`].
pub const ADDRESS_LEN: usize = 20;

/// A 20-byte account identifier, rendered as `0x`-prefixed hex.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address([u8; ADDRESS_LEN]);

impl Address {
    /// Wrap raw address bytes.
    pub const fn new(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }

    /// The zero address.
    pub const fn zero() -> Self {
        Self([0u8; ADDRESS_LEN])
    }

    /// Raw bytes of the address.
    pub const fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({self})")
    }
}

impl FromStr for Address {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let mut bytes = [0u8; ADDRESS_LEN];
        hex::decode_to_slice(s, &mut bytes)?;
        Ok(Self(bytes))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(DeError::custom)
    }
}

/// An opaque signing principal provisioned by the environment.
///
/// Identities are immutable once provisioned; consumers only read the
/// address-like identifier and hand the identity back to environment
/// operations that need an authorizer.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    address: Address,
}

impl Identity {
    /// Create an identity from its stable address.
    pub const fn new(address: Address) -> Self {
        Self { address }
    }

    /// The identity's stable address.
    pub const fn address(&self) -> Address {
        self.address
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.address.fmt(f)
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identity({})", self.address)
    }
}

/// Opaque token naming a point-in-time capture of environment state.
///
/// Tokens are minted by [`Environment::checkpoint`](crate::Environment) and
/// only have meaning to the environment that produced them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SnapshotToken(u64);

impl SnapshotToken {
    /// Wrap a raw snapshot id.
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// The raw snapshot id.
    pub const fn id(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SnapshotToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "snapshot#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(tag: u8) -> Address {
        let mut bytes = [0u8; ADDRESS_LEN];
        bytes[0] = tag;
        Address::new(bytes)
    }

    #[test]
    fn address_display_roundtrip() {
        let a = addr(0xAB);
        let shown = a.to_string();
        assert!(shown.starts_with("0x"));
        assert_eq!(shown.len(), 2 + ADDRESS_LEN * 2);
        assert_eq!(shown.parse::<Address>().unwrap(), a);
    }

    #[test]
    fn address_parse_rejects_bad_length() {
        assert!("0xdeadbeef".parse::<Address>().is_err());
    }

    #[test]
    fn address_serde_is_hex_string() {
        let a = addr(0x01);
        let json = serde_json::to_string(&a).unwrap();
        assert_eq!(json, format!("\"{a}\""));
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, a);
    }

    #[test]
    fn identity_exposes_address() {
        let a = addr(0x42);
        assert_eq!(Identity::new(a).address(), a);
    }
}
