//! Chain-style address derivation: Keccak-256 over the public key's X‖Y
//! bytes, last 20 bytes kept, rendered as `0x` + 40 lowercase hex chars.

use std::fmt;

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha3::{Digest, Keccak256};

use crate::errors::{IdentityError, IdentityResult};
use crate::keys::KeyPair;
use crate::mnemonic::Mnemonic;

pub const ADDRESS_LEN: usize = 20;
const HEX_PREFIX: &str = "0x";

/// A 20-byte account address. Pure function of the mnemonic; carries no
/// randomness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address([u8; ADDRESS_LEN]);

impl Address {
    /// Derive the address for a recovery phrase along the fixed path.
    pub fn derive(mnemonic: &Mnemonic) -> IdentityResult<Self> {
        let keypair = KeyPair::derive(mnemonic)?;
        Ok(Self::from_public_key_material(
            keypair.public_key_material(),
        ))
    }

    /// Hash the 64-byte X‖Y public key material and keep the last 20
    /// bytes of the digest.
    pub(crate) fn from_public_key_material(material: &[u8]) -> Self {
        let digest = Keccak256::digest(material);
        let mut bytes = [0u8; ADDRESS_LEN];
        bytes.copy_from_slice(&digest[digest.len() - ADDRESS_LEN..]);
        Self(bytes)
    }

    /// Strict parse of the canonical form: `0x` followed by exactly 40
    /// lowercase hex characters.
    pub fn parse(s: &str) -> IdentityResult<Self> {
        let hex_part = s.strip_prefix(HEX_PREFIX).ok_or_else(|| {
            IdentityError::ValidationError("Address must carry the 0x prefix".to_string())
        })?;

        if hex_part.len() != ADDRESS_LEN * 2 {
            return Err(IdentityError::ValidationError(
                "Address must be 40 hex characters".to_string(),
            ));
        }

        if hex_part.chars().any(|c| c.is_ascii_uppercase()) {
            return Err(IdentityError::ValidationError(
                "Address hex must be lowercase".to_string(),
            ));
        }

        let decoded = hex::decode(hex_part).map_err(|_| {
            IdentityError::ValidationError("Address contains non-hex characters".to_string())
        })?;

        let mut bytes = [0u8; ADDRESS_LEN];
        bytes.copy_from_slice(&decoded);
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", HEX_PREFIX, hex::encode(self.0))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Address::parse(&raw).map_err(D::Error::custom)
    }
}
