//! Deterministic key derivation from the recovery phrase.
//!
//! The phrase is stretched into a 64-byte BIP39 seed, the seed is walked
//! down the single hardcoded BIP44 path, and the resulting secp256k1 node
//! yields the account keypair. Every account this wallet manages lives at
//! the same path; there is no multi-account tree.

use std::str::FromStr;

use bip32::{DerivationPath, XPrv};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::errors::{IdentityError, IdentityResult};
use crate::mnemonic::{Mnemonic, SUPPORTED_WORD_COUNTS};

/// The one derivation path used by this wallet: account 0, external
/// chain, index 0.
pub const ACCOUNT_DERIVATION_PATH: &str = "m/44'/60'/0'/0/0";

/// Uncompressed SEC1 public key: 0x04 prefix + 32-byte X + 32-byte Y.
pub const PUBLIC_KEY_LEN: usize = 65;
pub const PRIVATE_KEY_LEN: usize = 32;

/// Stretch a validated phrase into the 64-byte BIP39 seed.
pub fn mnemonic_to_seed(mnemonic: &Mnemonic) -> Zeroizing<[u8; 64]> {
    mnemonic.to_seed()
}

/// Derive the master node of the HD key tree from a seed.
pub fn derive_master_key(seed: &[u8]) -> IdentityResult<XPrv> {
    XPrv::new(seed).map_err(|e| IdentityError::KeyDerivationFailed(format!("master key: {}", e)))
}

/// Walk a slash-separated path of hardened/non-hardened indices from the
/// seed. Fails with a typed error if any intermediate node is not yielded
/// by the HD algorithm.
pub fn derive_child(seed: &[u8], path: &str) -> IdentityResult<XPrv> {
    let path = DerivationPath::from_str(path)
        .map_err(|e| IdentityError::KeyDerivationFailed(format!("invalid path: {}", e)))?;
    XPrv::derive_from_path(seed, &path)
        .map_err(|e| IdentityError::KeyDerivationFailed(format!("HD derivation: {}", e)))
}

/// The fixed-path account keypair. Private key material is zeroized on
/// drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct KeyPair {
    public_key: [u8; PUBLIC_KEY_LEN],
    private_key: [u8; PRIVATE_KEY_LEN],
}

impl KeyPair {
    /// Derive the account keypair from a recovery phrase along
    /// [`ACCOUNT_DERIVATION_PATH`].
    pub fn derive(mnemonic: &Mnemonic) -> IdentityResult<Self> {
        if !SUPPORTED_WORD_COUNTS.contains(&mnemonic.word_count()) {
            return Err(IdentityError::InvalidMnemonicLength(mnemonic.word_count()));
        }

        let seed = mnemonic.to_seed();
        let node = derive_child(&seed[..], ACCOUNT_DERIVATION_PATH)?;

        let mut private_key = [0u8; PRIVATE_KEY_LEN];
        private_key.copy_from_slice(&node.private_key().to_bytes());

        let encoded = node.private_key().verifying_key().to_encoded_point(false);
        let point_bytes = encoded.as_bytes();
        if point_bytes.len() != PUBLIC_KEY_LEN || point_bytes[0] != 0x04 {
            private_key.zeroize();
            return Err(IdentityError::KeyDerivationFailed(
                "public key is not an uncompressed SEC1 point".to_string(),
            ));
        }
        let mut public_key = [0u8; PUBLIC_KEY_LEN];
        public_key.copy_from_slice(point_bytes);

        Ok(Self {
            public_key,
            private_key,
        })
    }

    pub fn public_key(&self) -> &[u8; PUBLIC_KEY_LEN] {
        &self.public_key
    }

    pub fn private_key(&self) -> &[u8; PRIVATE_KEY_LEN] {
        &self.private_key
    }

    /// The 64-byte X‖Y portion of the public key, prefix byte stripped.
    /// This is the input to address derivation.
    pub fn public_key_material(&self) -> &[u8] {
        &self.public_key[1..]
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_key", &hex::encode(self.public_key))
            .field("private_key", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KNOWN_PHRASE: &str =
        "pioneer million sorry pipe cry garden private olive give apology inch foster";

    #[test]
    fn derivation_is_deterministic() {
        let mnemonic = Mnemonic::parse(KNOWN_PHRASE).unwrap();
        let first = KeyPair::derive(&mnemonic).unwrap();
        let second = KeyPair::derive(&mnemonic).unwrap();
        assert_eq!(first.public_key(), second.public_key());
        assert_eq!(first.private_key(), second.private_key());
    }

    #[test]
    fn public_key_is_uncompressed_sec1() {
        let mnemonic = Mnemonic::generate().unwrap();
        let keypair = KeyPair::derive(&mnemonic).unwrap();
        assert_eq!(keypair.public_key().len(), PUBLIC_KEY_LEN);
        assert_eq!(keypair.public_key()[0], 0x04);
        assert_eq!(keypair.public_key_material().len(), 64);
    }

    #[test]
    fn different_phrases_yield_different_keys() {
        let first = KeyPair::derive(&Mnemonic::generate().unwrap()).unwrap();
        let second = KeyPair::derive(&Mnemonic::generate().unwrap()).unwrap();
        assert_ne!(first.public_key(), second.public_key());
    }

    #[test]
    fn master_and_child_derivation_are_exposed() {
        let mnemonic = Mnemonic::parse(KNOWN_PHRASE).unwrap();
        let seed = mnemonic_to_seed(&mnemonic);

        let master = derive_master_key(&seed[..]).unwrap();
        let child = derive_child(&seed[..], ACCOUNT_DERIVATION_PATH).unwrap();
        assert_ne!(
            master.private_key().to_bytes(),
            child.private_key().to_bytes()
        );
    }

    #[test]
    fn malformed_path_is_a_typed_failure() {
        let seed = [0u8; 64];
        let err = derive_child(&seed, "m/not-a-path").unwrap_err();
        assert!(matches!(err, IdentityError::KeyDerivationFailed(_)));
    }

    #[test]
    fn debug_redacts_private_key() {
        let keypair = KeyPair::derive(&Mnemonic::generate().unwrap()).unwrap();
        let rendered = format!("{:?}", keypair);
        assert!(rendered.contains("<redacted>"));
        assert!(!rendered.contains(&hex::encode(keypair.private_key())));
    }
}
