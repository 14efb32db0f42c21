//! Password vault for the recovery phrase.
//!
//! The password is stretched with Argon2id (fresh random per-vault salt,
//! fixed domain-separation secret) into a 256-bit key, and the space-joined
//! phrase is sealed with XChaCha20-Poly1305 under a fresh random 24-byte
//! nonce. Nonce reuse under the same key breaks confidentiality, so a new
//! nonce is drawn on every seal.
//!
//! Every failure on the open path collapses into the single opaque
//! [`IdentityError::DecryptionFailed`]: a caller cannot tell a wrong
//! password from a corrupted ciphertext, nonce, or salt.

use argon2::{Algorithm, Argon2, Params, Version};
use chacha20poly1305::aead::{Aead, KeyInit};
use chacha20poly1305::{XChaCha20Poly1305, XNonce};
use rand::rngs::OsRng;
use rand::RngCore;
use secrecy::{ExposeSecret, SecretString};
use zeroize::Zeroizing;

use crate::errors::{IdentityError, IdentityResult};
use crate::mnemonic::Mnemonic;

pub const NONCE_LEN: usize = 24;
pub const SALT_LEN: usize = 16;
const KEY_LEN: usize = 32;

const KDF_DOMAIN: &[u8] = b"keyhaven.vault.key.v1";
const KDF_M_COST_KIB: u32 = 19_456;
const KDF_T_COST: u32 = 2;
const KDF_P_COST: u32 = 1;

/// An encrypted recovery phrase together with the public parameters
/// needed to open it again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedVault {
    /// XChaCha20-Poly1305 ciphertext with the authentication tag appended.
    pub ciphertext: Vec<u8>,
    /// Random per-encryption nonce.
    pub nonce: [u8; NONCE_LEN],
    /// Random per-vault Argon2id salt.
    pub kdf_salt: [u8; SALT_LEN],
}

/// Encrypt a recovery phrase under a password.
pub fn seal(mnemonic: &Mnemonic, password: &SecretString) -> IdentityResult<SealedVault> {
    let mut rng = OsRng;
    let mut nonce = [0u8; NONCE_LEN];
    rng.fill_bytes(&mut nonce);
    let mut kdf_salt = [0u8; SALT_LEN];
    rng.fill_bytes(&mut kdf_salt);

    let key = derive_vault_key(password, &kdf_salt)?;
    let cipher = XChaCha20Poly1305::new_from_slice(key.as_ref())
        .map_err(|e| IdentityError::CryptoError(format!("Invalid encryption key: {}", e)))?;

    let plaintext = mnemonic.phrase();
    let ciphertext = cipher
        .encrypt(XNonce::from_slice(&nonce), plaintext.as_bytes())
        .map_err(|_| IdentityError::CryptoError("Encryption failure".to_string()))?;

    Ok(SealedVault {
        ciphertext,
        nonce,
        kdf_salt,
    })
}

/// Decrypt a sealed vault. Any tag mismatch, malformed plaintext, or KDF
/// failure surfaces as the one opaque error.
pub fn open(vault: &SealedVault, password: &SecretString) -> IdentityResult<Mnemonic> {
    let key =
        derive_vault_key(password, &vault.kdf_salt).map_err(|_| IdentityError::DecryptionFailed)?;
    let cipher = XChaCha20Poly1305::new_from_slice(key.as_ref())
        .map_err(|_| IdentityError::DecryptionFailed)?;

    let plaintext = Zeroizing::new(
        cipher
            .decrypt(XNonce::from_slice(&vault.nonce), vault.ciphertext.as_slice())
            .map_err(|_| IdentityError::DecryptionFailed)?,
    );

    let phrase =
        std::str::from_utf8(&plaintext).map_err(|_| IdentityError::DecryptionFailed)?;
    Mnemonic::parse(phrase).map_err(|_| IdentityError::DecryptionFailed)
}

/// Seal off the calling thread; the slow KDF runs on the blocking pool
/// and the caller awaits a single result.
pub async fn seal_async(mnemonic: Mnemonic, password: SecretString) -> IdentityResult<SealedVault> {
    tokio::task::spawn_blocking(move || seal(&mnemonic, &password))
        .await
        .map_err(|e| IdentityError::CryptoError(format!("Vault worker failed: {}", e)))?
}

/// Open off the calling thread. See [`seal_async`].
pub async fn open_async(vault: SealedVault, password: SecretString) -> IdentityResult<Mnemonic> {
    tokio::task::spawn_blocking(move || open(&vault, &password))
        .await
        .map_err(|e| IdentityError::CryptoError(format!("Vault worker failed: {}", e)))?
}

fn derive_vault_key(
    password: &SecretString,
    salt: &[u8; SALT_LEN],
) -> IdentityResult<Zeroizing<[u8; KEY_LEN]>> {
    let params = Params::new(KDF_M_COST_KIB, KDF_T_COST, KDF_P_COST, Some(KEY_LEN))
        .map_err(|e| IdentityError::CryptoError(format!("Invalid Argon2 params: {}", e)))?;

    let argon2 = Argon2::new_with_secret(KDF_DOMAIN, Algorithm::Argon2id, Version::V0x13, params)
        .map_err(|e| IdentityError::CryptoError(format!("Failed to init Argon2: {}", e)))?;

    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    argon2
        .hash_password_into(password.expose_secret().as_bytes(), salt, key.as_mut())
        .map_err(|e| IdentityError::CryptoError(format!("KDF failed: {}", e)))?;
    Ok(key)
}
