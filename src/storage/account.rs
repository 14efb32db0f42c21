//! Persisted account record: the single on-disk source of truth binding
//! the encrypted mnemonic, its cipher parameters, the derived address,
//! and the display name.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::kv::KvStore;
use crate::address::Address;
use crate::errors::{IdentityError, IdentityResult};
use crate::vault::{SealedVault, NONCE_LEN, SALT_LEN};

/// Envelope version currently written and accepted.
pub const RECORD_VERSION: &str = "v1";
/// Fixed key the record lives under in the key-value store.
pub const ACCOUNT_RECORD_KEY: &str = "account";

/// The persisted account. Created once at signup, read at every start,
/// deleted wholesale on reset. Only `name` is ever mutated in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRecord {
    /// 24-byte AEAD nonce, lowercase hex (48 chars).
    pub nonce: String,
    /// Encrypted mnemonic ciphertext, lowercase hex.
    pub mnemonic: String,
    /// 16-byte Argon2id salt, lowercase hex (32 chars).
    pub salt: String,
    /// Address derived from the mnemonic at signup.
    pub address: Address,
    /// User-chosen display name.
    pub name: String,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

impl AccountRecord {
    pub fn new(vault: &SealedVault, address: Address, name: impl Into<String>) -> Self {
        Self {
            nonce: hex::encode(vault.nonce),
            mnemonic: hex::encode(&vault.ciphertext),
            salt: hex::encode(vault.kdf_salt),
            address,
            name: name.into(),
            created_at: Utc::now(),
        }
    }

    /// Rebuild the sealed vault from the hex fields. Malformed hex or a
    /// wrong-sized nonce/salt is reported as the same opaque failure a
    /// tampered ciphertext produces.
    pub fn sealed_vault(&self) -> IdentityResult<SealedVault> {
        let ciphertext = hex::decode(&self.mnemonic).map_err(|_| IdentityError::DecryptionFailed)?;
        let nonce: [u8; NONCE_LEN] = hex::decode(&self.nonce)
            .map_err(|_| IdentityError::DecryptionFailed)?
            .try_into()
            .map_err(|_| IdentityError::DecryptionFailed)?;
        let kdf_salt: [u8; SALT_LEN] = hex::decode(&self.salt)
            .map_err(|_| IdentityError::DecryptionFailed)?
            .try_into()
            .map_err(|_| IdentityError::DecryptionFailed)?;

        Ok(SealedVault {
            ciphertext,
            nonce,
            kdf_salt,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RecordEnvelope {
    version: String,
    data: AccountRecord,
}

/// Versioned persistence of the account record over an injected
/// [`KvStore`] handle.
pub struct AccountStore<S: KvStore> {
    store: S,
}

impl<S: KvStore> AccountStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn save(&self, record: &AccountRecord) -> IdentityResult<()> {
        let envelope = RecordEnvelope {
            version: RECORD_VERSION.to_string(),
            data: record.clone(),
        };
        let serialized = serde_json::to_string(&envelope)?;
        self.store.put(ACCOUNT_RECORD_KEY, &serialized)?;
        log::debug!("account record persisted");
        Ok(())
    }

    /// Load the record, if any. Destructive migration policy: an envelope
    /// with an unexpected version, or one that no longer decodes, is
    /// deleted and reported as absent rather than migrated.
    pub fn load(&self) -> IdentityResult<Option<AccountRecord>> {
        let Some(raw) = self.store.get(ACCOUNT_RECORD_KEY)? else {
            return Ok(None);
        };

        match decode_envelope(&raw) {
            Ok(record) => Ok(Some(record)),
            Err(err) => {
                log::warn!("discarding stale account record: {}", err);
                self.store.delete(ACCOUNT_RECORD_KEY)?;
                Ok(None)
            }
        }
    }

    pub fn clear(&self) -> IdentityResult<()> {
        self.store.delete(ACCOUNT_RECORD_KEY)
    }

    pub(crate) fn store(&self) -> &S {
        &self.store
    }
}

fn decode_envelope(raw: &str) -> IdentityResult<AccountRecord> {
    let envelope: RecordEnvelope = serde_json::from_str(raw)?;
    if envelope.version != RECORD_VERSION {
        return Err(IdentityError::RecordVersionMismatch(envelope.version));
    }
    Ok(envelope.data)
}
