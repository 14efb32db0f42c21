use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum IdentityError {
    // Mnemonic codec errors
    InvalidMnemonicLength(usize),
    UnknownWord(String),
    InvalidChecksum,

    // Key derivation errors
    KeyDerivationFailed(String),

    // Vault errors. Deliberately opaque: wrong password and corrupted
    // ciphertext must be indistinguishable to the caller.
    DecryptionFailed,

    // Record store errors
    RecordVersionMismatch(String),
    StorageError(String),

    // State-guard violations
    AlreadyRegistered,
    AlreadyAuthenticated,
    NotUnlockable,

    // Validation and internal crypto plumbing
    ValidationError(String),
    CryptoError(String),
}

impl fmt::Display for IdentityError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            IdentityError::InvalidMnemonicLength(words) => {
                write!(f, "Invalid mnemonic length: {} words", words)
            }
            IdentityError::UnknownWord(word) => write!(f, "Unknown mnemonic word: {}", word),
            IdentityError::InvalidChecksum => write!(f, "Mnemonic checksum is invalid"),

            IdentityError::KeyDerivationFailed(msg) => write!(f, "Key derivation failed: {}", msg),

            IdentityError::DecryptionFailed => {
                write!(f, "Could not unlock the account with the provided password")
            }

            IdentityError::RecordVersionMismatch(version) => {
                write!(f, "Unsupported account record version: {}", version)
            }
            IdentityError::StorageError(msg) => write!(f, "Storage error: {}", msg),

            IdentityError::AlreadyRegistered => write!(f, "An account is already registered"),
            IdentityError::AlreadyAuthenticated => write!(f, "Account is already unlocked"),
            IdentityError::NotUnlockable => write!(f, "No account available to unlock"),

            IdentityError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            IdentityError::CryptoError(msg) => write!(f, "Cryptographic error: {}", msg),
        }
    }
}

impl std::error::Error for IdentityError {}

pub type IdentityResult<T> = Result<T, IdentityError>;

// Conversion helpers
impl From<std::io::Error> for IdentityError {
    fn from(error: std::io::Error) -> Self {
        IdentityError::StorageError(error.to_string())
    }
}

impl From<serde_json::Error> for IdentityError {
    fn from(error: serde_json::Error) -> Self {
        IdentityError::StorageError(format!("JSON error: {}", error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decryption_failure_message_is_opaque() {
        let message = IdentityError::DecryptionFailed.to_string();
        assert!(!message.to_lowercase().contains("tag"));
        assert!(!message.to_lowercase().contains("corrupt"));
        assert!(!message.to_lowercase().contains("nonce"));
    }

    #[test]
    fn io_errors_map_to_storage_errors() {
        let io_error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "locked");
        let err: IdentityError = io_error.into();
        assert!(matches!(err, IdentityError::StorageError(_)));
    }
}
