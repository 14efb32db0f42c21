// lib.rs - Identity and secret-custody core

//! Turns user-controlled entropy into a recoverable BIP39 phrase, derives
//! a stable account address from it along one fixed path, and protects
//! the phrase at rest behind a user password with authenticated
//! encryption. Everything around this core (UI, peers, transports) only
//! ever sees an address and a pass/fail unlock result.

pub mod address;
pub mod auth;
pub mod errors;
pub mod keys;
pub mod mnemonic;
pub mod storage;
pub mod validation;
pub mod vault;

// Re-export common types
pub use address::Address;
pub use auth::{AuthMachine, AuthSession, AuthStatus};
pub use errors::{IdentityError, IdentityResult};
pub use keys::{KeyPair, ACCOUNT_DERIVATION_PATH};
pub use mnemonic::Mnemonic;
pub use storage::{AccountRecord, AccountStore, FileKvStore, KvStore, MemoryKvStore};
pub use validation::InputValidator;
pub use vault::SealedVault;
