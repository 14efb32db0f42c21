//! Signup / unlock / reset orchestration.
//!
//! A closed state enum with an exhaustive transition function replaces the
//! loosely-typed action dispatch this flow is usually built from. The
//! persisted [`AccountRecord`] is the only source of truth; the in-memory
//! [`AuthSession`] is a disposable cache rebuilt from it on every
//! [`AuthMachine::init`].

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::errors::{IdentityError, IdentityResult};
use crate::mnemonic::Mnemonic;
use crate::storage::{AccountRecord, AccountStore, KvStore};
use crate::validation::InputValidator;
use crate::vault;

/// The one message shown for every unlock failure. Wrong password and
/// corrupted record are indistinguishable to the caller.
const UNLOCK_FAILURE_MESSAGE: &str = "Could not unlock the account with the provided password";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AuthStatus {
    #[default]
    Unregistered,
    Unauthenticated,
    Authenticated,
}

/// Process-local session state. Never persisted, never the source of
/// truth for the address.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AuthSession {
    pub status: AuthStatus,
    pub address: Option<Address>,
    pub name: Option<String>,
    pub last_error: Option<String>,
}

/// Drives the account lifecycle over an injected storage handle.
///
/// ```text
/// Unregistered --signup--> Unauthenticated --unlock--> Authenticated
///      ^                        ^    |                      |
///      |                        |    +-------- lock --------+
///      +--------- reset --------+---------------------------+
/// ```
pub struct AuthMachine<S: KvStore> {
    records: AccountStore<S>,
    validator: InputValidator,
    session: AuthSession,
}

impl<S: KvStore> AuthMachine<S> {
    pub fn new(store: S) -> IdentityResult<Self> {
        Ok(Self {
            records: AccountStore::new(store),
            validator: InputValidator::new()?,
            session: AuthSession::default(),
        })
    }

    pub fn session(&self) -> &AuthSession {
        &self.session
    }

    pub fn status(&self) -> AuthStatus {
        self.session.status
    }

    /// Rebuild the session from the persisted record. Idempotent: calling
    /// twice without intervening writes yields the same status.
    pub fn init(&mut self) -> IdentityResult<AuthStatus> {
        self.session = match self.records.load()? {
            Some(record) => AuthSession {
                status: AuthStatus::Unauthenticated,
                address: Some(record.address),
                name: Some(record.name),
                last_error: None,
            },
            None => AuthSession::default(),
        };
        log::info!("auth session initialized: {:?}", self.session.status);
        Ok(self.session.status)
    }

    /// Register a new account: derive the address, seal the mnemonic,
    /// persist the record. Lands on the unlock step (`Unauthenticated`)
    /// rather than auto-login, so the first unlock always exercises the
    /// same path as every later one.
    pub fn signup(
        &mut self,
        mnemonic: &Mnemonic,
        password: &SecretString,
        name: &str,
    ) -> IdentityResult<Address> {
        if self.records.load()?.is_some() {
            return Err(IdentityError::AlreadyRegistered);
        }
        self.validator.validate_display_name(name)?;
        self.validator.validate_password(password)?;

        let address = Address::derive(mnemonic)?;
        let sealed = vault::seal(mnemonic, password)?;
        let record = AccountRecord::new(&sealed, address, name);
        self.records.save(&record)?;

        self.session = AuthSession {
            status: AuthStatus::Unauthenticated,
            address: Some(address),
            name: Some(record.name),
            last_error: None,
        };
        log::info!("account registered for {}", address);
        Ok(address)
    }

    /// Unlock the account. Requires `Unauthenticated` and a loaded
    /// record; on success the decrypted mnemonic's re-derived address is
    /// byte-compared against the persisted one before the session is
    /// granted.
    pub fn unlock(&mut self, password: &SecretString) -> IdentityResult<AuthStatus> {
        match self.session.status {
            AuthStatus::Authenticated => return Err(IdentityError::AlreadyAuthenticated),
            AuthStatus::Unregistered => return Err(IdentityError::NotUnlockable),
            AuthStatus::Unauthenticated => {}
        }

        let record = self.records.load()?.ok_or(IdentityError::NotUnlockable)?;

        match try_unlock(&record, password) {
            Ok(()) => {
                self.session = AuthSession {
                    status: AuthStatus::Authenticated,
                    address: Some(record.address),
                    name: Some(record.name),
                    last_error: None,
                };
                log::info!("account unlocked");
                Ok(AuthStatus::Authenticated)
            }
            Err(_) => {
                self.session.status = AuthStatus::Unauthenticated;
                self.session.last_error = Some(UNLOCK_FAILURE_MESSAGE.to_string());
                log::warn!("unlock attempt failed");
                Err(IdentityError::DecryptionFailed)
            }
        }
    }

    /// Drop back to `Unauthenticated` without touching the record.
    pub fn lock(&mut self) {
        if self.session.status == AuthStatus::Authenticated {
            self.session.status = AuthStatus::Unauthenticated;
            self.session.last_error = None;
            log::info!("account locked");
        }
    }

    /// Delete the account record and session. Irreversible; callers are
    /// expected to have confirmed with the user.
    pub fn reset(&mut self) -> IdentityResult<()> {
        self.records.clear()?;
        self.session = AuthSession::default();
        log::info!("account reset to unregistered state");
        Ok(())
    }

    /// Update the display name, the only field ever mutated in place.
    pub fn rename(&mut self, name: &str) -> IdentityResult<()> {
        self.validator.validate_display_name(name)?;
        let mut record = self
            .records
            .load()?
            .ok_or_else(|| IdentityError::StorageError("No account record to rename".to_string()))?;
        record.name = name.to_string();
        self.records.save(&record)?;
        self.session.name = Some(record.name);
        Ok(())
    }
}

fn try_unlock(record: &AccountRecord, password: &SecretString) -> IdentityResult<()> {
    let sealed = record.sealed_vault()?;
    let mnemonic = vault::open(&sealed, password)?;
    let derived = Address::derive(&mnemonic)?;
    if derived != record.address {
        return Err(IdentityError::DecryptionFailed);
    }
    Ok(())
}
