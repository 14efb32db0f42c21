//! Input validation for signup-time user inputs.

use regex::Regex;
use secrecy::{ExposeSecret, SecretString};

use crate::errors::{IdentityError, IdentityResult};

const MAX_NAME_LEN: usize = 50;
const MIN_PASSWORD_LEN: usize = 8;
const MAX_PASSWORD_LEN: usize = 256;

/// Validates display names and signup passwords.
///
/// Unlock deliberately skips password-shape validation: any input is
/// simply a failed decryption, so no information about the stored
/// password leaks through validation errors.
pub struct InputValidator {
    name_pattern: Regex,
}

impl InputValidator {
    pub fn new() -> IdentityResult<Self> {
        let name_pattern = Regex::new(r"^[A-Za-z0-9][A-Za-z0-9 _-]*$")
            .map_err(|e| IdentityError::ValidationError(format!("Invalid name regex: {}", e)))?;
        Ok(Self { name_pattern })
    }

    pub fn validate_display_name(&self, name: &str) -> IdentityResult<()> {
        if name.is_empty() {
            return Err(IdentityError::ValidationError(
                "Display name cannot be empty".to_string(),
            ));
        }

        if name.len() > MAX_NAME_LEN {
            return Err(IdentityError::ValidationError(
                "Display name too long".to_string(),
            ));
        }

        if !self.name_pattern.is_match(name) {
            return Err(IdentityError::ValidationError(
                "Display name contains invalid characters".to_string(),
            ));
        }

        Ok(())
    }

    pub fn validate_password(&self, password: &SecretString) -> IdentityResult<()> {
        let password = password.expose_secret();

        if password.len() < MIN_PASSWORD_LEN {
            return Err(IdentityError::ValidationError(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }

        if password.len() > MAX_PASSWORD_LEN {
            return Err(IdentityError::ValidationError(
                "Password too long".to_string(),
            ));
        }

        if password.chars().any(|c| c.is_control()) {
            return Err(IdentityError::ValidationError(
                "Password contains control characters".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for InputValidator {
    fn default() -> Self {
        Self::new().expect("Failed to create InputValidator")
    }
}
