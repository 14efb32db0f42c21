//! BIP39 recovery phrase generation and validation.
//!
//! Phrases are restricted to the 12- and 24-word English forms. Parsing
//! validates word membership, word count, and the checksum bits before any
//! key material is derived from the phrase.

use bip39::{Language, Mnemonic as Bip39Mnemonic};
use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::{Zeroize, Zeroizing};

use crate::errors::{IdentityError, IdentityResult};

/// Word counts accepted by this wallet.
pub const SUPPORTED_WORD_COUNTS: [usize; 2] = [12, 24];

/// A validated BIP39 recovery phrase.
///
/// The inner word indices are zeroized when the value is dropped. The
/// phrase text itself is only materialized on demand via [`Mnemonic::phrase`]
/// and handed out inside a [`Zeroizing`] buffer.
#[derive(Clone, PartialEq, Eq)]
pub struct Mnemonic {
    inner: Bip39Mnemonic,
}

impl Mnemonic {
    /// Generate a 12-word phrase from 128 bits of OS randomness.
    pub fn generate() -> IdentityResult<Self> {
        Self::generate_with_word_count(12)
    }

    /// Generate a phrase with the requested word count (12 or 24).
    pub fn generate_with_word_count(word_count: usize) -> IdentityResult<Self> {
        let entropy_len = match word_count {
            12 => 16,
            24 => 32,
            other => return Err(IdentityError::InvalidMnemonicLength(other)),
        };

        let mut entropy = Zeroizing::new(vec![0u8; entropy_len]);
        let mut rng = OsRng;
        rng.try_fill_bytes(&mut entropy)
            .map_err(|e| IdentityError::CryptoError(format!("Failed to generate entropy: {}", e)))?;

        let inner = Bip39Mnemonic::from_entropy(&entropy)
            .map_err(|e| IdentityError::CryptoError(format!("Failed to encode mnemonic: {}", e)))?;
        Ok(Self { inner })
    }

    /// Rebuild a phrase from raw entropy bytes (16 or 32 bytes).
    pub fn from_entropy(entropy: &[u8]) -> IdentityResult<Self> {
        let inner = Bip39Mnemonic::from_entropy(entropy)
            .map_err(|e| IdentityError::ValidationError(format!("Invalid entropy: {}", e)))?;
        let mnemonic = Self { inner };
        if !SUPPORTED_WORD_COUNTS.contains(&mnemonic.word_count()) {
            return Err(IdentityError::InvalidMnemonicLength(mnemonic.word_count()));
        }
        Ok(mnemonic)
    }

    /// Parse and fully validate a phrase: word membership, word count,
    /// and checksum. A well-formed phrase whose checksum bits do not match
    /// is rejected here, before any key derivation happens.
    pub fn parse(phrase: &str) -> IdentityResult<Self> {
        let normalized = Zeroizing::new(phrase.trim().to_lowercase());
        let inner = Bip39Mnemonic::parse_in_normalized(Language::English, &normalized)
            .map_err(|err| codec_error(err, &normalized))?;

        let word_count = inner.word_count();
        if !SUPPORTED_WORD_COUNTS.contains(&word_count) {
            return Err(IdentityError::InvalidMnemonicLength(word_count));
        }

        Ok(Self { inner })
    }

    pub fn word_count(&self) -> usize {
        self.inner.word_count()
    }

    /// The space-joined lowercase phrase.
    pub fn phrase(&self) -> Zeroizing<String> {
        Zeroizing::new(self.inner.to_string())
    }

    /// Recover the raw entropy bytes encoded by the phrase.
    pub fn to_entropy(&self) -> Zeroizing<Vec<u8>> {
        Zeroizing::new(self.inner.to_entropy())
    }

    /// Stretch the phrase into the 64-byte BIP39 seed. The passphrase
    /// slot is pinned to the empty string; 25th-word passphrases are not
    /// supported by this wallet.
    pub(crate) fn to_seed(&self) -> Zeroizing<[u8; 64]> {
        Zeroizing::new(self.inner.to_seed(""))
    }
}

impl Drop for Mnemonic {
    fn drop(&mut self) {
        self.inner.zeroize();
    }
}

impl std::fmt::Debug for Mnemonic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mnemonic")
            .field("word_count", &self.word_count())
            .field("phrase", &"<redacted>")
            .finish()
    }
}

fn codec_error(err: bip39::Error, phrase: &str) -> IdentityError {
    match err {
        bip39::Error::BadWordCount(count) => IdentityError::InvalidMnemonicLength(count),
        bip39::Error::UnknownWord(index) => IdentityError::UnknownWord(
            phrase
                .split_whitespace()
                .nth(index)
                .unwrap_or_default()
                .to_string(),
        ),
        bip39::Error::InvalidChecksum => IdentityError::InvalidChecksum,
        other => IdentityError::ValidationError(format!("Mnemonic rejected: {}", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KNOWN_PHRASE: &str =
        "pioneer million sorry pipe cry garden private olive give apology inch foster";

    #[test]
    fn generate_produces_twelve_words() {
        let mnemonic = Mnemonic::generate().unwrap();
        assert_eq!(mnemonic.word_count(), 12);
        assert_eq!(mnemonic.phrase().split_whitespace().count(), 12);
    }

    #[test]
    fn generate_supports_twenty_four_words() {
        let mnemonic = Mnemonic::generate_with_word_count(24).unwrap();
        assert_eq!(mnemonic.word_count(), 24);
    }

    #[test]
    fn unsupported_word_count_rejected() {
        let err = Mnemonic::generate_with_word_count(15).unwrap_err();
        assert_eq!(err, IdentityError::InvalidMnemonicLength(15));
    }

    #[test]
    fn parse_round_trip_preserves_phrase() {
        let mnemonic = Mnemonic::generate().unwrap();
        let reparsed = Mnemonic::parse(&mnemonic.phrase()).unwrap();
        assert_eq!(mnemonic, reparsed);
    }

    #[test]
    fn parse_accepts_known_phrase() {
        let mnemonic = Mnemonic::parse(KNOWN_PHRASE).unwrap();
        assert_eq!(mnemonic.word_count(), 12);
    }

    #[test]
    fn parse_rejects_unknown_word() {
        let err = Mnemonic::parse(
            "pioneer million sorry pipe cry garden private olive give apology inch zzzzzz",
        )
        .unwrap_err();
        assert_eq!(err, IdentityError::UnknownWord("zzzzzz".to_string()));
    }

    #[test]
    fn parse_rejects_wrong_word_count() {
        let thirteen = format!("{} abandon", KNOWN_PHRASE);
        let err = Mnemonic::parse(&thirteen).unwrap_err();
        assert_eq!(err, IdentityError::InvalidMnemonicLength(13));
    }

    #[test]
    fn parse_rejects_fifteen_word_phrase() {
        // A perfectly valid 15-word BIP39 phrase is still outside this
        // wallet's supported lengths.
        let inner = bip39::Mnemonic::from_entropy(&[7u8; 20]).unwrap();
        let err = Mnemonic::parse(&inner.to_string()).unwrap_err();
        assert_eq!(err, IdentityError::InvalidMnemonicLength(15));
    }

    #[test]
    fn parse_rejects_bad_checksum() {
        // "abandon" twelve times is word-valid and length-valid but fails
        // the checksum (the valid all-zero-entropy phrase ends in "about").
        let phrase = ["abandon"; 12].join(" ");
        let err = Mnemonic::parse(&phrase).unwrap_err();
        assert_eq!(err, IdentityError::InvalidChecksum);
    }

    #[test]
    fn entropy_round_trip() {
        let mnemonic = Mnemonic::generate().unwrap();
        let entropy = mnemonic.to_entropy();
        assert_eq!(entropy.len(), 16);
        let rebuilt = Mnemonic::from_entropy(&entropy).unwrap();
        assert_eq!(mnemonic, rebuilt);
    }

    #[test]
    fn seed_is_deterministic() {
        let first = Mnemonic::parse(KNOWN_PHRASE).unwrap().to_seed();
        let second = Mnemonic::parse(KNOWN_PHRASE).unwrap().to_seed();
        assert_eq!(*first, *second);
    }

    #[test]
    fn debug_redacts_phrase() {
        let mnemonic = Mnemonic::generate().unwrap();
        let rendered = format!("{:?}", mnemonic);
        assert!(rendered.contains("<redacted>"));
        assert!(!rendered.contains(mnemonic.phrase().as_str()));
    }
}
