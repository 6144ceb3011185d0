//! Mnemonic phrase parsing and TON key derivation.
//!
//! The derivation scheme: the phrase itself keys an HMAC-SHA512 over the
//! (empty) password to produce entropy, PBKDF2-SHA512 with the "TON default
//! seed" salt stretches it, and the first 32 bytes seed an Ed25519 key.

use std::fmt;

use ed25519_dalek::{Signer as _, SigningKey, VerifyingKey};
use hmac::{Hmac, Mac};
use pbkdf2::pbkdf2_hmac;
use sha2::Sha512;
use thiserror::Error;

const PBKDF_SALT: &[u8] = b"TON default seed";
const PBKDF_ROUNDS: u32 = 100_000;

/// Accepted phrase lengths.
const VALID_WORD_COUNTS: [usize; 5] = [12, 15, 18, 21, 24];

/// Errors from phrase parsing and key derivation.
#[derive(Debug, Error)]
pub enum KeyError {
    /// The phrase is empty or has an unsupported word count.
    #[error("invalid mnemonic: expected 12/15/18/21/24 words, got {0}")]
    InvalidWordCount(usize),

    /// Internal derivation failure.
    #[error("key derivation failed: {0}")]
    Derivation(String),
}

/// A validated, normalized mnemonic phrase.
pub struct Mnemonic {
    words: Vec<String>,
}

impl Mnemonic {
    /// Parse a space-separated phrase. Words are lowercased and surrounding
    /// whitespace is ignored; the word count must be a standard length.
    pub fn parse(phrase: &str) -> Result<Self, KeyError> {
        let words: Vec<String> = phrase
            .split_whitespace()
            .map(|w| w.to_lowercase())
            .collect();
        if !VALID_WORD_COUNTS.contains(&words.len()) {
            return Err(KeyError::InvalidWordCount(words.len()));
        }
        Ok(Self { words })
    }

    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    /// Derive the signing key pair for this phrase.
    pub fn to_key_pair(&self) -> Result<KeyPair, KeyError> {
        let phrase = self.words.join(" ");

        let mut mac = Hmac::<Sha512>::new_from_slice(phrase.as_bytes())
            .map_err(|e| KeyError::Derivation(e.to_string()))?;
        mac.update(b"");
        let entropy = mac.finalize().into_bytes();

        let mut seed = [0u8; 64];
        pbkdf2_hmac::<Sha512>(&entropy, PBKDF_SALT, PBKDF_ROUNDS, &mut seed);

        let mut secret = [0u8; 32];
        secret.copy_from_slice(&seed[..32]);
        Ok(KeyPair {
            signing: SigningKey::from_bytes(&secret),
        })
    }
}

impl fmt::Debug for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never expose the words.
        write!(f, "Mnemonic({} words)", self.words.len())
    }
}

/// Ed25519 key pair backing the deployment wallet.
pub struct KeyPair {
    signing: SigningKey,
}

impl KeyPair {
    /// Public key bytes, as stored in the wallet state init.
    pub fn public_key(&self) -> [u8; 32] {
        self.signing.verifying_key().to_bytes()
    }

    pub fn verifying_key(&self) -> VerifyingKey {
        self.signing.verifying_key()
    }

    /// Sign a message (in practice: a cell representation hash).
    pub fn sign(&self, message: &[u8]) -> [u8; 64] {
        self.signing.sign(message).to_bytes()
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Expose the public half only.
        write!(f, "KeyPair(public: {})", hex::encode(self.public_key()))
    }
}
