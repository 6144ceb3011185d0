//! Key material handling.
//!
//! # Security
//! - The mnemonic phrase is read ONLY from the environment
//! - Neither the phrase nor the derived secret is ever logged or serialized
//! - Derivation happens before any network activity so a bad phrase can
//!   never leave a half-finished run behind

pub mod mnemonic;

pub use mnemonic::{KeyError, KeyPair, Mnemonic};
