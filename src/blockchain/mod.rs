//! Blockchain subsystem.
//!
//! # Data Flow
//! ```text
//! Environment (mnemonic)
//!     → crypto (key derivation)
//!     → wallet.rs (v4 wallet identity, transfer signing)
//!     → envelope.rs (internal message assembly)
//!     → client.rs (HTTP API v4: state queries, broadcast)
//! ```
//!
//! # Security Constraints
//! - Key material ONLY from environment variables
//! - Never log secrets
//! - All RPC calls have a configurable timeout
//! - No retries: any failed call terminates the run

pub mod address;
pub mod client;
pub mod envelope;
pub mod types;
pub mod wallet;

pub use address::TonAddress;
pub use client::ApiClient;
pub use envelope::InternalMessage;
pub use types::{ChainError, ChainResult, StateInit};
pub use wallet::Wallet;
