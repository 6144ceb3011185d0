//! Configuration management.
//!
//! # Data Flow
//! ```text
//! process environment
//!     → loader.rs (read, normalize, apply defaults)
//!     → DeployConfig (immutable for the whole run)
//! ```
//!
//! # Design Decisions
//! - Every token field has a default; only the mnemonic is truly required,
//!   and its absence surfaces at the derivation step, before any network IO
//! - Empty environment values count as unset
//! - Malformed optional values fall back to defaults instead of failing

pub mod loader;
pub mod schema;

pub use loader::from_env;
pub use schema::{DeployConfig, NetworkConfig, TokenParams};
