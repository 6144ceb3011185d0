//! Jetton domain: metadata encoding, the master-contract binding, and the
//! messages the deployer sends to it.
//!
//! # Data Flow
//! ```text
//! config::TokenParams
//!     → metadata.rs (on-chain content cell)
//!     → minter.rs   (state init → deterministic master address)
//!     → messages.rs (mint instruction carried by the deploy transfer)
//! ```

pub mod messages;
pub mod metadata;
pub mod minter;

pub use messages::Mint;
pub use metadata::build_onchain_metadata;
