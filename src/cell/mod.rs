//! TON cell primitives.
//!
//! # Data Flow
//! ```text
//! CellBuilder (bit-level writes)
//!     → Cell (immutable, hashed at build time)
//!     → boc.rs (wire serialization for broadcast / artifact loading)
//! dict.rs builds HashmapE trees for on-chain dictionaries
//! ```
//!
//! # Design Decisions
//! - Cells are immutable and reference-counted; the representation hash is
//!   computed once at build time since every address in the system derives
//!   from it
//! - Capacity violations (1023 bits, 4 refs) are errors, never panics
//! - Exotic cells are not modeled; the deployer only handles ordinary cells

pub mod boc;
pub mod builder;
pub mod cell;
pub mod dict;

pub use builder::CellBuilder;
pub use cell::{ArcCell, Cell, CellError, CellResult, MAX_CELL_BITS, MAX_CELL_REFS};
