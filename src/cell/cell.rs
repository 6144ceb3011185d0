//! Immutable cell type and representation hashing.

use std::fmt;
use std::sync::Arc;

use sha2::{Digest, Sha256};
use thiserror::Error;

/// Maximum number of data bits a single cell can hold.
pub const MAX_CELL_BITS: usize = 1023;

/// Maximum number of child references a single cell can hold.
pub const MAX_CELL_REFS: usize = 4;

/// Errors raised by cell construction and (de)serialization.
#[derive(Debug, Error)]
pub enum CellError {
    /// Writing past the 1023-bit data capacity.
    #[error("cell data overflow: {0} bits exceeds the {MAX_CELL_BITS}-bit capacity")]
    BitOverflow(usize),

    /// Attaching a fifth reference.
    #[error("cell reference overflow: at most {MAX_CELL_REFS} references per cell")]
    RefOverflow,

    /// A value does not fit the requested bit width.
    #[error("value {value} does not fit in {bits} bits")]
    ValueOutOfRange { value: u128, bits: usize },

    /// Malformed bag-of-cells input.
    #[error("malformed bag of cells: {0}")]
    Boc(String),
}

/// Result type for cell operations.
pub type CellResult<T> = Result<T, CellError>;

/// Shared handle to an immutable cell.
pub type ArcCell = Arc<Cell>;

/// An ordinary TON cell: up to 1023 data bits and 4 references.
///
/// The representation hash is computed eagerly at construction; it is the
/// value every contract address in the system is derived from.
pub struct Cell {
    data: Vec<u8>,
    bit_len: usize,
    refs: Vec<ArcCell>,
    hash: [u8; 32],
    depth: u16,
}

impl Cell {
    /// Construct a cell from zero-padded data bytes, a bit length, and
    /// child references. Validates capacity and computes the hash.
    pub fn new(data: Vec<u8>, bit_len: usize, refs: Vec<ArcCell>) -> CellResult<Self> {
        if bit_len > MAX_CELL_BITS {
            return Err(CellError::BitOverflow(bit_len));
        }
        if refs.len() > MAX_CELL_REFS {
            return Err(CellError::RefOverflow);
        }
        debug_assert!(data.len() >= (bit_len + 7) / 8);

        let depth = refs
            .iter()
            .map(|r| r.depth + 1)
            .max()
            .unwrap_or(0);

        let mut cell = Self {
            data,
            bit_len,
            refs,
            hash: [0u8; 32],
            depth,
        };
        cell.data.truncate((bit_len + 7) / 8);
        cell.hash = cell.compute_hash();
        Ok(cell)
    }

    /// Number of data bits stored.
    pub fn bit_len(&self) -> usize {
        self.bit_len
    }

    /// Data bytes, zero-padded past `bit_len`.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Child references in order.
    pub fn references(&self) -> &[ArcCell] {
        &self.refs
    }

    /// Representation hash (SHA-256 of the standard cell representation).
    pub fn repr_hash(&self) -> [u8; 32] {
        self.hash
    }

    /// Tree depth: 0 for a leaf, `1 + max(child depths)` otherwise.
    pub fn depth(&self) -> u16 {
        self.depth
    }

    /// First descriptor byte: reference count (ordinary, level 0).
    pub(crate) fn d1(&self) -> u8 {
        self.refs.len() as u8
    }

    /// Second descriptor byte: `floor(bits/8) + ceil(bits/8)`.
    pub(crate) fn d2(&self) -> u8 {
        (self.bit_len / 8 + (self.bit_len + 7) / 8) as u8
    }

    /// Data bytes as they appear on the wire: when the bit length is not
    /// byte-aligned, the bit right after the data is set (completion tag).
    pub(crate) fn wire_data(&self) -> Vec<u8> {
        let mut out = self.data.clone();
        if self.bit_len % 8 != 0 {
            let last = out.len() - 1;
            out[last] |= 0x80 >> (self.bit_len % 8);
        }
        out
    }

    fn compute_hash(&self) -> [u8; 32] {
        let mut repr = Vec::with_capacity(2 + self.data.len() + self.refs.len() * 34);
        repr.push(self.d1());
        repr.push(self.d2());
        repr.extend_from_slice(&self.wire_data());
        for r in &self.refs {
            repr.extend_from_slice(&r.depth.to_be_bytes());
        }
        for r in &self.refs {
            repr.extend_from_slice(&r.hash);
        }
        let digest = Sha256::digest(&repr);
        let mut out = [0u8; 32];
        out.copy_from_slice(&digest);
        out
    }
}

impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash
    }
}

impl Eq for Cell {}

impl fmt::Debug for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cell")
            .field("bits", &self.bit_len)
            .field("refs", &self.refs.len())
            .field("hash", &hex::encode(&self.hash[..8]))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::CellBuilder;

    #[test]
    fn test_empty_cell_descriptors() {
        let cell = Cell::new(Vec::new(), 0, Vec::new()).unwrap();
        assert_eq!(cell.d1(), 0);
        assert_eq!(cell.d2(), 0);
        assert_eq!(cell.depth(), 0);
    }

    #[test]
    fn test_hash_is_deterministic() {
        let a = Cell::new(vec![0xDE, 0xAD], 16, Vec::new()).unwrap();
        let b = Cell::new(vec![0xDE, 0xAD], 16, Vec::new()).unwrap();
        assert_eq!(a.repr_hash(), b.repr_hash());
        assert_eq!(a, b);
    }

    #[test]
    fn test_hash_sensitive_to_bit_length() {
        // Same bytes, different logical bit counts must hash differently.
        let a = Cell::new(vec![0x80], 1, Vec::new()).unwrap();
        let b = Cell::new(vec![0x80], 2, Vec::new()).unwrap();
        assert_ne!(a.repr_hash(), b.repr_hash());
    }

    #[test]
    fn test_depth_follows_references() {
        let leaf = Arc::new(Cell::new(Vec::new(), 0, Vec::new()).unwrap());
        let mid = Arc::new(Cell::new(Vec::new(), 0, vec![leaf]).unwrap());
        let root = Cell::new(Vec::new(), 0, vec![mid]).unwrap();
        assert_eq!(root.depth(), 2);
    }

    #[test]
    fn test_completion_tag_in_wire_data() {
        let mut b = CellBuilder::new();
        b.store_bit(true).unwrap();
        let cell = b.build().unwrap();
        // One data bit, tag at the second position: 0b1100_0000.
        assert_eq!(cell.wire_data(), vec![0xC0]);
        assert_eq!(cell.d2(), 1);
    }

    #[test]
    fn test_bit_overflow_rejected() {
        let result = Cell::new(vec![0u8; 128], 1024, Vec::new());
        assert!(matches!(result, Err(CellError::BitOverflow(1024))));
    }

    #[test]
    fn test_ref_overflow_rejected() {
        let leaf = Arc::new(Cell::new(Vec::new(), 0, Vec::new()).unwrap());
        let refs = vec![leaf.clone(), leaf.clone(), leaf.clone(), leaf.clone(), leaf];
        assert!(matches!(
            Cell::new(Vec::new(), 0, refs),
            Err(CellError::RefOverflow)
        ));
    }
}
