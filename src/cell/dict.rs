//! HashmapE dictionary builder.
//!
//! Builds the binary-trie dictionary layout used by on-chain metadata:
//! 256-bit keys, values stored as cell references in the leaves. Labels use
//! the shortest of the three standard encodings (`hml_short`, `hml_long`,
//! `hml_same`), which is what standard serializers emit.

use std::sync::Arc;

use crate::cell::builder::CellBuilder;
use crate::cell::cell::{ArcCell, CellResult};

/// Key width of every dictionary in this crate.
pub const DICT_KEY_BITS: usize = 256;

/// Build a 256-bit-keyed dictionary with `^Cell` values.
///
/// Returns `None` for an empty map (the caller stores the absent-dict bit).
/// Entries are sorted by key, so the result does not depend on input order.
pub fn build_dict_256(entries: &[([u8; 32], ArcCell)]) -> CellResult<Option<ArcCell>> {
    if entries.is_empty() {
        return Ok(None);
    }
    let mut sorted: Vec<(&[u8; 32], &ArcCell)> =
        entries.iter().map(|(k, v)| (k, v)).collect();
    sorted.sort_by_key(|(k, _)| **k);
    sorted.dedup_by_key(|(k, _)| **k);
    build_node(&sorted, 0).map(Some)
}

fn key_bit(key: &[u8; 32], index: usize) -> bool {
    key[index / 8] & (0x80 >> (index % 8)) != 0
}

fn build_node(entries: &[(&[u8; 32], &ArcCell)], from: usize) -> CellResult<ArcCell> {
    let n = DICT_KEY_BITS - from;

    // Longest prefix shared by every remaining key.
    let first = entries[0].0;
    let mut common = 0;
    'outer: while common < n {
        let bit = key_bit(first, from + common);
        for (k, _) in &entries[1..] {
            if key_bit(k, from + common) != bit {
                break 'outer;
            }
        }
        common += 1;
    }

    let label: Vec<bool> = (0..common).map(|i| key_bit(first, from + i)).collect();
    let mut b = CellBuilder::new();
    store_label(&mut b, &label, n)?;

    if entries.len() == 1 {
        debug_assert_eq!(common, n);
        b.store_reference(Arc::clone(entries[0].1))?;
    } else {
        let split = from + common;
        let pivot = entries.partition_point(|(k, _)| !key_bit(k, split));
        b.store_reference(build_node(&entries[..pivot], split + 1)?)?;
        b.store_reference(build_node(&entries[pivot..], split + 1)?)?;
    }
    b.build_arc()
}

/// Store an edge label over a key space of `m` remaining bits, picking the
/// shortest of the three encodings.
fn store_label(b: &mut CellBuilder, label: &[bool], m: usize) -> CellResult<()> {
    let l = label.len();
    let clog = bits_for(m);

    let uniform = l > 0 && label.iter().all(|&x| x == label[0]);
    let short_len = 2 * l + 2;
    let long_len = 2 + clog + l;
    let same_len = if uniform { 3 + clog } else { usize::MAX };

    if same_len <= short_len && same_len <= long_len {
        // hml_same$11 v:Bit n:(#<= m)
        b.store_bit(true)?;
        b.store_bit(true)?;
        b.store_bit(label[0])?;
        b.store_uint(l as u128, clog)?;
    } else if short_len <= long_len {
        // hml_short$0 len:(Unary ~n) s:(n * Bit)
        b.store_bit(false)?;
        for _ in 0..l {
            b.store_bit(true)?;
        }
        b.store_bit(false)?;
        for &bit in label {
            b.store_bit(bit)?;
        }
    } else {
        // hml_long$10 n:(#<= m) s:(n * Bit)
        b.store_bit(true)?;
        b.store_bit(false)?;
        b.store_uint(l as u128, clog)?;
        for &bit in label {
            b.store_bit(bit)?;
        }
    }
    Ok(())
}

/// Number of bits needed to store a value in `0..=m`.
fn bits_for(m: usize) -> usize {
    (usize::BITS - m.leading_zeros()) as usize
}
