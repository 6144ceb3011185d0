//! Bag-of-cells wire codec.
//!
//! Serializes a single-root cell tree into the standard `b5ee9c72` format
//! (used when broadcasting external messages) and parses the same format
//! back (used to load embedded compiled contract artifacts).

use std::collections::HashMap;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use crc::{Crc, CRC_32_ISCSI};

use crate::cell::cell::{ArcCell, Cell, CellError, CellResult};

const BOC_MAGIC: [u8; 4] = [0xB5, 0xEE, 0x9C, 0x72];

const CRC32C: Crc<u32> = Crc::<u32>::new(&CRC_32_ISCSI);

/// Serialize a cell tree with a single root, including the CRC32C trailer.
pub fn serialize(root: &ArcCell) -> CellResult<Vec<u8>> {
    // Unique cells ordered so that every reference points forward. Parents
    // always have strictly greater depth than their children, so a stable
    // sort by descending depth preserves that invariant.
    let mut visit_order: Vec<ArcCell> = Vec::new();
    let mut seen: HashMap<[u8; 32], usize> = HashMap::new();
    collect(root, &mut visit_order, &mut seen);
    visit_order.sort_by(|a, b| b.depth().cmp(&a.depth()));

    let mut index: HashMap<[u8; 32], usize> = HashMap::new();
    for (i, cell) in visit_order.iter().enumerate() {
        index.insert(cell.repr_hash(), i);
    }

    let cell_count = visit_order.len();
    let ref_size = minimal_byte_width(cell_count as u64);

    let mut cells_payload = Vec::new();
    for cell in &visit_order {
        cells_payload.push(cell.d1());
        cells_payload.push(cell.d2());
        cells_payload.extend_from_slice(&cell.wire_data());
        for r in cell.references() {
            let child = index[&r.repr_hash()];
            write_be(&mut cells_payload, child as u64, ref_size);
        }
    }

    let off_size = minimal_byte_width(cells_payload.len() as u64);

    let mut out = Vec::with_capacity(cells_payload.len() + 32);
    out.extend_from_slice(&BOC_MAGIC);
    // has_idx = 0, has_crc32c = 1, has_cache_bits = 0, flags = 0.
    out.push(0x40 | ref_size as u8);
    out.push(off_size as u8);
    write_be(&mut out, cell_count as u64, ref_size);
    write_be(&mut out, 1, ref_size); // roots
    write_be(&mut out, 0, ref_size); // absent
    write_be(&mut out, cells_payload.len() as u64, off_size);
    write_be(&mut out, 0, ref_size); // root index
    out.extend_from_slice(&cells_payload);

    let crc = CRC32C.checksum(&out);
    out.extend_from_slice(&crc.to_le_bytes());
    Ok(out)
}

/// Serialize to standard base64, the form the HTTP API accepts.
pub fn serialize_base64(root: &ArcCell) -> CellResult<String> {
    Ok(BASE64.encode(serialize(root)?))
}

/// Parse a bag of cells and return its (single) root.
pub fn parse(bytes: &[u8]) -> CellResult<ArcCell> {
    let mut r = Reader::new(bytes);

    let magic = r.take(4)?;
    if magic != BOC_MAGIC {
        return Err(CellError::Boc(format!(
            "bad magic {}, expected b5ee9c72",
            hex::encode(magic)
        )));
    }

    let b0 = r.take(1)?[0];
    let has_idx = b0 & 0x80 != 0;
    let has_crc = b0 & 0x40 != 0;
    let ref_size = (b0 & 0x07) as usize;
    let off_size = r.take(1)?[0] as usize;
    if ref_size == 0 || ref_size > 4 || off_size == 0 || off_size > 8 {
        return Err(CellError::Boc(format!(
            "unsupported size bytes: ref={ref_size} offset={off_size}"
        )));
    }

    let cell_count = r.read_be(ref_size)? as usize;
    let root_count = r.read_be(ref_size)? as usize;
    let absent = r.read_be(ref_size)? as usize;
    let payload_len = r.read_be(off_size)? as usize;
    if root_count != 1 || absent != 0 {
        return Err(CellError::Boc(format!(
            "expected a single-root bag, got {root_count} roots / {absent} absent"
        )));
    }
    let root_index = r.read_be(ref_size)? as usize;
    if has_idx {
        r.take(cell_count * off_size)?;
    }

    if has_crc {
        let body_len = bytes.len().checked_sub(4).ok_or_else(|| {
            CellError::Boc("truncated checksum trailer".to_string())
        })?;
        let expected = u32::from_le_bytes(bytes[body_len..].try_into().unwrap());
        let actual = CRC32C.checksum(&bytes[..body_len]);
        if expected != actual {
            return Err(CellError::Boc("checksum mismatch".to_string()));
        }
    }

    let payload_start = r.pos;
    let mut raw: Vec<(Vec<u8>, usize, Vec<usize>)> = Vec::with_capacity(cell_count);
    for i in 0..cell_count {
        let d1 = r.take(1)?[0];
        let d2 = r.take(1)?[0] as usize;
        if d1 & 0x08 != 0 {
            return Err(CellError::Boc("exotic cells are not supported".to_string()));
        }
        let ref_count = (d1 & 0x07) as usize;
        if ref_count > 4 {
            return Err(CellError::Boc(format!("cell {i} claims {ref_count} references")));
        }
        let byte_len = (d2 + 1) / 2;
        let mut data = r.take(byte_len)?.to_vec();
        let bit_len = if d2 % 2 == 0 {
            byte_len * 8
        } else {
            strip_completion_tag(&mut data)?
        };
        let mut refs = Vec::with_capacity(ref_count);
        for _ in 0..ref_count {
            let child = r.read_be(ref_size)? as usize;
            if child <= i || child >= cell_count {
                return Err(CellError::Boc(format!(
                    "cell {i} has a backward or out-of-range reference to {child}"
                )));
            }
            refs.push(child);
        }
        raw.push((data, bit_len, refs));
    }
    if r.pos - payload_start != payload_len {
        return Err(CellError::Boc("declared payload size mismatch".to_string()));
    }

    // References only point forward, so build back to front.
    let mut built: Vec<Option<ArcCell>> = vec![None; cell_count];
    for i in (0..cell_count).rev() {
        let (data, bit_len, refs) = raw[i].clone();
        let mut children = Vec::with_capacity(refs.len());
        for c in refs {
            let child = built[c]
                .clone()
                .ok_or_else(|| CellError::Boc(format!("unresolved reference {c}")))?;
            children.push(child);
        }
        built[i] = Some(Arc::new(Cell::new(data, bit_len, children)?));
    }

    built
        .get(root_index)
        .and_then(|c| c.clone())
        .ok_or_else(|| CellError::Boc(format!("root index {root_index} out of range")))
}

/// Parse from a hex string (the form embedded artifacts are stored in).
pub fn parse_hex(s: &str) -> CellResult<ArcCell> {
    let bytes = hex::decode(s.trim())
        .map_err(|e| CellError::Boc(format!("invalid hex: {e}")))?;
    parse(&bytes)
}

fn collect(cell: &ArcCell, order: &mut Vec<ArcCell>, seen: &mut HashMap<[u8; 32], usize>) {
    if seen.contains_key(&cell.repr_hash()) {
        return;
    }
    seen.insert(cell.repr_hash(), order.len());
    order.push(Arc::clone(cell));
    for r in cell.references() {
        collect(r, order, seen);
    }
}

fn minimal_byte_width(value: u64) -> usize {
    let mut width = 1;
    while value >> (width * 8) != 0 {
        width += 1;
    }
    width
}

fn write_be(out: &mut Vec<u8>, value: u64, width: usize) {
    for i in (0..width).rev() {
        out.push((value >> (i * 8)) as u8);
    }
}

/// Clear the completion tag in the last byte and return the bit length.
fn strip_completion_tag(data: &mut [u8]) -> CellResult<usize> {
    let last = *data
        .last()
        .ok_or_else(|| CellError::Boc("tagged cell with no data".to_string()))?;
    if last == 0 {
        return Err(CellError::Boc("missing completion tag".to_string()));
    }
    let trailing = last.trailing_zeros() as usize;
    let idx = data.len() - 1;
    data[idx] &= !(1 << trailing);
    Ok(data.len() * 8 - trailing - 1)
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn take(&mut self, n: usize) -> CellResult<&'a [u8]> {
        if self.pos + n > self.bytes.len() {
            return Err(CellError::Boc(format!(
                "truncated input: wanted {n} bytes at offset {}",
                self.pos
            )));
        }
        let out = &self.bytes[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    fn read_be(&mut self, width: usize) -> CellResult<u64> {
        let bytes = self.take(width)?;
        let mut v = 0u64;
        for &b in bytes {
            v = (v << 8) | b as u64;
        }
        Ok(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::CellBuilder;

    fn sample_tree() -> ArcCell {
        let leaf = {
            let mut b = CellBuilder::new();
            b.store_uint(0x1234, 16).unwrap();
            b.build_arc().unwrap()
        };
        let mid = {
            let mut b = CellBuilder::new();
            b.store_uint(7, 5).unwrap();
            b.store_reference(Arc::clone(&leaf)).unwrap();
            b.build_arc().unwrap()
        };
        let mut b = CellBuilder::new();
        b.store_coins(150_000_000).unwrap();
        b.store_reference(mid).unwrap();
        b.store_reference(leaf).unwrap();
        b.build_arc().unwrap()
    }

    #[test]
    fn test_round_trip_preserves_root_hash() {
        let root = sample_tree();
        let bytes = serialize(&root).unwrap();
        assert_eq!(&bytes[..4], &BOC_MAGIC);
        let parsed = parse(&bytes).unwrap();
        assert_eq!(parsed.repr_hash(), root.repr_hash());
    }

    #[test]
    fn test_shared_subtree_is_deduplicated() {
        // The leaf is referenced twice but serialized once: 3 unique cells.
        let root = sample_tree();
        let bytes = serialize(&root).unwrap();
        // cells count is the byte right after magic + b0 + off_size.
        assert_eq!(bytes[6], 3);
    }

    #[test]
    fn test_checksum_failure_detected() {
        let root = sample_tree();
        let mut bytes = serialize(&root).unwrap();
        let n = bytes.len();
        bytes[n - 1] ^= 0xFF;
        let err = parse(&bytes).unwrap_err();
        assert!(err.to_string().contains("checksum"));
    }

    #[test]
    fn test_bad_magic_rejected() {
        let err = parse(&[0, 1, 2, 3, 4, 5, 6, 7]).unwrap_err();
        assert!(err.to_string().contains("magic"));
    }

    #[test]
    fn test_truncated_input_rejected() {
        let root = sample_tree();
        let bytes = serialize(&root).unwrap();
        assert!(parse(&bytes[..bytes.len() / 2]).is_err());
    }
}
