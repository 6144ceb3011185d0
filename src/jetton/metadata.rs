//! On-chain token metadata encoding.
//!
//! Layout: a content cell tagged 0x00 holding a dictionary keyed by the
//! SHA-256 of each field name; values are referenced cells in snake format
//! (0x00 tag, then the UTF-8 bytes, chained through single references when
//! they outgrow a cell).

use sha2::{Digest, Sha256};

use crate::cell::dict::build_dict_256;
use crate::cell::{ArcCell, CellBuilder, CellResult};
use crate::config::TokenParams;

/// Content-layout tag: metadata stored fully on-chain.
const ONCHAIN_CONTENT_TAG: u8 = 0x00;

/// Snake-format tag inside each value cell.
const SNAKE_TAG: u8 = 0x00;

/// Bytes that fit next to the tag in a value root.
const FIRST_CHUNK: usize = 126;

/// Bytes per continuation cell.
const CHUNK: usize = 127;

/// Encode token parameters into the on-chain content cell.
///
/// Optional fields are absent from the dictionary entirely when unset;
/// decimals are carried as their decimal string form.
pub fn build_onchain_metadata(params: &TokenParams) -> CellResult<ArcCell> {
    let mut entries: Vec<([u8; 32], ArcCell)> = vec![
        (metadata_key("name"), snake_cell(params.name.as_bytes())?),
        (metadata_key("symbol"), snake_cell(params.symbol.as_bytes())?),
        (
            metadata_key("description"),
            snake_cell(params.description.as_bytes())?,
        ),
        (
            metadata_key("decimals"),
            snake_cell(params.decimals.to_string().as_bytes())?,
        ),
    ];
    if let Some(uri) = &params.uri {
        entries.push((metadata_key("uri"), snake_cell(uri.as_bytes())?));
    }
    if let Some(image) = &params.image {
        entries.push((metadata_key("image"), snake_cell(image.as_bytes())?));
    }

    let dict = build_dict_256(&entries)?;
    let mut b = CellBuilder::new();
    b.store_uint(ONCHAIN_CONTENT_TAG as u128, 8)?;
    b.store_maybe_reference(dict)?;
    b.build_arc()
}

/// SHA-256 of the field name, the dictionary key convention.
fn metadata_key(name: &str) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(&Sha256::digest(name.as_bytes()));
    out
}

/// Pack bytes into a snake-format cell chain.
fn snake_cell(data: &[u8]) -> CellResult<ArcCell> {
    let head_len = data.len().min(FIRST_CHUNK);
    let (head, mut tail) = data.split_at(head_len);

    // Build the continuation chain back to front.
    let mut chunks: Vec<&[u8]> = Vec::new();
    while !tail.is_empty() {
        let take = tail.len().min(CHUNK);
        let (chunk, rest) = tail.split_at(take);
        chunks.push(chunk);
        tail = rest;
    }
    let mut next: Option<ArcCell> = None;
    for chunk in chunks.into_iter().rev() {
        let mut b = CellBuilder::new();
        b.store_slice(chunk)?;
        if let Some(n) = next {
            b.store_reference(n)?;
        }
        next = Some(b.build_arc()?);
    }

    let mut b = CellBuilder::new();
    b.store_uint(SNAKE_TAG as u128, 8)?;
    b.store_slice(head)?;
    if let Some(n) = next {
        b.store_reference(n)?;
    }
    b.build_arc()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> TokenParams {
        TokenParams {
            name: "Tether USD".to_string(),
            symbol: "USDT".to_string(),
            description: "Tether USD".to_string(),
            decimals: 9,
            uri: None,
            image: None,
        }
    }

    #[test]
    fn test_content_cell_shape() {
        let content = build_onchain_metadata(&params()).unwrap();
        // Tag byte plus the dict-present bit.
        assert_eq!(content.bit_len(), 9);
        assert_eq!(content.data()[0], 0x00);
        assert_eq!(content.references().len(), 1);
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let a = build_onchain_metadata(&params()).unwrap();
        let b = build_onchain_metadata(&params()).unwrap();
        assert_eq!(a.repr_hash(), b.repr_hash());
    }

    #[test]
    fn test_optional_fields_change_content() {
        let without = build_onchain_metadata(&params()).unwrap();
        let mut with_image = params();
        with_image.image = Some("https://example.com/t.png".to_string());
        let with_image = build_onchain_metadata(&with_image).unwrap();
        assert_ne!(without.repr_hash(), with_image.repr_hash());
    }

    #[test]
    fn test_decimals_participate_as_string() {
        let mut six = params();
        six.decimals = 6;
        let nine = build_onchain_metadata(&params()).unwrap();
        let six = build_onchain_metadata(&six).unwrap();
        assert_ne!(nine.repr_hash(), six.repr_hash());
    }

    #[test]
    fn test_snake_cell_short_value() {
        let cell = snake_cell(b"USDT").unwrap();
        assert_eq!(cell.data(), &[0x00, b'U', b'S', b'D', b'T']);
        assert!(cell.references().is_empty());
    }

    #[test]
    fn test_snake_cell_chains_long_values() {
        let long = vec![b'x'; FIRST_CHUNK + CHUNK + 10];
        let cell = snake_cell(&long).unwrap();
        assert_eq!(cell.references().len(), 1);
        let second = &cell.references()[0];
        assert_eq!(second.bit_len(), CHUNK * 8);
        let third = &second.references()[0];
        assert_eq!(third.bit_len(), 10 * 8);
        assert!(third.references().is_empty());
    }
}
