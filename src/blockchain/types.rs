//! Chain-specific types and error definitions.

use std::sync::Arc;

use thiserror::Error;

use crate::cell::{ArcCell, CellBuilder, CellError, CellResult};
use crate::crypto::KeyError;

/// Nanoton per TON.
pub const NANO_PER_TON: u128 = 1_000_000_000;

/// Errors that can occur during blockchain operations.
#[derive(Debug, Error)]
pub enum ChainError {
    /// RPC connection or request failed.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// RPC request timed out.
    #[error("RPC timeout after {0} seconds")]
    Timeout(u64),

    /// The endpoint answered, but not with what we expected.
    #[error("malformed RPC response: {0}")]
    Response(String),

    /// The endpoint refused the external message.
    #[error("send rejected: {0}")]
    SendRejected(String),

    /// Invalid address text or structure.
    #[error("invalid address: {0}")]
    Address(String),

    /// Wallet derivation or signing error.
    #[error("wallet error: {0}")]
    Wallet(String),

    /// Cell construction / serialization error.
    #[error(transparent)]
    Cell(#[from] CellError),

    /// Key derivation error.
    #[error(transparent)]
    Key(#[from] KeyError),
}

/// Result type for blockchain operations.
pub type ChainResult<T> = Result<T, ChainError>;

/// A contract's initialization payload. Its cell hash IS the contract
/// address, so both halves must be treated as immutable once computed.
#[derive(Clone)]
pub struct StateInit {
    pub code: ArcCell,
    pub data: ArcCell,
}

impl StateInit {
    /// Serialize to the on-chain layout: no split depth, no special marker,
    /// code and data present, no libraries.
    pub fn to_cell(&self) -> CellResult<ArcCell> {
        let mut b = CellBuilder::new();
        b.store_uint(0b00110, 5)?;
        b.store_reference(Arc::clone(&self.code))?;
        b.store_reference(Arc::clone(&self.data))?;
        b.build_arc()
    }
}

/// Parse a decimal TON amount ("0.15") into nanoton.
pub fn to_nano(ton: &str) -> ChainResult<u128> {
    let mut parts = ton.splitn(2, '.');
    let whole = parts.next().unwrap_or("");
    let frac = parts.next().unwrap_or("");
    if whole.is_empty() && frac.is_empty() {
        return Err(ChainError::Response(format!("not a TON amount: {ton:?}")));
    }
    if frac.len() > 9 {
        return Err(ChainError::Response(format!(
            "sub-nanoton precision in amount: {ton:?}"
        )));
    }
    let whole: u128 = if whole.is_empty() {
        0
    } else {
        whole
            .parse()
            .map_err(|_| ChainError::Response(format!("not a TON amount: {ton:?}")))?
    };
    let frac: u128 = if frac.is_empty() {
        0
    } else {
        let scale = 10u128.pow(9 - frac.len() as u32);
        let digits: u128 = frac
            .parse()
            .map_err(|_| ChainError::Response(format!("not a TON amount: {ton:?}")))?;
        digits * scale
    };
    Ok(whole * NANO_PER_TON + frac)
}

/// Render nanoton as a decimal TON string, trimming trailing zeros.
pub fn from_nano(nano: u128) -> String {
    let whole = nano / NANO_PER_TON;
    let frac = nano % NANO_PER_TON;
    if frac == 0 {
        return whole.to_string();
    }
    let frac = format!("{frac:09}");
    format!("{}.{}", whole, frac.trim_end_matches('0'))
}
