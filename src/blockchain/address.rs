//! TON account addresses.
//!
//! An address is a workchain plus the 32-byte hash of the account's state
//! init. Two textual renderings exist: the raw `wc:hex` form and the
//! user-friendly form (tag byte, workchain byte, hash, CRC16-XMODEM
//! checksum, base64url).

use std::fmt;
use std::str::FromStr;

use base64::engine::general_purpose::{STANDARD, URL_SAFE};
use base64::Engine as _;
use crc::{Crc, CRC_16_XMODEM};

use crate::blockchain::types::{ChainError, ChainResult};
use crate::cell::{CellBuilder, CellResult};

const CRC16: Crc<u16> = Crc::<u16>::new(&CRC_16_XMODEM);

/// Tag byte of a bounceable friendly address.
const TAG_BOUNCEABLE: u8 = 0x11;
/// Tag byte of a non-bounceable friendly address.
const TAG_NON_BOUNCEABLE: u8 = 0x51;
/// Flag bit marking a testnet-only address.
const FLAG_TESTNET: u8 = 0x80;

/// A TON account address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TonAddress {
    pub workchain: i32,
    pub hash: [u8; 32],
}

impl TonAddress {
    pub fn new(workchain: i32, hash: [u8; 32]) -> Self {
        Self { workchain, hash }
    }

    /// Raw form: `0:abcdef…` (64 hex digits).
    pub fn to_raw(&self) -> String {
        format!("{}:{}", self.workchain, hex::encode(self.hash))
    }

    /// User-friendly form: base64url over tag, workchain, hash, CRC16.
    pub fn to_friendly(&self, bounceable: bool, testnet: bool) -> String {
        let mut tag = if bounceable {
            TAG_BOUNCEABLE
        } else {
            TAG_NON_BOUNCEABLE
        };
        if testnet {
            tag |= FLAG_TESTNET;
        }
        let mut data = Vec::with_capacity(36);
        data.push(tag);
        data.push(self.workchain as i8 as u8);
        data.extend_from_slice(&self.hash);
        let crc = CRC16.checksum(&data);
        data.extend_from_slice(&crc.to_be_bytes());
        URL_SAFE.encode(data)
    }

    /// Append this address in `addr_std` layout (no anycast).
    pub fn store_into(&self, b: &mut CellBuilder) -> CellResult<()> {
        b.store_uint(0b100, 3)?; // addr_std$10 anycast:nothing$0
        b.store_uint(self.workchain as i8 as u8 as u128, 8)?;
        b.store_slice(&self.hash)?;
        Ok(())
    }

    fn parse_raw(s: &str) -> ChainResult<Self> {
        let (wc, hash_hex) = s
            .split_once(':')
            .ok_or_else(|| ChainError::Address(format!("missing workchain: {s:?}")))?;
        let workchain: i32 = wc
            .parse()
            .map_err(|_| ChainError::Address(format!("bad workchain: {s:?}")))?;
        let bytes = hex::decode(hash_hex)
            .map_err(|_| ChainError::Address(format!("bad hash hex: {s:?}")))?;
        let hash: [u8; 32] = bytes
            .try_into()
            .map_err(|_| ChainError::Address(format!("hash must be 32 bytes: {s:?}")))?;
        Ok(Self { workchain, hash })
    }

    fn parse_friendly(s: &str) -> ChainResult<Self> {
        let decoded = URL_SAFE
            .decode(s)
            .or_else(|_| STANDARD.decode(s))
            .map_err(|_| ChainError::Address(format!("bad base64: {s:?}")))?;
        if decoded.len() != 36 {
            return Err(ChainError::Address(format!(
                "friendly address must decode to 36 bytes, got {}",
                decoded.len()
            )));
        }
        let expected = u16::from_be_bytes([decoded[34], decoded[35]]);
        let actual = CRC16.checksum(&decoded[..34]);
        if expected != actual {
            return Err(ChainError::Address("checksum mismatch".to_string()));
        }
        let tag = decoded[0] & !FLAG_TESTNET;
        if tag != TAG_BOUNCEABLE && tag != TAG_NON_BOUNCEABLE {
            return Err(ChainError::Address(format!("unknown tag {:#04x}", decoded[0])));
        }
        let workchain = decoded[1] as i8 as i32;
        let mut hash = [0u8; 32];
        hash.copy_from_slice(&decoded[2..34]);
        Ok(Self { workchain, hash })
    }
}

impl fmt::Display for TonAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_friendly(true, false))
    }
}

impl FromStr for TonAddress {
    type Err = ChainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.contains(':') {
            Self::parse_raw(s)
        } else {
            Self::parse_friendly(s)
        }
    }
}
