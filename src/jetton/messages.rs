//! Messages understood by the jetton master.
//!
//! The deployer only ever sends one: the initial mint, addressed to the
//! deployment wallet for the full supply.

use crate::blockchain::TonAddress;
use crate::cell::{ArcCell, CellBuilder, CellResult};

/// Opcode of the mint instruction.
pub const MINT_OPCODE: u32 = 0xfc70_8bd2;

/// Mint `amount` of the jetton to `receiver`.
pub struct Mint {
    /// Amount in elementary token units.
    pub amount: u128,
    pub receiver: TonAddress,
}

impl Mint {
    /// Encode as a message body: opcode, amount as a 257-bit signed
    /// integer, then the receiver address.
    pub fn build_body(&self) -> CellResult<ArcCell> {
        let mut b = CellBuilder::new();
        b.store_uint(MINT_OPCODE as u128, 32)?;
        b.store_bit(false)?; // sign
        b.store_uint(0, 128)?;
        b.store_uint(self.amount, 128)?;
        self.receiver.store_into(&mut b)?;
        b.build_arc()
    }
}
