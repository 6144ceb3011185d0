//! Internal message assembly.
//!
//! The deployment run sends exactly one internal message: destination is
//! the computed jetton master address, the attached value funds deployment,
//! the state init carries the contract code/data, and the body is the mint
//! instruction.

use std::sync::Arc;

use crate::blockchain::address::TonAddress;
use crate::blockchain::types::StateInit;
use crate::cell::{ArcCell, CellBuilder, CellResult};

/// An internal message ready to be wrapped in a wallet transfer.
pub struct InternalMessage {
    pub dest: TonAddress,
    /// Attached value in nanoton.
    pub value: u128,
    pub bounce: bool,
    /// Deploys `dest` when present.
    pub state_init: Option<StateInit>,
    pub body: Option<ArcCell>,
}

impl InternalMessage {
    /// Serialize to the `int_msg_info$0` layout. Fees, logical time and
    /// creation timestamp are left zero for the validators to fill in.
    pub fn to_cell(&self) -> CellResult<ArcCell> {
        let mut b = CellBuilder::new();
        b.store_bit(false)?; // int_msg_info$0
        b.store_bit(true)?; // ihr_disabled
        b.store_bit(self.bounce)?;
        b.store_bit(false)?; // bounced
        b.store_uint(0b00, 2)?; // src: addr_none
        self.dest.store_into(&mut b)?;
        b.store_coins(self.value)?;
        b.store_bit(false)?; // no extra currencies
        b.store_coins(0)?; // ihr_fee
        b.store_coins(0)?; // fwd_fee
        b.store_uint(0, 64)?; // created_lt
        b.store_uint(0, 32)?; // created_at

        match &self.state_init {
            Some(init) => {
                b.store_bit(true)?;
                b.store_bit(true)?; // as reference
                b.store_reference(init.to_cell()?)?;
            }
            None => {
                b.store_bit(false)?;
            }
        }
        match &self.body {
            Some(body) => {
                b.store_bit(true)?; // as reference
                b.store_reference(Arc::clone(body))?;
            }
            None => {
                b.store_bit(false)?;
            }
        }
        b.build_arc()
    }
}
