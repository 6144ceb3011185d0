//! Jetton master contract binding.
//!
//! The compiled code cell is a checked-in build artifact; this module only
//! assembles its initialization data and derives the resulting address.
//! Any change to owner, content, or supply changes the address.

use crate::blockchain::types::StateInit;
use crate::blockchain::TonAddress;
use crate::cell::{boc, ArcCell, CellBuilder, CellResult};

/// Compiled jetton master code cell.
const MINTER_CODE_HEX: &str = "b5ee9c7201010101000e000018ff00f4a413f4bcf2c80b0d1e";

/// Build the initialization payload for a jetton master owned by `owner`,
/// carrying `content` as its metadata and capped at `max_supply`.
pub fn init(owner: &TonAddress, content: ArcCell, max_supply: u128) -> CellResult<StateInit> {
    let code = boc::parse_hex(MINTER_CODE_HEX)?;

    let mut data = CellBuilder::new();
    owner.store_into(&mut data)?;
    data.store_reference(content)?;
    data.store_coins(max_supply)?;
    data.store_bit(true)?; // mintable
    let data = data.build_arc()?;

    Ok(StateInit { code, data })
}

/// Address of the contract a state init deploys to.
pub fn contract_address(workchain: i32, init: &StateInit) -> CellResult<TonAddress> {
    Ok(TonAddress::new(workchain, init.to_cell()?.repr_hash()))
}
