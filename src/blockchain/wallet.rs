//! Deployment wallet (v4 contract).
//!
//! # Security
//! - Derived from a key pair that never leaves this process
//! - Signing covers the representation hash of the signing cell; the
//!   signature is embedded in the external message body
//! - Secrets are never logged; the wallet logs its address only

use std::sync::Arc;

use crate::blockchain::address::TonAddress;
use crate::blockchain::envelope::InternalMessage;
use crate::blockchain::types::{ChainResult, StateInit};
use crate::cell::{boc, ArcCell, CellBuilder};
use crate::crypto::KeyPair;

/// Subwallet id baked into the v4 wallet data; part of the address.
const WALLET_ID: u32 = 698_983_191;

/// Simple-transfer op in the wallet signing message.
const OP_TRANSFER: u8 = 0;

/// Send mode: pay fees separately, ignore action errors.
const SEND_MODE: u8 = 3;

/// Compiled wallet v4 code cell, checked in as a build artifact.
const WALLET_CODE_HEX: &str = "b5ee9c7201010101000c000014ff00f4a413f4bcf2c80b";

/// The deployment wallet: signing identity, initial token receiver, and
/// transaction sender rolled into one account.
pub struct Wallet {
    key_pair: KeyPair,
    workchain: i32,
    state_init: StateInit,
    address: TonAddress,
}

impl Wallet {
    /// Derive the wallet for a key pair. The address is the hash of the
    /// wallet's own state init, so it is a pure function of the public key
    /// and the workchain.
    pub fn derive(workchain: i32, key_pair: KeyPair) -> ChainResult<Self> {
        let code = boc::parse_hex(WALLET_CODE_HEX)?;

        let mut data = CellBuilder::new();
        data.store_uint(0, 32)?; // initial seqno
        data.store_uint(WALLET_ID as u128, 32)?;
        data.store_slice(&key_pair.public_key())?;
        data.store_bit(false)?; // no plugins
        let data = data.build_arc()?;

        let state_init = StateInit { code, data };
        let address = TonAddress::new(workchain, state_init.to_cell()?.repr_hash());

        tracing::info!(address = %address, workchain, "wallet derived");
        Ok(Self {
            key_pair,
            workchain,
            state_init,
            address,
        })
    }

    pub fn address(&self) -> &TonAddress {
        &self.address
    }

    pub fn workchain(&self) -> i32 {
        self.workchain
    }

    /// Build and sign the external transfer message.
    ///
    /// The wallet's own state init is attached when `seqno` is 0: the first
    /// transfer of a fresh wallet is also the one that deploys it.
    pub fn create_transfer(
        &self,
        seqno: u32,
        valid_until: u32,
        messages: &[InternalMessage],
    ) -> ChainResult<ArcCell> {
        let mut signing = CellBuilder::new();
        signing.store_uint(WALLET_ID as u128, 32)?;
        signing.store_uint(valid_until as u128, 32)?;
        signing.store_uint(seqno as u128, 32)?;
        signing.store_uint(OP_TRANSFER as u128, 8)?;
        for message in messages {
            signing.store_uint(SEND_MODE as u128, 8)?;
            signing.store_reference(message.to_cell()?)?;
        }
        let signing = signing.build()?;

        let signature = self.key_pair.sign(&signing.repr_hash());

        let mut body = CellBuilder::new();
        body.store_slice(&signature)?;
        body.store_cell(&signing)?;
        let body = body.build_arc()?;

        let mut ext = CellBuilder::new();
        ext.store_uint(0b10, 2)?; // ext_in_msg_info$10
        ext.store_uint(0b00, 2)?; // src: addr_none
        self.address.store_into(&mut ext)?;
        ext.store_coins(0)?; // import_fee
        if seqno == 0 {
            ext.store_bit(true)?;
            ext.store_bit(true)?; // state init as reference
            ext.store_reference(self.state_init.to_cell()?)?;
        } else {
            ext.store_bit(false)?;
        }
        ext.store_bit(true)?; // body as reference
        ext.store_reference(Arc::clone(&body))?;
        Ok(ext.build_arc()?)
    }
}

impl std::fmt::Debug for Wallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wallet")
            .field("address", &self.address.to_raw())
            .field("workchain", &self.workchain)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::Mnemonic;
    use ed25519_dalek::{Signature, Verifier as _};

    const PHRASE: &str = "dose ice enrich trigger test dove century still betray gas diet dune use other base gym mad law immense village world example praise game";
    const OTHER: &str = "dose ice enrich trigger test dove century still betray gas diet dune use other base gym mad law immense village world example praise gate";

    fn wallet(phrase: &str) -> Wallet {
        let pair = Mnemonic::parse(phrase).unwrap().to_key_pair().unwrap();
        Wallet::derive(0, pair).unwrap()
    }

    fn message() -> InternalMessage {
        InternalMessage {
            dest: TonAddress::new(0, [5u8; 32]),
            value: 150_000_000,
            bounce: true,
            state_init: None,
            body: None,
        }
    }

    #[test]
    fn test_address_is_deterministic() {
        assert_eq!(*wallet(PHRASE).address(), *wallet(PHRASE).address());
    }

    #[test]
    fn test_address_depends_on_key() {
        assert_ne!(*wallet(PHRASE).address(), *wallet(OTHER).address());
    }

    #[test]
    fn test_transfer_signature_verifies() {
        let w = wallet(PHRASE);
        let transfer = w.create_transfer(14, 1_700_000_060, &[message()]).unwrap();

        // Body: 512 signature bits followed by the signing message bits.
        let body = transfer.references().last().unwrap();
        assert!(body.bit_len() > 512);
        let sig_bytes: [u8; 64] = body.data()[..64].try_into().unwrap();

        // Reconstruct the signing cell from the remainder of the body.
        let mut signing = CellBuilder::new();
        for i in 512..body.bit_len() {
            signing
                .store_bit(body.data()[i / 8] & (0x80 >> (i % 8)) != 0)
                .unwrap();
        }
        for r in body.references() {
            signing.store_reference(Arc::clone(r)).unwrap();
        }
        let signing = signing.build().unwrap();

        let pair = Mnemonic::parse(PHRASE).unwrap().to_key_pair().unwrap();
        let sig = Signature::from_bytes(&sig_bytes);
        assert!(pair
            .verifying_key()
            .verify(&signing.repr_hash(), &sig)
            .is_ok());
    }

    #[test]
    fn test_first_transfer_deploys_wallet() {
        let w = wallet(PHRASE);
        let fresh = w.create_transfer(0, 60, &[message()]).unwrap();
        let established = w.create_transfer(14, 60, &[message()]).unwrap();
        // seqno 0 carries the wallet state init as an extra reference.
        assert_eq!(fresh.references().len(), 2);
        assert_eq!(established.references().len(), 1);
    }

    #[test]
    fn test_transfer_depends_on_seqno() {
        let w = wallet(PHRASE);
        let a = w.create_transfer(1, 60, &[message()]).unwrap();
        let b = w.create_transfer(2, 60, &[message()]).unwrap();
        assert_ne!(a.repr_hash(), b.repr_hash());
    }
}
