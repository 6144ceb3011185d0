//! Deployment orchestrator.
//!
//! One run performs the whole flow in order: derive credentials, derive the
//! wallet, read chain state, encode metadata, compute the master address,
//! build the mint body, sign the transfer, broadcast once. Every step must
//! succeed before the next starts; the first failure is terminal.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::blockchain::types::{from_nano, to_nano, ChainError, ChainResult};
use crate::blockchain::{ApiClient, InternalMessage, TonAddress, Wallet};
use crate::cell::boc;
use crate::config::DeployConfig;
use crate::crypto::Mnemonic;
use crate::jetton::{self, Mint};

/// All accounts live in the basechain.
pub const WORKCHAIN: i32 = 0;

/// Initial supply in whole tokens.
pub const MAX_SUPPLY_WHOLE: u128 = 1_000_000_000;

/// Value attached to the deployment message.
pub const DEPLOY_VALUE_TON: &str = "0.15";

/// How long the signed transfer stays valid.
const TRANSFER_TTL_SECS: u64 = 60;

/// What a completed run reports to the operator.
#[derive(Debug, Clone)]
pub struct DeployReport {
    pub wallet_address: TonAddress,
    pub seqno: u32,
    /// Wallet balance in nanoton at the anchoring block.
    pub balance: u128,
    /// Minted amount in elementary token units.
    pub minted: u128,
    /// Where the jetton master was deployed.
    pub master_address: TonAddress,
}

/// Initial supply in elementary units for a decimals setting.
pub fn total_supply(decimals: u32) -> u128 {
    MAX_SUPPLY_WHOLE * 10u128.pow(decimals)
}

/// Run one deployment.
pub async fn run(config: &DeployConfig) -> ChainResult<DeployReport> {
    // Credentials first: a bad phrase must fail before any network IO.
    let key_pair = Mnemonic::parse(&config.mnemonic)?.to_key_pair()?;
    let wallet = Wallet::derive(WORKCHAIN, key_pair)?;

    let client = ApiClient::new(&config.network.endpoint, config.network.rpc_timeout_secs)?;
    let block = client.get_last_block().await?;
    let seqno = client.get_wallet_seqno(block, wallet.address()).await?;
    let account = client.get_account(block, wallet.address()).await?;
    tracing::info!(
        block,
        seqno,
        balance = %from_nano(account.balance),
        active = account.active,
        "wallet state read"
    );

    let content = jetton::build_onchain_metadata(&config.token)?;
    let supply = total_supply(config.token.decimals);
    let init = jetton::minter::init(wallet.address(), content, supply)?;
    let master = jetton::minter::contract_address(WORKCHAIN, &init)?;
    tracing::info!(master = %master, supply = %supply, "jetton master computed");

    let body = Mint {
        amount: supply,
        receiver: *wallet.address(),
    }
    .build_body()?;

    let valid_until = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| ChainError::Wallet(format!("system clock: {e}")))?
        .as_secs()
        + TRANSFER_TTL_SECS;
    let transfer = wallet.create_transfer(
        seqno,
        valid_until as u32,
        &[InternalMessage {
            dest: master,
            value: to_nano(DEPLOY_VALUE_TON)?,
            bounce: true,
            state_init: Some(init),
            body: Some(body),
        }],
    )?;

    // The one and only submission; no retry on failure.
    client.send(&boc::serialize_base64(&transfer)?).await?;
    tracing::info!(master = %master, "deployment message sent");

    Ok(DeployReport {
        wallet_address: *wallet.address(),
        seqno,
        balance: account.balance,
        minted: supply,
        master_address: master,
    })
}
