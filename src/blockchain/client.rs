//! TON HTTP API v4 client.
//!
//! # Responsibilities
//! - Query the latest masterchain block
//! - Read account balance and status
//! - Run the wallet `seqno` get-method
//! - Broadcast a serialized external message
//!
//! Every call is wrapped in a timeout and any failure maps into
//! [`ChainError`]; the deployer performs no retries on top.

use std::time::Duration;

use serde::Deserialize;
use tokio::time::timeout;
use url::Url;

use crate::blockchain::address::TonAddress;
use crate::blockchain::types::{ChainError, ChainResult};

/// Default public testnet endpoint, matching the network the deployer
/// targets out of the box.
pub const DEFAULT_ENDPOINT: &str = "https://testnet-v4.tonhubapi.com";

/// HTTP API v4 client.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
    timeout: Duration,
}

/// Account balance and status at a block.
#[derive(Debug, Clone)]
pub struct AccountSummary {
    /// Balance in nanoton.
    pub balance: u128,
    /// Whether the account holds deployed code.
    pub active: bool,
}

#[derive(Deserialize)]
struct LastBlockResponse {
    last: BlockRef,
}

#[derive(Deserialize)]
struct BlockRef {
    seqno: u64,
}

#[derive(Deserialize)]
struct AccountResponse {
    account: AccountInfo,
}

#[derive(Deserialize)]
struct AccountInfo {
    balance: BalanceInfo,
    state: AccountStateInfo,
}

#[derive(Deserialize)]
struct BalanceInfo {
    coins: String,
}

#[derive(Deserialize)]
struct AccountStateInfo {
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RunMethodResponse {
    exit_code: i32,
    #[serde(default)]
    result: Vec<StackItem>,
}

#[derive(Deserialize)]
struct StackItem {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    value: String,
}

#[derive(Deserialize)]
struct SendResponse {
    status: i32,
}

impl ApiClient {
    /// Create a client for an endpoint base URL.
    pub fn new(endpoint: &str, timeout_secs: u64) -> ChainResult<Self> {
        let base: Url = endpoint
            .parse()
            .map_err(|e| ChainError::Rpc(format!("invalid endpoint '{endpoint}': {e}")))?;
        Ok(Self {
            http: reqwest::Client::new(),
            base,
            timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// Latest masterchain block seqno; all state reads are anchored to it.
    pub async fn get_last_block(&self) -> ChainResult<u64> {
        let url = self.url("/block/latest")?;
        let resp: LastBlockResponse = self.get_json(url).await?;
        Ok(resp.last.seqno)
    }

    /// Balance and status of an account at a block.
    pub async fn get_account(
        &self,
        block: u64,
        address: &TonAddress,
    ) -> ChainResult<AccountSummary> {
        let url = self.url(&format!("/account/{block}/{}", address.to_friendly(true, false)))?;
        let resp: AccountResponse = self.get_json(url).await?;
        let balance = resp
            .account
            .balance
            .coins
            .parse()
            .map_err(|_| ChainError::Response(format!("bad balance: {:?}", resp.account.balance.coins)))?;
        Ok(AccountSummary {
            balance,
            active: resp.account.state.kind == "active",
        })
    }

    /// Current wallet sequence number via the `seqno` get-method.
    ///
    /// An account without deployed code cannot run the method; its next
    /// transfer is the deploying one and uses seqno 0.
    pub async fn get_wallet_seqno(&self, block: u64, address: &TonAddress) -> ChainResult<u32> {
        let url = self.url(&format!(
            "/account/{block}/{}/run/seqno",
            address.to_friendly(true, false)
        ))?;
        let resp: RunMethodResponse = self.get_json(url).await?;
        if resp.exit_code != 0 {
            return Ok(0);
        }
        let item = resp
            .result
            .first()
            .ok_or_else(|| ChainError::Response("empty seqno result stack".to_string()))?;
        if item.kind != "int" {
            return Err(ChainError::Response(format!(
                "seqno returned a {} instead of an int",
                item.kind
            )));
        }
        parse_stack_int(&item.value)
    }

    /// Broadcast a base64-encoded external message. Called exactly once per
    /// run; a rejection is terminal.
    pub async fn send(&self, boc_base64: &str) -> ChainResult<()> {
        let url = self.url("/send")?;
        let fut = self
            .http
            .post(url)
            .json(&serde_json::json!({ "boc": boc_base64 }))
            .send();
        let resp = timeout(self.timeout, fut)
            .await
            .map_err(|_| ChainError::Timeout(self.timeout.as_secs()))?
            .map_err(|e| ChainError::Rpc(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(ChainError::SendRejected(format!(
                "endpoint returned {}",
                resp.status()
            )));
        }
        let body: SendResponse = resp
            .json()
            .await
            .map_err(|e| ChainError::Response(e.to_string()))?;
        if body.status != 1 {
            return Err(ChainError::SendRejected(format!(
                "endpoint status {}",
                body.status
            )));
        }
        Ok(())
    }

    fn url(&self, path: &str) -> ChainResult<Url> {
        self.base
            .join(path)
            .map_err(|e| ChainError::Rpc(format!("bad path {path}: {e}")))
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: Url) -> ChainResult<T> {
        let fut = self.http.get(url.clone()).send();
        let resp = timeout(self.timeout, fut)
            .await
            .map_err(|_| {
                tracing::warn!(url = %url, "RPC timeout");
                ChainError::Timeout(self.timeout.as_secs())
            })?
            .map_err(|e| {
                tracing::warn!(url = %url, error = %e, "RPC transport error");
                ChainError::Rpc(e.to_string())
            })?;
        if !resp.status().is_success() {
            return Err(ChainError::Rpc(format!(
                "{} returned {}",
                url.path(),
                resp.status()
            )));
        }
        resp.json::<T>()
            .await
            .map_err(|e| ChainError::Response(e.to_string()))
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("endpoint", &self.base.as_str())
            .field("timeout_secs", &self.timeout.as_secs())
            .finish()
    }
}

/// Stack integers arrive as decimal or 0x-prefixed strings.
fn parse_stack_int(value: &str) -> ChainResult<u32> {
    let parsed = if let Some(hexval) = value.strip_prefix("0x") {
        u32::from_str_radix(hexval, 16)
    } else {
        value.parse()
    };
    parsed.map_err(|_| ChainError::Response(format!("bad stack int: {value:?}")))
}
