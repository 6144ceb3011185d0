//! Configuration schema definitions.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::blockchain::client::DEFAULT_ENDPOINT;

/// Root configuration for one deployment run.
#[derive(Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct DeployConfig {
    /// Seed phrase for the deployment wallet. Kept out of serialized and
    /// debug output.
    #[serde(skip)]
    pub mnemonic: String,

    /// Endpoint and timeout settings.
    pub network: NetworkConfig,

    /// Token parameters for the jetton being deployed.
    pub token: TokenParams,
}

impl fmt::Debug for DeployConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeployConfig")
            .field("mnemonic", &"<redacted>")
            .field("network", &self.network)
            .field("token", &self.token)
            .finish()
    }
}

/// Network configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// HTTP API v4 base URL.
    pub endpoint: String,

    /// Per-request timeout in seconds.
    pub rpc_timeout_secs: u64,
}

impl NetworkConfig {
    /// Whether the endpoint targets testnet; controls how addresses are
    /// rendered in operator output.
    pub fn is_testnet(&self) -> bool {
        self.endpoint.contains("testnet") || self.endpoint.contains("sandbox")
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            rpc_timeout_secs: 15,
        }
    }
}

/// Token parameters, the source record for on-chain metadata.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct TokenParams {
    pub name: String,
    pub symbol: String,
    pub description: String,
    pub decimals: u32,

    /// Off-chain metadata URI; omitted from the metadata record when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,

    /// Token image URL; omitted from the metadata record when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// Decimals used when `token_decimals` is unset or malformed.
pub const DEFAULT_DECIMALS: u32 = 9;

impl Default for TokenParams {
    fn default() -> Self {
        Self {
            name: "Tether USD".to_string(),
            symbol: "USDT".to_string(),
            description: "Tether USD".to_string(),
            decimals: DEFAULT_DECIMALS,
            uri: None,
            image: None,
        }
    }
}
