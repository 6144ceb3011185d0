//! Configuration loading from the process environment.

use crate::config::schema::{DeployConfig, NetworkConfig, TokenParams, DEFAULT_DECIMALS};

/// Environment variable holding the deployment wallet seed phrase.
pub const MNEMONIC_ENV_VAR: &str = "mnemonics_2";

pub const TOKEN_NAME_ENV_VAR: &str = "token_name";
pub const TOKEN_SYMBOL_ENV_VAR: &str = "token_symbol";
pub const TOKEN_DESCRIPTION_ENV_VAR: &str = "token_description";
pub const TOKEN_DECIMALS_ENV_VAR: &str = "token_decimals";
pub const TOKEN_URI_ENV_VAR: &str = "token_uri";
pub const TOKEN_IMAGE_ENV_VAR: &str = "token_image";

pub const ENDPOINT_ENV_VAR: &str = "TON_API_ENDPOINT";
pub const RPC_TIMEOUT_ENV_VAR: &str = "TON_API_TIMEOUT_SECS";

/// Load configuration from the process environment.
pub fn from_env() -> DeployConfig {
    from_lookup(|name| std::env::var(name).ok())
}

/// Load configuration through an injected variable lookup.
///
/// Empty values are treated as unset, matching the behavior operators get
/// from commenting a line out of their env file halfway.
pub fn from_lookup<F>(lookup: F) -> DeployConfig
where
    F: Fn(&str) -> Option<String>,
{
    let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    let defaults = TokenParams::default();
    let decimals = match get(TOKEN_DECIMALS_ENV_VAR) {
        None => DEFAULT_DECIMALS,
        Some(raw) => match raw.trim().parse() {
            // Supply scaling is 10^decimals on a 128-bit amount.
            Ok(d) if d <= 18 => d,
            _ => {
                tracing::debug!(value = %raw, "unusable token_decimals, using default");
                DEFAULT_DECIMALS
            }
        },
    };

    let network_defaults = NetworkConfig::default();
    DeployConfig {
        mnemonic: lookup(MNEMONIC_ENV_VAR).unwrap_or_default(),
        network: NetworkConfig {
            endpoint: get(ENDPOINT_ENV_VAR).unwrap_or(network_defaults.endpoint),
            rpc_timeout_secs: get(RPC_TIMEOUT_ENV_VAR)
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(network_defaults.rpc_timeout_secs),
        },
        token: TokenParams {
            name: get(TOKEN_NAME_ENV_VAR).unwrap_or(defaults.name),
            symbol: get(TOKEN_SYMBOL_ENV_VAR).unwrap_or(defaults.symbol),
            description: get(TOKEN_DESCRIPTION_ENV_VAR).unwrap_or(defaults.description),
            decimals,
            uri: get(TOKEN_URI_ENV_VAR),
            image: get(TOKEN_IMAGE_ENV_VAR),
        },
    }
}
