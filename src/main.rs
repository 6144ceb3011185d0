//! Jetton deployment binary.
//!
//! ```text
//! environment (mnemonic + token params)
//!     → config    (defaults, normalization)
//!     → deploy    (derive → query → encode → sign → send, strictly ordered)
//!     → report    (wallet state + final jetton master address)
//! ```
//!
//! One run, one transaction. Any failure terminates the process with a
//! non-zero exit; nothing is retried and nothing local needs rollback.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use jetton_deployer::blockchain::types::from_nano;
use jetton_deployer::{config, deploy};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "jetton_deployer=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("jetton-deployer v0.1.0 starting");

    let config = config::from_env();
    tracing::info!(
        endpoint = %config.network.endpoint,
        token = %config.token.symbol,
        decimals = config.token.decimals,
        "Configuration loaded"
    );

    let testnet = config.network.is_testnet();
    let report = deploy::run(&config).await?;

    let whole_tokens = report.minted / 10u128.pow(config.token.decimals);
    println!(
        "Deployment wallet: {}",
        report.wallet_address.to_friendly(true, testnet)
    );
    println!("Seqno: {}", report.seqno);
    println!("Balance: {} TON", from_nano(report.balance));
    println!("Minting: {} {}", whole_tokens, config.token.symbol);
    println!("=========================================");
    println!(
        "Deployment message sent to:\n{}",
        report.master_address.to_friendly(true, testnet)
    );

    Ok(())
}
