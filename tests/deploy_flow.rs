//! End-to-end deployment flow against a mock API backend.

use std::net::SocketAddr;

use jetton_deployer::config::{loader, DeployConfig};
use jetton_deployer::deploy;

mod common;

const PHRASE: &str = "dose ice enrich trigger test dove century still betray gas diet dune use other base gym mad law immense village world example praise game";

fn test_config(endpoint: &str, extra: &[(&str, &str)]) -> DeployConfig {
    let mut vars: Vec<(String, String)> = vec![
        ("mnemonics_2".to_string(), PHRASE.to_string()),
        ("TON_API_ENDPOINT".to_string(), endpoint.to_string()),
    ];
    for (k, v) in extra {
        vars.push((k.to_string(), v.to_string()));
    }
    loader::from_lookup(|name| {
        vars.iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.clone())
    })
}

#[tokio::test]
async fn test_happy_path_submits_exactly_once() {
    let addr: SocketAddr = "127.0.0.1:28391".parse().unwrap();
    let counters = common::start_mock_api(addr, false).await;
    let config = test_config(&format!("http://{addr}"), &[]);

    let report = deploy::run(&config).await.expect("deploy should succeed");

    assert_eq!(report.seqno, 14);
    assert_eq!(report.balance, 5_000_000_000);
    // Default decimals 9: 10^9 whole tokens in elementary units.
    assert_eq!(report.minted, 1_000_000_000u128 * 1_000_000_000);
    assert_eq!(report.master_address.workchain, 0);
    assert_eq!(counters.sends(), 1);
}

#[tokio::test]
async fn test_decimals_and_image_overrides() {
    let addr: SocketAddr = "127.0.0.1:28392".parse().unwrap();
    let _counters = common::start_mock_api(addr, false).await;
    let config = test_config(
        &format!("http://{addr}"),
        &[
            ("token_decimals", "6"),
            ("token_image", "https://example.com/logo.png"),
        ],
    );
    assert_eq!(
        config.token.image.as_deref(),
        Some("https://example.com/logo.png")
    );

    let report = deploy::run(&config).await.expect("deploy should succeed");
    assert_eq!(report.minted, 1_000_000_000u128 * 1_000_000);
}

#[tokio::test]
async fn test_master_address_is_referentially_transparent() {
    let addr: SocketAddr = "127.0.0.1:28393".parse().unwrap();
    let counters = common::start_mock_api(addr, false).await;
    let config = test_config(&format!("http://{addr}"), &[]);

    let first = deploy::run(&config).await.unwrap();
    let second = deploy::run(&config).await.unwrap();

    assert_eq!(first.wallet_address, second.wallet_address);
    assert_eq!(first.master_address, second.master_address);
    assert_eq!(counters.sends(), 2);
}

#[tokio::test]
async fn test_token_params_change_master_address() {
    let addr: SocketAddr = "127.0.0.1:28394".parse().unwrap();
    let _counters = common::start_mock_api(addr, false).await;
    let base = test_config(&format!("http://{addr}"), &[]);
    let renamed = test_config(&format!("http://{addr}"), &[("token_symbol", "OTHER")]);

    let a = deploy::run(&base).await.unwrap();
    let b = deploy::run(&renamed).await.unwrap();
    assert_ne!(a.master_address, b.master_address);
}

#[tokio::test]
async fn test_seqno_failure_aborts_before_send() {
    let addr: SocketAddr = "127.0.0.1:28395".parse().unwrap();
    let counters = common::start_mock_api(addr, true).await;
    let config = test_config(&format!("http://{addr}"), &[]);

    let result = deploy::run(&config).await;

    assert!(result.is_err());
    assert_eq!(counters.sends(), 0);
}

#[tokio::test]
async fn test_missing_mnemonic_fails_before_any_rpc() {
    let addr: SocketAddr = "127.0.0.1:28396".parse().unwrap();
    let counters = common::start_mock_api(addr, false).await;
    let mut config = test_config(&format!("http://{addr}"), &[]);
    config.mnemonic.clear();

    let result = deploy::run(&config).await;

    assert!(result.is_err());
    assert_eq!(counters.requests(), 0);
}
