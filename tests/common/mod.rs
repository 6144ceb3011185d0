//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Observed traffic on a mock API instance.
#[derive(Clone, Default)]
pub struct ApiCounters {
    /// Every request that reached the endpoint.
    pub requests: Arc<AtomicU32>,
    /// POSTs to /send specifically.
    pub sends: Arc<AtomicU32>,
}

impl ApiCounters {
    pub fn requests(&self) -> u32 {
        self.requests.load(Ordering::SeqCst)
    }

    pub fn sends(&self) -> u32 {
        self.sends.load(Ordering::SeqCst)
    }
}

/// Start a mock TON HTTP API v4 backend.
///
/// Routes the handful of paths the deployer uses and returns canned
/// responses; with `fail_seqno` the seqno get-method returns a 500 so tests
/// can assert fail-fast ordering.
pub async fn start_mock_api(addr: SocketAddr, fail_seqno: bool) -> ApiCounters {
    let listener = TcpListener::bind(addr).await.unwrap();
    let counters = ApiCounters::default();
    let shared = counters.clone();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let shared = shared.clone();
                    tokio::spawn(async move {
                        let mut buf = vec![0u8; 16384];
                        let n = socket.read(&mut buf).await.unwrap_or(0);
                        let head = String::from_utf8_lossy(&buf[..n]).to_string();
                        let path = head.split_whitespace().nth(1).unwrap_or("").to_string();

                        shared.requests.fetch_add(1, Ordering::SeqCst);
                        let (status, body) = route(&path, fail_seqno, &shared);
                        let response = format!(
                            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                            body.len()
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    counters
}

fn route(path: &str, fail_seqno: bool, counters: &ApiCounters) -> (&'static str, String) {
    if path.ends_with("/run/seqno") {
        if fail_seqno {
            return (
                "500 Internal Server Error",
                r#"{"error":"induced failure"}"#.to_string(),
            );
        }
        (
            "200 OK",
            r#"{"exitCode":0,"result":[{"type":"int","value":"14"}]}"#.to_string(),
        )
    } else if path == "/send" {
        counters.sends.fetch_add(1, Ordering::SeqCst);
        ("200 OK", r#"{"status":1}"#.to_string())
    } else if path == "/block/latest" {
        ("200 OK", r#"{"last":{"seqno":100}}"#.to_string())
    } else if path.starts_with("/account/") {
        (
            "200 OK",
            r#"{"account":{"balance":{"coins":"5000000000"},"state":{"type":"active"}}}"#
                .to_string(),
        )
    } else {
        ("404 Not Found", "{}".to_string())
    }
}
