//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use pin_secrets::config::SecretsConfig;
use pin_secrets::{HttpServer, MemoryStore, Shutdown};
use tokio::net::TcpListener;

/// A server running on an ephemeral port. Dropping it shuts the server down.
pub struct TestServer {
    pub addr: SocketAddr,
    shutdown: Shutdown,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Config with PIN size 4 and rate limiting off, so functional tests are
/// not throttled.
pub fn test_config() -> SecretsConfig {
    let mut config = SecretsConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.limits.pin_size = 4;
    config.rate_limit.enabled = false;
    config
}

/// Start the full server with an in-memory store.
pub async fn start_server(config: SecretsConfig) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let store = Arc::new(MemoryStore::new(config.limits));
    let server = HttpServer::new(config, store);
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    TestServer { addr, shutdown }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
