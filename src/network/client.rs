//! Peer chain retrieval
//!
//! Consensus only needs one thing from a peer: its full chain and length.
//! [`ChainSource`] abstracts that request so the resolver can be driven by
//! HTTP in production and by an in-memory map in tests.

use crate::core::ChainSnapshot;
use crate::network::peer::PeerError;
use futures::future::BoxFuture;
use std::time::Duration;

/// Path of the chain endpoint every node serves
pub const CHAIN_PATH: &str = "/chain";

/// Default timeout for a single chain request
pub const DEFAULT_PEER_TIMEOUT: Duration = Duration::from_secs(5);

/// Fetches a peer's chain
pub trait ChainSource: Send + Sync {
    /// Retrieve the chain served by `peer` (canonical `host:port`).
    ///
    /// Any transport failure, non-success status or malformed body is an
    /// error; the caller decides whether that is fatal.
    fn fetch_chain<'a>(
        &'a self,
        peer: &'a str,
    ) -> BoxFuture<'a, Result<ChainSnapshot, PeerError>>;
}

/// Retrieves chains over HTTP with `GET http://{peer}/chain`
#[derive(Debug, Clone)]
pub struct HttpChainSource {
    client: reqwest::Client,
}

impl HttpChainSource {
    pub fn new(timeout: Duration) -> Result<Self, PeerError> {
        // Peers are addressed directly
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .no_proxy()
            .build()?;
        Ok(Self { client })
    }

    async fn get_chain(&self, peer: &str) -> Result<ChainSnapshot, PeerError> {
        let url = format!("http://{}{}", peer, CHAIN_PATH);
        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PeerError::BadStatus(status.as_u16()));
        }

        let body = response.bytes().await?;
        let snapshot: ChainSnapshot = serde_json::from_slice(&body)?;
        Ok(snapshot)
    }
}

impl ChainSource for HttpChainSource {
    fn fetch_chain<'a>(
        &'a self,
        peer: &'a str,
    ) -> BoxFuture<'a, Result<ChainSnapshot, PeerError>> {
        Box::pin(self.get_chain(peer))
    }
}

/// Serves fixed snapshots from memory; unknown peers are unreachable
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryChainSource {
    snapshots: std::sync::RwLock<std::collections::HashMap<String, ChainSnapshot>>,
}

#[cfg(test)]
impl MemoryChainSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the snapshot returned for `peer`
    pub fn insert(&self, peer: &str, snapshot: ChainSnapshot) {
        self.snapshots.write().unwrap().insert(peer.to_string(), snapshot);
    }

    /// Make `peer` unreachable
    pub fn remove(&self, peer: &str) {
        self.snapshots.write().unwrap().remove(peer);
    }
}

#[cfg(test)]
impl ChainSource for MemoryChainSource {
    fn fetch_chain<'a>(
        &'a self,
        peer: &'a str,
    ) -> BoxFuture<'a, Result<ChainSnapshot, PeerError>> {
        let snapshot = self
            .snapshots
            .read()
            .unwrap()
            .get(peer)
            .cloned()
            .ok_or_else(|| PeerError::Unreachable(peer.to_string()));
        Box::pin(async move { snapshot })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Ledger;

    #[tokio::test]
    async fn test_memory_source() {
        let source = MemoryChainSource::new();
        let snapshot = Ledger::new().snapshot();
        source.insert("127.0.0.1:5001", snapshot.clone());

        assert_eq!(source.fetch_chain("127.0.0.1:5001").await.unwrap(), snapshot);
        assert!(matches!(
            source.fetch_chain("127.0.0.1:5002").await,
            Err(PeerError::Unreachable(_))
        ));

        source.remove("127.0.0.1:5001");
        assert!(source.fetch_chain("127.0.0.1:5001").await.is_err());
    }

    #[tokio::test]
    async fn test_http_source_unreachable_peer() {
        let source = HttpChainSource::new(Duration::from_millis(500)).unwrap();
        // Port 9 (discard) on localhost is not expected to serve HTTP
        let result = source.fetch_chain("127.0.0.1:9").await;
        assert!(matches!(result, Err(PeerError::Transport(_))));
    }

    #[tokio::test]
    async fn test_http_source_reads_chain_endpoint() {
        use axum::{routing::get, Json, Router};

        let snapshot = Ledger::new().snapshot();
        let served = snapshot.clone();
        let app = Router::new().route(
            CHAIN_PATH,
            get(move || {
                let served = served.clone();
                async move { Json(served) }
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        let source = HttpChainSource::new(DEFAULT_PEER_TIMEOUT).unwrap();
        let fetched = source.fetch_chain(&addr.to_string()).await.unwrap();
        assert_eq!(fetched, snapshot);
    }

    #[tokio::test]
    async fn test_http_source_rejects_error_status_and_bad_body() {
        use axum::{http::StatusCode, routing::get, Router};

        let app = Router::new()
            .route(CHAIN_PATH, get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        let source = HttpChainSource::new(DEFAULT_PEER_TIMEOUT).unwrap();
        assert!(matches!(
            source.fetch_chain(&addr.to_string()).await,
            Err(PeerError::BadStatus(500))
        ));

        let app = Router::new().route(CHAIN_PATH, get(|| async { r#"{"chain": "nope"}"# }));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        assert!(matches!(
            source.fetch_chain(&addr.to_string()).await,
            Err(PeerError::Malformed(_))
        ));
    }
}
