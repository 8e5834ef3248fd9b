//! Wallet backed by a JSON-RPC node with unlocked accounts
//!
//! Used by the console front-end against a local development node, where the
//! node itself signs `eth_sendTransaction` for its unlocked accounts.

#![cfg(feature = "server")]

use crate::wallet::{Eip1193, ProviderError, WalletError};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<ProviderError>,
}

impl RpcResponse {
    fn into_result(self) -> Result<Value, WalletError> {
        match (self.error, self.result) {
            (Some(err), _) => Err(err.into()),
            (None, result) => Ok(result.unwrap_or(Value::Null)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RpcWallet {
    client: reqwest::Client,
    url: String,
    next_id: Arc<AtomicU64>,
}

impl RpcWallet {
    pub fn new(url: impl Into<String>) -> Self {
        RpcWallet {
            client: reqwest::Client::new(),
            url: url.into(),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns the wallet when the node answers, `None` otherwise
    pub async fn detect(url: &str) -> Option<RpcWallet> {
        let wallet = RpcWallet::new(url);
        match wallet.request("web3_clientVersion", json!([])).await {
            Ok(version) => {
                log::info!("Connected to node {} ({})", url, version);
                Some(wallet)
            }
            Err(e) => {
                log::warn!("No node reachable at {}: {}", url, e);
                None
            }
        }
    }
}

/// Unlocked node accounts need no consent, authorization is a plain listing
fn node_method(method: &str) -> &str {
    match method {
        "eth_requestAccounts" => "eth_accounts",
        other => other,
    }
}

impl Eip1193 for RpcWallet {
    async fn request(&self, method: &str, params: Value) -> Result<Value, WalletError> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method: node_method(method),
            params,
        };
        log::debug!("-> {} #{}", request.method, request.id);
        let body = serde_json::to_vec(&request)?;
        let bytes = self
            .client
            .post(&self.url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| WalletError::Transport(e.to_string()))?
            .bytes()
            .await
            .map_err(|e| WalletError::Transport(e.to_string()))?;
        let response: RpcResponse = serde_json::from_slice(&bytes)?;
        response.into_result()
    }

    async fn pause(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
