//! Wallet provider abstraction
//!
//! Every wallet the application talks to, the browser extension as well as a
//! development node with unlocked accounts, speaks the EIP-1193 request
//! interface. This module defines that interface and the handful of typed
//! requests the ATM page needs on top of it.

use alloy_primitives::{Address, B256, Bytes};
use serde::Deserialize;
use serde_json::{Value, json};
use std::future::Future;
use std::time::Duration;

/// Errors raised while talking to a wallet provider
#[derive(Debug, thiserror::Error)]
pub enum WalletError {
    #[error("MetaMask wallet is required to connect")]
    NotDetected,
    #[error("wallet request failed ({code}): {message}")]
    Rpc { code: i64, message: String },
    #[error("transport error: {0}")]
    Transport(String),
    #[error("script evaluation failed: {0}")]
    Eval(String),
    #[error("malformed wallet response: {0}")]
    Json(#[from] serde_json::Error),
    #[error("abi decoding failed: {0}")]
    Abi(#[from] alloy_sol_types::Error),
    #[error("transaction {0} reverted")]
    Reverted(B256),
}

/// JSON-RPC error object as returned by providers
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderError {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
}

impl From<ProviderError> for WalletError {
    fn from(err: ProviderError) -> Self {
        WalletError::Rpc {
            code: err.code,
            message: err.message,
        }
    }
}

/// Minimal EIP-1193 provider
///
/// Futures are not required to be `Send`: the browser provider lives on the
/// single wasm thread.
pub trait Eip1193 {
    /// Sends one request and returns the raw `result` member
    fn request(
        &self,
        method: &str,
        params: Value,
    ) -> impl Future<Output = Result<Value, WalletError>>;

    /// Waits between two receipt polls
    fn pause(&self, duration: Duration) -> impl Future<Output = ()>;
}

/// Subset of a transaction receipt the page cares about
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub transaction_hash: B256,
    #[serde(default)]
    pub block_number: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl Receipt {
    /// Pre-byzantium receipts carry no status, treat them as successful
    pub fn succeeded(&self) -> bool {
        self.status.as_deref().map_or(true, |s| s == "0x1")
    }

    pub fn block(&self) -> Option<u64> {
        let raw = self.block_number.as_deref()?;
        u64::from_str_radix(raw.trim_start_matches("0x"), 16).ok()
    }
}

/// Lists the accounts the user already authorized, without prompting
pub async fn accounts<P: Eip1193>(provider: &P) -> Result<Vec<Address>, WalletError> {
    let value = provider.request("eth_accounts", json!([])).await?;
    Ok(serde_json::from_value(value)?)
}

/// Asks the wallet to authorize accounts; this opens the consent prompt
pub async fn request_accounts<P: Eip1193>(provider: &P) -> Result<Vec<Address>, WalletError> {
    let value = provider.request("eth_requestAccounts", json!([])).await?;
    Ok(serde_json::from_value(value)?)
}

/// Read-only contract call against the latest block
pub async fn call<P: Eip1193>(
    provider: &P,
    from: Address,
    to: Address,
    data: Bytes,
) -> Result<Bytes, WalletError> {
    let tx = json!({ "from": from, "to": to, "data": data });
    let value = provider.request("eth_call", json!([tx, "latest"])).await?;
    Ok(serde_json::from_value(value)?)
}

/// Hands a transaction to the wallet for signing and submission
pub async fn send_transaction<P: Eip1193>(
    provider: &P,
    from: Address,
    to: Address,
    data: Bytes,
) -> Result<B256, WalletError> {
    let tx = json!({ "from": from, "to": to, "data": data });
    let value = provider.request("eth_sendTransaction", json!([tx])).await?;
    Ok(serde_json::from_value(value)?)
}

/// Polls until the transaction is included. There is no timeout.
pub async fn wait_for_inclusion<P: Eip1193>(
    provider: &P,
    hash: B256,
    poll_interval: Duration,
) -> Result<Receipt, WalletError> {
    loop {
        let value = provider
            .request("eth_getTransactionReceipt", json!([hash]))
            .await?;
        if !value.is_null() {
            let receipt: Receipt = serde_json::from_value(value)?;
            if !receipt.succeeded() {
                return Err(WalletError::Reverted(hash));
            }
            log::debug!("Transaction {} included in block {:?}", hash, receipt.block());
            return Ok(receipt);
        }
        provider.pause(poll_interval).await;
    }
}
