//! Wallet injected in the page by a browser extension
//!
//! Requests go through `window.ethereum.request`, evaluated in the webview
//! with Dioxus' `document::eval`. Promise rejections are caught on the JS side
//! and handed back as a `{ err: { code, message } }` object so the provider's
//! error code survives the trip.

use crate::wallet::{Eip1193, ProviderError, WalletError};
use dioxus::prelude::document;
use serde::Deserialize;
use serde_json::{Value, json};
use std::time::Duration;

const DETECT_SCRIPT: &str = r#"return typeof window.ethereum !== "undefined";"#;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
enum Reply {
    Ok(Value),
    Err(ProviderError),
}

/// Handle on `window.ethereum`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BrowserWallet;

impl BrowserWallet {
    /// Returns a handle when an extension injected a provider
    pub async fn detect() -> Option<BrowserWallet> {
        match document::eval(DETECT_SCRIPT).join::<bool>().await {
            Ok(true) => Some(BrowserWallet),
            Ok(false) => None,
            Err(err) => {
                log::warn!("Wallet detection failed: {:?}", err);
                None
            }
        }
    }
}

fn request_script(method: &str, params: &Value) -> Result<String, WalletError> {
    let payload = serde_json::to_string(&json!({ "method": method, "params": params }))?;
    Ok(format!(
        r#"try {{
    const result = await window.ethereum.request({payload});
    return {{ ok: result ?? null }};
}} catch (e) {{
    return {{ err: {{ code: e?.code ?? -1, message: String(e?.message ?? e) }} }};
}}"#
    ))
}

impl Eip1193 for BrowserWallet {
    async fn request(&self, method: &str, params: Value) -> Result<Value, WalletError> {
        let script = request_script(method, &params)?;
        log::debug!("window.ethereum.request {}", method);
        let reply = document::eval(&script)
            .join::<Reply>()
            .await
            .map_err(|e| WalletError::Eval(format!("{e:?}")))?;
        match reply {
            Reply::Ok(value) => Ok(value),
            Reply::Err(err) => Err(err.into()),
        }
    }

    async fn pause(&self, duration: Duration) {
        let script = format!(
            "await new Promise(resolve => setTimeout(resolve, {})); return null;",
            duration.as_millis()
        );
        if let Err(err) = document::eval(&script).join::<Value>().await {
            log::warn!("Poll delay failed: {:?}", err);
        }
    }
}
