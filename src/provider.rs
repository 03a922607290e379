//! Wallet provider boundary: account access, balances, fee data and the
//! accounts-changed notification. The provider owns all key material; this
//! client never sees a private key.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tokio::sync::broadcast;

use crate::error::RemitError;

#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Ask the wallet for account access. Empty list means the user has no
    /// unlocked account.
    async fn request_accounts(&self) -> Result<Vec<String>, RemitError>;
    async fn get_balance(&self, address: &str) -> Result<u128, RemitError>;
    /// Current gas price in wei, for advisory fee projections.
    async fn gas_price(&self) -> Result<u128, RemitError>;
    /// Account list changes, emitted whenever the wallet switches or locks.
    fn subscribe_accounts_changed(&self) -> broadcast::Receiver<Vec<String>>;
}

/// JSON-RPC wallet provider. A refused connection is treated as
/// provider-absent: there is simply no wallet listening.
pub struct RpcProvider {
    url: String,
    client: Client,
    request_id: AtomicU64,
    accounts_tx: broadcast::Sender<Vec<String>>,
}

impl RpcProvider {
    pub fn new(url: String) -> Self {
        let (accounts_tx, _) = broadcast::channel(8);
        Self {
            url,
            client: Client::new(),
            request_id: AtomicU64::new(1),
            accounts_tx,
        }
    }

    async fn send_request(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, RemitError> {
        let id = self.request_id.fetch_add(1, Ordering::SeqCst);
        let request = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": id,
        });

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    RemitError::ProviderAbsent
                } else {
                    RemitError::Provider(e.to_string())
                }
            })?;

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| RemitError::Provider(format!("Failed to parse response: {}", e)))?;

        if let Some(error) = body.get("error") {
            return Err(RemitError::Provider(
                error["message"].as_str().unwrap_or("Unknown error").to_string(),
            ));
        }

        Ok(body["result"].clone())
    }

    /// Poll the wallet's account list and broadcast on change. The session
    /// listens for this to force a disconnect on lock/switch.
    pub fn start_accounts_watch(self: &Arc<Self>, poll_interval: Duration) -> tokio::task::JoinHandle<()> {
        let provider = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut last: Option<Vec<String>> = None;
            loop {
                let Some(p) = provider.upgrade() else { break };
                match p.send_request("getAccounts", json!(null)).await {
                    Ok(result) => {
                        let accounts: Vec<String> =
                            serde_json::from_value(result).unwrap_or_default();
                        if last.as_ref() != Some(&accounts) {
                            if last.is_some() {
                                let _ = p.accounts_tx.send(accounts.clone());
                            }
                            last = Some(accounts);
                        }
                    }
                    Err(e) => {
                        tracing::warn!("Account watch poll failed: {}", e);
                    }
                }
                drop(p);
                tokio::time::sleep(poll_interval).await;
            }
        })
    }
}

#[async_trait]
impl WalletProvider for RpcProvider {
    async fn request_accounts(&self) -> Result<Vec<String>, RemitError> {
        let result = self.send_request("requestAccounts", json!(null)).await?;
        serde_json::from_value(result)
            .map_err(|e| RemitError::Provider(format!("Bad account list: {}", e)))
    }

    async fn get_balance(&self, address: &str) -> Result<u128, RemitError> {
        let result = self
            .send_request("getBalance", json!({ "address": address }))
            .await?;
        let wei = result["balance"].as_str().unwrap_or("0");
        wei.parse::<u128>()
            .map_err(|e| RemitError::Provider(format!("Bad balance '{}': {}", wei, e)))
    }

    async fn gas_price(&self) -> Result<u128, RemitError> {
        let result = self.send_request("getFeeData", json!(null)).await?;
        let wei = result["gasPrice"].as_str().unwrap_or("0");
        wei.parse::<u128>()
            .map_err(|e| RemitError::Provider(format!("Bad gas price '{}': {}", wei, e)))
    }

    fn subscribe_accounts_changed(&self) -> broadcast::Receiver<Vec<String>> {
        self.accounts_tx.subscribe()
    }
}
