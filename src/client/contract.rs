// JSON-RPC client for the remittance contract
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tokio::sync::broadcast;

use crate::error::RemitError;
use crate::types::{Profile, TxHash, TxRecord, VaultEvent};

/// Everything the contract exposes to this client. Views and flows only see
/// this trait, so tests can substitute a mock handle.
#[async_trait]
pub trait ContractApi: Send + Sync {
    async fn get_user(&self, address: &str) -> Result<Profile, RemitError>;
    async fn check_username_availability(&self, username: &str) -> Result<bool, RemitError>;
    async fn check_phone_availability(&self, phone: &str) -> Result<bool, RemitError>;
    async fn register_user(&self, username: &str, phone: &str) -> Result<TxHash, RemitError>;

    /// Recipient is a username/phone identifier OR a raw address; the unused
    /// one is passed empty / zero. Amount doubles as the attached value.
    async fn send_funds(
        &self,
        identifier: &str,
        address: &str,
        amount_wei: u128,
        gas_hint_wei: u128,
    ) -> Result<TxHash, RemitError>;
    async fn estimate_send_gas(
        &self,
        identifier: &str,
        address: &str,
        amount_wei: u128,
    ) -> Result<u64, RemitError>;

    async fn get_vaults_for_member(&self, address: &str) -> Result<Vec<String>, RemitError>;
    async fn get_vault_members(&self, creator: &str) -> Result<Vec<String>, RemitError>;
    async fn get_vault_balance(&self, creator: &str) -> Result<u128, RemitError>;
    async fn create_vault(&self) -> Result<TxHash, RemitError>;
    async fn add_to_vault(&self, creator: &str, member: &str) -> Result<TxHash, RemitError>;
    async fn deposit_to_vault(&self, creator: &str, value_wei: u128) -> Result<TxHash, RemitError>;
    async fn withdraw_from_vault(
        &self,
        creator: &str,
        amount_wei: u128,
    ) -> Result<TxHash, RemitError>;

    async fn get_transactions(&self, address: &str) -> Result<Vec<TxRecord>, RemitError>;

    /// Blocks until the transaction is mined. No timeout: a hung node hangs
    /// the caller, matching the rest of the call surface.
    async fn wait_for_confirmation(&self, tx: &TxHash) -> Result<(), RemitError>;

    /// VaultDeposit / VaultWithdraw events, unfiltered. Callers filter by
    /// creator themselves.
    fn subscribe_vault_events(&self) -> broadcast::Receiver<VaultEvent>;
}

/// Contract handle bound to a connected account, speaking JSON-RPC to the
/// node fronting the deployed contract.
pub struct RpcContract {
    url: String,
    contract_address: String,
    /// Signing account every write call is issued from.
    from: String,
    client: Client,
    request_id: AtomicU64,
    events_tx: broadcast::Sender<VaultEvent>,
}

impl RpcContract {
    pub fn new(url: String, contract_address: String, from: String) -> Self {
        let (events_tx, _) = broadcast::channel(64);
        Self {
            url,
            contract_address,
            from,
            client: Client::new(),
            request_id: AtomicU64::new(1),
            events_tx,
        }
    }

    pub fn account(&self) -> &str {
        &self.from
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
            .map_err(|e| RemitError::Rpc(e.to_string()))?;

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| RemitError::Rpc(format!("Failed to parse response: {}", e)))?;

        if let Some(error) = body.get("error") {
            // Business rejections carry a reason string; surface it verbatim.
            if let Some(reason) = error["reason"].as_str() {
                return Err(RemitError::Rejected(reason.to_string()));
            }
            return Err(RemitError::Rpc(
                error["message"].as_str().unwrap_or("Unknown error").to_string(),
            ));
        }

        Ok(body["result"].clone())
    }

    fn wei_from(value: &serde_json::Value) -> Result<u128, RemitError> {
        match value {
            serde_json::Value::String(s) => s
                .parse::<u128>()
                .map_err(|e| RemitError::Rpc(format!("Bad wei value '{}': {}", s, e))),
            serde_json::Value::Number(n) => n
                .as_u64()
                .map(u128::from)
                .ok_or_else(|| RemitError::Rpc(format!("Bad wei value: {}", value))),
            _ => Err(RemitError::Rpc(format!("Bad wei value: {}", value))),
        }
    }

    /// Background scan of the contract's vault event log, fanning new entries
    /// out to subscribers. Runs until the handle is dropped.
    pub fn start_event_feed(self: &Arc<Self>, poll_interval: Duration) -> tokio::task::JoinHandle<()> {
        let contract = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut cursor: u64 = 0;
            let mut first = true;
            loop {
                let Some(contract) = contract.upgrade() else { break };
                match contract
                    .send_request(
                        "getVaultEvents",
                        json!({
                            "contract": contract.contract_address,
                            "fromIndex": cursor,
                        }),
                    )
                    .await
                {
                    Ok(result) => {
                        if let Some(next) = result["nextIndex"].as_u64() {
                            if first {
                                // Skip history present before we attached.
                                cursor = next;
                                first = false;
                            } else {
                                let events: Vec<VaultEvent> = serde_json::from_value(
                                    result["events"].clone(),
                                )
                                .unwrap_or_default();
                                for event in events {
                                    let _ = contract.events_tx.send(event);
                                }
                                cursor = next;
                            }
                        }
                    }
                    Err(e) => {
                        tracing::warn!("Vault event scan failed: {}", e);
                    }
                }
                drop(contract);
                tokio::time::sleep(poll_interval).await;
            }
        })
    }
}

#[async_trait]
impl ContractApi for RpcContract {
    async fn get_user(&self, address: &str) -> Result<Profile, RemitError> {
        let result = self
            .send_request(
                "getUser",
                json!({ "contract": self.contract_address, "address": address }),
            )
            .await?;
        serde_json::from_value(result).map_err(|e| RemitError::Rpc(format!("Bad user record: {}", e)))
    }

    async fn check_username_availability(&self, username: &str) -> Result<bool, RemitError> {
        let result = self
            .send_request(
                "checkUsernameAvailability",
                json!({ "contract": self.contract_address, "username": username }),
            )
            .await?;
        Ok(result.as_bool().unwrap_or(false))
    }

    async fn check_phone_availability(&self, phone: &str) -> Result<bool, RemitError> {
        let result = self
            .send_request(
                "checkPhoneAvailability",
                json!({ "contract": self.contract_address, "phone": phone }),
            )
            .await?;
        Ok(result.as_bool().unwrap_or(false))
    }

    async fn register_user(&self, username: &str, phone: &str) -> Result<TxHash, RemitError> {
        let result = self
            .send_request(
                "registerUser",
                json!({
                    "contract": self.contract_address,
                    "from": self.from,
                    "username": username,
                    "phone": phone,
                }),
            )
            .await?;
        Ok(TxHash(result["txHash"].as_str().unwrap_or("").to_string()))
    }

    async fn send_funds(
        &self,
        identifier: &str,
        address: &str,
        amount_wei: u128,
        gas_hint_wei: u128,
    ) -> Result<TxHash, RemitError> {
        let result = self
            .send_request(
                "sendFunds",
                json!({
                    "contract": self.contract_address,
                    "from": self.from,
                    "identifier": identifier,
                    "address": address,
                    "amount": amount_wei.to_string(),
                    "gasHint": gas_hint_wei.to_string(),
                    "value": amount_wei.to_string(),
                }),
            )
            .await?;
        Ok(TxHash(result["txHash"].as_str().unwrap_or("").to_string()))
    }

    async fn estimate_send_gas(
        &self,
        identifier: &str,
        address: &str,
        amount_wei: u128,
    ) -> Result<u64, RemitError> {
        let result = self
            .send_request(
                "estimateGas",
                json!({
                    "contract": self.contract_address,
                    "from": self.from,
                    "method": "sendFunds",
                    "identifier": identifier,
                    "address": address,
                    "amount": amount_wei.to_string(),
                    "value": amount_wei.to_string(),
                }),
            )
            .await?;
        result["gas"]
            .as_u64()
            .ok_or_else(|| RemitError::Rpc("No gas in estimate response".to_string()))
    }

    async fn get_vaults_for_member(&self, address: &str) -> Result<Vec<String>, RemitError> {
        let result = self
            .send_request(
                "getVaultsForMember",
                json!({ "contract": self.contract_address, "address": address }),
            )
            .await?;
        serde_json::from_value(result).map_err(|e| RemitError::Rpc(format!("Bad vault list: {}", e)))
    }

    async fn get_vault_members(&self, creator: &str) -> Result<Vec<String>, RemitError> {
        let result = self
            .send_request(
                "getVaultMembers",
                json!({ "contract": self.contract_address, "creator": creator }),
            )
            .await?;
        serde_json::from_value(result)
            .map_err(|e| RemitError::Rpc(format!("Bad member list: {}", e)))
    }

    async fn get_vault_balance(&self, creator: &str) -> Result<u128, RemitError> {
        let result = self
            .send_request(
                "getVaultBalance",
                json!({ "contract": self.contract_address, "creator": creator }),
            )
            .await?;
        Self::wei_from(&result["balance"])
    }

    async fn create_vault(&self) -> Result<TxHash, RemitError> {
        let result = self
            .send_request(
                "createVault",
                json!({ "contract": self.contract_address, "from": self.from }),
            )
            .await?;
        Ok(TxHash(result["txHash"].as_str().unwrap_or("").to_string()))
    }

    async fn add_to_vault(&self, creator: &str, member: &str) -> Result<TxHash, RemitError> {
        let result = self
            .send_request(
                "addToVault",
                json!({
                    "contract": self.contract_address,
                    "from": self.from,
                    "creator": creator,
                    "member": member,
                }),
            )
            .await?;
        Ok(TxHash(result["txHash"].as_str().unwrap_or("").to_string()))
    }

    async fn deposit_to_vault(&self, creator: &str, value_wei: u128) -> Result<TxHash, RemitError> {
        let result = self
            .send_request(
                "depositToVault",
                json!({
                    "contract": self.contract_address,
                    "from": self.from,
                    "creator": creator,
                    "value": value_wei.to_string(),
                }),
            )
            .await?;
        Ok(TxHash(result["txHash"].as_str().unwrap_or("").to_string()))
    }

    async fn withdraw_from_vault(
        &self,
        creator: &str,
        amount_wei: u128,
    ) -> Result<TxHash, RemitError> {
        let result = self
            .send_request(
                "withdrawFromVault",
                json!({
                    "contract": self.contract_address,
                    "from": self.from,
                    "creator": creator,
                    "amount": amount_wei.to_string(),
                }),
            )
            .await?;
        Ok(TxHash(result["txHash"].as_str().unwrap_or("").to_string()))
    }

    async fn get_transactions(&self, address: &str) -> Result<Vec<TxRecord>, RemitError> {
        let result = self
            .send_request(
                "getTransactions",
                json!({ "contract": self.contract_address, "address": address }),
            )
            .await?;
        serde_json::from_value(result)
            .map_err(|e| RemitError::Rpc(format!("Bad transaction log: {}", e)))
    }

    async fn wait_for_confirmation(&self, tx: &TxHash) -> Result<(), RemitError> {
        loop {
            let result = self
                .send_request("getTransactionReceipt", json!({ "txHash": tx.0 }))
                .await?;
            if !result.is_null() {
                return match result["status"].as_str() {
                    Some("failed") => Err(RemitError::Rejected(
                        result["reason"]
                            .as_str()
                            .unwrap_or("Transaction reverted")
                            .to_string(),
                    )),
                    _ => Ok(()),
                };
            }
            tokio::time::sleep(Duration::from_secs(1)).await;
        }
    }

    fn subscribe_vault_events(&self) -> broadcast::Receiver<VaultEvent> {
        self.events_tx.subscribe()
    }
}
