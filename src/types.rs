//! Wire types mirrored from the remittance contract. Nothing here is
//! authoritative; every field is a projection of contract state and is only
//! ever updated by a fresh read.

use serde::{Deserialize, Serialize};

use crate::units::wei_string;

/// On-chain user record, fetched on connect and after registration.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Profile {
    pub username: String,
    #[serde(rename = "phoneNumber")]
    pub phone_number: String,
    #[serde(rename = "walletAddress")]
    pub wallet_address: String,
    pub exists: bool,
}

/// One entry of the contract's flat transaction log.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TxRecord {
    pub sender: String,
    pub receiver: String,
    #[serde(with = "wei_string")]
    pub amount: u128,
    #[serde(rename = "gasUsed", with = "wei_string")]
    pub gas_used: u128,
    /// Unix seconds, as emitted by the contract.
    pub timestamp: i64,
    /// Method tag: "send", "vault_deposit" or "vault_withdraw".
    pub method: String,
}

/// Point-in-time vault snapshot. Balance deliberately absent: it is fetched
/// out-of-band by the balance watcher.
#[derive(Debug, Clone, PartialEq)]
pub struct VaultSummary {
    pub creator: String,
    pub members: Vec<String>,
    pub is_creator: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum VaultEventKind {
    Deposit,
    Withdraw,
}

/// Contract-emitted vault event, delivered to balance-watch subscribers.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct VaultEvent {
    pub kind: VaultEventKind,
    pub creator: String,
    pub member: String,
    #[serde(with = "wei_string")]
    pub amount: u128,
}

/// Hash of a submitted transaction, to be awaited for confirmation.
#[derive(Debug, Clone, PartialEq)]
pub struct TxHash(pub String);

impl std::fmt::Display for TxHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Case-insensitive address comparison; the contract mixes checksummed and
/// lowercased addresses in its log.
pub fn same_address(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

/// Local shape check for a 0x address. The contract is still the authority
/// on whether it maps to anything.
pub fn is_address(value: &str) -> bool {
    value.len() == 42 && value.starts_with("0x") && hex::decode(&value[2..]).is_ok()
}

pub fn truncate_address(address: &str) -> String {
    if address.len() <= 10 {
        return address.to_string();
    }
    format!("{}...{}", &address[..6], &address[address.len() - 4..])
}
