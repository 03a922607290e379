//! Client-side reconciliation of the contract's flat transaction log:
//! duplicate suppression, category filtering and sorting.
//!
//! The contract double-emits self-referential vault transactions (sender ==
//! receiver), so the raw log is treated as untrusted input and exact
//! duplicates are dropped before anything is displayed. First occurrence
//! wins.

use clap::ValueEnum;

use crate::types::{same_address, TxRecord};

pub const METHOD_SEND: &str = "send";
pub const METHOD_VAULT_DEPOSIT: &str = "vault_deposit";
pub const METHOD_VAULT_WITHDRAW: &str = "vault_withdraw";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum HistoryFilter {
    All,
    Sent,
    Received,
    Vault,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortBy {
    Date,
    Amount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Synthetic identity of a record: addresses are lowercased, everything else
/// taken as-is. Two records with equal keys are the same transaction.
fn comparison_key(tx: &TxRecord) -> (String, String, u128, i64, String) {
    (
        tx.sender.to_lowercase(),
        tx.receiver.to_lowercase(),
        tx.amount,
        tx.timestamp,
        tx.method.clone(),
    )
}

/// Dedup, filter and sort the raw log for display.
pub fn reconcile(
    records: &[TxRecord],
    account: &str,
    filter: HistoryFilter,
    sort_by: SortBy,
    order: SortOrder,
) -> Vec<TxRecord> {
    let mut seen = std::collections::HashSet::new();
    let mut result: Vec<TxRecord> = records
        .iter()
        .filter(|tx| seen.insert(comparison_key(tx)))
        .cloned()
        .collect();

    result.retain(|tx| match filter {
        HistoryFilter::All => true,
        HistoryFilter::Sent => tx.method == METHOD_SEND && same_address(&tx.sender, account),
        HistoryFilter::Received => tx.method == METHOD_SEND && same_address(&tx.receiver, account),
        HistoryFilter::Vault => {
            tx.method == METHOD_VAULT_DEPOSIT || tx.method == METHOD_VAULT_WITHDRAW
        }
    });

    // Stable sort keeps log order among equal keys.
    match sort_by {
        SortBy::Date => result.sort_by_key(|tx| tx.timestamp),
        SortBy::Amount => result.sort_by_key(|tx| tx.amount),
    }
    if order == SortOrder::Desc {
        result.reverse();
    }

    result
}

/// Display direction of a record relative to the active account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxDirection {
    Outgoing,
    Incoming,
    Neutral,
}

pub fn direction(tx: &TxRecord, account: &str) -> TxDirection {
    let is_sender = same_address(&tx.sender, account);
    let is_receiver = same_address(&tx.receiver, account);
    if is_sender && is_receiver {
        TxDirection::Neutral
    } else if is_sender {
        TxDirection::Outgoing
    } else {
        TxDirection::Incoming
    }
}

/// Human label for a record, mirroring sender/receiver roles.
pub fn type_label(tx: &TxRecord, account: &str) -> &'static str {
    let is_sender = same_address(&tx.sender, account);
    let is_receiver = same_address(&tx.receiver, account);
    match tx.method.as_str() {
        METHOD_VAULT_DEPOSIT => {
            if is_sender && is_receiver {
                "Vault Self-Deposit"
            } else if is_sender {
                "Vault Deposit"
            } else {
                "Vault Contribution"
            }
        }
        METHOD_VAULT_WITHDRAW => {
            if is_sender && is_receiver {
                "Vault Self-Withdrawal"
            } else if is_sender {
                "Vault Withdrawal"
            } else {
                "Vault Distribution"
            }
        }
        METHOD_SEND => {
            if is_sender {
                "Sent"
            } else {
                "Received"
            }
        }
        _ => "Transaction",
    }
}
