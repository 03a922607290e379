use chrono::{DateTime, Utc};

use crate::error::RemitError;
use crate::history::{self, HistoryFilter, SortBy, SortOrder, TxDirection};
use crate::send;
use crate::session::Session;
use crate::types::truncate_address;
use crate::units::{format_ether, format_ether_gas, parse_ether};

pub async fn handle_send_command(session: &Session, to: String, amount: String) {
    let contract = match session.contract() {
        Ok(c) => c,
        Err(e) => {
            println!("Error: {}", e);
            return;
        }
    };

    let amount_wei = match parse_ether(&amount) {
        Ok(wei) => wei,
        Err(e) => {
            println!("Error: {}", e);
            return;
        }
    };

    // Advisory figure only; zero when the node cannot estimate.
    let provider = session.provider();
    let fee_wei = send::estimate_fee_wei(&contract, &provider, &to, amount_wei).await;
    println!("Sending {} ETH to {}", format_ether(amount_wei), to);
    if fee_wei > 0 {
        println!("Estimated gas fee: {} ETH", format_ether_gas(fee_wei));
        println!(
            "Total (amount + gas): {} ETH",
            format_ether_gas(amount_wei + fee_wei)
        );
    }

    println!("Submitting transfer...");
    match send::send(&contract, &to, amount_wei, fee_wei).await {
        Ok(tx) => {
            println!("Success! Tx Hash: {}", tx);
        }
        Err(e) => {
            println!("{}", e.user_message());
        }
    }
}

pub async fn handle_history_command(
    session: &Session,
    filter: HistoryFilter,
    sort_by: SortBy,
    order: SortOrder,
) {
    let (contract, account) = match (session.contract(), session.account()) {
        (Ok(c), Some(a)) => (c, a.to_string()),
        _ => {
            println!("Error: {}", RemitError::NotConnected);
            return;
        }
    };

    println!("Fetching transaction history...");
    let records = match contract.get_transactions(&account).await {
        Ok(records) => records,
        Err(e) => {
            println!("Error fetching history: {}", e);
            return;
        }
    };

    let records = history::reconcile(&records, &account, filter, sort_by, order);
    if records.is_empty() {
        println!("No transactions found.");
        return;
    }

    println!("{} transaction(s):", records.len());
    for tx in &records {
        let when = DateTime::<Utc>::from_timestamp(tx.timestamp, 0)
            .map(|dt| dt.format("%b %d, %Y %H:%M").to_string())
            .unwrap_or_else(|| tx.timestamp.to_string());
        let sign = match history::direction(tx, &account) {
            TxDirection::Outgoing => "-",
            TxDirection::Incoming => "+",
            TxDirection::Neutral => " ",
        };
        println!(
            "  {} | {:<22} | {}{} ETH | gas {} ETH | {} -> {}",
            when,
            history::type_label(tx, &account),
            sign,
            format_ether(tx.amount),
            format_ether_gas(tx.gas_used),
            truncate_address(&tx.sender),
            truncate_address(&tx.receiver),
        );
    }
}
