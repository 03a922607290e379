pub mod ops;
pub mod tx;
pub mod user;

use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};

use crate::client::{ContractApi, RpcContract};
use crate::config::RemitConfig;
use crate::error::RemitError;
use crate::provider::RpcProvider;
use crate::session::{ContractFactory, Session};

#[derive(Parser)]
#[command(name = "remitpay")]
#[command(about = "RemitPay remittance client", long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(long, default_value = "remitpay.toml")]
    pub config: String,
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Register a username and phone number for this wallet
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        phone: String,
    },
    /// Send funds to a username, phone number or address
    Send {
        #[arg(long)]
        to: String,
        /// Amount in ETH
        #[arg(long)]
        amount: String,
    },
    /// Show receive details and generate a payment QR code
    Receive {
        /// Also write the QR code as an SVG image
        #[arg(long)]
        save: bool,
    },
    /// Wallet balance and profile overview
    Dashboard,
    /// Transaction history
    History {
        #[arg(long, value_enum, default_value = "all")]
        filter: crate::history::HistoryFilter,
        #[arg(long, value_enum, default_value = "date")]
        sort_by: crate::history::SortBy,
        #[arg(long, value_enum, default_value = "desc")]
        order: crate::history::SortOrder,
    },
    /// Family vault operations
    Vault {
        #[command(subcommand)]
        cmd: ops::VaultCommands,
    },
}

/// Wire a session against the configured node: JSON-RPC provider plus a
/// contract factory that binds handles to the connected account and starts
/// their vault event feed.
pub fn build_session(config: &RemitConfig) -> (Session, Arc<RpcProvider>) {
    let provider = Arc::new(RpcProvider::new(config.node.rpc_url.clone()));
    let rpc_url = config.node.rpc_url.clone();
    let contract_address = config.node.contract_address.clone();
    let event_poll = Duration::from_millis(config.watcher.event_poll_ms);

    let factory: ContractFactory = Box::new(move |account| {
        let contract = Arc::new(RpcContract::new(
            rpc_url.clone(),
            contract_address.clone(),
            account.to_string(),
        ));
        // Detached; the feed ends when the handle's last Arc drops.
        let _feed = contract.start_event_feed(event_poll);
        contract as Arc<dyn ContractApi>
    });

    (Session::new(provider.clone(), factory), provider)
}

/// Connect, surfacing the install prompt when no provider is listening.
pub async fn connect_or_exit(session: &mut Session) -> bool {
    match session.connect().await {
        Ok(()) if session.is_connected() => true,
        Ok(()) => {
            println!("Could not connect wallet. Check the provider and try again.");
            false
        }
        Err(RemitError::ProviderAbsent) => {
            println!("{}", RemitError::ProviderAbsent);
            false
        }
        Err(e) => {
            println!("Connection failed: {}", e);
            false
        }
    }
}
