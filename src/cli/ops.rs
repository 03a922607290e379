use std::time::Duration;

use clap::Subcommand;

use crate::config::RemitConfig;
use crate::session::Session;
use crate::types::truncate_address;
use crate::units::{format_ether, parse_ether};
use crate::vault_watch;
use crate::vaults;

#[derive(Subcommand)]
pub enum VaultCommands {
    /// List every vault this wallet belongs to
    List,
    /// Create a vault with this wallet as its creator
    Create,
    /// Add a member address to a vault
    AddMember {
        #[arg(long)]
        creator: String,
        #[arg(long)]
        member: String,
    },
    /// Deposit ETH into a vault
    Deposit {
        #[arg(long)]
        creator: String,
        /// Amount in ETH
        #[arg(long)]
        amount: String,
    },
    /// Withdraw ETH from a vault
    Withdraw {
        #[arg(long)]
        creator: String,
        /// Amount in ETH
        #[arg(long)]
        amount: String,
    },
    /// Show a vault's balance
    Balance {
        #[arg(long)]
        creator: String,
        /// Keep running and print the balance as it changes
        #[arg(long)]
        watch: bool,
    },
}

pub async fn handle_vault_command(session: &Session, config: &RemitConfig, cmd: VaultCommands) {
    let contract = match session.contract() {
        Ok(c) => c,
        Err(e) => {
            println!("Error: {}", e);
            return;
        }
    };
    let account = session.account().unwrap_or_default().to_string();

    match cmd {
        VaultCommands::List => {
            println!("Fetching vaults...");
            match vaults::fetch_all(&contract, &account).await {
                Ok(list) if list.is_empty() => println!("No vaults found."),
                Ok(list) => {
                    for vault in list {
                        let role = if vault.is_creator { "creator" } else { "member" };
                        println!(
                            "  {} ({}) - {} member(s)",
                            truncate_address(&vault.creator),
                            role,
                            vault.members.len()
                        );
                        for member in &vault.members {
                            println!("      {}", truncate_address(member));
                        }
                    }
                }
                Err(e) => println!("Error fetching vaults: {}", e),
            }
        }
        VaultCommands::Create => {
            println!("Creating vault...");
            match vaults::create(&contract).await {
                Ok(tx) => println!("Vault created. Tx Hash: {}", tx),
                Err(e) => println!("{}", e.user_message()),
            }
        }
        VaultCommands::AddMember { creator, member } => {
            println!("Adding {} to vault...", truncate_address(&member));
            match vaults::add_member(&contract, &creator, &member).await {
                Ok(tx) => println!("Member added. Tx Hash: {}", tx),
                Err(e) => println!("{}", e.user_message()),
            }
        }
        VaultCommands::Deposit { creator, amount } => {
            let value_wei = match parse_ether(&amount) {
                Ok(wei) => wei,
                Err(e) => {
                    println!("Error: {}", e);
                    return;
                }
            };
            println!("Depositing {} ETH...", format_ether(value_wei));
            match vaults::deposit(&contract, &creator, value_wei).await {
                Ok(tx) => println!("Deposit confirmed. Tx Hash: {}", tx),
                Err(e) => println!("{}", e.user_message()),
            }
        }
        VaultCommands::Withdraw { creator, amount } => {
            let amount_wei = match parse_ether(&amount) {
                Ok(wei) => wei,
                Err(e) => {
                    println!("Error: {}", e);
                    return;
                }
            };
            // One fresh read stands in for the displayed figure the gate
            // normally checks against.
            let displayed = match contract.get_vault_balance(&creator).await {
                Ok(wei) => wei,
                Err(e) => {
                    println!("Error reading vault balance: {}", e);
                    return;
                }
            };
            println!("Withdrawing {} ETH...", format_ether(amount_wei));
            match vaults::withdraw(&contract, &creator, amount_wei, displayed).await {
                Ok(tx) => println!("Withdrawal confirmed. Tx Hash: {}", tx),
                Err(e) => println!("{}", e.user_message()),
            }
        }
        VaultCommands::Balance { creator, watch } => {
            if !watch {
                match contract.get_vault_balance(&creator).await {
                    Ok(wei) => println!("Vault balance: {} ETH", format_ether(wei)),
                    Err(e) => println!("Error: {}", e),
                }
                return;
            }

            let handle = vault_watch::spawn(
                contract.clone(),
                creator.clone(),
                Duration::from_secs(config.watcher.poll_interval_secs),
            );
            let mut rx = handle.subscribe();
            println!("Watching vault {} (Ctrl-C to stop)...", truncate_address(&creator));
            loop {
                tokio::select! {
                    changed = rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        println!("Vault balance: {} ETH", format_ether(*rx.borrow()));
                    }
                    _ = tokio::signal::ctrl_c() => {
                        println!("Stopping watch.");
                        break;
                    }
                }
            }
        }
    }
}
