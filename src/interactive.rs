//! Menu-driven client mode. Every screen works off the shared session; an
//! account switch or lock reported by the wallet tears the session down no
//! matter which screen is up.

use std::io::{self, Write};
use std::time::Duration;

use crate::cli;
use crate::config::RemitConfig;
use crate::history::{HistoryFilter, SortBy, SortOrder};
use crate::provider::WalletProvider;
use crate::registration;
use crate::send;
use crate::session::Session;
use crate::types::truncate_address;
use crate::units::{format_ether, format_ether_gas, parse_ether};
use crate::vault_watch;
use crate::vaults;

pub async fn start(config: RemitConfig) {
    print_banner();

    let (mut session, provider) = cli::build_session(&config);
    println!("Connecting wallet...");
    if !cli::connect_or_exit(&mut session).await {
        return;
    }

    let _accounts_watch =
        provider.start_accounts_watch(Duration::from_millis(config.watcher.event_poll_ms));
    let mut accounts_rx = provider.subscribe_accounts_changed();

    if let Some(account) = session.account() {
        println!("Connected as {}", truncate_address(account));
    }
    if session.profile().is_none() {
        registration_screen(&mut session).await;
    }

    loop {
        // Account switches that happened while a screen was up.
        while let Ok(accounts) = accounts_rx.try_recv() {
            session.handle_accounts_changed(&accounts);
        }
        if !session.is_connected() {
            println!("\nWallet disconnected (account switched or locked).");
            println!("1. Reconnect");
            println!("2. Exit");
            match prompt("Select Option: ").as_str() {
                "1" => {
                    if !cli::connect_or_exit(&mut session).await {
                        return;
                    }
                    if session.profile().is_none() {
                        registration_screen(&mut session).await;
                    }
                }
                _ => return,
            }
            continue;
        }

        println!();
        println!("1. Dashboard");
        println!("2. Send Money");
        println!("3. Receive Money");
        println!("4. Family Vault");
        println!("5. Transaction History");
        println!("6. Register Username");
        println!("7. Exit");

        match prompt("Select Option: ").as_str() {
            "1" => cli::user::handle_dashboard_command(&session).await,
            "2" => send_screen(&session).await,
            "3" => receive_screen(&session, &config),
            "4" => vault_screen(&session, &config).await,
            "5" => history_screen(&session).await,
            "6" => registration_screen(&mut session).await,
            "7" => return,
            // Unknown input routes back to the main menu.
            _ => println!("Invalid option."),
        }
    }
}

fn print_banner() {
    println!("========================================");
    println!("               REMITPAY                 ");
    println!("     send money home, on the chain      ");
    println!("========================================");
}

fn prompt(label: &str) -> String {
    print!("{}", label);
    let _ = io::stdout().flush();
    let mut line = String::new();
    if io::stdin().read_line(&mut line).is_err() {
        return String::new();
    }
    line.trim().to_string()
}

async fn registration_screen(session: &mut Session) {
    println!("\n--- Registration ---");
    if let Some(profile) = session.profile() {
        println!("Already registered as @{}", profile.username);
        return;
    }
    println!("Claim a username so others can pay you without your address.");
    println!("(leave username empty to skip)");

    loop {
        let username = prompt("Username: ");
        if username.is_empty() {
            return;
        }
        let phone = prompt("Phone number: ");
        match registration::register(session, &username, &phone).await {
            Ok(()) => {
                println!("Registration confirmed. Welcome, @{}!", username.trim());
                return;
            }
            Err(e) => {
                println!("{}", e);
            }
        }
    }
}

async fn send_screen(session: &Session) {
    println!("\n--- Send Money ---");
    let contract = match session.contract() {
        Ok(c) => c,
        Err(e) => {
            println!("Error: {}", e);
            return;
        }
    };

    let recipient = prompt("Recipient (username, phone or 0x address): ");
    if recipient.is_empty() {
        return;
    }
    let amount_wei = match parse_ether(&prompt("Amount (ETH): ")) {
        Ok(wei) => wei,
        Err(e) => {
            println!("Error: {}", e);
            return;
        }
    };

    let provider = session.provider();
    let fee_wei = send::estimate_fee_wei(&contract, &provider, &recipient, amount_wei).await;
    println!("Amount:  {} ETH", format_ether(amount_wei));
    if fee_wei > 0 {
        println!("Gas fee: {} ETH (estimated)", format_ether_gas(fee_wei));
        println!("Total:   {} ETH", format_ether_gas(amount_wei + fee_wei));
    } else {
        println!("Gas fee: unavailable");
    }

    if prompt("Confirm send? (y/n): ").to_lowercase() != "y" {
        println!("Cancelled.");
        return;
    }

    println!("Submitting transfer...");
    match send::send(&contract, &recipient, amount_wei, fee_wei).await {
        Ok(tx) => println!("Success! Tx Hash: {}", tx),
        Err(e) => println!("{}", e.user_message()),
    }
}

fn receive_screen(session: &Session, config: &RemitConfig) {
    println!("\n--- Receive Money ---");
    cli::user::handle_receive_command(session, config, false);
    if session.profile().is_some() && prompt("Save QR as SVG? (y/n): ").to_lowercase() == "y" {
        cli::user::handle_receive_command(session, config, true);
    }
}

async fn history_screen(session: &Session) {
    println!("\n--- Transaction History ---");
    let filter = match prompt("Filter [1 all / 2 sent / 3 received / 4 vault]: ").as_str() {
        "2" => HistoryFilter::Sent,
        "3" => HistoryFilter::Received,
        "4" => HistoryFilter::Vault,
        _ => HistoryFilter::All,
    };
    let sort_by = match prompt("Sort by [1 date / 2 amount]: ").as_str() {
        "2" => SortBy::Amount,
        _ => SortBy::Date,
    };
    let order = match prompt("Order [1 newest-first / 2 oldest-first]: ").as_str() {
        "2" => SortOrder::Asc,
        _ => SortOrder::Desc,
    };
    cli::tx::handle_history_command(session, filter, sort_by, order).await;
}

async fn vault_screen(session: &Session, config: &RemitConfig) {
    println!("\n--- Family Vault ---");
    let contract = match session.contract() {
        Ok(c) => c,
        Err(e) => {
            println!("Error: {}", e);
            return;
        }
    };
    let account = session.account().unwrap_or_default().to_string();

    let list = match vaults::fetch_all(&contract, &account).await {
        Ok(list) => list,
        Err(e) => {
            println!("Error fetching vaults: {}", e);
            return;
        }
    };

    if list.is_empty() {
        println!("You are not in any vault yet.");
        if prompt("Create one? (y/n): ").to_lowercase() == "y" {
            match vaults::create(&contract).await {
                Ok(tx) => println!("Vault created. Tx Hash: {}", tx),
                Err(e) => println!("{}", e.user_message()),
            }
        }
        return;
    }

    for (i, vault) in list.iter().enumerate() {
        let role = if vault.is_creator { "creator" } else { "member" };
        println!(
            "{}. {} ({}) - {} member(s)",
            i + 1,
            truncate_address(&vault.creator),
            role,
            vault.members.len()
        );
    }
    let Ok(index) = prompt("Select vault: ").parse::<usize>() else {
        return;
    };
    let Some(vault) = list.get(index.wrapping_sub(1)) else {
        println!("Invalid option.");
        return;
    };

    // Balance stays live for as long as this screen holds the handle.
    let watcher = vault_watch::spawn(
        contract.clone(),
        vault.creator.clone(),
        Duration::from_secs(config.watcher.poll_interval_secs),
    );

    loop {
        println!();
        println!("Vault {}", truncate_address(&vault.creator));
        println!("Balance: {} ETH", format_ether(watcher.balance()));
        println!("1. Refresh balance");
        println!("2. Deposit");
        println!("3. Withdraw");
        if vault.is_creator {
            println!("4. Add member");
        }
        println!("5. Back");

        match prompt("Select Option: ").as_str() {
            "1" => {
                watcher.refresh().await;
                // Give the read a moment before redrawing.
                tokio::time::sleep(Duration::from_millis(300)).await;
            }
            "2" => {
                match parse_ether(&prompt("Amount (ETH): ")) {
                    Ok(wei) => match vaults::deposit(&contract, &vault.creator, wei).await {
                        Ok(tx) => {
                            println!("Deposit confirmed. Tx Hash: {}", tx);
                            watcher.refresh().await;
                        }
                        Err(e) => println!("{}", e.user_message()),
                    },
                    Err(e) => println!("Error: {}", e),
                }
            }
            "3" => {
                match parse_ether(&prompt("Amount (ETH): ")) {
                    Ok(wei) => {
                        match vaults::withdraw(&contract, &vault.creator, wei, watcher.balance())
                            .await
                        {
                            Ok(tx) => {
                                println!("Withdrawal confirmed. Tx Hash: {}", tx);
                                watcher.refresh().await;
                            }
                            Err(e) => println!("{}", e.user_message()),
                        }
                    }
                    Err(e) => println!("Error: {}", e),
                }
            }
            "4" if vault.is_creator => {
                let member = prompt("Member address (0x...): ");
                match vaults::add_member(&contract, &vault.creator, &member).await {
                    Ok(tx) => println!("Member added. Tx Hash: {}", tx),
                    Err(e) => println!("{}", e.user_message()),
                }
            }
            "5" => return,
            _ => println!("Invalid option."),
        }
    }
}
