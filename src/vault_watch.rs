//! Vault balance watcher: one fetch routine, several triggers.
//!
//! The previous ad-hoc mix of mount fetch, interval poll and event listeners
//! is made an explicit refresh-on-trigger loop here. Triggers are the watch
//! start, a fixed interval, matching contract events and a manual channel;
//! all converge on the same read. No coalescing: overlapping triggers just
//! produce redundant idempotent reads, and the displayed value is always the
//! latest successful one.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc, watch};

use crate::client::ContractApi;
use crate::types::{same_address, VaultEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshTrigger {
    Start,
    Interval,
    Event,
    Manual,
}

/// Handle to a running watcher. Dropping it ends the loop and removes the
/// event listener.
pub struct VaultBalanceHandle {
    balance_rx: watch::Receiver<u128>,
    manual_tx: mpsc::Sender<()>,
    task: tokio::task::JoinHandle<()>,
}

impl VaultBalanceHandle {
    /// Latest successfully read balance, in wei.
    pub fn balance(&self) -> u128 {
        *self.balance_rx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<u128> {
        self.balance_rx.clone()
    }

    /// Queue a manual refresh (the "Refresh" button).
    pub async fn refresh(&self) {
        let _ = self.manual_tx.send(()).await;
    }
}

impl Drop for VaultBalanceHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Start watching one vault's balance. Changing the watched vault means
/// dropping the handle and spawning a new one.
pub fn spawn(
    contract: Arc<dyn ContractApi>,
    creator: String,
    poll_interval: Duration,
) -> VaultBalanceHandle {
    let (balance_tx, balance_rx) = watch::channel(0u128);
    let (manual_tx, mut manual_rx) = mpsc::channel::<()>(8);
    let mut events = contract.subscribe_vault_events();

    let task = tokio::spawn(async move {
        fetch(&contract, &creator, &balance_tx, RefreshTrigger::Start).await;

        let mut interval = tokio::time::interval(poll_interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        interval.tick().await; // immediate first tick already covered by Start

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    fetch(&contract, &creator, &balance_tx, RefreshTrigger::Interval).await;
                }
                event = events.recv() => {
                    match event {
                        Ok(event) if event_matches(&event, &creator) => {
                            fetch(&contract, &creator, &balance_tx, RefreshTrigger::Event).await;
                        }
                        Ok(_) => {}
                        Err(broadcast::error::RecvError::Lagged(n)) => {
                            tracing::warn!("Vault event stream lagged by {}, refreshing", n);
                            fetch(&contract, &creator, &balance_tx, RefreshTrigger::Event).await;
                        }
                        Err(broadcast::error::RecvError::Closed) => {
                            // Event feed gone; keep polling.
                            events = contract.subscribe_vault_events();
                        }
                    }
                }
                cmd = manual_rx.recv() => {
                    match cmd {
                        Some(()) => {
                            fetch(&contract, &creator, &balance_tx, RefreshTrigger::Manual).await;
                        }
                        None => break,
                    }
                }
            }
        }
    });

    VaultBalanceHandle {
        balance_rx,
        manual_tx,
        task,
    }
}

fn event_matches(event: &VaultEvent, creator: &str) -> bool {
    same_address(&event.creator, creator)
}

async fn fetch(
    contract: &Arc<dyn ContractApi>,
    creator: &str,
    balance_tx: &watch::Sender<u128>,
    trigger: RefreshTrigger,
) {
    match contract.get_vault_balance(creator).await {
        Ok(balance) => {
            tracing::debug!("Vault {} balance {} ({:?})", creator, balance, trigger);
            let _ = balance_tx.send(balance);
        }
        Err(e) => {
            // Stale-but-present beats blanking the display.
            tracing::error!("Error fetching balance: {}", e);
        }
    }
}
