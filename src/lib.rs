pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod history;
pub mod interactive;
pub mod provider;
pub mod receive;
pub mod registration;
pub mod send;
pub mod session;
pub mod types;
pub mod units;
pub mod vault_watch;
pub mod vaults;

#[cfg(test)]
pub mod testutil;
