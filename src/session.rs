//! Wallet session: the connected account, the account-bound contract handle
//! and the cached profile. Exactly one session lives at a time; views borrow
//! the handle through it instead of reaching for ambient state.

use std::sync::Arc;

use crate::client::ContractApi;
use crate::error::RemitError;
use crate::provider::WalletProvider;
use crate::types::{same_address, Profile};

/// Builds a contract handle bound to the given signing account. Injected so
/// tests can hand back a mock.
pub type ContractFactory = Box<dyn Fn(&str) -> Arc<dyn ContractApi> + Send + Sync>;

pub struct Session {
    provider: Arc<dyn WalletProvider>,
    contract_factory: ContractFactory,
    account: Option<String>,
    contract: Option<Arc<dyn ContractApi>>,
    profile: Option<Profile>,
    connected: bool,
}

impl Session {
    pub fn new(provider: Arc<dyn WalletProvider>, contract_factory: ContractFactory) -> Self {
        Session {
            provider,
            contract_factory,
            account: None,
            contract: None,
            profile: None,
            connected: false,
        }
    }

    /// Connect the wallet: one accounts request, one handle construction,
    /// one profile read.
    ///
    /// An absent provider is returned to the caller (it owns the install
    /// prompt). Any other provider failure is logged and leaves the session
    /// untouched.
    pub async fn connect(&mut self) -> Result<(), RemitError> {
        let accounts = match self.provider.request_accounts().await {
            Ok(accounts) => accounts,
            Err(RemitError::ProviderAbsent) => return Err(RemitError::ProviderAbsent),
            Err(e) => {
                tracing::error!("Error connecting wallet: {}", e);
                return Ok(());
            }
        };

        let Some(address) = accounts.first().cloned() else {
            tracing::error!("Wallet returned no accounts");
            return Ok(());
        };

        let contract = (self.contract_factory)(&address);

        self.account = Some(address.clone());
        self.contract = Some(contract.clone());
        self.connected = true;
        self.profile = None;

        // Profile read failure is non-fatal: the user just looks
        // unregistered until the next refresh.
        match contract.get_user(&address).await {
            Ok(profile) if profile.exists => self.profile = Some(profile),
            Ok(_) => {}
            Err(e) => tracing::error!("Error fetching user data: {}", e),
        }

        Ok(())
    }

    pub fn disconnect(&mut self) {
        self.account = None;
        self.contract = None;
        self.profile = None;
        self.connected = false;
    }

    /// Re-fetch the cached profile; the only way it ever changes.
    pub async fn refresh_profile(&mut self) {
        let (Some(contract), Some(account)) = (&self.contract, &self.account) else {
            return;
        };
        match contract.get_user(account).await {
            Ok(profile) if profile.exists => self.profile = Some(profile),
            Ok(_) => {}
            Err(e) => tracing::error!("Error fetching user data: {}", e),
        }
    }

    /// Provider account-list notification. An empty list or a switched first
    /// account destroys the session.
    pub fn handle_accounts_changed(&mut self, accounts: &[String]) {
        match accounts.first() {
            None => self.disconnect(),
            Some(first) => {
                if let Some(current) = &self.account {
                    if !same_address(current, first) {
                        self.disconnect();
                    }
                }
            }
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn account(&self) -> Option<&str> {
        self.account.as_deref()
    }

    pub fn profile(&self) -> Option<&Profile> {
        self.profile.as_ref()
    }

    pub fn provider(&self) -> Arc<dyn WalletProvider> {
        self.provider.clone()
    }

    pub fn contract(&self) -> Result<Arc<dyn ContractApi>, RemitError> {
        self.contract.clone().ok_or(RemitError::NotConnected)
    }
}
