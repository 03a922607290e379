//! Mock contract and provider for unit tests. State is scripted per-test;
//! call counters let tests assert how many reads a flow actually issued.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::client::ContractApi;
use crate::error::RemitError;
use crate::provider::WalletProvider;
use crate::types::{Profile, TxHash, TxRecord, VaultEvent};

#[derive(Default)]
struct MockState {
    profiles: HashMap<String, Profile>,
    taken_usernames: HashSet<String>,
    taken_phones: HashSet<String>,
    vaults_for_member: HashMap<String, Vec<String>>,
    vault_members: HashMap<String, Vec<String>>,
    vault_balance: u128,
    /// Scripted answers for successive balance reads; `None` is a failed
    /// read. Exhausted script falls back to `vault_balance`.
    balance_script: VecDeque<Option<u128>>,
    transactions: Vec<TxRecord>,
    gas_estimate: Option<u64>,
    reject_with: Option<String>,
    writes: Vec<String>,
}

pub struct MockContract {
    state: Mutex<MockState>,
    get_user_calls: AtomicUsize,
    balance_calls: AtomicUsize,
    availability_calls: AtomicUsize,
    events_tx: broadcast::Sender<VaultEvent>,
}

impl MockContract {
    pub fn new() -> Self {
        let (events_tx, _) = broadcast::channel(64);
        Self {
            state: Mutex::new(MockState::default()),
            get_user_calls: AtomicUsize::new(0),
            balance_calls: AtomicUsize::new(0),
            availability_calls: AtomicUsize::new(0),
            events_tx,
        }
    }

    /// Seed a stored profile. Availability is scripted separately via
    /// `take_username` / `take_phone`.
    pub fn register_profile(&self, address: &str, username: &str, phone: &str) {
        let mut state = self.state.lock().unwrap();
        state.profiles.insert(
            address.to_lowercase(),
            Profile {
                username: username.to_string(),
                phone_number: phone.to_string(),
                wallet_address: address.to_string(),
                exists: true,
            },
        );
    }

    pub fn take_username(&self, username: &str) {
        self.state
            .lock()
            .unwrap()
            .taken_usernames
            .insert(username.to_string());
    }

    pub fn take_phone(&self, phone: &str) {
        self.state
            .lock()
            .unwrap()
            .taken_phones
            .insert(phone.to_string());
    }

    pub fn set_vaults(&self, member: &str, creators: Vec<&str>) {
        self.state.lock().unwrap().vaults_for_member.insert(
            member.to_lowercase(),
            creators.iter().map(|c| c.to_string()).collect(),
        );
    }

    pub fn set_vault_members(&self, creator: &str, members: Vec<&str>) {
        self.state.lock().unwrap().vault_members.insert(
            creator.to_lowercase(),
            members.iter().map(|m| m.to_string()).collect(),
        );
    }

    pub fn set_vault_balance(&self, balance: u128) {
        self.state.lock().unwrap().vault_balance = balance;
    }

    pub fn script_balances(&self, reads: Vec<Option<u128>>) {
        self.state.lock().unwrap().balance_script = reads.into();
    }

    pub fn set_transactions(&self, txs: Vec<TxRecord>) {
        self.state.lock().unwrap().transactions = txs;
    }

    pub fn set_gas_estimate(&self, gas: Option<u64>) {
        self.state.lock().unwrap().gas_estimate = gas;
    }

    /// Make the next write call fail with a contract rejection.
    pub fn reject_writes_with(&self, reason: &str) {
        self.state.lock().unwrap().reject_with = Some(reason.to_string());
    }

    pub fn emit_vault_event(&self, event: VaultEvent) {
        let _ = self.events_tx.send(event);
    }

    pub fn get_user_calls(&self) -> usize {
        self.get_user_calls.load(Ordering::SeqCst)
    }

    pub fn balance_calls(&self) -> usize {
        self.balance_calls.load(Ordering::SeqCst)
    }

    pub fn availability_calls(&self) -> usize {
        self.availability_calls.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> Vec<String> {
        self.state.lock().unwrap().writes.clone()
    }

    fn write(&self, description: String) -> Result<TxHash, RemitError> {
        let mut state = self.state.lock().unwrap();
        if let Some(reason) = state.reject_with.take() {
            return Err(RemitError::Rejected(reason));
        }
        state.writes.push(description);
        Ok(TxHash(format!("0xmock{:04}", state.writes.len())))
    }
}

impl Default for MockContract {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContractApi for MockContract {
    async fn get_user(&self, address: &str) -> Result<Profile, RemitError> {
        self.get_user_calls.fetch_add(1, Ordering::SeqCst);
        let state = self.state.lock().unwrap();
        Ok(state
            .profiles
            .get(&address.to_lowercase())
            .cloned()
            .unwrap_or(Profile {
                username: String::new(),
                phone_number: String::new(),
                wallet_address: address.to_string(),
                exists: false,
            }))
    }

    async fn check_username_availability(&self, username: &str) -> Result<bool, RemitError> {
        self.availability_calls.fetch_add(1, Ordering::SeqCst);
        Ok(!self.state.lock().unwrap().taken_usernames.contains(username))
    }

    async fn check_phone_availability(&self, phone: &str) -> Result<bool, RemitError> {
        self.availability_calls.fetch_add(1, Ordering::SeqCst);
        Ok(!self.state.lock().unwrap().taken_phones.contains(phone))
    }

    async fn register_user(&self, username: &str, phone: &str) -> Result<TxHash, RemitError> {
        self.write(format!("registerUser {} {}", username, phone))
    }

    async fn send_funds(
        &self,
        identifier: &str,
        address: &str,
        amount_wei: u128,
        _gas_hint_wei: u128,
    ) -> Result<TxHash, RemitError> {
        self.write(format!("sendFunds {} {} {}", identifier, address, amount_wei))
    }

    async fn estimate_send_gas(
        &self,
        _identifier: &str,
        _address: &str,
        _amount_wei: u128,
    ) -> Result<u64, RemitError> {
        self.state
            .lock()
            .unwrap()
            .gas_estimate
            .ok_or_else(|| RemitError::Rpc("estimation failed".to_string()))
    }

    async fn get_vaults_for_member(&self, address: &str) -> Result<Vec<String>, RemitError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .vaults_for_member
            .get(&address.to_lowercase())
            .cloned()
            .unwrap_or_default())
    }

    async fn get_vault_members(&self, creator: &str) -> Result<Vec<String>, RemitError> {
        let state = self.state.lock().unwrap();
        state
            .vault_members
            .get(&creator.to_lowercase())
            .cloned()
            .ok_or_else(|| RemitError::Rejected("Vault does not exist".to_string()))
    }

    async fn get_vault_balance(&self, _creator: &str) -> Result<u128, RemitError> {
        self.balance_calls.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.lock().unwrap();
        match state.balance_script.pop_front() {
            Some(Some(balance)) => {
                state.vault_balance = balance;
                Ok(balance)
            }
            Some(None) => Err(RemitError::Rpc("balance read failed".to_string())),
            None => Ok(state.vault_balance),
        }
    }

    async fn create_vault(&self) -> Result<TxHash, RemitError> {
        self.write("createVault".to_string())
    }

    async fn add_to_vault(&self, creator: &str, member: &str) -> Result<TxHash, RemitError> {
        self.write(format!("addToVault {} {}", creator, member))
    }

    async fn deposit_to_vault(&self, creator: &str, value_wei: u128) -> Result<TxHash, RemitError> {
        self.write(format!("depositToVault {} {}", creator, value_wei))
    }

    async fn withdraw_from_vault(
        &self,
        creator: &str,
        amount_wei: u128,
    ) -> Result<TxHash, RemitError> {
        self.write(format!("withdrawFromVault {} {}", creator, amount_wei))
    }

    async fn get_transactions(&self, _address: &str) -> Result<Vec<TxRecord>, RemitError> {
        Ok(self.state.lock().unwrap().transactions.clone())
    }

    async fn wait_for_confirmation(&self, _tx: &TxHash) -> Result<(), RemitError> {
        Ok(())
    }

    fn subscribe_vault_events(&self) -> broadcast::Receiver<VaultEvent> {
        self.events_tx.subscribe()
    }
}

enum ProviderMode {
    Accounts(Vec<String>),
    Absent,
    Failing(String),
}

pub struct MockProvider {
    mode: ProviderMode,
    balances: Mutex<HashMap<String, u128>>,
    gas_price: Mutex<Option<u128>>,
    accounts_tx: broadcast::Sender<Vec<String>>,
}

impl MockProvider {
    fn with_mode(mode: ProviderMode) -> Self {
        let (accounts_tx, _) = broadcast::channel(8);
        Self {
            mode,
            balances: Mutex::new(HashMap::new()),
            gas_price: Mutex::new(Some(30_000_000_000)), // 30 gwei
            accounts_tx,
        }
    }

    pub fn with_accounts(accounts: Vec<String>) -> Self {
        Self::with_mode(ProviderMode::Accounts(accounts))
    }

    pub fn absent() -> Self {
        Self::with_mode(ProviderMode::Absent)
    }

    pub fn failing(message: &str) -> Self {
        Self::with_mode(ProviderMode::Failing(message.to_string()))
    }

    pub fn set_balance(&self, address: &str, wei: u128) {
        self.balances
            .lock()
            .unwrap()
            .insert(address.to_lowercase(), wei);
    }

    pub fn set_gas_price(&self, wei: Option<u128>) {
        *self.gas_price.lock().unwrap() = wei;
    }

    pub fn push_accounts(&self, accounts: Vec<String>) {
        let _ = self.accounts_tx.send(accounts);
    }
}

#[async_trait]
impl WalletProvider for MockProvider {
    async fn request_accounts(&self) -> Result<Vec<String>, RemitError> {
        match &self.mode {
            ProviderMode::Accounts(accounts) => Ok(accounts.clone()),
            ProviderMode::Absent => Err(RemitError::ProviderAbsent),
            ProviderMode::Failing(msg) => Err(RemitError::Provider(msg.clone())),
        }
    }

    async fn get_balance(&self, address: &str) -> Result<u128, RemitError> {
        Ok(self
            .balances
            .lock()
            .unwrap()
            .get(&address.to_lowercase())
            .copied()
            .unwrap_or(0))
    }

    async fn gas_price(&self) -> Result<u128, RemitError> {
        self.gas_price
            .lock()
            .unwrap()
            .ok_or_else(|| RemitError::Provider("fee data unavailable".to_string()))
    }

    fn subscribe_accounts_changed(&self) -> broadcast::Receiver<Vec<String>> {
        self.accounts_tx.subscribe()
    }
}
