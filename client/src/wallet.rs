//! Wallet providers.
//!
//! A provider owns the accounts, signs vote transactions and tells its
//! listeners when the selected account or the network changes. Two are
//! available:
//!
//! - [`SandboxWallet`] drives an in-process [`SandboxLedger`]
//! - [`RpcWallet`] goes through the gateway's `/sandbox` routes

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use ligue1_ledger::address::canonicalize;
use ligue1_ledger::{LedgerError, LedgerWriter, SandboxLedger, VoteReceipt};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::error::ClientError;
use crate::http::{decode, transport};

const NOTIFICATION_BUFFER: usize = 16;

/// Change pushed by a wallet provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletNotification {
    /// Authorized accounts, selected one first. Empty when the wallet locked.
    AccountsChanged(Vec<String>),
    NetworkChanged(String),
}

#[async_trait]
pub trait WalletProvider: Send + Sync {
    async fn is_available(&self) -> bool;

    /// Ask the user to authorize accounts. Selected account first.
    async fn request_accounts(&self) -> Result<Vec<String>, ClientError>;

    /// Accounts already authorized, without prompting.
    async fn accounts(&self) -> Result<Vec<String>, ClientError>;

    /// Sign and submit a vote from `from`, resolving once it is included.
    async fn submit_vote(&self, from: &str, club_id: u32) -> Result<VoteReceipt, ClientError>;

    fn subscribe(&self) -> broadcast::Receiver<WalletNotification>;
}

/// Accounts a wallet holds plus whether the user authorized them.
struct Keyring {
    accounts: RwLock<Vec<String>>,
    authorized: AtomicBool,
    notifications: broadcast::Sender<WalletNotification>,
}

impl Keyring {
    fn new(accounts: Vec<String>) -> Self {
        let (notifications, _) = broadcast::channel(NOTIFICATION_BUFFER);
        Self {
            accounts: RwLock::new(accounts),
            authorized: AtomicBool::new(false),
            notifications,
        }
    }

    fn authorize(&self) -> Result<Vec<String>, ClientError> {
        let accounts = self.accounts.read().clone();
        if accounts.is_empty() {
            return Err(ClientError::NoAccounts);
        }
        self.authorized.store(true, Ordering::SeqCst);
        Ok(accounts)
    }

    fn authorized(&self) -> Vec<String> {
        if self.authorized.load(Ordering::SeqCst) {
            self.accounts.read().clone()
        } else {
            Vec::new()
        }
    }

    fn ensure_owned(&self, from: &str) -> Result<String, ClientError> {
        let from = canonicalize(from)?;
        if self.authorized().iter().any(|account| *account == from) {
            Ok(from)
        } else {
            Err(ClientError::UnknownAccount(from))
        }
    }

    fn select(&self, address: &str) -> Result<(), ClientError> {
        let address = canonicalize(address)?;
        let accounts = {
            let mut accounts = self.accounts.write();
            accounts.retain(|account| *account != address);
            accounts.insert(0, address);
            accounts.clone()
        };
        self.notify(WalletNotification::AccountsChanged(accounts));
        Ok(())
    }

    fn lock(&self) {
        self.authorized.store(false, Ordering::SeqCst);
        self.notify(WalletNotification::AccountsChanged(Vec::new()));
    }

    fn notify(&self, notification: WalletNotification) {
        debug!(?notification, "Wallet notification");
        // no listener is fine
        let _ = self.notifications.send(notification);
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Sandbox Wallet
// ═══════════════════════════════════════════════════════════════════════════

/// In-process wallet over a [`SandboxLedger`].
pub struct SandboxWallet {
    ledger: SandboxLedger,
    keyring: Keyring,
    network: RwLock<String>,
}

impl SandboxWallet {
    pub fn new(ledger: SandboxLedger, accounts: Vec<String>) -> Self {
        let network = ledger.info().network.clone();
        Self {
            ledger,
            keyring: Keyring::new(accounts),
            network: RwLock::new(network),
        }
    }

    /// Wallet holding `count` freshly generated accounts.
    pub async fn with_generated_accounts(
        ledger: SandboxLedger,
        count: usize,
    ) -> Result<Self, ClientError> {
        let mut accounts = Vec::with_capacity(count);
        for _ in 0..count {
            accounts.push(ledger.generate_account().await?);
        }
        Ok(Self::new(ledger, accounts))
    }

    /// Select another account, as a user would in the wallet UI.
    pub fn switch_account(&self, address: &str) -> Result<(), ClientError> {
        self.keyring.select(address)
    }

    pub fn switch_network(&self, network: &str) {
        *self.network.write() = network.to_string();
        self.keyring
            .notify(WalletNotification::NetworkChanged(network.to_string()));
    }

    /// Revoke the authorization; listeners see an empty account list.
    pub fn lock(&self) {
        self.keyring.lock();
    }

    pub fn network(&self) -> String {
        self.network.read().clone()
    }
}

#[async_trait]
impl WalletProvider for SandboxWallet {
    async fn is_available(&self) -> bool {
        true
    }

    async fn request_accounts(&self) -> Result<Vec<String>, ClientError> {
        self.keyring.authorize()
    }

    async fn accounts(&self) -> Result<Vec<String>, ClientError> {
        Ok(self.keyring.authorized())
    }

    async fn submit_vote(&self, from: &str, club_id: u32) -> Result<VoteReceipt, ClientError> {
        let from = self.keyring.ensure_owned(from)?;
        Ok(self.ledger.vote(&from, club_id).await?)
    }

    fn subscribe(&self) -> broadcast::Receiver<WalletNotification> {
        self.keyring.notifications.subscribe()
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// RPC Wallet
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Deserialize)]
struct AccountBody {
    address: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SubmitVoteBody<'a> {
    from: &'a str,
    club_id: u32,
}

#[derive(Deserialize)]
struct ReceiptBody {
    receipt: VoteReceipt,
}

/// Wallet whose node is reached through the gateway's `/sandbox` routes.
///
/// The first [`request_accounts`](WalletProvider::request_accounts) call
/// creates an account on the node when the wallet holds none.
pub struct RpcWallet {
    base_url: String,
    http: reqwest::Client,
    keyring: Keyring,
}

impl RpcWallet {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
            keyring: Keyring::new(Vec::new()),
        }
    }

    /// Wallet importing existing accounts.
    pub fn with_accounts(base_url: impl Into<String>, accounts: Vec<String>) -> Self {
        let wallet = Self::new(base_url);
        *wallet.keyring.accounts.write() = accounts;
        wallet
    }

    pub fn switch_account(&self, address: &str) -> Result<(), ClientError> {
        self.keyring.select(address)
    }

    pub fn lock(&self) {
        self.keyring.lock();
    }

    async fn create_account(&self) -> Result<String, LedgerError> {
        let response = self
            .http
            .post(format!("{}/sandbox/accounts", self.base_url))
            .send()
            .await
            .map_err(transport)?;
        let body: AccountBody = decode(response).await?;
        info!(address = %body.address, "Created wallet account");
        Ok(body.address)
    }
}

#[async_trait]
impl WalletProvider for RpcWallet {
    async fn is_available(&self) -> bool {
        match self
            .http
            .get(format!("{}/api/health", self.base_url))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                debug!(error = %e, "Wallet node unreachable");
                false
            }
        }
    }

    async fn request_accounts(&self) -> Result<Vec<String>, ClientError> {
        if self.keyring.accounts.read().is_empty() {
            let address = self.create_account().await?;
            self.keyring.accounts.write().push(address);
        }
        self.keyring.authorize()
    }

    async fn accounts(&self) -> Result<Vec<String>, ClientError> {
        Ok(self.keyring.authorized())
    }

    async fn submit_vote(&self, from: &str, club_id: u32) -> Result<VoteReceipt, ClientError> {
        let from = self.keyring.ensure_owned(from)?;
        let response = self
            .http
            .post(format!("{}/sandbox/transactions", self.base_url))
            .json(&SubmitVoteBody {
                from: &from,
                club_id,
            })
            .send()
            .await
            .map_err(transport)?;
        let body: ReceiptBody = decode(response).await?;
        Ok(body.receipt)
    }

    fn subscribe(&self) -> broadcast::Receiver<WalletNotification> {
        self.keyring.notifications.subscribe()
    }
}
