//! # Wallet session
//!
//! Local view of one wallet connection: the selected address and what the
//! ledger says about it.
//!
//! The ledger is the only authority on `has_voted`. The session re-derives it
//! on connect, on every account or network change, and after a vote is
//! included. Local checks in [`WalletSession::vote`] only spare a transaction
//! that the contract would reject anyway.

use std::sync::Arc;

use ligue1_ledger::{LedgerError, LedgerReader, VoteReceipt};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::ClientError;
use crate::wallet::{WalletNotification, WalletProvider};

/// Message shown while a vote transaction is in flight.
pub const VOTE_PENDING_MESSAGE: &str = "Vote in progress, waiting for confirmation";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletState {
    pub address: Option<String>,
    pub is_connected: bool,
    pub has_voted: bool,
    pub voter_choice: Option<u32>,
}

pub struct WalletSession<W> {
    wallet: Arc<W>,
    ledger: Arc<dyn LedgerReader>,
    state: WalletState,
    pending: Option<String>,
    last_error: Option<ClientError>,
}

impl<W: WalletProvider> WalletSession<W> {
    pub fn new(wallet: Arc<W>, ledger: Arc<dyn LedgerReader>) -> Self {
        Self {
            wallet,
            ledger,
            state: WalletState::default(),
            pending: None,
            last_error: None,
        }
    }

    pub fn state(&self) -> &WalletState {
        &self.state
    }

    /// Message of the transaction in flight, if any.
    pub fn pending(&self) -> Option<&str> {
        self.pending.as_deref()
    }

    pub fn last_error(&self) -> Option<&ClientError> {
        self.last_error.as_ref()
    }

    pub fn wallet(&self) -> &Arc<W> {
        &self.wallet
    }

    /// Ask the wallet for accounts and adopt the first one.
    pub async fn connect(&mut self) -> Result<(), ClientError> {
        self.last_error = None;
        let result = self.try_connect().await;
        self.record(result)
    }

    async fn try_connect(&mut self) -> Result<(), ClientError> {
        if !self.wallet.is_available().await {
            return Err(ClientError::WalletUnavailable);
        }
        let accounts = self.wallet.request_accounts().await?;
        self.adopt(accounts).await
    }

    /// Pick up an account the wallet already authorized, without prompting.
    /// Returns whether a session was restored.
    pub async fn restore(&mut self) -> Result<bool, ClientError> {
        let result = self.try_restore().await;
        self.record(result)
    }

    async fn try_restore(&mut self) -> Result<bool, ClientError> {
        let accounts = self.wallet.accounts().await?;
        if accounts.is_empty() {
            return Ok(false);
        }
        self.adopt(accounts).await?;
        Ok(true)
    }

    /// Forget the address locally. Nothing happens on the ledger.
    pub fn disconnect(&mut self) {
        if let Some(address) = self.state.address.take() {
            debug!(%address, "Wallet disconnected");
        }
        self.state = WalletState::default();
        self.last_error = None;
    }

    /// Re-derive the voting status of the current address from the ledger.
    pub async fn refresh(&mut self) -> Result<(), ClientError> {
        let Some(address) = self.state.address.clone() else {
            return Ok(());
        };
        let result = self.load_voting_status(&address).await;
        self.record(result)
    }

    /// Cast the single vote of the connected address.
    ///
    /// Fails without touching the ledger when no address is connected or the
    /// address already voted.
    pub async fn vote(&mut self, club_id: u32) -> Result<VoteReceipt, ClientError> {
        let connected = self.state.is_connected;
        let Some(address) = self.state.address.clone().filter(|_| connected) else {
            return self.record(Err(ClientError::NotConnected));
        };
        if self.state.has_voted {
            return self.record(Err(ClientError::AlreadyVoted));
        }

        self.last_error = None;
        self.pending = Some(VOTE_PENDING_MESSAGE.to_string());
        let submitted = self.wallet.submit_vote(&address, club_id).await;
        self.pending = None;

        let receipt = self.record(submitted)?;
        info!(%address, club_id, tx = %receipt.tx_hash, "Vote confirmed");

        self.state.has_voted = true;
        self.state.voter_choice = Some(club_id);
        if let Err(e) = self.load_voting_status(&address).await {
            warn!(error = %e, "Could not re-read voting status after vote");
        }
        Ok(receipt)
    }

    /// React to a wallet notification.
    pub async fn handle_notification(
        &mut self,
        notification: WalletNotification,
    ) -> Result<(), ClientError> {
        match notification {
            WalletNotification::AccountsChanged(accounts) if accounts.is_empty() => {
                self.disconnect();
                Ok(())
            }
            WalletNotification::AccountsChanged(accounts) => {
                if self.state.address.as_ref() == accounts.first() && self.state.is_connected {
                    return Ok(());
                }
                let result = self.adopt(accounts).await;
                self.record(result)
            }
            WalletNotification::NetworkChanged(network) => {
                info!(%network, "Network changed, reloading wallet state");
                let was_connected = self.state.is_connected;
                self.state = WalletState::default();
                if !was_connected {
                    return Ok(());
                }
                let result = self.try_restore().await.map(|_| ());
                self.record(result)
            }
        }
    }

    async fn adopt(&mut self, accounts: Vec<String>) -> Result<(), ClientError> {
        let address = accounts.into_iter().next().ok_or(ClientError::NoAccounts)?;
        debug!(%address, "Adopting wallet account");

        self.state = WalletState {
            address: Some(address.clone()),
            is_connected: true,
            has_voted: false,
            voter_choice: None,
        };
        self.load_voting_status(&address).await
    }

    async fn load_voting_status(&mut self, address: &str) -> Result<(), ClientError> {
        let has_voted = self.ledger.has_voted(address).await?;
        let voter_choice = if has_voted {
            match self.ledger.get_voter_choice(address).await {
                Ok(choice) => Some(choice),
                Err(LedgerError::NotVoted) => None,
                Err(e) => return Err(e.into()),
            }
        } else {
            None
        };

        // the account may have changed while the ledger answered
        if self.state.address.as_deref() == Some(address) {
            self.state.has_voted = has_voted;
            self.state.voter_choice = voter_choice;
        }
        Ok(())
    }

    fn record<T>(&mut self, result: Result<T, ClientError>) -> Result<T, ClientError> {
        if let Err(e) = &result {
            debug!(error = %e, "Wallet session error");
            self.last_error = Some(e.clone());
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wallet::SandboxWallet;
    use ligue1_ledger::{LedgerWriter, SandboxConfig, SandboxLedger};

    async fn session(accounts: usize) -> (WalletSession<SandboxWallet>, SandboxLedger) {
        let ledger = SandboxLedger::start(SandboxConfig::default()).await.unwrap();
        let wallet = SandboxWallet::with_generated_accounts(ledger.clone(), accounts)
            .await
            .unwrap();
        let session = WalletSession::new(Arc::new(wallet), Arc::new(ledger.clone()));
        (session, ledger)
    }

    #[tokio::test]
    async fn test_connect_adopts_first_account() {
        let (mut session, _) = session(2).await;

        session.connect().await.unwrap();

        let state = session.state();
        assert!(state.is_connected);
        assert!(state.address.is_some());
        assert!(!state.has_voted);
        assert_eq!(state.voter_choice, None);
    }

    #[tokio::test]
    async fn test_vote_fails_fast_when_not_connected() {
        let (mut session, ledger) = session(1).await;

        assert_eq!(session.vote(1).await, Err(ClientError::NotConnected));
        assert_eq!(session.last_error(), Some(&ClientError::NotConnected));
        assert_eq!(ledger.get_total_votes().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_vote_then_second_vote_fails_locally() {
        let (mut session, ledger) = session(1).await;
        session.connect().await.unwrap();

        let receipt = session.vote(5).await.unwrap();
        assert_eq!(receipt.club_id, 5);
        assert!(session.pending().is_none());
        assert!(session.state().has_voted);
        assert_eq!(session.state().voter_choice, Some(5));

        assert_eq!(session.vote(6).await, Err(ClientError::AlreadyVoted));
        assert_eq!(ledger.get_total_votes().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_connect_sees_vote_cast_elsewhere() {
        let (mut session, ledger) = session(1).await;
        let address = session.wallet().request_accounts().await.unwrap()[0].clone();
        ledger.vote(&address, 9).await.unwrap();

        session.connect().await.unwrap();

        assert!(session.state().has_voted);
        assert_eq!(session.state().voter_choice, Some(9));
        assert_eq!(session.vote(1).await, Err(ClientError::AlreadyVoted));
    }

    #[tokio::test]
    async fn test_invalid_club_surfaces_ledger_message() {
        let (mut session, _) = session(1).await;
        session.connect().await.unwrap();

        let error = session.vote(42).await.unwrap_err();
        assert_eq!(error, ClientError::Ledger(LedgerError::InvalidClub));
        assert_eq!(error.to_string(), "Invalid club");
        assert!(!session.state().has_voted);
        assert!(session.pending().is_none());
    }

    #[tokio::test]
    async fn test_account_switch_rederives_state() {
        let (mut session, _) = session(2).await;
        let mut notifications = session.wallet().subscribe();
        session.connect().await.unwrap();
        session.vote(1).await.unwrap();

        let accounts = session.wallet().accounts().await.unwrap();
        session.wallet().switch_account(&accounts[1]).unwrap();
        let notification = notifications.recv().await.unwrap();
        session.handle_notification(notification).await.unwrap();

        assert_eq!(session.state().address.as_deref(), Some(accounts[1].as_str()));
        assert!(!session.state().has_voted);
        assert_eq!(session.state().voter_choice, None);
    }

    #[tokio::test]
    async fn test_empty_accounts_disconnects() {
        let (mut session, _) = session(1).await;
        session.connect().await.unwrap();

        session
            .handle_notification(WalletNotification::AccountsChanged(Vec::new()))
            .await
            .unwrap();

        assert_eq!(session.state(), &WalletState::default());
    }

    #[tokio::test]
    async fn test_network_change_reloads() {
        let (mut session, _) = session(1).await;
        session.connect().await.unwrap();
        session.vote(2).await.unwrap();

        session
            .handle_notification(WalletNotification::NetworkChanged("testnet".into()))
            .await
            .unwrap();

        // same ledger behind the sandbox wallet, so the vote is found again
        assert!(session.state().is_connected);
        assert!(session.state().has_voted);
        assert_eq!(session.state().voter_choice, Some(2));
    }

    #[tokio::test]
    async fn test_restore_without_authorization() {
        let (mut session, _) = session(1).await;

        assert!(!session.restore().await.unwrap());
        assert!(!session.state().is_connected);

        session.wallet().request_accounts().await.unwrap();
        assert!(session.restore().await.unwrap());
        assert!(session.state().is_connected);
    }

    #[tokio::test]
    async fn test_disconnect_has_no_ledger_effect() {
        let (mut session, ledger) = session(1).await;
        session.connect().await.unwrap();
        session.vote(3).await.unwrap();
        let address = session.state().address.clone().unwrap();

        session.disconnect();

        assert_eq!(session.state(), &WalletState::default());
        assert!(ledger.has_voted(&address).await.unwrap());
    }
}
