use ligue1_ledger::LedgerError;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClientError {
    #[error("No wallet provider available")]
    WalletUnavailable,

    #[error("Wallet returned no accounts")]
    NoAccounts,

    #[error("Account {0} is not managed by this wallet")]
    UnknownAccount(String),

    #[error("Wallet not connected")]
    NotConnected,

    #[error("You have already voted")]
    AlreadyVoted,

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl ClientError {
    /// Connectivity failures. Nothing is retried automatically.
    pub fn is_transient(&self) -> bool {
        matches!(self, ClientError::Ledger(e) if e.is_transient())
    }
}
