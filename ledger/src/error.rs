use shared::errors::VoteError;
use thiserror::Error;

/// Failures of a ledger read or transaction.
///
/// Validation failures carry the contract's own message so callers can surface
/// them verbatim.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Invalid club")]
    InvalidClub,

    #[error("Already voted")]
    AlreadyVoted,

    #[error("Address has not voted")]
    NotVoted,

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Contract not initialized")]
    NotInitialized,

    #[error("Transaction rejected: {0}")]
    Rejected(String),

    #[error("Ledger unavailable: {0}")]
    Unavailable(String),

    #[error("Transport error: {0}")]
    Transport(String),
}

impl LedgerError {
    /// Connectivity failures; the caller may retry by hand.
    pub fn is_transient(&self) -> bool {
        matches!(self, LedgerError::Unavailable(_) | LedgerError::Transport(_))
    }
}

impl From<VoteError> for LedgerError {
    fn from(error: VoteError) -> Self {
        match error {
            VoteError::InvalidClub => LedgerError::InvalidClub,
            VoteError::AlreadyVoted => LedgerError::AlreadyVoted,
            VoteError::NotVoted => LedgerError::NotVoted,
            VoteError::NotInitialized => LedgerError::NotInitialized,
            other => LedgerError::Rejected(other.message().to_string()),
        }
    }
}
