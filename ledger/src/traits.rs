use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::error::LedgerError;
use crate::types::{ClubInfo, ContractInfo, VoteCast, VoteReceipt};

/// Read surface of the vote ledger. No call changes state.
#[async_trait]
pub trait LedgerReader: Send + Sync {
    async fn get_club(&self, club_id: u32) -> Result<ClubInfo, LedgerError>;

    /// All clubs in id order.
    async fn get_all_clubs(&self) -> Result<Vec<ClubInfo>, LedgerError>;

    /// All clubs by non-increasing vote count.
    async fn get_results(&self) -> Result<Vec<ClubInfo>, LedgerError>;

    async fn get_total_votes(&self) -> Result<u64, LedgerError>;

    async fn has_voted(&self, address: &str) -> Result<bool, LedgerError>;

    /// Fails with [`LedgerError::NotVoted`] for addresses without a vote.
    async fn get_voter_choice(&self, address: &str) -> Result<u32, LedgerError>;

    async fn contract_info(&self) -> Result<ContractInfo, LedgerError>;
}

/// Write surface of the vote ledger.
#[async_trait]
pub trait LedgerWriter: Send + Sync {
    /// Submit a signed vote and wait until it is included.
    async fn vote(&self, voter: &str, club_id: u32) -> Result<VoteReceipt, LedgerError>;
}

/// Stream of accepted votes.
pub trait VoteFeed: Send + Sync {
    fn subscribe(&self) -> broadcast::Receiver<VoteCast>;
}
