//! Access to the Ligue 1 vote ledger.
//!
//! [`LedgerReader`], [`LedgerWriter`] and [`VoteFeed`] describe what the
//! gateway and the clients need from the ledger. [`SandboxLedger`] implements
//! all three by hosting the contract in a local Soroban environment.

pub mod address;
pub mod error;
pub mod sandbox;
pub mod traits;
pub mod types;

pub use error::LedgerError;
pub use sandbox::{SandboxConfig, SandboxLedger};
pub use traits::{LedgerReader, LedgerWriter, VoteFeed};
pub use types::{
    rank_clubs, vote_share, ClubInfo, ClubResult, ClubSeedConfig, ContractInfo, VoteCast,
    VoteReceipt,
};
