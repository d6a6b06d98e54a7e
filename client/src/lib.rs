//! Client-side building blocks for the Ligue 1 vote.
//!
//! - [`WalletSession`] tracks one wallet connection and casts its vote
//! - [`Poller`] keeps a live copy of the standings
//! - [`GatewayReader`] reads the ledger through the HTTP gateway

pub mod error;
pub mod gateway;
mod http;
pub mod poller;
pub mod session;
pub mod wallet;

pub use error::ClientError;
pub use gateway::GatewayReader;
pub use poller::{Poller, PollerConfig, Snapshot};
pub use session::{WalletSession, WalletState, VOTE_PENDING_MESSAGE};
pub use wallet::{RpcWallet, SandboxWallet, WalletNotification, WalletProvider};
