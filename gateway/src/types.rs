//! Request and response types for the HTTP API.
//!
//! Every success body carries `success: true` next to its payload.

use chrono::{DateTime, Utc};
use ligue1_ledger::{ClubInfo, ClubResult, ContractInfo, VoteReceipt};
use serde::{Deserialize, Serialize};

use crate::mirror::MirrorStats;

// ═══════════════════════════════════════════════════════════════════════════
// Ledger Reads
// ═══════════════════════════════════════════════════════════════════════════

/// Response for `GET /api/clubs`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClubsResponse {
    pub success: bool,
    pub clubs: Vec<ClubInfo>,
    pub total: usize,
}

/// Response for `GET /api/results`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultsResponse {
    pub success: bool,
    pub results: Vec<ClubResult>,
    pub total_votes: u64,
    pub timestamp: DateTime<Utc>,
}

/// Response for `GET /api/has-voted/{address}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HasVotedResponse {
    pub success: bool,
    pub has_voted: bool,
    /// `null` when the address has not voted.
    pub voter_choice: Option<u32>,
}

/// Response for `GET /api/contract-info`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractInfoResponse {
    pub success: bool,
    pub contract: ContractInfo,
}

// ═══════════════════════════════════════════════════════════════════════════
// Mirror & Health
// ═══════════════════════════════════════════════════════════════════════════

/// Response for `GET /api/stats`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub success: bool,
    pub stats: MirrorStats,
}

/// Response for `GET /api/health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub success: bool,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    /// Ledger reachable.
    pub contract: bool,
    /// Mirror writable.
    pub database: bool,
    pub uptime_secs: i64,
}

// ═══════════════════════════════════════════════════════════════════════════
// Sandbox Node
// ═══════════════════════════════════════════════════════════════════════════

/// Response for `POST /sandbox/accounts`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    pub success: bool,
    pub address: String,
}

/// Request body for `POST /sandbox/transactions`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitVoteRequest {
    pub from: String,
    pub club_id: u32,
}

/// Response for `POST /sandbox/transactions`, sent once the vote is included.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitVoteResponse {
    pub success: bool,
    pub receipt: VoteReceipt,
}
