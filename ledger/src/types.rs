use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shared::constants::LIGUE1_ROSTER;

/// A club as seen from outside the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClubInfo {
    pub id: u32,
    pub name: String,
    pub logo: String,
    pub votes: u64,
    pub exists: bool,
}

/// A club ranked in the results, with its share of all votes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClubResult {
    pub id: u32,
    pub name: String,
    pub logo: String,
    pub votes: u64,
    pub percentage: f64,
}

impl ClubResult {
    pub fn new(club: &ClubInfo, total_votes: u64) -> Self {
        Self {
            id: club.id,
            name: club.name.clone(),
            logo: club.logo.clone(),
            votes: club.votes,
            percentage: vote_share(club.votes, total_votes),
        }
    }
}

/// Percentage of `total` held by `votes`, rounded to two decimals; 0 when nobody voted.
pub fn vote_share(votes: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (votes as f64 / total as f64 * 10_000.0).round() / 100.0
}

/// Rank clubs by non-increasing votes, ties by id.
pub fn rank_clubs(clubs: &[ClubInfo], total_votes: u64) -> Vec<ClubResult> {
    let mut ranked: Vec<&ClubInfo> = clubs.iter().collect();
    ranked.sort_by(|a, b| b.votes.cmp(&a.votes).then(a.id.cmp(&b.id)));
    ranked
        .into_iter()
        .map(|club| ClubResult::new(club, total_votes))
        .collect()
}

/// Roster entry used to deploy the contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClubSeedConfig {
    pub name: String,
    pub logo: String,
}

impl ClubSeedConfig {
    /// The default 18-club Ligue 1 roster.
    pub fn ligue1() -> Vec<Self> {
        LIGUE1_ROSTER
            .iter()
            .map(|(name, logo)| Self {
                name: name.to_string(),
                logo: logo.to_string(),
            })
            .collect()
    }
}

/// Proof that a vote transaction was included in the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteReceipt {
    pub tx_hash: String,
    pub ledger_sequence: u32,
    pub club_id: u32,
}

/// Notification published for every accepted vote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteCast {
    pub voter: String,
    pub club_id: u32,
    pub club_name: String,
    pub tx_hash: String,
    pub ledger_sequence: u32,
    pub timestamp: DateTime<Utc>,
}

/// Where the contract lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractInfo {
    pub address: String,
    pub network: String,
    pub deployed_at: DateTime<Utc>,
}
