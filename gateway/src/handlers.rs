//! HTTP request handlers.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use chrono::Utc;
use ligue1_ledger::address::canonicalize;
use ligue1_ledger::{ClubResult, LedgerError, LedgerWriter, SandboxLedger};
use tracing::{debug, info};

use crate::error::ApiError;
use crate::state::SharedState;
use crate::types::*;

// ═══════════════════════════════════════════════════════════════════════════
// Ledger Reads
// ═══════════════════════════════════════════════════════════════════════════

/// Handler for `GET /api/clubs` - all clubs in id order.
pub async fn clubs_handler(
    State(state): State<SharedState>,
) -> Result<Json<ClubsResponse>, ApiError> {
    let clubs = state.ledger.get_all_clubs().await?;

    Ok(Json(ClubsResponse {
        success: true,
        total: clubs.len(),
        clubs,
    }))
}

/// Handler for `GET /api/results` - ranked clubs with vote shares.
pub async fn results_handler(
    State(state): State<SharedState>,
) -> Result<Json<ResultsResponse>, ApiError> {
    let ranked = state.ledger.get_results().await?;
    // summed from the same read so the shares add up
    let total_votes = ranked.iter().map(|club| club.votes).sum();

    Ok(Json(ResultsResponse {
        success: true,
        results: ranked
            .iter()
            .map(|club| ClubResult::new(club, total_votes))
            .collect(),
        total_votes,
        timestamp: Utc::now(),
    }))
}

/// Handler for `GET /api/has-voted/{address}`.
pub async fn has_voted_handler(
    State(state): State<SharedState>,
    Path(address): Path<String>,
) -> Result<Json<HasVotedResponse>, ApiError> {
    let address = canonicalize(&address).map_err(|_| ApiError::InvalidAddress)?;

    let has_voted = state.ledger.has_voted(&address).await?;
    let voter_choice = if has_voted {
        Some(state.ledger.get_voter_choice(&address).await?)
    } else {
        None
    };

    Ok(Json(HasVotedResponse {
        success: true,
        has_voted,
        voter_choice,
    }))
}

/// Handler for `GET /api/contract-info`.
pub async fn contract_info_handler(
    State(state): State<SharedState>,
) -> Result<Json<ContractInfoResponse>, ApiError> {
    let contract = state.ledger.contract_info().await?;
    Ok(Json(ContractInfoResponse {
        success: true,
        contract,
    }))
}

// ═══════════════════════════════════════════════════════════════════════════
// Mirror & Health
// ═══════════════════════════════════════════════════════════════════════════

/// Handler for `GET /api/stats` - aggregates from the mirror, not the ledger.
pub async fn stats_handler(State(state): State<SharedState>) -> Json<StatsResponse> {
    Json(StatsResponse {
        success: true,
        stats: state.mirror.stats(state.config.recent_votes_limit),
    })
}

/// Handler for `GET /api/health` - liveness plus dependency flags.
///
/// `contract` is true only when a read actually reached the contract.
pub async fn health_handler(State(state): State<SharedState>) -> Json<HealthResponse> {
    let contract = match state.ledger.get_total_votes().await {
        Ok(_) => true,
        Err(e) => {
            debug!(error = %e, "Ledger not reachable");
            false
        }
    };
    let now = Utc::now();

    Json(HealthResponse {
        success: true,
        message: "Ligue1Vote API operational".to_string(),
        timestamp: now,
        contract,
        database: state.mirror.is_healthy(),
        uptime_secs: (now - state.started_at).num_seconds(),
    })
}

// ═══════════════════════════════════════════════════════════════════════════
// Sandbox Node
// ═══════════════════════════════════════════════════════════════════════════

fn sandbox(state: &SharedState) -> Result<&SandboxLedger, ApiError> {
    state.sandbox.as_ref().ok_or(ApiError::SandboxDisabled)
}

/// Handler for `POST /sandbox/accounts` - create a voter account.
pub async fn create_account_handler(
    State(state): State<SharedState>,
) -> Result<Json<AccountResponse>, ApiError> {
    let address = sandbox(&state)?.generate_account().await?;
    debug!(%address, "Sandbox account created");

    Ok(Json(AccountResponse {
        success: true,
        address,
    }))
}

/// Handler for `POST /sandbox/transactions` - sign and submit a vote.
///
/// Responds once the transaction is included. Contract rejections keep their
/// message: `409` for a second vote, `400` for an unknown club or a body
/// that does not parse.
pub async fn submit_vote_handler(
    State(state): State<SharedState>,
    payload: Result<Json<SubmitVoteRequest>, JsonRejection>,
) -> Result<Json<SubmitVoteResponse>, ApiError> {
    let ledger = sandbox(&state)?;
    let Json(request) = payload?;
    let from = canonicalize(&request.from).map_err(|e| match e {
        LedgerError::InvalidAddress(_) => ApiError::InvalidAddress,
        other => other.into(),
    })?;

    let receipt = ledger.vote(&from, request.club_id).await?;
    info!(
        voter = %from,
        club_id = receipt.club_id,
        tx = %receipt.tx_hash,
        "Vote transaction included"
    );

    Ok(Json(SubmitVoteResponse {
        success: true,
        receipt,
    }))
}
