//! Error codes for the Ligue 1 vote contract
//!
//! Codes are stable: hosts map them back to typed failures, so never renumber
//! an existing variant.

use soroban_sdk::contracterror;

/// Error type returned by every fallible contract entry point
///
/// - 1-2: lifecycle
/// - 3-5: vote validation
/// - 6-8: roster validation
/// - 9: arithmetic
#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
pub enum VoteError {
    // ===== Lifecycle (1-2) =====
    /// Contract has no roster yet
    NotInitialized = 1,

    /// Contract was already initialized
    AlreadyInitialized = 2,

    // ===== Vote Validation (3-5) =====
    /// Club id does not reference an existing club
    InvalidClub = 3,

    /// Address has already cast its vote
    AlreadyVoted = 4,

    /// Address has not voted yet, so it has no recorded choice
    NotVoted = 5,

    // ===== Roster Validation (6-8) =====
    /// Roster passed to `initialize` is empty
    EmptyRoster = 6,

    /// Roster exceeds `MAX_CLUBS`
    RosterTooLarge = 7,

    /// Club name is empty or longer than `MAX_CLUB_NAME_LENGTH`
    InvalidClubName = 8,

    // ===== Arithmetic (9) =====
    /// Vote counter overflowed
    Overflow = 9,
}

impl VoteError {
    /// Get a human-readable description of the error
    pub fn message(&self) -> &'static str {
        match self {
            VoteError::NotInitialized => "Contract not initialized",
            VoteError::AlreadyInitialized => "Contract already initialized",
            VoteError::InvalidClub => "Invalid club",
            VoteError::AlreadyVoted => "Already voted",
            VoteError::NotVoted => "Address has not voted",
            VoteError::EmptyRoster => "Roster is empty",
            VoteError::RosterTooLarge => "Roster is too large",
            VoteError::InvalidClubName => "Invalid club name",
            VoteError::Overflow => "Arithmetic overflow",
        }
    }

    /// Map a raw contract error code back to its variant
    pub fn from_code(code: u32) -> Option<Self> {
        let error = match code {
            1 => VoteError::NotInitialized,
            2 => VoteError::AlreadyInitialized,
            3 => VoteError::InvalidClub,
            4 => VoteError::AlreadyVoted,
            5 => VoteError::NotVoted,
            6 => VoteError::EmptyRoster,
            7 => VoteError::RosterTooLarge,
            8 => VoteError::InvalidClubName,
            9 => VoteError::Overflow,
            _ => return None,
        };
        Some(error)
    }
}
