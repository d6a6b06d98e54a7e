//! Validation helpers for the Ligue 1 vote contract

use crate::constants::{FIRST_CLUB_ID, MAX_CLUBS, MAX_CLUB_NAME_LENGTH};
use crate::errors::VoteError;
use soroban_sdk::String;

// ===== Club Validation =====

/// Validate that `club_id` references a club of a roster holding `club_count` clubs
///
/// # Returns
/// `Ok(())` if `FIRST_CLUB_ID <= club_id <= club_count`, `Err(VoteError::InvalidClub)` otherwise
pub fn validate_club_id(club_id: u32, club_count: u32) -> Result<(), VoteError> {
    if club_id < FIRST_CLUB_ID || club_id > club_count {
        return Err(VoteError::InvalidClub);
    }
    Ok(())
}

/// Validate a club display name
pub fn validate_club_name(name: &String) -> Result<(), VoteError> {
    let len = name.len();
    if len == 0 || len > MAX_CLUB_NAME_LENGTH {
        return Err(VoteError::InvalidClubName);
    }
    Ok(())
}

// ===== Roster Validation =====

/// Validate the number of clubs in a roster
pub fn validate_roster_len(len: u32) -> Result<(), VoteError> {
    if len == 0 {
        return Err(VoteError::EmptyRoster);
    }
    if len > MAX_CLUBS {
        return Err(VoteError::RosterTooLarge);
    }
    Ok(())
}

// ===== Arithmetic =====

/// Increment a vote counter, returning error on overflow
pub fn safe_increment(votes: u64) -> Result<u64, VoteError> {
    votes.checked_add(1).ok_or(VoteError::Overflow)
}
