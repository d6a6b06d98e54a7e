//! Contract data types for the Ligue 1 vote
//!
//! Clubs are created once at initialization and only their `votes` field ever
//! changes. Voter records are written once, on the first accepted vote.

use soroban_sdk::{contracttype, Address, String};

/// A club on the ballot
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Club {
    /// Stable identifier, assigned at initialization
    pub id: u32,
    /// Display name
    pub name: String,
    /// Logo reference (path or URL)
    pub logo: String,
    /// Cumulative vote count
    pub votes: u64,
    /// True for every club of the initial roster
    pub exists: bool,
}

/// Roster entry passed to `initialize`
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClubSeed {
    pub name: String,
    pub logo: String,
}

/// Per-address vote record
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VoterRecord {
    pub has_voted: bool,
    pub club_id: u32,
}

/// Storage keys
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DataKey {
    Admin,
    ClubCount,
    Club(u32),
    Voter(Address),
}
