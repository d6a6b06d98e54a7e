#![no_std]
//! # Ligue 1 Vote Contract
//!
//! One address, one vote, for one club of a roster fixed at initialization.
//!
//! Every address starts in the not-voted state. `vote` moves it to
//! `Voted(club_id)` exactly once; there is no path back. Rejected calls leave
//! storage untouched, since validation happens before any write.

use soroban_sdk::{contract, contractimpl, symbol_short, Address, Env, Symbol, Vec};

use shared::errors::VoteError;
use shared::types::{Club, ClubSeed, VoterRecord};
use shared::validation::{safe_increment, validate_club_id, validate_club_name, validate_roster_len};

mod storage;

/// Topic of the event published for every accepted vote:
/// `("vote_cast", voter, club_id) -> club_name`
pub const VOTE_CAST: Symbol = symbol_short!("vote_cast");

#[contract]
pub struct Ligue1VoteContract;

fn require_initialized(env: &Env) -> Result<u32, VoteError> {
    if !storage::has_admin(env) {
        return Err(VoteError::NotInitialized);
    }
    Ok(storage::get_club_count(env))
}

#[allow(deprecated)]
fn publish_vote_cast(env: &Env, voter: &Address, club: &Club) {
    env.events()
        .publish((VOTE_CAST, voter.clone(), club.id), club.name.clone());
}

#[contractimpl]
impl Ligue1VoteContract {
    /// Create the roster. Ids are assigned `1..=roster.len()` in order.
    pub fn initialize(env: Env, admin: Address, roster: Vec<ClubSeed>) -> Result<(), VoteError> {
        if storage::has_admin(&env) {
            return Err(VoteError::AlreadyInitialized);
        }

        admin.require_auth();

        validate_roster_len(roster.len())?;
        for seed in roster.iter() {
            validate_club_name(&seed.name)?;
        }

        let mut id = 0u32;
        for seed in roster.iter() {
            id += 1;
            storage::save_club(
                &env,
                &Club {
                    id,
                    name: seed.name,
                    logo: seed.logo,
                    votes: 0,
                    exists: true,
                },
            );
        }

        storage::set_club_count(&env, id);
        storage::set_admin(&env, &admin);
        storage::bump_instance(&env);

        Ok(())
    }

    /// Record `voter`'s single vote for `club_id`.
    ///
    /// The club is checked before the voter, so an address that already voted
    /// and now names a missing club gets `InvalidClub`.
    pub fn vote(env: Env, voter: Address, club_id: u32) -> Result<(), VoteError> {
        voter.require_auth();

        let club_count = require_initialized(&env)?;
        validate_club_id(club_id, club_count)?;

        let mut club = storage::get_club(&env, club_id).ok_or(VoteError::InvalidClub)?;
        if !club.exists {
            return Err(VoteError::InvalidClub);
        }

        if storage::get_voter(&env, &voter).has_voted {
            return Err(VoteError::AlreadyVoted);
        }

        club.votes = safe_increment(club.votes)?;

        storage::save_club(&env, &club);
        storage::save_voter(
            &env,
            &voter,
            &VoterRecord {
                has_voted: true,
                club_id,
            },
        );
        storage::bump_instance(&env);

        publish_vote_cast(&env, &voter, &club);

        Ok(())
    }

    // -------------------------------
    // Read-only Queries
    // -------------------------------

    pub fn get_club(env: Env, club_id: u32) -> Result<Club, VoteError> {
        let club_count = require_initialized(&env)?;
        validate_club_id(club_id, club_count)?;
        storage::get_club(&env, club_id).ok_or(VoteError::InvalidClub)
    }

    /// All clubs in id order.
    pub fn get_all_clubs(env: Env) -> Vec<Club> {
        let mut clubs = Vec::new(&env);
        for id in 1..=storage::get_club_count(&env) {
            if let Some(club) = storage::get_club(&env, id) {
                clubs.push_back(club);
            }
        }
        clubs
    }

    /// All clubs by descending vote count; equal counts keep id order.
    pub fn get_results(env: Env) -> Vec<Club> {
        let mut sorted: Vec<Club> = Vec::new(&env);
        for club in Self::get_all_clubs(env.clone()).iter() {
            // insert after every club with at least as many votes
            let mut position = sorted.len();
            for (index, ranked) in sorted.iter().enumerate() {
                if ranked.votes < club.votes {
                    position = index as u32;
                    break;
                }
            }
            sorted.insert(position, club);
        }
        sorted
    }

    pub fn get_total_votes(env: Env) -> u64 {
        Self::get_all_clubs(env)
            .iter()
            .fold(0u64, |total, club| total.saturating_add(club.votes))
    }

    pub fn has_voted(env: Env, voter: Address) -> bool {
        storage::get_voter(&env, &voter).has_voted
    }

    pub fn get_voter_choice(env: Env, voter: Address) -> Result<u32, VoteError> {
        let record = storage::get_voter(&env, &voter);
        if !record.has_voted {
            return Err(VoteError::NotVoted);
        }
        Ok(record.club_id)
    }

    pub fn club_count(env: Env) -> u32 {
        storage::get_club_count(&env)
    }

    pub fn admin(env: Env) -> Result<Address, VoteError> {
        storage::get_admin(&env).ok_or(VoteError::NotInitialized)
    }
}
