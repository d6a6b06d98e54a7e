use soroban_sdk::{Address, Env};

use shared::constants::{ENTRY_TTL_EXTEND_TO, ENTRY_TTL_THRESHOLD};
use shared::types::{Club, DataKey, VoterRecord};

// ── Admin ────────────────────────────────────────────────────────────────────

pub fn set_admin(env: &Env, admin: &Address) {
    env.storage().instance().set(&DataKey::Admin, admin);
}

pub fn get_admin(env: &Env) -> Option<Address> {
    env.storage().instance().get(&DataKey::Admin)
}

pub fn has_admin(env: &Env) -> bool {
    env.storage().instance().has(&DataKey::Admin)
}

// ── Club Count ───────────────────────────────────────────────────────────────

pub fn set_club_count(env: &Env, count: u32) {
    env.storage().instance().set(&DataKey::ClubCount, &count);
}

pub fn get_club_count(env: &Env) -> u32 {
    env.storage()
        .instance()
        .get(&DataKey::ClubCount)
        .unwrap_or(0u32)
}

// ── Clubs ────────────────────────────────────────────────────────────────────

pub fn save_club(env: &Env, club: &Club) {
    let key = DataKey::Club(club.id);
    env.storage().persistent().set(&key, club);
    env.storage()
        .persistent()
        .extend_ttl(&key, ENTRY_TTL_THRESHOLD, ENTRY_TTL_EXTEND_TO);
}

pub fn get_club(env: &Env, club_id: u32) -> Option<Club> {
    env.storage().persistent().get(&DataKey::Club(club_id))
}

// ── Voters ───────────────────────────────────────────────────────────────────

pub fn save_voter(env: &Env, voter: &Address, record: &VoterRecord) {
    let key = DataKey::Voter(voter.clone());
    env.storage().persistent().set(&key, record);
    env.storage()
        .persistent()
        .extend_ttl(&key, ENTRY_TTL_THRESHOLD, ENTRY_TTL_EXTEND_TO);
}

/// Unknown addresses read as the default, not-voted record.
pub fn get_voter(env: &Env, voter: &Address) -> VoterRecord {
    env.storage()
        .persistent()
        .get(&DataKey::Voter(voter.clone()))
        .unwrap_or(VoterRecord {
            has_voted: false,
            club_id: 0,
        })
}

pub fn bump_instance(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(ENTRY_TTL_THRESHOLD, ENTRY_TTL_EXTEND_TO);
}
