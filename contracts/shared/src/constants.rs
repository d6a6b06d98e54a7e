//! Constants used by the Ligue 1 vote contract and its hosts

use soroban_sdk::{Env, String, Vec};

use crate::types::ClubSeed;

// ===== Roster Limits =====

/// Maximum number of clubs a roster may hold
pub const MAX_CLUBS: u32 = 64;

/// Maximum length of a club display name, in bytes
pub const MAX_CLUB_NAME_LENGTH: u32 = 64;

/// Identifier of the first club; ids run `FIRST_CLUB_ID..=club_count`
pub const FIRST_CLUB_ID: u32 = 1;

// ===== Ledger TTL Constants =====
// Voter records and clubs live in persistent storage for the whole season.
// At ~5s per ledger: 180 days ≈ 3,110,400 ledgers.

/// Remaining TTL below which an entry is bumped
pub const ENTRY_TTL_THRESHOLD: u32 = 1_555_200;

/// TTL an entry is extended to when bumped
pub const ENTRY_TTL_EXTEND_TO: u32 = 3_110_400;

// ===== Default Roster =====

/// The 18 clubs of the default Ligue 1 ballot, as `(name, logo)` pairs.
/// Ids are assigned in this order starting at `FIRST_CLUB_ID`.
pub const LIGUE1_ROSTER: [(&str, &str); 18] = [
    ("Paris Saint-Germain", "/logos/psg.png"),
    ("Olympique de Marseille", "/logos/om.png"),
    ("Olympique Lyonnais", "/logos/ol.png"),
    ("AS Monaco", "/logos/monaco.png"),
    ("LOSC Lille", "/logos/lille.png"),
    ("Stade Rennais FC", "/logos/rennes.png"),
    ("OGC Nice", "/logos/nice.png"),
    ("RC Lens", "/logos/lens.png"),
    ("Stade de Reims", "/logos/reims.png"),
    ("Montpellier HSC", "/logos/montpellier.png"),
    ("RC Strasbourg Alsace", "/logos/strasbourg.png"),
    ("FC Nantes", "/logos/nantes.png"),
    ("Toulouse FC", "/logos/toulouse.png"),
    ("Stade Brestois 29", "/logos/brest.png"),
    ("FC Lorient", "/logos/lorient.png"),
    ("Clermont Foot 63", "/logos/clermont.png"),
    ("FC Metz", "/logos/metz.png"),
    ("Le Havre AC", "/logos/le-havre.png"),
];

/// Build the default roster as contract values
pub fn default_roster(env: &Env) -> Vec<ClubSeed> {
    let mut roster = Vec::new(env);
    for (name, logo) in LIGUE1_ROSTER.iter() {
        roster.push_back(ClubSeed {
            name: String::from_str(env, name),
            logo: String::from_str(env, logo),
        });
    }
    roster
}
