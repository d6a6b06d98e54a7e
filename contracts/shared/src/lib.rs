#![no_std]
//! # Shared Ligue 1 Vote Library
//!
//! Types, errors, constants and validation helpers shared by the Ligue 1 vote
//! contract and the hosts that deploy it.
//!
//! ## Modules
//!
//! - `errors` - The contract error enum and its human-readable messages
//! - `types` - Club and voter records, roster seeds, storage keys
//! - `constants` - Roster limits, TTLs and the default Ligue 1 roster
//! - `validation` - Reusable validation helper functions
//!
//! ## Usage
//!
//! ```rust,ignore
//! use shared::errors::VoteError;
//! use shared::types::{Club, ClubSeed};
//! use shared::validation::validate_club_id;
//! use shared::constants::LIGUE1_ROSTER;
//! ```

pub mod constants;
pub mod errors;
pub mod types;
pub mod validation;

pub use constants::{default_roster, LIGUE1_ROSTER};
pub use errors::VoteError;
pub use types::{Club, ClubSeed, DataKey, VoterRecord};
pub use validation::{
    safe_increment, validate_club_id, validate_club_name, validate_roster_len,
};
