//! # Vote mirror
//!
//! Off-chain, append-only copy of the votes the ledger accepted.
//!
//! The mirror only feeds historical statistics. It is never asked whether an
//! address may vote: the ledger answers that.
//!
//! ## Rules
//!
//! - One record per transaction hash; delivering the same event twice is a no-op
//! - One record per voter (lower-cased strkey)
//! - Records are never updated or removed
//!
//! ## Journal
//!
//! When a journal path is configured every record is written as one JSON line
//! before it becomes visible, and the file is replayed on startup. Writes
//! happen under the store lock, so concurrent appends never interleave.
//! An unparsable last line is a write torn by a crash: it is logged and cut
//! off. An unparsable line anywhere else fails the replay.

use std::collections::{HashMap, HashSet};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use ligue1_ledger::address::mirror_key;
use ligue1_ledger::VoteCast;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

/// One accepted vote, denormalized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MirrorVote {
    pub voter: String,
    pub club_id: u32,
    pub club_name: String,
    pub tx_hash: String,
    pub timestamp: DateTime<Utc>,
    pub ledger_sequence: u32,
}

impl From<VoteCast> for MirrorVote {
    fn from(event: VoteCast) -> Self {
        Self {
            voter: mirror_key(&event.voter),
            club_id: event.club_id,
            club_name: event.club_name,
            tx_hash: event.tx_hash,
            timestamp: event.timestamp,
            ledger_sequence: event.ledger_sequence,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendOutcome {
    Inserted,
    /// Same transaction was already mirrored.
    Duplicate,
}

#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("Voter {voter} already mirrored with transaction {existing_tx}")]
    VoterConflict { voter: String, existing_tx: String },

    #[error("Journal I/O error: {0}")]
    Journal(#[from] io::Error),

    #[error("Corrupt journal {path} line {line}: {source}")]
    Corrupt {
        path: PathBuf,
        line: usize,
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClubCount {
    pub club_id: u32,
    pub club_name: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentVote {
    pub club_name: String,
    pub timestamp: DateTime<Utc>,
    pub voter: String,
}

/// Aggregates served by `/api/stats`. Advisory: may lag the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MirrorStats {
    pub total_votes: u64,
    pub votes_by_club: Vec<ClubCount>,
    pub recent_votes: Vec<RecentVote>,
}

#[derive(Default)]
struct Inner {
    votes: Vec<MirrorVote>,
    tx_hashes: HashSet<String>,
    /// voter -> tx hash
    voters: HashMap<String, String>,
    journal: Option<File>,
}

impl Inner {
    fn check(&self, vote: &MirrorVote) -> Result<AppendOutcome, MirrorError> {
        if self.tx_hashes.contains(&vote.tx_hash) {
            return Ok(AppendOutcome::Duplicate);
        }
        if let Some(existing_tx) = self.voters.get(&vote.voter) {
            return Err(MirrorError::VoterConflict {
                voter: vote.voter.clone(),
                existing_tx: existing_tx.clone(),
            });
        }
        Ok(AppendOutcome::Inserted)
    }

    /// Load journal lines and return the length of the intact prefix.
    fn replay(&mut self, path: &Path, contents: &[u8]) -> Result<usize, MirrorError> {
        let lines: Vec<&[u8]> = contents.split(|byte| *byte == b'\n').collect();
        let last = lines.iter().rposition(|line| !is_blank(line));

        let mut offset = 0;
        for (index, line) in lines.iter().enumerate() {
            let next = (offset + line.len() + 1).min(contents.len());
            if !is_blank(line) {
                match serde_json::from_slice::<MirrorVote>(line) {
                    Ok(vote) => match self.check(&vote) {
                        Ok(AppendOutcome::Inserted) => self.insert(vote),
                        Ok(AppendOutcome::Duplicate) => {}
                        Err(e) => warn!(line = index + 1, error = %e, "Skipping journal record"),
                    },
                    Err(source) if Some(index) == last => {
                        warn!(
                            path = %path.display(),
                            line = index + 1,
                            error = %source,
                            "Dropping torn journal record"
                        );
                        return Ok(offset);
                    }
                    Err(source) => {
                        return Err(MirrorError::Corrupt {
                            path: path.to_path_buf(),
                            line: index + 1,
                            source,
                        })
                    }
                }
            }
            offset = next;
        }
        Ok(offset)
    }

    fn insert(&mut self, vote: MirrorVote) {
        self.tx_hashes.insert(vote.tx_hash.clone());
        self.voters.insert(vote.voter.clone(), vote.tx_hash.clone());
        self.votes.push(vote);
    }
}

fn is_blank(line: &[u8]) -> bool {
    line.iter().all(u8::is_ascii_whitespace)
}

pub struct MirrorStore {
    inner: RwLock<Inner>,
    healthy: AtomicBool,
}

impl MirrorStore {
    pub fn in_memory() -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
            healthy: AtomicBool::new(true),
        }
    }

    /// Open (or create) a journal-backed mirror and replay its records.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, MirrorError> {
        let path = path.as_ref();
        let mut inner = Inner::default();

        let mut needs_newline = false;
        if path.exists() {
            let contents = fs::read(path)?;
            let intact = inner.replay(path, &contents)?;
            if intact < contents.len() {
                OpenOptions::new()
                    .write(true)
                    .open(path)?
                    .set_len(intact as u64)?;
            }
            needs_newline = contents[..intact].last().is_some_and(|byte| *byte != b'\n');
        }

        let mut journal = OpenOptions::new().create(true).append(true).open(path)?;
        if needs_newline {
            journal.write_all(b"\n")?;
        }
        inner.journal = Some(journal);
        info!(path = %path.display(), votes = inner.votes.len(), "Mirror journal opened");

        Ok(Self {
            inner: RwLock::new(inner),
            healthy: AtomicBool::new(true),
        })
    }

    /// Append a record. Idempotent on the transaction hash.
    pub fn append(&self, vote: MirrorVote) -> Result<AppendOutcome, MirrorError> {
        let mut vote = vote;
        vote.voter = mirror_key(&vote.voter);

        let mut inner = self.inner.write();
        if inner.check(&vote)? == AppendOutcome::Duplicate {
            return Ok(AppendOutcome::Duplicate);
        }

        if let Some(journal) = inner.journal.as_mut() {
            let written = serde_json::to_string(&vote)
                .map_err(io::Error::from)
                .and_then(|line| writeln!(journal, "{line}"))
                .and_then(|_| journal.flush());
            if let Err(e) = written {
                self.healthy.store(false, Ordering::Relaxed);
                return Err(e.into());
            }
            self.healthy.store(true, Ordering::Relaxed);
        }

        inner.insert(vote);
        Ok(AppendOutcome::Inserted)
    }

    pub fn len(&self) -> usize {
        self.inner.read().votes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// False after a journal write failed, until the next successful one.
    pub fn is_healthy(&self) -> bool {
        self.healthy.load(Ordering::Relaxed)
    }

    pub fn stats(&self, recent_limit: usize) -> MirrorStats {
        let inner = self.inner.read();

        let mut by_club: HashMap<u32, ClubCount> = HashMap::new();
        for vote in &inner.votes {
            by_club
                .entry(vote.club_id)
                .or_insert_with(|| ClubCount {
                    club_id: vote.club_id,
                    club_name: vote.club_name.clone(),
                    count: 0,
                })
                .count += 1;
        }
        let mut votes_by_club: Vec<ClubCount> = by_club.into_values().collect();
        votes_by_club.sort_by(|a, b| b.count.cmp(&a.count).then(a.club_id.cmp(&b.club_id)));

        let mut recent: Vec<&MirrorVote> = inner.votes.iter().collect();
        recent.sort_by(|a, b| {
            b.timestamp
                .cmp(&a.timestamp)
                .then(b.ledger_sequence.cmp(&a.ledger_sequence))
        });
        let recent_votes = recent
            .into_iter()
            .take(recent_limit)
            .map(|vote| RecentVote {
                club_name: vote.club_name.clone(),
                timestamp: vote.timestamp,
                voter: vote.voter.clone(),
            })
            .collect();

        MirrorStats {
            total_votes: inner.votes.len() as u64,
            votes_by_club,
            recent_votes,
        }
    }
}
