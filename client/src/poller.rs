//! Live results polling.
//!
//! A [`Poller`] re-fetches every club on a fixed interval and publishes the
//! outcome as one [`Snapshot`]. The total is summed from the clubs of the same
//! read, so shares always add up. The task is aborted when the `Poller` is
//! dropped.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use ligue1_ledger::{rank_clubs, ClubInfo, ClubResult, LedgerReader};
use serde::Serialize;
use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, trace, warn};

#[derive(Debug, Clone)]
pub struct PollerConfig {
    pub interval: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
        }
    }
}

/// Everything a results view renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// Clubs in id order.
    pub clubs: Vec<ClubInfo>,
    /// Clubs by votes, with their share.
    pub results: Vec<ClubResult>,
    pub total_votes: u64,
    pub loading: bool,
    /// Message of the last failed fetch. Data from earlier fetches is kept.
    pub error: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            clubs: Vec::new(),
            results: Vec::new(),
            total_votes: 0,
            loading: true,
            error: None,
            updated_at: None,
        }
    }
}

pub struct Poller {
    snapshot: watch::Receiver<Snapshot>,
    refresh: Arc<Notify>,
    task: JoinHandle<()>,
}

impl Poller {
    /// Start polling. The first fetch happens immediately.
    pub fn spawn(ledger: Arc<dyn LedgerReader>, config: PollerConfig) -> Self {
        let (tx, snapshot) = watch::channel(Snapshot::default());
        let refresh = Arc::new(Notify::new());

        let task = tokio::spawn(run(ledger, config, tx, refresh.clone()));

        Self {
            snapshot,
            refresh,
            task,
        }
    }

    /// Latest snapshot.
    pub fn snapshot(&self) -> Snapshot {
        self.snapshot.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshot.clone()
    }

    /// Fetch now instead of waiting for the next tick.
    pub fn refresh(&self) {
        self.refresh.notify_one();
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run(
    ledger: Arc<dyn LedgerReader>,
    config: PollerConfig,
    tx: watch::Sender<Snapshot>,
    refresh: Arc<Notify>,
) {
    let mut ticker = tokio::time::interval(config.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    debug!(interval = ?config.interval, "Results poller started");

    loop {
        tokio::select! {
            _ = ticker.tick() => trace!("Poll tick"),
            _ = refresh.notified() => {
                tx.send_modify(|snapshot| snapshot.loading = true);
                ticker.reset();
            }
        }
        fetch(ledger.as_ref(), &tx).await;
    }
}

async fn fetch(ledger: &dyn LedgerReader, tx: &watch::Sender<Snapshot>) {
    match ledger.get_all_clubs().await {
        Ok(clubs) => {
            let total_votes = clubs.iter().map(|club| club.votes).sum();
            let results = rank_clubs(&clubs, total_votes);
            tx.send_replace(Snapshot {
                clubs,
                results,
                total_votes,
                loading: false,
                error: None,
                updated_at: Some(Utc::now()),
            });
        }
        Err(e) => {
            warn!(error = %e, "Failed to fetch results");
            tx.send_modify(|snapshot| {
                snapshot.loading = false;
                snapshot.error = Some(e.to_string());
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::GatewayReader;
    use async_trait::async_trait;
    use ligue1_ledger::{ContractInfo, LedgerError, LedgerWriter, SandboxConfig, SandboxLedger};
    use tokio::time::timeout;

    /// Reader whose total is read from a stale replica.
    struct LaggingTotal {
        clubs: Vec<ClubInfo>,
    }

    fn club(id: u32, votes: u64) -> ClubInfo {
        ClubInfo {
            id,
            name: format!("Club {id}"),
            logo: String::new(),
            votes,
            exists: true,
        }
    }

    #[async_trait]
    impl LedgerReader for LaggingTotal {
        async fn get_club(&self, club_id: u32) -> Result<ClubInfo, LedgerError> {
            self.clubs
                .iter()
                .find(|club| club.id == club_id)
                .cloned()
                .ok_or(LedgerError::InvalidClub)
        }

        async fn get_all_clubs(&self) -> Result<Vec<ClubInfo>, LedgerError> {
            Ok(self.clubs.clone())
        }

        async fn get_results(&self) -> Result<Vec<ClubInfo>, LedgerError> {
            Ok(self.clubs.clone())
        }

        async fn get_total_votes(&self) -> Result<u64, LedgerError> {
            Ok(0)
        }

        async fn has_voted(&self, _address: &str) -> Result<bool, LedgerError> {
            Ok(false)
        }

        async fn get_voter_choice(&self, _address: &str) -> Result<u32, LedgerError> {
            Err(LedgerError::NotVoted)
        }

        async fn contract_info(&self) -> Result<ContractInfo, LedgerError> {
            Err(LedgerError::Unavailable("no contract".into()))
        }
    }

    async fn wait_for(
        rx: &mut watch::Receiver<Snapshot>,
        done: impl Fn(&Snapshot) -> bool,
    ) -> Snapshot {
        timeout(Duration::from_secs(5), async {
            loop {
                let current = rx.borrow_and_update().clone();
                if done(&current) {
                    return current;
                }
                rx.changed().await.unwrap();
            }
        })
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_first_fetch_is_immediate() {
        let ledger = SandboxLedger::start(SandboxConfig::default()).await.unwrap();
        let poller = Poller::spawn(
            Arc::new(ledger),
            PollerConfig {
                interval: Duration::from_secs(3600),
            },
        );
        assert!(poller.snapshot().loading);

        let snapshot = wait_for(&mut poller.subscribe(), |s| !s.loading).await;
        assert_eq!(snapshot.clubs.len(), 18);
        assert_eq!(snapshot.results.len(), 18);
        assert_eq!(snapshot.total_votes, 0);
        assert!(snapshot.error.is_none());
        assert!(snapshot.updated_at.is_some());
    }

    #[tokio::test]
    async fn test_refresh_picks_up_votes() {
        let ledger = SandboxLedger::start(SandboxConfig::default()).await.unwrap();
        let poller = Poller::spawn(
            Arc::new(ledger.clone()),
            PollerConfig {
                interval: Duration::from_secs(3600),
            },
        );
        let mut rx = poller.subscribe();
        wait_for(&mut rx, |s| !s.loading).await;

        for club_id in [7, 7, 3] {
            let voter = ledger.generate_account().await.unwrap();
            ledger.vote(&voter, club_id).await.unwrap();
        }
        poller.refresh();

        let snapshot = wait_for(&mut rx, |s| s.total_votes == 3).await;
        assert_eq!(snapshot.results[0].id, 7);
        assert_eq!(snapshot.results[0].percentage, 66.67);
        assert_eq!(snapshot.results[1].id, 3);
        assert_eq!(snapshot.results[1].percentage, 33.33);
        // clubs keep id order
        assert_eq!(snapshot.clubs[0].id, 1);
    }

    #[tokio::test]
    async fn test_total_is_summed_from_the_same_read() {
        let reader = LaggingTotal {
            clubs: vec![club(1, 1), club(2, 2), club(3, 0)],
        };
        let poller = Poller::spawn(Arc::new(reader), PollerConfig::default());

        let snapshot = wait_for(&mut poller.subscribe(), |s| !s.loading).await;
        assert_eq!(snapshot.total_votes, 3);
        assert_eq!(snapshot.results[0].id, 2);
        assert_eq!(snapshot.results[0].percentage, 66.67);
        assert_eq!(snapshot.results[1].percentage, 33.33);
        let shares: f64 = snapshot.results.iter().map(|r| r.percentage).sum();
        assert!((shares - 100.0).abs() < 0.01);
    }

    #[tokio::test]
    async fn test_interval_ticks_without_refresh() {
        let ledger = SandboxLedger::start(SandboxConfig::default()).await.unwrap();
        let poller = Poller::spawn(
            Arc::new(ledger.clone()),
            PollerConfig {
                interval: Duration::from_millis(50),
            },
        );
        let mut rx = poller.subscribe();
        wait_for(&mut rx, |s| !s.loading).await;

        let voter = ledger.generate_account().await.unwrap();
        ledger.vote(&voter, 1).await.unwrap();

        let snapshot = wait_for(&mut rx, |s| s.total_votes == 1).await;
        assert_eq!(snapshot.results[0].percentage, 100.0);
    }

    #[tokio::test]
    async fn test_failure_recorded_in_snapshot() {
        let poller = Poller::spawn(
            Arc::new(GatewayReader::new("http://127.0.0.1:9")),
            PollerConfig::default(),
        );

        let snapshot = wait_for(&mut poller.subscribe(), |s| s.error.is_some()).await;
        assert!(!snapshot.loading);
        assert!(snapshot.clubs.is_empty());
    }

    #[tokio::test]
    async fn test_drop_stops_polling() {
        let ledger = SandboxLedger::start(SandboxConfig::default()).await.unwrap();
        let poller = Poller::spawn(Arc::new(ledger), PollerConfig::default());
        let mut rx = poller.subscribe();
        wait_for(&mut rx, |s| !s.loading).await;

        drop(poller);

        let closed = timeout(Duration::from_secs(5), async {
            while rx.changed().await.is_ok() {}
        })
        .await;
        assert!(closed.is_ok());
    }
}
