use std::sync::Arc;

use ligue1_ledger::VoteCast;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::mirror::{AppendOutcome, MirrorStore, MirrorVote};

/// Copy every accepted vote into the mirror.
///
/// Mirror failures are logged and dropped; the vote already stands on the
/// ledger. The task ends when the feed closes.
pub fn spawn_mirror_listener(
    mut events: broadcast::Receiver<VoteCast>,
    mirror: Arc<MirrorStore>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("Listening for vote events");
        loop {
            match events.recv().await {
                Ok(event) => record(&mirror, event),
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Vote listener lagged, events not mirrored");
                }
                Err(RecvError::Closed) => {
                    debug!("Vote feed closed");
                    break;
                }
            }
        }
    })
}

fn record(mirror: &MirrorStore, event: VoteCast) {
    let vote = MirrorVote::from(event);
    let tx_hash = vote.tx_hash.clone();

    match mirror.append(vote) {
        Ok(AppendOutcome::Inserted) => info!(tx = %tx_hash, "Vote mirrored"),
        Ok(AppendOutcome::Duplicate) => debug!(tx = %tx_hash, "Vote already mirrored"),
        Err(e) => error!(tx = %tx_hash, error = %e, "Failed to mirror vote"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn event(voter: &str, tx: &str) -> VoteCast {
        VoteCast {
            voter: voter.to_string(),
            club_id: 1,
            club_name: "Paris Saint-Germain".to_string(),
            tx_hash: tx.to_string(),
            ledger_sequence: 2,
            timestamp: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_listener_mirrors_and_dedupes() {
        let (tx, rx) = broadcast::channel(16);
        let mirror = Arc::new(MirrorStore::in_memory());
        let handle = spawn_mirror_listener(rx, mirror.clone());

        tx.send(event("GABC", "aa")).unwrap();
        tx.send(event("GABC", "aa")).unwrap();
        // conflicting record is logged, not fatal
        tx.send(event("GABC", "bb")).unwrap();
        tx.send(event("GDEF", "cc")).unwrap();
        drop(tx);

        handle.await.unwrap();

        let stats = mirror.stats(10);
        assert_eq!(stats.total_votes, 2);
        assert!(stats.recent_votes.iter().all(|v| v.voter == v.voter.to_lowercase()));
    }
}
