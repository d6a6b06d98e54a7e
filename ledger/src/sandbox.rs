//! Local Soroban host for the vote contract.
//!
//! The Soroban `Env` is single-threaded, so it lives on a dedicated thread and
//! every call reaches it as a job over a channel. Jobs run one at a time,
//! which gives the serialized transaction execution the contract relies on.
//! A job that panics is logged and the host keeps serving. The thread exits
//! on [`SandboxLedger::shutdown`] or once the last handle is dropped.

use std::fmt::Debug;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use soroban_sdk::testutils::{Address as _, Ledger as _};
use soroban_sdk::{Address, Bytes, Env, String as SorobanString, Vec as SorobanVec};
use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, error, info, warn};

use ligue1_vote_contract::{Ligue1VoteContract, Ligue1VoteContractClient};
use shared::errors::VoteError;
use shared::types::{Club, ClubSeed};

use crate::address::canonicalize;
use crate::error::LedgerError;
use crate::traits::{LedgerReader, LedgerWriter, VoteFeed};
use crate::types::{ClubInfo, ClubSeedConfig, ContractInfo, VoteCast, VoteReceipt};

/// Settings for a sandbox deployment.
#[derive(Debug, Clone)]
pub struct SandboxConfig {
    /// Network name reported by `contract_info`.
    pub network: String,
    /// Clubs to deploy, in id order.
    pub roster: Vec<ClubSeedConfig>,
    /// Seconds between two consecutive ledger closes.
    pub close_time_step_secs: u64,
    /// Capacity of the vote notification channel.
    pub event_buffer: usize,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            network: "sandbox".to_string(),
            roster: ClubSeedConfig::ligue1(),
            close_time_step_secs: 5,
            event_buffer: 1024,
        }
    }
}

type Job = Box<dyn FnOnce(&mut Host) + Send>;

/// Handle to a running sandbox ledger. Cheap to clone.
#[derive(Clone)]
pub struct SandboxLedger {
    jobs: mpsc::UnboundedSender<Job>,
    events: broadcast::Sender<VoteCast>,
    info: Arc<ContractInfo>,
}

impl SandboxLedger {
    /// Spawn the host thread, deploy the contract and initialize the roster.
    pub async fn start(config: SandboxConfig) -> Result<Self, LedgerError> {
        let (jobs, mut job_rx) = mpsc::unbounded_channel::<Job>();
        let (events, _) = broadcast::channel(config.event_buffer.max(1));
        let (ready_tx, ready_rx) = oneshot::channel();

        let host_events = events.clone();
        thread::Builder::new()
            .name("sandbox-ledger".to_string())
            .spawn(move || {
                let mut host = match Host::deploy(&config, host_events) {
                    Ok((host, info)) => {
                        let _ = ready_tx.send(Ok(info));
                        host
                    }
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };

                while let Some(job) = job_rx.blocking_recv() {
                    if panic::catch_unwind(AssertUnwindSafe(|| job(&mut host))).is_err() {
                        error!("Sandbox ledger job panicked, request dropped");
                    }
                    if !host.running {
                        break;
                    }
                }
                debug!("Sandbox ledger host stopped");
            })
            .map_err(|e| LedgerError::Unavailable(format!("failed to spawn host thread: {e}")))?;

        let info = ready_rx
            .await
            .map_err(|_| LedgerError::Unavailable("host thread exited during deploy".into()))??;

        info!(
            contract = %info.address,
            network = %info.network,
            "Sandbox ledger deployed"
        );

        Ok(Self {
            jobs,
            events,
            info: Arc::new(info),
        })
    }

    /// Create a fresh account address usable as a voter.
    pub async fn generate_account(&self) -> Result<String, LedgerError> {
        self.call(|host| Ok(to_strkey(&Address::generate(&host.env))))
            .await
    }

    pub fn info(&self) -> &ContractInfo {
        &self.info
    }

    /// Stop the host thread after the jobs queued before this one. Every
    /// later call fails with [`LedgerError::Unavailable`].
    pub async fn shutdown(&self) -> Result<(), LedgerError> {
        self.call(|host| {
            host.running = false;
            Ok(())
        })
        .await
    }

    async fn call<T, F>(&self, job: F) -> Result<T, LedgerError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Host) -> Result<T, LedgerError> + Send + 'static,
    {
        let (reply_tx, reply_rx) = oneshot::channel();
        let job: Job = Box::new(move |host| {
            let _ = reply_tx.send(job(host));
        });

        self.jobs
            .send(job)
            .map_err(|_| LedgerError::Unavailable("sandbox host stopped".into()))?;

        reply_rx
            .await
            .map_err(|_| LedgerError::Unavailable("sandbox host dropped the request".into()))?
    }
}

#[async_trait]
impl LedgerReader for SandboxLedger {
    async fn get_club(&self, club_id: u32) -> Result<ClubInfo, LedgerError> {
        self.call(move |host| {
            let club = settle(host.client().try_get_club(&club_id))?;
            Ok(club_info(&club))
        })
        .await
    }

    async fn get_all_clubs(&self) -> Result<Vec<ClubInfo>, LedgerError> {
        self.call(|host| Ok(club_infos(&host.client().get_all_clubs())))
            .await
    }

    async fn get_results(&self) -> Result<Vec<ClubInfo>, LedgerError> {
        self.call(|host| Ok(club_infos(&host.client().get_results())))
            .await
    }

    async fn get_total_votes(&self) -> Result<u64, LedgerError> {
        self.call(|host| Ok(host.client().get_total_votes())).await
    }

    async fn has_voted(&self, address: &str) -> Result<bool, LedgerError> {
        let canonical = canonicalize(address)?;
        self.call(move |host| {
            let voter = host.address(&canonical);
            Ok(host.client().has_voted(&voter))
        })
        .await
    }

    async fn get_voter_choice(&self, address: &str) -> Result<u32, LedgerError> {
        let canonical = canonicalize(address)?;
        self.call(move |host| {
            let voter = host.address(&canonical);
            settle(host.client().try_get_voter_choice(&voter))
        })
        .await
    }

    async fn contract_info(&self) -> Result<ContractInfo, LedgerError> {
        Ok(self.info.as_ref().clone())
    }
}

#[async_trait]
impl LedgerWriter for SandboxLedger {
    async fn vote(&self, voter: &str, club_id: u32) -> Result<VoteReceipt, LedgerError> {
        let canonical = canonicalize(voter)?;
        self.call(move |host| host.vote(&canonical, club_id)).await
    }
}

impl VoteFeed for SandboxLedger {
    fn subscribe(&self) -> broadcast::Receiver<VoteCast> {
        self.events.subscribe()
    }
}

/// State owned by the host thread.
struct Host {
    env: Env,
    contract_id: Address,
    contract_strkey: String,
    events: broadcast::Sender<VoteCast>,
    close_time_step_secs: u64,
    running: bool,
}

impl Host {
    fn deploy(
        config: &SandboxConfig,
        events: broadcast::Sender<VoteCast>,
    ) -> Result<(Self, ContractInfo), LedgerError> {
        let env = Env::default();
        // Wallet signatures are checked by the wallet provider, not the sandbox.
        env.mock_all_auths();
        env.cost_estimate().budget().reset_unlimited();

        let deployed_at = Utc::now();
        env.ledger().set_timestamp(deployed_at.timestamp().max(0) as u64);
        env.ledger().set_sequence_number(1);

        let contract_id = env.register(Ligue1VoteContract, ());
        let admin = Address::generate(&env);

        let mut roster = SorobanVec::new(&env);
        for seed in &config.roster {
            roster.push_back(ClubSeed {
                name: SorobanString::from_str(&env, &seed.name),
                logo: SorobanString::from_str(&env, &seed.logo),
            });
        }

        let host = Self {
            contract_strkey: to_strkey(&contract_id),
            env,
            contract_id,
            events,
            close_time_step_secs: config.close_time_step_secs,
            running: true,
        };

        settle(host.client().try_initialize(&admin, &roster))?;

        let info = ContractInfo {
            address: host.contract_strkey.clone(),
            network: config.network.clone(),
            deployed_at,
        };
        Ok((host, info))
    }

    fn client(&self) -> Ligue1VoteContractClient<'_> {
        Ligue1VoteContractClient::new(&self.env, &self.contract_id)
    }

    fn address(&self, canonical: &str) -> Address {
        Address::from_string(&SorobanString::from_str(&self.env, canonical))
    }

    fn vote(&mut self, voter: &str, club_id: u32) -> Result<VoteReceipt, LedgerError> {
        let address = self.address(voter);
        if let Err(e) = settle(self.client().try_vote(&address, &club_id)) {
            debug!(voter, club_id, error = %e, "Vote rejected");
            return Err(e);
        }

        let (ledger_sequence, timestamp) = self.close_ledger();
        let tx_hash = self.tx_hash(voter, club_id, ledger_sequence);
        let club = settle(self.client().try_get_club(&club_id))?;

        let event = VoteCast {
            voter: voter.to_string(),
            club_id,
            club_name: to_std_string(&club.name),
            tx_hash: tx_hash.clone(),
            ledger_sequence,
            timestamp,
        };

        info!(
            voter,
            club_id,
            club = %event.club_name,
            ledger = ledger_sequence,
            tx = %tx_hash,
            "Vote included"
        );

        if self.events.send(event).is_err() {
            debug!("No vote subscribers");
        }

        Ok(VoteReceipt {
            tx_hash,
            ledger_sequence,
            club_id,
        })
    }

    /// One transaction per ledger: advance sequence and close time.
    fn close_ledger(&self) -> (u32, DateTime<Utc>) {
        let sequence = self.env.ledger().sequence() + 1;
        let close_time = self.env.ledger().timestamp() + self.close_time_step_secs;
        self.env.ledger().set_sequence_number(sequence);
        self.env.ledger().set_timestamp(close_time);

        let timestamp = Utc
            .timestamp_opt(close_time as i64, 0)
            .single()
            .unwrap_or_else(|| {
                warn!(close_time, "Ledger close time out of range");
                Utc::now()
            });
        (sequence, timestamp)
    }

    fn tx_hash(&self, voter: &str, club_id: u32, sequence: u32) -> String {
        let preimage = format!("{}:{}:{}:{}", self.contract_strkey, voter, club_id, sequence);
        let digest = self
            .env
            .crypto()
            .sha256(&Bytes::from_slice(&self.env, preimage.as_bytes()));
        hex::encode(digest.to_array())
    }
}

/// Collapse the nested result of a `try_*` contract call.
fn settle<T, C, I>(outcome: Result<Result<T, C>, Result<VoteError, I>>) -> Result<T, LedgerError>
where
    C: Debug,
    I: Debug,
{
    match outcome {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(LedgerError::Rejected(format!("undecodable return value: {e:?}"))),
        Err(Ok(error)) => Err(error.into()),
        Err(Err(e)) => Err(LedgerError::Rejected(format!("host error: {e:?}"))),
    }
}

fn club_info(club: &Club) -> ClubInfo {
    ClubInfo {
        id: club.id,
        name: to_std_string(&club.name),
        logo: to_std_string(&club.logo),
        votes: club.votes,
        exists: club.exists,
    }
}

fn club_infos(clubs: &SorobanVec<Club>) -> Vec<ClubInfo> {
    clubs.iter().map(|club| club_info(&club)).collect()
}

fn to_std_string(value: &SorobanString) -> String {
    let mut buf = vec![0u8; value.len() as usize];
    value.copy_into_slice(&mut buf);
    String::from_utf8_lossy(&buf).into_owned()
}

fn to_strkey(address: &Address) -> String {
    to_std_string(&address.to_string())
}
