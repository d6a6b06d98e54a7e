//! [`LedgerReader`] over the gateway's JSON surface.

use async_trait::async_trait;
use ligue1_ledger::{ClubInfo, ClubResult, ContractInfo, LedgerError, LedgerReader};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::http::{decode, transport};

#[derive(Deserialize)]
struct ClubsBody {
    clubs: Vec<ClubInfo>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResultsBody {
    results: Vec<ClubResult>,
    total_votes: u64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct HasVotedBody {
    has_voted: bool,
    voter_choice: Option<u32>,
}

#[derive(Deserialize)]
struct ContractBody {
    contract: ContractInfo,
}

#[derive(Debug, Clone)]
pub struct GatewayReader {
    base_url: String,
    http: reqwest::Client,
}

impl GatewayReader {
    /// `base_url` is the gateway root, e.g. `http://localhost:3001`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, reqwest::Client::new())
    }

    pub fn with_client(base_url: impl Into<String>, http: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, LedgerError> {
        let response = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await
            .map_err(transport)?;
        decode(response).await
    }

    async fn voter(&self, address: &str) -> Result<HasVotedBody, LedgerError> {
        self.get(&format!("/api/has-voted/{}", address.trim())).await
    }
}

#[async_trait]
impl LedgerReader for GatewayReader {
    async fn get_club(&self, club_id: u32) -> Result<ClubInfo, LedgerError> {
        self.get_all_clubs()
            .await?
            .into_iter()
            .find(|club| club.id == club_id)
            .ok_or(LedgerError::InvalidClub)
    }

    async fn get_all_clubs(&self) -> Result<Vec<ClubInfo>, LedgerError> {
        Ok(self.get::<ClubsBody>("/api/clubs").await?.clubs)
    }

    async fn get_results(&self) -> Result<Vec<ClubInfo>, LedgerError> {
        let body: ResultsBody = self.get("/api/results").await?;
        Ok(body
            .results
            .into_iter()
            .map(|result| ClubInfo {
                id: result.id,
                name: result.name,
                logo: result.logo,
                votes: result.votes,
                exists: true,
            })
            .collect())
    }

    async fn get_total_votes(&self) -> Result<u64, LedgerError> {
        Ok(self.get::<ResultsBody>("/api/results").await?.total_votes)
    }

    async fn has_voted(&self, address: &str) -> Result<bool, LedgerError> {
        Ok(self.voter(address).await?.has_voted)
    }

    async fn get_voter_choice(&self, address: &str) -> Result<u32, LedgerError> {
        let body = self.voter(address).await?;
        match (body.has_voted, body.voter_choice) {
            (true, Some(club_id)) => Ok(club_id),
            _ => Err(LedgerError::NotVoted),
        }
    }

    async fn contract_info(&self) -> Result<ContractInfo, LedgerError> {
        Ok(self.get::<ContractBody>("/api/contract-info").await?.contract)
    }
}
