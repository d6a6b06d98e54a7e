use std::{env, fmt::Display, path::PathBuf, str::FromStr};

use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid {key} value {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
    /// Browser origins allowed on top of private-network dev servers.
    pub cors_origins: Vec<String>,
    /// JSON-lines file backing the vote mirror; in-memory only when unset.
    pub mirror_journal: Option<PathBuf>,
    pub network: String,
    /// How many votes `/api/stats` lists as recent.
    pub recent_votes_limit: usize,
    /// Serve the `/sandbox` account and transaction routes.
    pub sandbox_rpc: bool,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
            cors_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
            ],
            mirror_journal: None,
            network: "sandbox".to_string(),
            recent_votes_limit: 10,
            sandbox_rpc: true,
        }
    }
}

impl GatewayConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        Ok(Self {
            host: try_load("HOST", defaults.host)?,
            port: try_load("PORT", defaults.port)?,
            cors_origins: match var("CORS_ORIGINS") {
                Some(raw) => parse_list(&raw),
                None => defaults.cors_origins,
            },
            mirror_journal: var("MIRROR_JOURNAL").map(PathBuf::from),
            network: try_load("NETWORK_NAME", defaults.network)?,
            recent_votes_limit: try_load("RECENT_VOTES_LIMIT", defaults.recent_votes_limit)?,
            sandbox_rpc: try_load("SANDBOX_RPC", defaults.sandbox_rpc)?,
        })
    }
}

fn var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn try_load<T>(key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr + Display,
    T::Err: Display,
{
    let Some(raw) = var(key) else {
        info!("{key} not set, using default: {default}");
        return Ok(default);
    };

    raw.trim().parse().map_err(|e: T::Err| {
        warn!("Invalid {key} value: {e}");
        ConfigError::Invalid {
            key,
            value: raw.clone(),
            reason: e.to_string(),
        }
    })
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_list_skips_blanks() {
        assert_eq!(
            parse_list(" http://a:3000 ,, http://b:3000 "),
            vec!["http://a:3000".to_string(), "http://b:3000".to_string()]
        );
        assert!(parse_list("").is_empty());
    }

    #[test]
    fn test_try_load_reports_bad_values() {
        env::set_var("LIGUE1_TEST_BAD_PORT", "not-a-port");
        let result: Result<u16, _> = try_load("LIGUE1_TEST_BAD_PORT", 3001);
        assert!(matches!(result, Err(ConfigError::Invalid { key: "LIGUE1_TEST_BAD_PORT", .. })));
        env::remove_var("LIGUE1_TEST_BAD_PORT");

        let result: Result<u16, _> = try_load("LIGUE1_TEST_UNSET_PORT", 3001);
        assert_eq!(result.unwrap(), 3001);
    }
}
