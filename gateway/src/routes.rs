//! Route configuration for the HTTP API.

use std::net::Ipv4Addr;
use std::time::Duration;

use axum::{
    http::{header::CONTENT_TYPE, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers::*;
use crate::state::SharedState;

/// Port of the web front end served during development.
const DEV_FRONTEND_PORT: u16 = 3000;

/// Create the full router with all routes.
pub fn create_router(state: SharedState) -> Router {
    let cors = cors_layer(&state.config.cors_origins);

    Router::new()
        .nest("/api", api_routes())
        .nest("/sandbox", sandbox_routes())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Create the `/api` router.
fn api_routes() -> Router<SharedState> {
    Router::new()
        .route("/clubs", get(clubs_handler))
        .route("/results", get(results_handler))
        .route("/has-voted/{address}", get(has_voted_handler))
        .route("/stats", get(stats_handler))
        .route("/contract-info", get(contract_info_handler))
        .route("/health", get(health_handler))
}

/// Create the `/sandbox` router standing in for a local development node.
fn sandbox_routes() -> Router<SharedState> {
    Router::new()
        .route("/accounts", post(create_account_handler))
        .route("/transactions", post(submit_vote_handler))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(move |origin: &HeaderValue, _| {
            allowed.contains(origin) || is_private_dev_origin(origin)
        }))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(Duration::from_secs(60 * 60))
}

/// `http://<private IPv4>:3000`, i.e. the front end opened from another LAN device.
fn is_private_dev_origin(origin: &HeaderValue) -> bool {
    let Ok(origin) = origin.to_str() else {
        return false;
    };
    let Some(authority) = origin.strip_prefix("http://") else {
        return false;
    };
    let Some((host, port)) = authority.rsplit_once(':') else {
        return false;
    };

    port.parse::<u16>() == Ok(DEV_FRONTEND_PORT)
        && host
            .parse::<Ipv4Addr>()
            .map(|ip| ip.is_private())
            .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GatewayConfig;
    use crate::listener::spawn_mirror_listener;
    use crate::mirror::MirrorStore;
    use crate::state::AppState;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use async_trait::async_trait;
    use ligue1_ledger::{
        ClubInfo, ContractInfo, LedgerError, LedgerReader, SandboxConfig, SandboxLedger, VoteFeed,
    };
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    /// Reader whose total lags behind its clubs.
    struct LaggingTotal;

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
            Ok(club(club_id, 0))
        }

        async fn get_all_clubs(&self) -> Result<Vec<ClubInfo>, LedgerError> {
            Ok(vec![club(1, 1), club(2, 2)])
        }

        async fn get_results(&self) -> Result<Vec<ClubInfo>, LedgerError> {
            Ok(vec![club(2, 2), club(1, 1)])
        }

        async fn get_total_votes(&self) -> Result<u64, LedgerError> {
            Ok(1)
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

    async fn create_test_state(sandbox_rpc: bool) -> SharedState {
        let ledger = SandboxLedger::start(SandboxConfig::default()).await.unwrap();
        let mirror = Arc::new(MirrorStore::in_memory());
        spawn_mirror_listener(ledger.subscribe(), mirror.clone());

        let config = GatewayConfig {
            sandbox_rpc,
            ..GatewayConfig::default()
        };
        Arc::new(AppState::new(
            config,
            Arc::new(ledger.clone()),
            sandbox_rpc.then_some(ledger),
            mirror,
        ))
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn new_account(app: &Router) -> String {
        let (status, body) = send(app, post_json("/sandbox/accounts", json!({}))).await;
        assert_eq!(status, StatusCode::OK);
        body["address"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_router_health() {
        let app = create_router(create_test_state(true).await);

        let (status, body) = send(&app, get("/api/health")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["contract"], true);
        assert_eq!(body["database"], true);
    }

    #[tokio::test]
    async fn test_router_health_reports_stopped_ledger() {
        let state = create_test_state(true).await;
        state.sandbox.as_ref().unwrap().shutdown().await.unwrap();
        let app = create_router(state);

        let (status, body) = send(&app, get("/api/health")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["contract"], false);
        assert_eq!(body["database"], true);
    }

    #[tokio::test]
    async fn test_router_clubs() {
        let app = create_router(create_test_state(true).await);

        let (status, body) = send(&app, get("/api/clubs")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 18);
        assert_eq!(body["clubs"][0]["name"], "Paris Saint-Germain");
        assert_eq!(body["clubs"][0]["votes"], 0);
        assert_eq!(body["clubs"][0]["exists"], true);
    }

    #[tokio::test]
    async fn test_router_results_without_votes() {
        let app = create_router(create_test_state(true).await);

        let (status, body) = send(&app, get("/api/results")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["totalVotes"], 0);
        assert_eq!(body["results"].as_array().unwrap().len(), 18);
        assert_eq!(body["results"][0]["percentage"], 0.0);
        assert!(body["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_router_results_total_matches_clubs() {
        let state = Arc::new(AppState::new(
            GatewayConfig::default(),
            Arc::new(LaggingTotal),
            None,
            Arc::new(MirrorStore::in_memory()),
        ));
        let app = create_router(state);

        let (status, body) = send(&app, get("/api/results")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["totalVotes"], 3);
        assert_eq!(body["results"][0]["percentage"], 66.67);
        assert_eq!(body["results"][1]["percentage"], 33.33);
    }

    #[tokio::test]
    async fn test_router_vote_flow() {
        let app = create_router(create_test_state(true).await);
        let voter = new_account(&app).await;

        let (status, body) = send(&app, get(&format!("/api/has-voted/{voter}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["hasVoted"], false);
        assert_eq!(body["voterChoice"], Value::Null);

        let (status, body) = send(
            &app,
            post_json("/sandbox/transactions", json!({ "from": voter, "clubId": 2 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["receipt"]["clubId"], 2);

        let (_, body) = send(&app, get(&format!("/api/has-voted/{voter}"))).await;
        assert_eq!(body["hasVoted"], true);
        assert_eq!(body["voterChoice"], 2);

        let (_, body) = send(&app, get("/api/results")).await;
        assert_eq!(body["totalVotes"], 1);
        assert_eq!(body["results"][0]["id"], 2);
        assert_eq!(body["results"][0]["percentage"], 100.0);

        let (status, body) = send(
            &app,
            post_json("/sandbox/transactions", json!({ "from": voter, "clubId": 3 })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "Already voted");
    }

    #[tokio::test]
    async fn test_router_rejects_invalid_input() {
        let app = create_router(create_test_state(true).await);
        let voter = new_account(&app).await;

        let (status, body) = send(&app, get("/api/has-voted/0x1234")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid address");

        let (status, body) = send(
            &app,
            post_json("/sandbox/transactions", json!({ "from": voter, "clubId": 99 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid club");

        let (status, _) = send(
            &app,
            post_json("/sandbox/transactions", json!({ "from": "nobody", "clubId": 1 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_router_malformed_vote_body_is_json_error() {
        let app = create_router(create_test_state(true).await);

        for body in [
            json!({ "from": "x", "clubId": "abc" }),
            json!({ "from": "x", "clubId": -1 }),
            json!({ "clubId": 1 }),
        ] {
            let (status, body) = send(&app, post_json("/sandbox/transactions", body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert!(body["error"].as_str().unwrap().starts_with("Invalid request body"));
        }

        let not_json = Request::builder()
            .method("POST")
            .uri("/sandbox/transactions")
            .header(CONTENT_TYPE, "text/plain")
            .body(Body::from("clubId=1"))
            .unwrap();
        let (status, body) = send(&app, not_json).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_router_stats_follow_votes() {
        let app = create_router(create_test_state(true).await);

        for club_id in [4, 4, 7] {
            let voter = new_account(&app).await;
            let (status, _) = send(
                &app,
                post_json("/sandbox/transactions", json!({ "from": voter, "clubId": club_id })),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
        }

        // the mirror is fed asynchronously
        let mut body = Value::Null;
        for _ in 0..50 {
            let (_, stats) = send(&app, get("/api/stats")).await;
            body = stats;
            if body["stats"]["totalVotes"] == 3 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }

        assert_eq!(body["stats"]["totalVotes"], 3);
        assert_eq!(body["stats"]["votesByClub"][0]["clubId"], 4);
        assert_eq!(body["stats"]["votesByClub"][0]["count"], 2);
        assert_eq!(body["stats"]["recentVotes"].as_array().unwrap().len(), 3);
        let voter = body["stats"]["recentVotes"][0]["voter"].as_str().unwrap();
        assert_eq!(voter, voter.to_lowercase());
    }

    #[tokio::test]
    async fn test_router_sandbox_disabled() {
        let app = create_router(create_test_state(false).await);

        let (status, _) = send(&app, post_json("/sandbox/accounts", json!({}))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&app, get("/api/contract-info")).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[test]
    fn test_private_dev_origins() {
        let allowed = |origin: &str| is_private_dev_origin(&HeaderValue::from_str(origin).unwrap());

        assert!(allowed("http://192.168.1.20:3000"));
        assert!(allowed("http://10.121.74.159:3000"));
        assert!(allowed("http://172.16.0.4:3000"));
        assert!(!allowed("http://192.168.1.20:8080"));
        assert!(!allowed("http://8.8.8.8:3000"));
        assert!(!allowed("https://192.168.1.20:3000"));
    }
}
