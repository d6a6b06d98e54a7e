//! Application state

use std::sync::Arc;

use chrono::{DateTime, Utc};
use ligue1_ledger::{LedgerReader, SandboxLedger};

use crate::config::GatewayConfig;
use crate::mirror::MirrorStore;

pub struct AppState {
    pub config: GatewayConfig,
    pub ledger: Arc<dyn LedgerReader>,
    /// Local node backing the `/sandbox` routes, when they are enabled.
    pub sandbox: Option<SandboxLedger>,
    pub mirror: Arc<MirrorStore>,
    pub started_at: DateTime<Utc>,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(
        config: GatewayConfig,
        ledger: Arc<dyn LedgerReader>,
        sandbox: Option<SandboxLedger>,
        mirror: Arc<MirrorStore>,
    ) -> Self {
        Self {
            config,
            ledger,
            sandbox,
            mirror,
            started_at: Utc::now(),
        }
    }
}
