pub mod agent;
pub mod bpv7;
pub mod config;
pub mod rest;
pub mod store;

use std::sync::Arc;

use agent::RestAgent;
use config::DaemonConfig;

/// Shared application state passed to every route handler.
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<DaemonConfig>,
    /// The client agent: session registry, mailboxes, submission path.
    pub agent: Arc<RestAgent>,
    pub started_at: std::time::Instant,
}
