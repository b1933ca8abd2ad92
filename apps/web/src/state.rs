use std::sync::Arc;

use crate::auth::Authenticator;
use crate::config::Config;
use crate::leads::LeadsClient;
use crate::session::SessionStore;
use crate::summary::LeadSummarizer;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Browser-driven login. Default: `BrowserAuthenticator<ChromeLauncher>`.
    pub authenticator: Arc<dyn Authenticator>,
    pub leads: LeadsClient,
    pub summarizer: Arc<dyn LeadSummarizer>,
    pub sessions: SessionStore,
}
