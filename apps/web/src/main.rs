mod auth;
mod config;
mod errors;
mod leads;
mod llm_client;
mod routes;
mod session;
mod state;
mod summary;
mod ui;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::auth::{BrowserAuthenticator, ChromeLauncher, LoginFlow};
use crate::config::Config;
use crate::leads::LeadsClient;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::session::SessionStore;
use crate::state::AppState;
use crate::summary::GeminiSummarizer;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Lead Evaluator v{}", env!("CARGO_PKG_VERSION"));

    let authenticator = BrowserAuthenticator::new(
        ChromeLauncher::new(config.webdriver_url.clone()),
        LoginFlow::from_config(&config),
    );
    info!("Browser login via WebDriver at {}", config.webdriver_url);

    let llm = LlmClient::from_config(&config);
    info!("LLM client initialized (model: {})", llm.model());

    let state = AppState {
        authenticator: Arc::new(authenticator),
        leads: LeadsClient::from_config(&config),
        summarizer: Arc::new(GeminiSummarizer::new(llm)),
        sessions: SessionStore::default(),
        config: config.clone(),
    };

    let app = build_router(state).layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
