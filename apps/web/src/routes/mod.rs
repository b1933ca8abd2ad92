pub mod handlers;
pub mod health;

use axum::{
    routing::{get, post},
    Router,
};
use tower_sessions::{cookie::SameSite, MemoryStore, SessionManagerLayer};

use crate::state::AppState;

pub const SESSION_COOKIE: &str = "lead_session";

pub fn build_router(state: AppState) -> Router {
    // Served over plain HTTP on the local machine, so the cookie is not `Secure`.
    let sessions = SessionManagerLayer::new(MemoryStore::default())
        .with_name(SESSION_COOKIE)
        .with_same_site(SameSite::Lax)
        .with_secure(false);

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/", get(handlers::handle_index))
        .route("/login", post(handlers::handle_login))
        .route("/logout", post(handlers::handle_logout))
        .route("/leads", post(handlers::handle_fetch_leads))
        .route("/leads/summary", post(handlers::handle_generate_summary))
        .route("/leads/export.csv", get(handlers::handle_export))
        .with_state(state)
        .layer(sessions)
}
