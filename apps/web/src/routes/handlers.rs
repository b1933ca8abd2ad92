use axum::{
    extract::State,
    http::{header, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;
use tower_sessions::Session;
use uuid::Uuid;

use crate::auth::{Credentials, LoginOutcome, SessionToken};
use crate::errors::AppError;
use crate::leads::export::{to_csv_bytes, EXPORT_FILE_NAME};
use crate::session::{context_id, ensure_context_id, LeadBoard, LeadKey, LeadQuery, Notice};
use crate::state::AppState;
use crate::ui::{self, LeadsView};

const INVALID_LOGIN: &str = "Invalid email or password.";

async fn require_token(
    state: &AppState,
    session: &Session,
) -> Result<(Uuid, SessionToken), AppError> {
    let id = context_id(session).await?.ok_or(AppError::Unauthorized)?;
    let token = state.sessions.token(id).ok_or(AppError::Unauthorized)?;
    Ok((id, token))
}

fn invalid_login() -> Response {
    (StatusCode::UNAUTHORIZED, Html(ui::login_page(Some(INVALID_LOGIN)))).into_response()
}

/// GET /
pub async fn handle_index(
    State(state): State<AppState>,
    session: Session,
) -> Result<Html<String>, AppError> {
    let Some(id) = context_id(&session).await? else {
        return Ok(Html(ui::login_page(None)));
    };

    let page = state.sessions.with_existing(id, |ctx| {
        ctx.token.as_ref()?;
        let notice = ctx.notice.take();
        let (industry, location) = match &ctx.last_query {
            Some(q) => (q.industry.as_str(), q.location.as_str()),
            None => (
                state.config.default_industry.as_str(),
                state.config.default_location.as_str(),
            ),
        };
        Some(ui::leads_page(&LeadsView {
            industry,
            location,
            notice: notice.as_ref(),
            board: ctx.board.as_ref(),
        }))
    });

    Ok(Html(page.flatten().unwrap_or_else(|| ui::login_page(None))))
}

#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// POST /login
pub async fn handle_login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let credentials = Credentials {
        email: form.email.trim().to_string(),
        password: form.password,
    };
    if credentials.email.is_empty() || credentials.password.is_empty() {
        return Ok(invalid_login());
    }

    match state.authenticator.login(&credentials).await {
        LoginOutcome::Authenticated(token) => {
            let id = ensure_context_id(&session).await?;
            state.sessions.with(id, |ctx| {
                ctx.token = Some(token);
                ctx.notice = Some(Notice::success("Logged in successfully!"));
            });
            Ok(Redirect::to("/").into_response())
        }
        LoginOutcome::Rejected => Ok(invalid_login()),
    }
}

/// POST /logout
pub async fn handle_logout(
    State(state): State<AppState>,
    session: Session,
) -> Result<Redirect, AppError> {
    if let Some(id) = context_id(&session).await? {
        state.sessions.remove(id);
    }
    session.flush().await?;
    Ok(Redirect::to("/"))
}

#[derive(Deserialize)]
pub struct FetchForm {
    pub industry: String,
    pub location: String,
}

/// POST /leads
pub async fn handle_fetch_leads(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<FetchForm>,
) -> Result<Redirect, AppError> {
    let (id, token) = require_token(&state, &session).await?;

    let industry = form.industry.trim();
    let location = form.location.trim();
    if industry.is_empty() || location.is_empty() {
        return Err(AppError::Validation(
            "Industry and location are both required".to_string(),
        ));
    }

    let report = state
        .leads
        .fetch_and_classify(&token, industry, location)
        .await;

    let notice = match report.error {
        Some(message) => Notice::error(message),
        None => Notice::success(ui::found_message(report.leads.counts())),
    };

    state.sessions.with_existing(id, |ctx| {
        ctx.board = Some(LeadBoard::from(report.leads));
        ctx.last_query = Some(LeadQuery {
            industry: industry.to_string(),
            location: location.to_string(),
        });
        ctx.notice = Some(notice);
    });

    Ok(Redirect::to("/"))
}

#[derive(Deserialize)]
pub struct SummaryForm {
    pub key: String,
}

/// POST /leads/summary
pub async fn handle_generate_summary(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<SummaryForm>,
) -> Result<Redirect, AppError> {
    let (id, _) = require_token(&state, &session).await?;

    let key = LeadKey::parse(&form.key)
        .ok_or_else(|| AppError::NotFound(format!("Lead {} not found", form.key)))?;

    let lead = state
        .sessions
        .with_existing(id, |ctx| {
            ctx.board
                .as_ref()
                .and_then(|board| board.entry(&key))
                .map(|entry| entry.lead.clone())
        })
        .flatten()
        .ok_or_else(|| AppError::NotFound(format!("Lead {key} not found")))?;

    let summary = state.summarizer.summarize(&lead).await;

    state.sessions.with_existing(id, |ctx| {
        // The board may have been replaced while the model was answering.
        if let Some(entry) = ctx.board.as_mut().and_then(|board| board.entry_mut(&key)) {
            entry.summary = Some(summary);
        }
    });

    Ok(Redirect::to(&format!("/#{}", key.anchor())))
}

/// GET /leads/export.csv
pub async fn handle_export(
    State(state): State<AppState>,
    session: Session,
) -> Result<Response, AppError> {
    let (id, _) = require_token(&state, &session).await?;

    let leads = state
        .sessions
        .with_existing(id, |ctx| ctx.board.as_ref().map(LeadBoard::to_classified))
        .flatten()
        .ok_or_else(|| AppError::NotFound("No leads fetched yet".to_string()))?;

    let csv = to_csv_bytes(&leads)?;
    let disposition =
        HeaderValue::from_str(&format!("attachment; filename=\"{EXPORT_FILE_NAME}\""))
            .map_err(anyhow::Error::from)?;

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("text/csv; charset=utf-8")),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        csv,
    )
        .into_response())
}
