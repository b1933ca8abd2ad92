//! Per-browser session contexts.
//!
//! A session holds the login token, the last fetched board and a one-shot
//! notice. Everything lives in memory and is gone on restart.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tower_sessions::{session, Session};
use uuid::Uuid;

use crate::auth::SessionToken;
use crate::leads::{ClassifiedLeads, Lead, Tier, TierCounts};

/// Stable identity of one displayed lead: its tier, a company slug and its
/// position within the tier. The ordinal tells apart duplicate names.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LeadKey {
    pub tier: Tier,
    pub ordinal: usize,
    pub slug: String,
}

impl LeadKey {
    pub fn new(tier: Tier, ordinal: usize, company: &str) -> Self {
        Self {
            tier,
            ordinal,
            slug: slugify(company),
        }
    }

    /// Parses the `<tier>-<ordinal>-<slug>` form produced by `Display`.
    pub fn parse(s: &str) -> Option<Self> {
        let mut parts = s.splitn(3, '-');
        let tier = Tier::parse(parts.next()?)?;
        let ordinal = parts.next()?.parse().ok()?;
        let slug = parts.next().unwrap_or_default().to_string();
        Some(Self { tier, ordinal, slug })
    }

    /// HTML id / URL fragment for the lead's row. ASCII only.
    pub fn anchor(&self) -> String {
        format!("lead-{}-{}", self.tier, self.ordinal)
    }
}

impl std::fmt::Display for LeadKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}-{}", self.tier, self.ordinal, self.slug)
    }
}

pub fn slugify(company: &str) -> String {
    company.trim().to_lowercase().replace([' ', '.'], "_")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeadEntry {
    pub key: LeadKey,
    pub lead: Lead,
    pub summary: Option<String>,
}

/// The classified leads of the last fetch, with their display state.
#[derive(Debug, Clone, Default)]
pub struct LeadBoard {
    high: Vec<LeadEntry>,
    medium: Vec<LeadEntry>,
    low: Vec<LeadEntry>,
}

impl From<ClassifiedLeads> for LeadBoard {
    fn from(leads: ClassifiedLeads) -> Self {
        let entries = |tier: Tier, leads: Vec<Lead>| -> Vec<LeadEntry> {
            leads
                .into_iter()
                .enumerate()
                .map(|(i, lead)| LeadEntry {
                    key: LeadKey::new(tier, i, &lead.company),
                    lead,
                    summary: None,
                })
                .collect()
        };
        Self {
            high: entries(Tier::High, leads.high),
            medium: entries(Tier::Medium, leads.medium),
            low: entries(Tier::Low, leads.low),
        }
    }
}

impl LeadBoard {
    pub fn tier(&self, tier: Tier) -> &[LeadEntry] {
        match tier {
            Tier::High => &self.high,
            Tier::Medium => &self.medium,
            Tier::Low => &self.low,
        }
    }

    fn tier_mut(&mut self, tier: Tier) -> &mut Vec<LeadEntry> {
        match tier {
            Tier::High => &mut self.high,
            Tier::Medium => &mut self.medium,
            Tier::Low => &mut self.low,
        }
    }

    /// Looks up by ordinal and checks the slug, so a key from an older board
    /// does not resolve to a different company.
    pub fn entry(&self, key: &LeadKey) -> Option<&LeadEntry> {
        self.tier(key.tier)
            .get(key.ordinal)
            .filter(|e| e.key == *key)
    }

    pub fn entry_mut(&mut self, key: &LeadKey) -> Option<&mut LeadEntry> {
        self.tier_mut(key.tier)
            .get_mut(key.ordinal)
            .filter(|e| e.key == *key)
    }

    pub fn counts(&self) -> TierCounts {
        TierCounts {
            high: self.high.len(),
            medium: self.medium.len(),
            low: self.low.len(),
        }
    }

    pub fn to_classified(&self) -> ClassifiedLeads {
        let leads = |entries: &[LeadEntry]| entries.iter().map(|e| e.lead.clone()).collect();
        ClassifiedLeads {
            high: leads(&self.high),
            medium: leads(&self.medium),
            low: leads(&self.low),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LeadQuery {
    pub industry: String,
    pub location: String,
}

#[derive(Debug, Default)]
pub struct SessionContext {
    pub token: Option<SessionToken>,
    pub board: Option<LeadBoard>,
    pub last_query: Option<LeadQuery>,
    /// Shown once on the next render.
    pub notice: Option<Notice>,
}

/// All live sessions. The lock is never held across an external call.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<Mutex<HashMap<Uuid, SessionContext>>>,
}

impl SessionStore {
    /// Runs `f` against the session, creating an empty one if needed.
    pub fn with<R>(&self, id: Uuid, f: impl FnOnce(&mut SessionContext) -> R) -> R {
        let mut sessions = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        f(sessions.entry(id).or_default())
    }

    /// Runs `f` against an existing session only. Returns `None`, and creates
    /// nothing, when the id is unknown.
    pub fn with_existing<R>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut SessionContext) -> R,
    ) -> Option<R> {
        let mut sessions = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        sessions.get_mut(&id).map(f)
    }

    /// Read-only lookup; does not create a session.
    pub fn token(&self, id: Uuid) -> Option<SessionToken> {
        let sessions = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        sessions.get(&id).and_then(|ctx| ctx.token.clone())
    }

    /// Tears down the session context.
    pub fn remove(&self, id: Uuid) {
        let mut sessions = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if sessions.remove(&id).is_some() {
            tracing::info!(session = %id, "Session closed");
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

/// Key under which the cookie-backed session holds its context id.
const CONTEXT_ID_KEY: &str = "context_id";

/// The context id recorded in the cookie session, if any. Never writes.
pub async fn context_id(session: &Session) -> Result<Option<Uuid>, session::Error> {
    session.get::<Uuid>(CONTEXT_ID_KEY).await
}

/// Returns the session's context id, recording a new one if needed.
pub async fn ensure_context_id(session: &Session) -> Result<Uuid, session::Error> {
    if let Some(id) = context_id(session).await? {
        return Ok(id);
    }
    let id = Uuid::new_v4();
    session.insert(CONTEXT_ID_KEY, id).await?;
    Ok(id)
}
