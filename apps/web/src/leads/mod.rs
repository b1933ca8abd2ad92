//! Leads query adapter: one authenticated POST, then tiering.
//!
//! Failures never escape `fetch_and_classify`; the caller gets three empty
//! tiers and a display message instead.

use reqwest::{header, Client};
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::auth::SessionToken;
use crate::config::Config;

pub mod classify;
pub mod export;

pub use classify::{classify, ClassifiedLeads, Lead, RawLead, Tier, TierCounts};

/// The API is only ever asked for its first page.
const PAGE: u32 = 1;
const USER_AGENT: &str = "Mozilla/5.0";
const ACCEPT: &str = "application/json, text/plain, */*";

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("leads API returned status {status}: {body}")]
    Status { status: u16, body: String },
}

#[derive(Debug, Serialize)]
struct LeadQuery<'a> {
    industry: &'a str,
    location: &'a str,
    page: u32,
}

/// Outcome of a fetch. `error` is set when the request failed, in which case
/// `leads` is empty.
#[derive(Debug, Default)]
pub struct FetchReport {
    pub leads: ClassifiedLeads,
    pub error: Option<String>,
}

#[derive(Clone)]
pub struct LeadsClient {
    client: Client,
    url: String,
    origin: String,
    cookie_name: String,
}

impl LeadsClient {
    pub fn new(url: String, origin: String, cookie_name: String) -> Self {
        Self {
            // No request timeout on this call.
            client: Client::new(),
            url,
            origin,
            cookie_name,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.leads_api_url.clone(),
            config.leads_origin.clone(),
            config.session_cookie_name.clone(),
        )
    }

    /// Issues the single lead query and returns the raw records.
    pub async fn fetch(
        &self,
        token: &SessionToken,
        industry: &str,
        location: &str,
    ) -> Result<Vec<RawLead>, FetchError> {
        let body = LeadQuery {
            industry,
            location,
            page: PAGE,
        };

        let response = self
            .client
            .post(&self.url)
            .header(header::ACCEPT, ACCEPT)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::ORIGIN, &self.origin)
            .header(header::REFERER, format!("{}/", self.origin.trim_end_matches('/')))
            .header(header::USER_AGENT, USER_AGENT)
            .header(
                header::COOKIE,
                format!("{}={}", self.cookie_name, token.as_str()),
            )
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json::<Vec<RawLead>>().await?)
    }

    /// Fetches, normalizes and tiers leads. Never fails.
    pub async fn fetch_and_classify(
        &self,
        token: &SessionToken,
        industry: &str,
        location: &str,
    ) -> FetchReport {
        match self.fetch(token, industry, location).await {
            Ok(raw) => {
                let leads = classify(raw.into_iter().map(Lead::from));
                let counts = leads.counts();
                info!(
                    industry,
                    location,
                    high = counts.high,
                    medium = counts.medium,
                    low = counts.low,
                    "Fetched leads"
                );
                FetchReport { leads, error: None }
            }
            Err(e) => {
                warn!(industry, location, "Lead fetch failed: {e}");
                FetchReport {
                    leads: ClassifiedLeads::default(),
                    error: Some(format!("Failed to fetch leads: {e}")),
                }
            }
        }
    }
}
