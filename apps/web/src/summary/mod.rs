//! Lead summaries: one prompt, one model call, trimmed text back.
//!
//! Failures become the summary text itself. Nothing is cached; asking again
//! re-issues the call.

use async_trait::async_trait;
use tracing::{info, warn};

use crate::leads::Lead;
use crate::llm_client::LlmClient;

pub mod prompts;

use prompts::LEAD_SUMMARY_PROMPT_TEMPLATE;

/// Carried in `AppState` as `Arc<dyn LeadSummarizer>`.
#[async_trait]
pub trait LeadSummarizer: Send + Sync {
    async fn summarize(&self, lead: &Lead) -> String;
}

pub fn build_prompt(lead: &Lead) -> String {
    fill_template(
        LEAD_SUMMARY_PROMPT_TEMPLATE,
        &[
            ("company", lead.company.as_str()),
            ("industry", lead.industry.as_str()),
            ("address", lead.address.as_str()),
            ("bbb_rating", lead.bbb_rating.as_str()),
            ("website", lead.website.as_str()),
        ],
    )
}

/// Substitutes `{name}` placeholders in one pass over the template.
/// Substituted values are copied verbatim, never rescanned. Unknown
/// placeholders are left as they are.
fn fill_template(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        let substitution = tail.find('}').and_then(|end| {
            let name = &tail[1..end];
            vars.iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value, end))
        });
        match substitution {
            Some((value, end)) => {
                out.push_str(value);
                rest = &tail[end + 1..];
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

pub struct GeminiSummarizer {
    llm: LlmClient,
}

impl GeminiSummarizer {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl LeadSummarizer for GeminiSummarizer {
    async fn summarize(&self, lead: &Lead) -> String {
        let prompt = build_prompt(lead);
        match self.llm.call_text(&prompt).await {
            Ok(text) => {
                info!(company = %lead.company, "Generated lead summary");
                text.trim().to_string()
            }
            Err(e) => {
                warn!(company = %lead.company, "Lead summary failed: {e}");
                format!("Summary generation failed: {e}")
            }
        }
    }
}
