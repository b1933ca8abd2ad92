//! Lead ingestion and tiering.
//!
//! A lead's tier depends only on whether `bbb_rating` and `website` carry a
//! real value after normalization. Tiers are assigned once at ingestion.

use serde::{Deserialize, Deserializer, Serialize};

/// Normalized values that count as "no value".
const PLACEHOLDERS: [&str; 4] = ["", "n/a", "na", "none"];

/// A record exactly as the leads API returns it.
/// Missing fields and JSON `null` both become empty strings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawLead {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub company: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub industry: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub address: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub bbb_rating: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub phone: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub website: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// A normalized lead. Column names match the CSV export header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lead {
    #[serde(rename = "Company")]
    pub company: String,
    #[serde(rename = "Industry")]
    pub industry: String,
    #[serde(rename = "Address")]
    pub address: String,
    #[serde(rename = "BBB Rating")]
    pub bbb_rating: String,
    #[serde(rename = "Phone")]
    pub phone: String,
    #[serde(rename = "Website")]
    pub website: String,
}

impl From<RawLead> for Lead {
    fn from(raw: RawLead) -> Self {
        Self {
            company: raw.company.trim().to_string(),
            industry: raw.industry.trim().to_string(),
            address: raw.address.trim().to_string(),
            bbb_rating: normalize(&raw.bbb_rating),
            phone: raw.phone.trim().to_string(),
            website: normalize(&raw.website),
        }
    }
}

impl Lead {
    pub fn has_rating(&self) -> bool {
        is_present(&self.bbb_rating)
    }

    pub fn has_website(&self) -> bool {
        is_present(&self.website)
    }
}

/// Trim and lower-case a comparison field.
pub fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

/// True when the normalized value is not a placeholder.
pub fn is_present(value: &str) -> bool {
    !PLACEHOLDERS.contains(&normalize(value).as_str())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    High,
    Medium,
    Low,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::High, Tier::Medium, Tier::Low];

    /// High needs both rating and website, Medium needs a website, the rest are Low.
    pub fn of(lead: &Lead) -> Self {
        match (lead.has_rating(), lead.has_website()) {
            (true, true) => Tier::High,
            (false, true) => Tier::Medium,
            _ => Tier::Low,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::High => "high",
            Tier::Medium => "medium",
            Tier::Low => "low",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "high" => Some(Tier::High),
            "medium" => Some(Tier::Medium),
            "low" => Some(Tier::Low),
            _ => None,
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TierCounts {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

/// Leads partitioned into tiers. Input order is kept within each tier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassifiedLeads {
    pub high: Vec<Lead>,
    pub medium: Vec<Lead>,
    pub low: Vec<Lead>,
}

impl ClassifiedLeads {
    /// Every lead, high first, then medium, then low.
    pub fn all(&self) -> impl Iterator<Item = &Lead> {
        self.high.iter().chain(&self.medium).chain(&self.low)
    }

    pub fn counts(&self) -> TierCounts {
        TierCounts {
            high: self.high.len(),
            medium: self.medium.len(),
            low: self.low.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.high.is_empty() && self.medium.is_empty() && self.low.is_empty()
    }
}

pub fn classify(leads: impl IntoIterator<Item = Lead>) -> ClassifiedLeads {
    let mut out = ClassifiedLeads::default();
    for lead in leads {
        match Tier::of(&lead) {
            Tier::High => out.high.push(lead),
            Tier::Medium => out.medium.push(lead),
            Tier::Low => out.low.push(lead),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(company: &str, rating: &str, website: &str) -> RawLead {
        RawLead {
            company: company.into(),
            bbb_rating: rating.into(),
            website: website.into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_rating_and_website_is_high() {
        let lead = Lead::from(raw("Acme Corp", "A+", "acme.com"));
        assert_eq!(Tier::of(&lead), Tier::High);
    }

    #[test]
    fn test_placeholder_rating_with_website_is_medium() {
        let lead = Lead::from(raw("Foo LLC", "N/A", "foo.com"));
        assert_eq!(Tier::of(&lead), Tier::Medium);
    }

    #[test]
    fn test_nothing_is_low() {
        let lead = Lead::from(raw("Bar Inc", "", ""));
        assert_eq!(Tier::of(&lead), Tier::Low);
    }

    #[test]
    fn test_rating_without_website_is_low() {
        let lead = Lead::from(raw("Baz Co", "B", "none"));
        assert_eq!(Tier::of(&lead), Tier::Low);
    }

    #[test]
    fn test_placeholders_are_absent_in_any_case_and_padding() {
        for value in ["", "  ", "N/A", "n/a", "NA", " na ", "None", "NONE"] {
            assert!(!is_present(value), "{value:?} should be absent");
        }
        for value in ["A+", "acme.com", "nan", "n/a/b"] {
            assert!(is_present(value), "{value:?} should be present");
        }
    }

    #[test]
    fn test_ingestion_normalizes_fields() {
        let lead = Lead::from(RawLead {
            company: "  Acme Corp ".into(),
            industry: " Software ".into(),
            address: " 1 Main St ".into(),
            bbb_rating: " A+ ".into(),
            phone: " 555-0100 ".into(),
            website: " WWW.Acme.COM ".into(),
        });
        assert_eq!(lead.company, "Acme Corp");
        assert_eq!(lead.industry, "Software");
        assert_eq!(lead.address, "1 Main St");
        assert_eq!(lead.bbb_rating, "a+");
        assert_eq!(lead.phone, "555-0100");
        assert_eq!(lead.website, "www.acme.com");
    }

    #[test]
    fn test_raw_lead_tolerates_null_and_missing() {
        let json = r#"{"company": "Acme", "website": null}"#;
        let raw: RawLead = serde_json::from_str(json).unwrap();
        assert_eq!(raw.company, "Acme");
        assert_eq!(raw.website, "");
        assert_eq!(raw.bbb_rating, "");
    }

    #[test]
    fn test_classify_keeps_order_and_every_lead_lands_once() {
        let input: Vec<Lead> = vec![
            raw("A", "A+", "a.com"),
            raw("B", "", "b.com"),
            raw("C", "", ""),
            raw("D", "B", "d.com"),
            raw("E", "na", "e.com"),
        ]
        .into_iter()
        .map(Lead::from)
        .collect();

        let classified = classify(input.clone());
        let names = |leads: &[Lead]| leads.iter().map(|l| l.company.clone()).collect::<Vec<_>>();

        assert_eq!(names(&classified.high), ["A", "D"]);
        assert_eq!(names(&classified.medium), ["B", "E"]);
        assert_eq!(names(&classified.low), ["C"]);
        assert_eq!(classified.all().count(), input.len());
        assert_eq!(
            classified.counts(),
            TierCounts {
                high: 2,
                medium: 2,
                low: 1
            }
        );
    }

    #[test]
    fn test_classify_is_idempotent() {
        let input: Vec<Lead> = vec![
            raw("A", "A+", "a.com"),
            raw("B", "", "b.com"),
            raw("C", "", ""),
        ]
        .into_iter()
        .map(Lead::from)
        .collect();

        let first = classify(input.clone());
        let second = classify(input);
        assert_eq!(first, second);

        let reclassified = classify(first.all().cloned().collect::<Vec<_>>());
        assert_eq!(reclassified, first);
    }

    #[test]
    fn test_tier_parse_round_trips_names() {
        for tier in Tier::ALL {
            assert_eq!(Tier::parse(tier.as_str()), Some(tier));
        }
        assert_eq!(Tier::parse("HIGH"), None);
    }
}
