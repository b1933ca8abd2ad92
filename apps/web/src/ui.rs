//! Server-rendered pages. Every interpolated value goes through `escape`.

use std::fmt::Write;

use axum::http::StatusCode;

use crate::leads::{Tier, TierCounts};
use crate::session::{LeadBoard, LeadEntry, Notice, NoticeKind};

const STYLE: &str = "body{font-family:sans-serif;max-width:1100px;margin:2rem auto;padding:0 1rem}\
    .notice{padding:.75rem 1rem;border-radius:4px;margin:1rem 0}\
    .success{background:#e6f4ea}.error{background:#fce8e6}\
    .lead{display:flex;justify-content:space-between;align-items:center;\
    padding:.5rem 0;border-bottom:1px solid #eee}\
    .summary{background:#e8f0fe;padding:.75rem 1rem;margin:.5rem 15%;\
    border-radius:4px;white-space:pre-wrap}\
    table{border-collapse:collapse;width:100%}\
    td,th{border:1px solid #ddd;padding:.35rem;text-align:left}\
    form.inline{display:inline}label{display:block;margin:.5rem 0}";

pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\">\
         <title>{}</title><style>{STYLE}</style></head>\
         <body>{body}</body></html>",
        escape(title)
    )
}

fn notice_html(notice: &Notice) -> String {
    let class = match notice.kind {
        NoticeKind::Success => "success",
        NoticeKind::Error => "error",
    };
    format!(
        "<div class=\"notice {class}\">{}</div>",
        escape(&notice.message)
    )
}

pub fn login_page(error: Option<&str>) -> String {
    let mut body = String::from("<h1>SaaSquatch Leads Login</h1>");
    if let Some(message) = error {
        body.push_str(&notice_html(&Notice::error(message)));
    }
    body.push_str(
        "<form method=\"post\" action=\"/login\">\
         <label>Email <input type=\"email\" name=\"email\" required></label>\
         <label>Password <input type=\"password\" name=\"password\" required></label>\
         <button type=\"submit\">Login</button></form>",
    );
    page("Lead Evaluator", &body)
}

pub struct LeadsView<'a> {
    pub industry: &'a str,
    pub location: &'a str,
    pub notice: Option<&'a Notice>,
    pub board: Option<&'a LeadBoard>,
}

pub fn found_message(counts: TierCounts) -> String {
    format!(
        "Found {} high, {} medium, {} low potential leads",
        counts.high, counts.medium, counts.low
    )
}

pub fn leads_page(view: &LeadsView<'_>) -> String {
    let mut body = String::new();
    body.push_str(
        "<form method=\"post\" action=\"/logout\" class=\"inline\" style=\"float:right\">\
         <button type=\"submit\">Log out</button></form><h1>Find Leads</h1>",
    );
    if let Some(notice) = view.notice {
        body.push_str(&notice_html(notice));
    }
    let _ = write!(
        body,
        "<form method=\"post\" action=\"/leads\">\
         <label>Business Type / Industry <input name=\"industry\" value=\"{}\"></label>\
         <label>Location <input name=\"location\" value=\"{}\"></label>\
         <button type=\"submit\">Fetch Leads</button></form>",
        escape(view.industry),
        escape(view.location)
    );

    if let Some(board) = view.board {
        render_board(&mut body, board);
    }

    page("Lead Evaluator", &body)
}

fn render_board(body: &mut String, board: &LeadBoard) {
    let high = board.tier(Tier::High);
    if !high.is_empty() {
        body.push_str("<h2>High Potential Leads</h2>");
        for entry in high {
            render_lead_row(body, entry);
        }
    }

    body.push_str("<details><summary>Medium Potential Leads</summary>");
    for entry in board.tier(Tier::Medium) {
        render_lead_row(body, entry);
    }
    body.push_str("</details>");

    body.push_str("<details><summary>Low Potential Leads</summary>");
    render_table(body, board.tier(Tier::Low));
    body.push_str("</details>");

    body.push_str("<p><a href=\"/leads/export.csv\" download>Download All Leads as CSV</a></p>");
}

fn render_lead_row(body: &mut String, entry: &LeadEntry) {
    let key = escape(&entry.key.to_string());
    let anchor = entry.key.anchor();
    let lead = &entry.lead;
    let _ = write!(
        body,
        "<div class=\"lead\" id=\"{anchor}\"><span><strong>{}</strong> - {} - {}</span>\
         <form method=\"post\" action=\"/leads/summary\" class=\"inline\">\
         <input type=\"hidden\" name=\"key\" value=\"{key}\">\
         <button type=\"submit\">Why might this be a good lead?</button></form></div>",
        escape(&lead.company),
        escape(&lead.industry),
        escape(&lead.website)
    );
    if let Some(summary) = &entry.summary {
        let _ = write!(body, "<div class=\"summary\">{}</div>", escape(summary));
    }
}

fn render_table(body: &mut String, entries: &[LeadEntry]) {
    body.push_str(
        "<table><thead><tr><th>Company</th><th>Industry</th><th>Address</th>\
         <th>BBB Rating</th><th>Phone</th><th>Website</th></tr></thead><tbody>",
    );
    for entry in entries {
        let lead = &entry.lead;
        body.push_str("<tr>");
        for cell in [
            &lead.company,
            &lead.industry,
            &lead.address,
            &lead.bbb_rating,
            &lead.phone,
            &lead.website,
        ] {
            let _ = write!(body, "<td>{}</td>", escape(cell));
        }
        body.push_str("</tr>");
    }
    body.push_str("</tbody></table>");
}

pub fn error_page(status: StatusCode, message: &str) -> String {
    let body = format!(
        "<h1>{}</h1><p>{}</p><p><a href=\"/\">Back</a></p>",
        status.as_u16(),
        escape(message)
    );
    page("Error", &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leads::{classify, Lead, RawLead};
    use crate::session::LeadKey;

    fn board() -> LeadBoard {
        let raws = vec![
            RawLead {
                company: "Acme <Corp>".into(),
                industry: "Software".into(),
                bbb_rating: "A+".into(),
                website: "acme.com".into(),
                ..Default::default()
            },
            RawLead {
                company: "Foo LLC".into(),
                website: "foo.com".into(),
                ..Default::default()
            },
            RawLead {
                company: "Bar & Co".into(),
                phone: "555-0100".into(),
                ..Default::default()
            },
        ];
        LeadBoard::from(classify(raws.into_iter().map(Lead::from)))
    }

    #[test]
    fn test_escape() {
        assert_eq!(
            escape(r#"<a href="x">'&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_login_page_shows_error() {
        let html = login_page(Some("Invalid email or password."));
        assert!(html.contains("Invalid email or password."));
        assert!(html.contains("action=\"/login\""));
    }

    #[test]
    fn test_leads_page_renders_tiers_escaped() {
        let mut board = board();
        let key = LeadKey::new(Tier::High, 0, "Acme <Corp>");
        board.entry_mut(&key).unwrap().summary = Some("Solid <b>fit</b>".into());

        let html = leads_page(&LeadsView {
            industry: "Software",
            location: "New York",
            notice: None,
            board: Some(&board),
        });

        assert!(html.contains("High Potential Leads"));
        assert!(html.contains("<strong>Acme &lt;Corp&gt;</strong>"));
        assert!(html.contains("Solid &lt;b&gt;fit&lt;/b&gt;"));
        assert!(html.contains("value=\"medium-0-foo_llc\""));
        assert!(html.contains("<td>Bar &amp; Co</td><td></td><td></td><td></td><td>555-0100</td>"));
        assert!(html.contains("/leads/export.csv"));
        assert!(!html.contains("<Corp>"));
    }

    #[test]
    fn test_empty_high_tier_has_no_heading() {
        let html = leads_page(&LeadsView {
            industry: "",
            location: "",
            notice: Some(&Notice::error("Failed to fetch leads: boom")),
            board: Some(&LeadBoard::default()),
        });
        assert!(!html.contains("High Potential Leads"));
        assert!(html.contains("Medium Potential Leads"));
        assert!(html.contains("notice error"));
    }

    #[test]
    fn test_found_message() {
        let counts = TierCounts {
            high: 2,
            medium: 1,
            low: 0,
        };
        assert_eq!(
            found_message(counts),
            "Found 2 high, 1 medium, 0 low potential leads"
        );
    }
}
