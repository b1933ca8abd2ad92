// Prompt template for lead summaries.

/// Lead summary prompt template.
/// Replace: {company}, {industry}, {address}, {bbb_rating}, {website}
pub const LEAD_SUMMARY_PROMPT_TEMPLATE: &str = r#"You are a highly skilled B2B sales analyst.

Analyze the following company in detail and return a 3-5 sentence business summary highlighting:
1. What the company likely specializes in (based on its name, industry, and website).
2. What kind of problems or inefficiencies they may face.
3. Why they are a strong or weak sales lead.
4. How we could best approach them with our product/service offering.

Company: {company}
Industry: {industry}
Address: {address}
BBB Rating: {bbb_rating}
Website: {website}

Write this like a mini-profile for a sales team to quickly understand the opportunity."#;
