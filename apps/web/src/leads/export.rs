//! CSV export of every classified lead.

use std::io::{Read, Write};

use anyhow::{Context, Result};

use super::classify::{ClassifiedLeads, Lead};

pub const CSV_HEADER: [&str; 6] = [
    "Company",
    "Industry",
    "Address",
    "BBB Rating",
    "Phone",
    "Website",
];
pub const EXPORT_FILE_NAME: &str = "all_leads.csv";

/// Writes the header followed by every lead in high, medium, low order.
/// The header is written even when there are no leads.
pub fn write_csv<W: Write>(leads: &ClassifiedLeads, writer: W) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    wtr.write_record(CSV_HEADER)?;
    for lead in leads.all() {
        wtr.serialize(lead)
            .with_context(|| format!("Failed to write lead '{}'", lead.company))?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn to_csv_bytes(leads: &ClassifiedLeads) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    write_csv(leads, &mut buf)?;
    Ok(buf)
}

pub fn read_csv<R: Read>(reader: R) -> Result<Vec<Lead>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut leads = Vec::new();
    for (row, record) in rdr.deserialize().enumerate() {
        let lead: Lead = record.with_context(|| format!("Invalid CSV row {}", row + 1))?;
        leads.push(lead);
    }
    Ok(leads)
}
